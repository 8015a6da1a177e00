// -----------------------------------------------------------------------------
// Modules

mod auto_register;
mod get_type_meta;
mod trait_object;
mod type_path;
mod typed;

// -----------------------------------------------------------------------------
// Internal API

use auto_register::get_auto_register_impl;
use get_type_meta::impl_trait_get_type_meta;
use type_path::impl_trait_type_path;
use typed::impl_trait_typed;

pub(crate) use trait_object::impl_contract_trait;

use proc_macro2::TokenStream;
use quote::quote;
use syn::DeriveInput;

use crate::derive_data::{ContractAttributes, ContractMeta, Target};

/// Expands `#[derive(Contract)]` and `#[derive(Typed)]`.
pub(crate) fn impl_derive(ast: &DeriveInput, target: Target) -> syn::Result<TokenStream> {
    let attrs = ContractAttributes::parse_attrs(&ast.attrs, target)?;
    let meta = ContractMeta::new(attrs, &ast.ident, &ast.generics, target)?;

    let type_path_impl = impl_trait_type_path(&meta);
    let typed_impl = impl_trait_typed(&meta);
    let get_type_meta_impl = impl_trait_get_type_meta(&meta);
    let auto_register = get_auto_register_impl(&meta);

    Ok(quote! {
        const _: () = {
            #type_path_impl
            #typed_impl
            #get_type_meta_impl
            #auto_register
        };
    })
}
