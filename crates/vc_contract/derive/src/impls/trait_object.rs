use proc_macro2::TokenStream;
use quote::quote;
use syn::{ItemTrait, Type, TypeParamBound, parse_quote};

use crate::derive_data::{ContractAttributes, ContractMeta, Target};

/// Generate `Serialize for dyn Trait` and `Deserialize for Box<dyn Trait>`.
///
/// Both go through the contract converter, so a trait object is always
/// written with its discriminator.
fn impl_serde(meta: &ContractMeta) -> TokenStream {
    let vc_contract_path = meta.vc_contract_path();
    let serde_core_ = crate::path::serde_core_(vc_contract_path);
    let box_ = crate::path::box_(vc_contract_path);
    let result_ = crate::path::ResultFP;
    let serialize_contract_ = crate::path::serialize_contract_(vc_contract_path);
    let deserialize_contract_ = crate::path::deserialize_contract_(vc_contract_path);

    let real_type = meta.real_type();

    quote! {
        impl #serde_core_::Serialize for #real_type {
            fn serialize<S>(&self, serializer: S) -> #result_<S::Ok, S::Error>
            where
                S: #serde_core_::Serializer,
            {
                #serialize_contract_(self, serializer)
            }
        }

        impl<'de> #serde_core_::Deserialize<'de> for #box_<#real_type> {
            fn deserialize<D>(deserializer: D) -> #result_<Self, D::Error>
            where
                D: #serde_core_::Deserializer<'de>,
            {
                #deserialize_contract_::<#real_type, D>(deserializer)
            }
        }
    }
}

/// Expands `#[contract_trait(...)]`.
///
/// The trait gains `ContractObject` and every extended trait as supertraits;
/// `dyn Trait` gets `TypePath`, `Typed`, `GetTypeMeta` and serde support.
pub(crate) fn impl_contract_trait(
    attrs: ContractAttributes,
    mut item: ItemTrait,
) -> syn::Result<TokenStream> {
    let ident = item.ident.clone();
    let meta = ContractMeta::new(attrs, &ident, &item.generics, Target::Trait)?;

    let contract_object_ = crate::path::contract_object_(meta.vc_contract_path());
    let mut supertraits: Vec<TypeParamBound> = vec![parse_quote! { #contract_object_ }];
    for extended in &meta.attrs().interfaces {
        if let Type::TraitObject(object) = extended {
            supertraits.extend(object.bounds.iter().cloned());
        }
    }
    item.colon_token.get_or_insert_with(Default::default);
    item.supertraits.extend(supertraits);

    let type_path_impl = super::impl_trait_type_path(&meta);
    let typed_impl = super::impl_trait_typed(&meta);
    let get_type_meta_impl = super::impl_trait_get_type_meta(&meta);
    let serde_impl = impl_serde(&meta);
    let auto_register = super::get_auto_register_impl(&meta);

    Ok(quote! {
        #item

        const _: () = {
            #type_path_impl
            #typed_impl
            #get_type_meta_impl
            #serde_impl
            #auto_register
        };
    })
}
