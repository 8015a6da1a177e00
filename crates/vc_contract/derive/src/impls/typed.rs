use proc_macro2::TokenStream;
use quote::quote;

use crate::derive_data::{ContractMeta, Target};

/// Generate the `TypeInfo` construction expression.
///
/// Similar to following:
///
/// ```ignore
/// TypeInfo::new::<Self>(TypeKind::Concrete)
///     .with_contract(ContractDecl::new().with_value("circle"))
///     .with_base::<Shape>()
///     .with_interface::<dyn Named>()
/// ```
fn type_info_tokens(meta: &ContractMeta) -> TokenStream {
    let vc_contract_path = meta.vc_contract_path();
    let type_info_ = crate::path::type_info_(vc_contract_path);
    let type_kind_ = crate::path::type_kind_(vc_contract_path);
    let attrs = meta.attrs();

    let kind = match meta.target() {
        Target::Trait => quote! { #type_kind_::Interface },
        _ if attrs.is_abstract.is_some() => quote! { #type_kind_::Abstract },
        _ => quote! { #type_kind_::Concrete },
    };

    let with_contract = if meta.target() == Target::Contract || attrs.declares_contract() {
        let contract_decl_ = crate::path::contract_decl_(vc_contract_path);
        let with_name = attrs.name.iter().map(|name| quote! { .with_name(#name) });
        let with_value = attrs.value.iter().map(|value| quote! { .with_value(#value) });
        let with_root = attrs.root.map(|_| quote! { .with_root(true) });
        quote! {
            .with_contract(#contract_decl_::new() #(#with_name)* #(#with_value)* #with_root)
        }
    } else {
        crate::utils::empty()
    };

    let with_base = attrs.base.iter().map(|base| quote! { .with_base::<#base>() });
    let with_interfaces = attrs
        .interfaces
        .iter()
        .map(|interface| quote! { .with_interface::<#interface>() });

    quote! {
        #type_info_::new::<Self>(#kind)
            #with_contract
            #(#with_base)*
            #(#with_interfaces)*
    }
}

/// Generate implementation code for `Typed`.
pub(crate) fn impl_trait_typed(meta: &ContractMeta) -> TokenStream {
    let vc_contract_path = meta.vc_contract_path();
    let typed_ = crate::path::typed_(vc_contract_path);
    let type_info_ = crate::path::type_info_(vc_contract_path);
    let info_cell_ = crate::path::non_generic_type_info_cell_(vc_contract_path);

    let real_type = meta.real_type();
    let type_info_tokens = type_info_tokens(meta);

    quote! {
        impl #typed_ for #real_type {
            fn type_info() -> &'static #type_info_ {
                static CELL: #info_cell_ = #info_cell_::new();
                CELL.get_or_init(|| {
                    #type_info_tokens
                })
            }
        }
    }
}
