use proc_macro2::TokenStream;
use quote::quote;

use crate::derive_data::ContractMeta;

/// Generate implementation code for `TypePath`.
pub(crate) fn impl_trait_type_path(meta: &ContractMeta) -> TokenStream {
    let vc_contract_path = meta.vc_contract_path();
    let type_path_ = crate::path::type_path_(vc_contract_path);
    let option_ = crate::path::OptionFP;

    let real_type = meta.real_type();
    let type_path = meta.type_path();
    let type_name = meta.type_name();
    let module_path = meta.module_path();

    quote! {
        impl #type_path_ for #real_type {
            #[inline]
            fn type_path() -> &'static str {
                #type_path
            }

            #[inline]
            fn type_name() -> &'static str {
                #type_name
            }

            #[inline]
            fn module_path() -> #option_<&'static str> {
                #module_path
            }
        }
    }
}
