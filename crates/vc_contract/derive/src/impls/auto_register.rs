use proc_macro2::TokenStream;

use crate::derive_data::ContractMeta;

/// Generate `auto_register` implementation
#[cfg(feature = "auto_register")]
pub(crate) fn get_auto_register_impl(meta: &ContractMeta) -> TokenStream {
    use quote::quote_spanned;

    let Some(span) = meta.auto_register() else {
        return crate::utils::empty();
    };

    let auto_register_ = crate::path::auto_register_(meta.vc_contract_path());
    let real_type = meta.real_type();

    quote_spanned! { span =>
        #auto_register_::inventory::submit!{
            #auto_register_::__AutoRegisterFunc(
                <#real_type as #auto_register_::__RegisterType>::__register
            )
        }
    }
}

/// Generate `auto_register` implementation
#[cfg(not(feature = "auto_register"))]
pub(crate) fn get_auto_register_impl(_: &ContractMeta) -> TokenStream {
    crate::utils::empty()
}
