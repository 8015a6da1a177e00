use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use syn::{Generics, Ident, Path};

use super::{ContractAttributes, Target};

/// Information shared by all generated impls of one type or trait.
pub(crate) struct ContractMeta<'a> {
    vc_contract_path: Path,
    attrs: ContractAttributes,
    ident: &'a Ident,
    target: Target,
}

impl core::fmt::Debug for ContractMeta<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ContractMeta")
            .field("vc_contract_path", &self.vc_contract_path.to_token_stream())
            .field("ident", &self.ident)
            .field("target", &self.target)
            .field("attrs", &self.attrs)
            .finish()
    }
}

impl<'a> ContractMeta<'a> {
    /// Fails for generic types: their instances cannot be enumerated.
    pub fn new(
        attrs: ContractAttributes,
        ident: &'a Ident,
        generics: &Generics,
        target: Target,
    ) -> syn::Result<Self> {
        if !generics.params.is_empty() || generics.where_clause.is_some() {
            return Err(syn::Error::new_spanned(
                generics,
                "generic types cannot take part in contract hierarchies",
            ));
        }

        Ok(Self {
            vc_contract_path: crate::path::vc_contract(),
            attrs,
            ident,
            target,
        })
    }

    #[inline]
    pub fn vc_contract_path(&self) -> &Path {
        &self.vc_contract_path
    }

    #[inline]
    pub fn attrs(&self) -> &ContractAttributes {
        &self.attrs
    }

    #[inline]
    pub fn target(&self) -> Target {
        self.target
    }

    /// The type the impls are written for: `Ident` or `dyn Ident`.
    pub fn real_type(&self) -> TokenStream {
        let ident = self.ident;
        match self.target {
            Target::Trait => quote! { dyn #ident },
            Target::Contract | Target::Typed => quote! { #ident },
        }
    }

    fn dyn_prefix(&self) -> &'static str {
        match self.target {
            Target::Trait => "dyn ",
            Target::Contract | Target::Typed => "",
        }
    }

    /// Tokens of a `&'static str` expression holding the full type path.
    pub fn type_path(&self) -> TokenStream {
        let prefix = self.dyn_prefix();
        match &self.attrs.type_path {
            Some(path) => {
                let path = format!("{prefix}{}", path.value());
                quote! { #path }
            }
            None => {
                let ident = self.ident.to_string();
                quote! { ::core::concat!(#prefix, ::core::module_path!(), "::", #ident) }
            }
        }
    }

    /// Tokens of a `&'static str` expression holding the short type name.
    pub fn type_name(&self) -> TokenStream {
        let name = match &self.attrs.type_path {
            Some(path) => {
                let path = path.value();
                let (_, name) = crate::utils::split_type_path(&path);
                format!("{}{name}", self.dyn_prefix())
            }
            None => format!("{}{}", self.dyn_prefix(), self.ident),
        };
        quote! { #name }
    }

    /// Tokens of an `Option<&'static str>` expression holding the module path.
    pub fn module_path(&self) -> TokenStream {
        let option_ = crate::path::OptionFP;
        match &self.attrs.type_path {
            Some(path) => match crate::utils::split_type_path(&path.value()) {
                (Some(module), _) => quote! { #option_::Some(#module) },
                (None, _) => quote! { #option_::None },
            },
            None => quote! { #option_::Some(::core::module_path!()) },
        }
    }

    /// `Some(span)` if the type should be submitted for auto registration.
    #[inline]
    pub fn auto_register(&self) -> Option<proc_macro2::Span> {
        self.attrs.auto_register
    }
}
