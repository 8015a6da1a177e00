//! Paths of the items the generated code refers to.
//!
//! Kept in one place so that moving an item inside `vc_contract` only
//! requires a change here.

use proc_macro2::TokenStream;
use quote::quote;

// -----------------------------------------------------------------------------
// Crate Path

/// Get the path under which the invoking crate sees `vc_contract`.
///
/// 1. For crates that depend on `vc_contract`, `::vc_contract` (or the renamed key).
/// 2. For crates that depend on `vc_poly`, `::vc_poly::contract`.
/// 3. Otherwise `::vc_contract`, which is also what `vc_contract` itself
///    resolves through `extern crate self as vc_contract`.
///
/// Reading the manifest is not free, so the path is computed once per
/// macro invocation and passed around.
pub(crate) fn vc_contract() -> syn::Path {
    vc_macro_utils::Manifest::shared(|manifest| manifest.get_crate_path("vc_contract"))
}

// -----------------------------------------------------------------------------
// core

pub(crate) struct OptionFP;

impl quote::ToTokens for OptionFP {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        tokens.extend(quote! { ::core::option::Option });
    }
}

pub(crate) struct ResultFP;

impl quote::ToTokens for ResultFP {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        tokens.extend(quote! { ::core::result::Result });
    }
}

// -----------------------------------------------------------------------------
// __macro_exports

#[inline(always)]
pub(crate) fn box_(vc_contract_path: &syn::Path) -> TokenStream {
    quote! { #vc_contract_path::__macro_exports::Box }
}

#[inline(always)]
pub(crate) fn any_(vc_contract_path: &syn::Path) -> TokenStream {
    quote! { #vc_contract_path::__macro_exports::Any }
}

#[inline(always)]
pub(crate) fn serde_core_(vc_contract_path: &syn::Path) -> TokenStream {
    quote! { #vc_contract_path::__macro_exports::serde_core }
}

#[cfg(feature = "auto_register")]
#[inline(always)]
pub(crate) fn auto_register_(vc_contract_path: &syn::Path) -> TokenStream {
    quote! { #vc_contract_path::__macro_exports::auto_register }
}

// -----------------------------------------------------------------------------
// info

#[inline]
pub(crate) fn type_path_(vc_contract_path: &syn::Path) -> TokenStream {
    quote! { #vc_contract_path::info::TypePath }
}

#[inline]
pub(crate) fn typed_(vc_contract_path: &syn::Path) -> TokenStream {
    quote! { #vc_contract_path::info::Typed }
}

#[inline]
pub(crate) fn type_info_(vc_contract_path: &syn::Path) -> TokenStream {
    quote! { #vc_contract_path::info::TypeInfo }
}

#[inline]
pub(crate) fn type_kind_(vc_contract_path: &syn::Path) -> TokenStream {
    quote! { #vc_contract_path::info::TypeKind }
}

#[inline]
pub(crate) fn contract_decl_(vc_contract_path: &syn::Path) -> TokenStream {
    quote! { #vc_contract_path::info::ContractDecl }
}

#[inline]
pub(crate) fn non_generic_type_info_cell_(vc_contract_path: &syn::Path) -> TokenStream {
    quote! { #vc_contract_path::info::NonGenericTypeInfoCell }
}

// -----------------------------------------------------------------------------
// registry

#[inline]
pub(crate) fn type_meta_(vc_contract_path: &syn::Path) -> TokenStream {
    quote! { #vc_contract_path::registry::TypeMeta }
}

#[inline]
pub(crate) fn get_type_meta_(vc_contract_path: &syn::Path) -> TokenStream {
    quote! { #vc_contract_path::registry::GetTypeMeta }
}

#[inline]
pub(crate) fn from_type_(vc_contract_path: &syn::Path) -> TokenStream {
    quote! { #vc_contract_path::registry::FromType }
}

#[inline]
pub(crate) fn type_registry_(vc_contract_path: &syn::Path) -> TokenStream {
    quote! { #vc_contract_path::registry::TypeRegistry }
}

#[inline]
pub(crate) fn type_trait_cast_(vc_contract_path: &syn::Path) -> TokenStream {
    quote! { #vc_contract_path::registry::TypeTraitCast }
}

#[inline]
pub(crate) fn type_trait_upcast_(vc_contract_path: &syn::Path) -> TokenStream {
    quote! { #vc_contract_path::registry::TypeTraitUpcast }
}

#[inline]
pub(crate) fn type_trait_deserialize_(vc_contract_path: &syn::Path) -> TokenStream {
    quote! { #vc_contract_path::registry::TypeTraitDeserialize }
}

// -----------------------------------------------------------------------------
// serde

#[inline]
pub(crate) fn contract_object_(vc_contract_path: &syn::Path) -> TokenStream {
    quote! { #vc_contract_path::serde::ContractObject }
}

#[inline]
pub(crate) fn serialize_contract_(vc_contract_path: &syn::Path) -> TokenStream {
    quote! { #vc_contract_path::serde::serialize_contract }
}

#[inline]
pub(crate) fn deserialize_contract_(vc_contract_path: &syn::Path) -> TokenStream {
    quote! { #vc_contract_path::serde::deserialize_contract }
}
