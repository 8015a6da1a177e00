use proc_macro2::{Span, TokenStream};
use quote::{quote, quote_spanned};
use syn::Ident;
use syn::spanned::Spanned;

use crate::derive_data::{ContractMeta, Target};

/// Generate implementation code for `GetTypeMeta`.
///
/// Types receive `TypeTraitCast<Self>`, one `TypeTraitCast<dyn I>` per
/// implemented interface and, for concrete `Contract` types,
/// `TypeTraitDeserialize`. Types and trait objects with interfaces (or
/// extended traits) receive a `TypeTraitUpcast` with one step per entry.
///
/// Ancestors are registered as dependencies.
pub(crate) fn impl_trait_get_type_meta(meta: &ContractMeta) -> TokenStream {
    let vc_contract_path = meta.vc_contract_path();
    let get_type_meta_ = crate::path::get_type_meta_(vc_contract_path);
    let type_meta_ = crate::path::type_meta_(vc_contract_path);
    let from_type_ = crate::path::from_type_(vc_contract_path);
    let type_registry_ = crate::path::type_registry_(vc_contract_path);
    let attrs = meta.attrs();

    let outer_ = Ident::new("__outer", Span::call_site());

    let box_ = crate::path::box_(vc_contract_path);
    let mut inserts = Vec::new();

    if meta.target() != Target::Trait {
        let type_trait_cast_ = crate::path::type_trait_cast_(vc_contract_path);

        inserts.push(quote! {
            #type_meta_::insert_trait::<#type_trait_cast_<Self>>(&mut #outer_, #from_type_::<Self>::from_type());
        });

        let deserialize = meta.target() == Target::Contract
            && attrs.is_abstract.is_none()
            && attrs.deserialize();
        if deserialize {
            let type_trait_deserialize_ = crate::path::type_trait_deserialize_(vc_contract_path);
            inserts.push(quote! {
                #type_meta_::insert_trait::<#type_trait_deserialize_>(&mut #outer_, #from_type_::<Self>::from_type());
            });
        }

        inserts.extend(attrs.interfaces.iter().map(|interface| {
            quote_spanned! { interface.span() =>
                #type_meta_::insert_trait::<#type_trait_cast_<#interface>>(
                    &mut #outer_,
                    #type_trait_cast_::<#interface>::new(|value| {
                        value.downcast::<Self>().map(|value| value as #box_<#interface>)
                    }),
                );
            }
        }));
    }

    if !attrs.interfaces.is_empty() {
        let type_trait_upcast_ = crate::path::type_trait_upcast_(vc_contract_path);
        let any_ = crate::path::any_(vc_contract_path);

        // Concrete types start from `Box<Self>`, trait objects from `Box<Box<Self>>`.
        let source = if meta.target() == Target::Trait {
            quote! { #box_<Self> }
        } else {
            quote! { Self }
        };
        let value = if meta.target() == Target::Trait {
            quote! { *value }
        } else {
            quote! { value }
        };
        let steps = attrs.interfaces.iter().map(|interface| {
            quote_spanned! { interface.span() =>
                .with::<#interface>(|value| {
                    value
                        .downcast::<#source>()
                        .map(|value| #box_::new(#value as #box_<#interface>) as #box_<dyn #any_>)
                })
            }
        });
        inserts.push(quote! {
            #type_meta_::insert_trait::<#type_trait_upcast_>(
                &mut #outer_,
                #type_trait_upcast_::new() #(#steps)*,
            );
        });
    }

    let trait_counter = inserts.len();

    let dependencies: Vec<TokenStream> = attrs
        .base
        .iter()
        .chain(attrs.interfaces.iter())
        .map(|ty| quote! { #type_registry_::register::<#ty>(registry); })
        .collect();

    let real_type = meta.real_type();

    let body = if inserts.is_empty() {
        quote! { #type_meta_::of::<Self>() }
    } else {
        quote! {
            let mut #outer_ = #type_meta_::with_capacity::<Self>(#trait_counter);
            #(#inserts)*
            #outer_
        }
    };

    let register_dependencies = if dependencies.is_empty() {
        crate::utils::empty()
    } else {
        quote! {
            fn register_dependencies(registry: &mut #type_registry_) {
                #(#dependencies)*
            }
        }
    };

    quote! {
        impl #get_type_meta_ for #real_type {
            fn get_type_meta() -> #type_meta_ {
                #body
            }

            #register_dependencies
        }
    }
}
