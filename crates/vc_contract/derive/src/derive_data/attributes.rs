use proc_macro2::Span;
use syn::meta::ParseNestedMeta;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{Attribute, LitBool, LitStr, Token, Type};

use crate::CONTRACT_ATTRIBUTE_NAME;

/// What the attributes are attached to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Target {
    /// `#[derive(Contract)]`
    Contract,
    /// `#[derive(Typed)]`
    Typed,
    /// `#[contract_trait]`
    Trait,
}

/// Everything `#[contract(...)]` or `#[contract_trait(...)]` can declare.
///
/// ```ignore
/// #[contract(
///     name = "kind", value = "circle", root, abstract,
///     base = Shape, implements(dyn Named, dyn Sized2d),
///     type_path = "shapes::Circle", deserialize = false, auto_register,
/// )]
/// ```
///
/// Traits use `extends(dyn A, ...)` instead of `implements` and accept
/// neither `base`, `abstract` nor `deserialize`.
#[derive(Default, Debug)]
pub(crate) struct ContractAttributes {
    pub name: Option<LitStr>,
    pub value: Option<LitStr>,
    pub root: Option<Span>,
    pub is_abstract: Option<Span>,
    pub base: Option<Type>,
    pub interfaces: Vec<Type>,
    pub type_path: Option<LitStr>,
    pub deserialize: Option<LitBool>,
    pub auto_register: Option<Span>,
}

fn set_once<T>(slot: &mut Option<T>, value: T, meta: &ParseNestedMeta) -> syn::Result<()> {
    if slot.is_some() {
        return Err(meta.error("duplicate attribute"));
    }
    *slot = Some(value);
    Ok(())
}

fn parse_dyn_list(meta: &ParseNestedMeta) -> syn::Result<Vec<Type>> {
    let content;
    syn::parenthesized!(content in meta.input);
    let list = Punctuated::<Type, Token![,]>::parse_terminated(&content)?;

    list.into_iter()
        .map(|ty| match ty {
            Type::TraitObject(_) => Ok(ty),
            other => Err(syn::Error::new(other.span(), "expected `dyn Trait`")),
        })
        .collect()
}

impl ContractAttributes {
    /// Collects every `#[contract(...)]` attribute of a type.
    pub fn parse_attrs(attrs: &[Attribute], target: Target) -> syn::Result<Self> {
        let mut out = Self::default();
        for attr in attrs {
            if attr.path().is_ident(CONTRACT_ATTRIBUTE_NAME) {
                attr.parse_nested_meta(|meta| out.parse_meta(meta, target))?;
            }
        }
        out.validate(target)?;
        Ok(out)
    }

    /// Parses one item of the attribute list.
    pub fn parse_meta(&mut self, meta: ParseNestedMeta, target: Target) -> syn::Result<()> {
        let is_trait = target == Target::Trait;

        if meta.path.is_ident("name") {
            set_once(&mut self.name, meta.value()?.parse()?, &meta)
        } else if meta.path.is_ident("value") {
            set_once(&mut self.value, meta.value()?.parse()?, &meta)
        } else if meta.path.is_ident("root") {
            set_once(&mut self.root, meta.path.span(), &meta)
        } else if meta.path.is_ident("type_path") {
            set_once(&mut self.type_path, meta.value()?.parse()?, &meta)
        } else if meta.path.is_ident("auto_register") {
            set_once(&mut self.auto_register, meta.path.span(), &meta)
        } else if !is_trait && meta.path.is_ident("abstract") {
            set_once(&mut self.is_abstract, meta.path.span(), &meta)
        } else if !is_trait && meta.path.is_ident("base") {
            set_once(&mut self.base, meta.value()?.parse()?, &meta)
        } else if !is_trait && meta.path.is_ident("deserialize") {
            set_once(&mut self.deserialize, meta.value()?.parse()?, &meta)
        } else if !is_trait && meta.path.is_ident("implements") {
            self.interfaces.extend(parse_dyn_list(&meta)?);
            Ok(())
        } else if is_trait && meta.path.is_ident("extends") {
            self.interfaces.extend(parse_dyn_list(&meta)?);
            Ok(())
        } else if is_trait {
            Err(meta.error(
                "expected one of `name`, `value`, `root`, `extends`, `type_path`, `auto_register`",
            ))
        } else {
            Err(meta.error(
                "expected one of `name`, `value`, `root`, `abstract`, `base`, `implements`, \
                 `type_path`, `deserialize`, `auto_register`",
            ))
        }
    }

    pub fn validate(&self, target: Target) -> syn::Result<()> {
        if target == Target::Typed {
            let declared = [
                self.name.as_ref().map(LitStr::span),
                self.value.as_ref().map(LitStr::span),
                self.root,
            ];
            if let Some(span) = declared.into_iter().flatten().next() {
                return Err(syn::Error::new(
                    span,
                    "`Typed` declares no contract, use `#[derive(Contract)]` for `name`, `value` and `root`",
                ));
            }
        }
        if let Some(path) = &self.type_path
            && path.value().trim().is_empty()
        {
            return Err(syn::Error::new(path.span(), "`type_path` must not be empty"));
        }
        Ok(())
    }

    /// Returns `true` if a contract name, value or root flag was given.
    pub fn declares_contract(&self) -> bool {
        self.name.is_some() || self.value.is_some() || self.root.is_some()
    }

    /// Returns `true` unless `deserialize = false` was given.
    pub fn deserialize(&self) -> bool {
        self.deserialize.as_ref().is_none_or(LitBool::value)
    }
}

#[cfg(test)]
mod tests {
    use syn::{DeriveInput, parse_quote};

    use super::{ContractAttributes, Target};

    #[test]
    fn parse_all() {
        let input: DeriveInput = parse_quote! {
            #[contract(name = "kind", value = "circle", root, abstract)]
            #[contract(base = Shape, implements(dyn Named, dyn Sized2d))]
            #[contract(type_path = "shapes::Circle", deserialize = false, auto_register)]
            struct Circle;
        };
        let attrs = ContractAttributes::parse_attrs(&input.attrs, Target::Contract).unwrap();

        assert_eq!(attrs.name.unwrap().value(), "kind");
        assert_eq!(attrs.value.unwrap().value(), "circle");
        assert!(attrs.root.is_some());
        assert!(attrs.is_abstract.is_some());
        assert!(attrs.base.is_some());
        assert_eq!(attrs.interfaces.len(), 2);
        assert_eq!(attrs.type_path.unwrap().value(), "shapes::Circle");
        assert!(attrs.deserialize.is_some_and(|lit| !lit.value()));
        assert!(attrs.auto_register.is_some());
    }

    #[test]
    fn rejects_duplicates() {
        let input: DeriveInput = parse_quote! {
            #[contract(value = "a", value = "b")]
            struct Twice;
        };
        assert!(ContractAttributes::parse_attrs(&input.attrs, Target::Contract).is_err());
    }

    #[test]
    fn interfaces_are_trait_objects() {
        let input: DeriveInput = parse_quote! {
            #[contract(implements(Shape))]
            struct NotDyn;
        };
        assert!(ContractAttributes::parse_attrs(&input.attrs, Target::Contract).is_err());
    }

    #[test]
    fn typed_declares_no_contract() {
        let input: DeriveInput = parse_quote! {
            #[contract(value = "a")]
            struct Plain;
        };
        assert!(ContractAttributes::parse_attrs(&input.attrs, Target::Typed).is_err());
    }

    #[test]
    fn trait_keys() {
        let input: DeriveInput = parse_quote! {
            #[contract(base = Shape)]
            struct Trait;
        };
        assert!(ContractAttributes::parse_attrs(&input.attrs, Target::Trait).is_err());

        let input: DeriveInput = parse_quote! {
            #[contract(name = "kind", extends(dyn Shape))]
            struct Trait;
        };
        let attrs = ContractAttributes::parse_attrs(&input.attrs, Target::Trait).unwrap();
        assert!(attrs.declares_contract());
        assert_eq!(attrs.interfaces.len(), 1);
    }
}
