//! See following macros:
//!
//! - [`Contract`]
//! - [`Typed`]
//! - [`contract_trait`]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::std_instead_of_core, reason = "proc-macro lib")]
#![allow(clippy::std_instead_of_alloc, reason = "proc-macro lib")]

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemTrait, parse_macro_input};

static CONTRACT_ATTRIBUTE_NAME: &str = "contract";

// -----------------------------------------------------------------------------
// Modules

mod derive_data;
mod impls;
mod path;
mod utils;

use derive_data::{ContractAttributes, Target};

// -----------------------------------------------------------------------------
// Macros

/// # Contract Derivation
///
/// `#[derive(Contract)]` declares a type as member (or root) of a contract
/// hierarchy. It implements the following traits:
///
/// - `TypePath`
/// - `Typed`, with a `ContractDecl`
/// - `GetTypeMeta`, carrying `TypeTraitDeserialize` and `TypeTraitCast`s
///
/// The type must also implement `serde::Serialize` and `serde::Deserialize`.
///
/// ## Contract
///
/// ```rust, ignore
/// #[derive(Contract, Serialize, Deserialize)]
/// #[contract(name = "kind", value = "vehicle")]
/// struct Vehicle { wheels: u8 }
/// ```
///
/// - `name = "..."`: the discriminator field name. Makes the type a root.
/// - `root`: makes the type a root named `"$type"` unless `name` is given.
/// - `value = "..."`: the discriminator value. Defaults to the type name for
///   concrete types.
///
/// Blank strings count as absent.
///
/// ## Ancestry
///
/// Rust has no inheritance, so the ancestry the serialized form follows is
/// declared:
///
/// ```rust, ignore
/// #[derive(Contract, Serialize, Deserialize)]
/// #[contract(value = "car", base = Vehicle, implements(dyn Driveable))]
/// struct Car { wheels: u8, seats: u8 }
///
/// impl Driveable for Car {}
/// ```
///
/// - `base = Type`: the base type, any type implementing `Typed`.
/// - `implements(dyn A, dyn B)`: the `#[contract_trait]` traits the type
///   implements. A value can only be read as `Box<dyn A>` if `dyn A` is
///   listed here.
///
/// ## Abstract Types
///
/// `abstract` marks a type that is never written as itself: it receives no
/// default discriminator value and no `TypeTraitDeserialize`, so it does not
/// need to implement `Deserialize`. `deserialize = false` skips
/// `TypeTraitDeserialize` alone.
///
/// ## Custom Type Path
///
/// ```rust, ignore
/// #[derive(Contract, Serialize, Deserialize)]
/// #[contract(type_path = "garage::Car")]
/// struct Car;
/// ```
///
/// The type name (and with it the default discriminator value) is the last
/// segment of the path.
///
/// ## Auto Registration
///
/// `auto_register` submits the type to `TypeRegistry::auto_register`. It is
/// a no-op when the `auto_register` feature is disabled.
///
/// Generic types are rejected: their instantiations cannot be enumerated.
#[proc_macro_derive(Contract, attributes(contract))]
pub fn derive_contract(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    impls::impl_derive(&ast, Target::Contract)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// # Typed Derivation
///
/// Implements `TypePath`, `Typed` and `GetTypeMeta` without a contract
/// declaration. The type is an ancestor or interface implementor but never
/// a hierarchy member itself.
///
/// Accepts the `#[contract(...)]` keys of [`derive Contract`](derive_contract)
/// except `name`, `value` and `root`. No `TypeTraitDeserialize` is
/// registered.
///
/// ```rust, ignore
/// #[derive(Typed, Serialize)]
/// #[contract(implements(dyn Driveable))]
/// struct Trailer;
/// ```
#[proc_macro_derive(Typed, attributes(contract))]
pub fn derive_typed(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    impls::impl_derive(&ast, Target::Typed)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Declares a trait whose trait object takes part in contract hierarchies.
///
/// The trait gains `ContractObject` as supertrait, and `dyn Trait` gets
/// `TypePath`, `Typed` and `GetTypeMeta`, a `Serialize` implementation that
/// writes the discriminator, and a `Deserialize` implementation for
/// `Box<dyn Trait>` that resolves it.
///
/// ```rust, ignore
/// #[contract_trait(name = "kind")]
/// pub trait Shape {
///     fn area(&self) -> f64;
/// }
///
/// #[contract_trait(extends(dyn Shape))]
/// pub trait Polygon {
///     fn corners(&self) -> usize;
/// }
/// ```
///
/// Accepted keys: `name`, `value`, `root`, `type_path`, `auto_register` as
/// for [`derive Contract`](derive_contract), and `extends(dyn A, ...)`,
/// which also adds the extended traits as supertraits. Without `name`,
/// `value` or `root` the trait declares no contract.
///
/// Generic traits are rejected.
#[proc_macro_attribute]
pub fn contract_trait(args: TokenStream, input: TokenStream) -> TokenStream {
    let mut attrs = ContractAttributes::default();
    let parser = syn::meta::parser(|meta| attrs.parse_meta(meta, Target::Trait));
    parse_macro_input!(args with parser);

    let item = parse_macro_input!(input as ItemTrait);

    attrs
        .validate(Target::Trait)
        .and_then(|()| impls::impl_contract_trait(attrs, item))
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
