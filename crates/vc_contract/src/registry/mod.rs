//! Runtime type registry: the source of related types and of the
//! capabilities the converter needs to build values.
//!
//! ## Menu
//!
//! - [`TypeTrait`]: a capability supported by a type, stored type-erased.
//! - [`FromType`]: creates a `TypeTrait` for a type.
//! - [`TypeMeta`]: a [`TypeInfo`] plus a `TypeTrait` table.
//! - [`GetTypeMeta`]: creates the `TypeMeta` of a type.
//! - [`TypeRegistry`]: stores `TypeMeta`s, indexed by id and name.
//! - [`TypeRegistryArc`]: a shared, lockable `TypeRegistry`.
//! - TypeTraits:
//!     - [`TypeTraitDeserialize`]: binds a type from any serde deserializer.
//!     - [`TypeTraitCast`]: boxes a bound value as a declared type (itself or a trait object).
//!     - [`TypeTraitUpcast`]: erased steps to implemented and extended interfaces.
//!
//! ## auto_register
//!
//! See [`TypeRegistry::auto_register`].
//!
//! Static registration uses the [`inventory`] crate. Types opt in with
//! `#[contract(auto_register)]`; the global registry
//! ([`TypeRegistryArc::global`]) collects them on first access.
//!
//! [`TypeInfo`]: crate::info::TypeInfo
//! [`inventory`]: https://docs.rs/inventory

// -----------------------------------------------------------------------------
// Modules

mod from_type;
mod traits;
mod type_meta;
mod type_registry;
mod type_trait;

// -----------------------------------------------------------------------------
// Exports

pub use from_type::FromType;
pub use traits::{TypeTraitCast, TypeTraitDeserialize, TypeTraitUpcast, UpcastFn};
pub use type_meta::{GetTypeMeta, TypeMeta};
pub use type_registry::{TypeRegistry, TypeRegistryArc};
pub use type_trait::TypeTrait;
