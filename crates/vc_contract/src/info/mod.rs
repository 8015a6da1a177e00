//! Static type information for contract participants.
//!
//! ## Menu
//!
//! - [`TypePath`]: stable type path and name, independent of compiler versions.
//! - [`Type`]: a [`TypeId`](core::any::TypeId) bundled with its path accessors.
//! - [`ContractDecl`]: the declared contract content of one exact type.
//! - [`TypeKind`]: interface, abstract or concrete.
//! - [`TypeInfo`]: identity, kind, ancestry and declaration of a type.
//! - [`Typed`]: static access to a type's [`TypeInfo`].
//! - [`DynamicTyped`]: the same through a value.
//! - [`NonGenericTypeInfoCell`]: lazy storage used by `Typed` implementations.
//!
//! Ancestry is declared, not inferred. Rust has no class inheritance, so
//! `base` and `interfaces` describe the hierarchy the serialized form follows.
//! A trait object `dyn Shape` plays the role of an interface; a struct
//! can name a base struct or abstract type it specializes.

// -----------------------------------------------------------------------------
// Modules

mod cell;
mod contract_decl;
mod ty;
mod type_info;
mod type_path;
mod typed;

// -----------------------------------------------------------------------------
// Exports

pub use cell::NonGenericTypeInfoCell;
pub use contract_decl::{ContractDecl, DEFAULT_DISCRIMINATOR_NAME};
pub use ty::Type;
pub use type_info::{TypeInfo, TypeKind};
pub use type_path::TypePath;
pub use typed::{DynamicTyped, Typed};
