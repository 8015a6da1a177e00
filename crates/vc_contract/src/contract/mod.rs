//! Hierarchy resolution: which hierarchy a type belongs to, and which type
//! a discriminator value denotes.
//!
//! ## Menu
//!
//! - [`TypeHierarchy`]: a root, a discriminator name and the [`Member`]s.
//! - [`ContractFactory`]: resolves the [`Contract`] of a type.
//! - [`DefaultContractFactory`]: resolution from declared contracts and
//!   [`RelatedTypes`].
//! - [`ContractRegistry`]: the cached front door; start here.
//! - [`ContractError`]: configuration and lookup errors.
//!
//! ## Resolution
//!
//! A type is polymorphic if it carries its own [`ContractDecl`] and exactly
//! one type of its ancestry (itself included) declares a discriminator name.
//! Zero such types make it non-polymorphic; more than one is an
//! [`AmbiguousDiscriminatorName`] error.
//!
//! The hierarchy of a root holds every related type that is assignable to
//! the root and has a discriminator value: the declared value, or the type
//! name for concrete types. Values must be unique within one hierarchy;
//! different hierarchies may reuse them.
//!
//! [`ContractDecl`]: crate::info::ContractDecl
//! [`AmbiguousDiscriminatorName`]: ContractError::AmbiguousDiscriminatorName

// -----------------------------------------------------------------------------
// Modules

mod error;
mod factory;
mod hierarchy;
mod registry;
mod related;

// -----------------------------------------------------------------------------
// Exports

pub use error::ContractError;
pub use factory::{Contract, ContractFactory, DefaultContractFactory};
pub use hierarchy::{Member, TypeHierarchy};
pub use registry::ContractRegistry;
pub use related::{RelatedTypes, RelatedTypesFn};
