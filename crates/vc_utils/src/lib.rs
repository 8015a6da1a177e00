//! Small containers shared by the `vc_contract` crates.
//!
//! ## Menu
//!
//! - [`TypeIdMap`]: a map keyed by [`TypeId`](core::any::TypeId) with a pass-through hasher.
//! - [`TypeIdOnceMap`]: a thread-safe, compute-once cache keyed by `TypeId`.
//! - [`hash`]: hash states and a `HashMap` alias with a fixed seed.
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::std_instead_of_alloc, reason = "std-only crate")]

// -----------------------------------------------------------------------------
// Modules

mod once_map;
mod typeid_map;

pub mod hash;

// -----------------------------------------------------------------------------
// Top-level exports

pub use once_map::TypeIdOnceMap;
pub use typeid_map::TypeIdMap;
