#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::std_instead_of_alloc, reason = "std-only crate")]

// -----------------------------------------------------------------------------
// Extern Self

// The derive macros emit `vc_contract::...` paths. Inside this crate (and its
// doc tests) that name must resolve too.
extern crate self as vc_contract;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

pub mod contract;
pub mod info;
pub mod json;
pub mod registry;
pub mod schema;
pub mod serde;

// -----------------------------------------------------------------------------
// Top-Level exports

#[doc(hidden)]
pub mod __macro_exports;

/// Declaration macros.
///
/// - `#[derive(Contract)]`: a hierarchy root or member.
/// - `#[derive(Typed)]`: a type with declared ancestry but no contract.
/// - `#[contract_trait]`: a trait whose `dyn` type takes part in hierarchies.
pub mod derive {
    pub use vc_contract_derive::{Contract, Typed, contract_trait};
}
