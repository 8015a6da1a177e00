//! Discriminator-tagged polymorphism for serde.
//!
//! Re-exports the member crates of the workspace:
//!
//! - [`contract`]: contract declarations, hierarchy resolution and the serde converter.
//! - [`utils`]: type-keyed containers used by the resolution caches.
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

pub use vc_contract as contract;
pub use vc_utils as utils;
