//! Parsing of the macro inputs.

// -----------------------------------------------------------------------------
// Modules

mod attributes;
mod contract_meta;

// -----------------------------------------------------------------------------
// Internal API

pub(crate) use attributes::{ContractAttributes, Target};
pub(crate) use contract_meta::ContractMeta;
