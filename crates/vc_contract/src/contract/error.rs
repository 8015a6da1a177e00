use alloc::string::String;
use alloc::vec::Vec;

use thiserror::Error;

// -----------------------------------------------------------------------------
// ContractError

/// Errors of hierarchy resolution and hierarchy lookups.
///
/// The first two variants are configuration errors: they are detected when
/// a hierarchy is first resolved and are returned again, unchanged, by every
/// later query that reaches the same hierarchy.
///
/// Types are named by their type name.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ContractError {
    #[error(
        "the discriminator name of `{type_name}` is declared more than once in its ancestry (on {})",
        .declared_on.join(", ")
    )]
    AmbiguousDiscriminatorName {
        type_name: &'static str,
        declared_on: Vec<&'static str>,
    },

    #[error("discriminator value `{value}` of the `{root}` hierarchy is used by both `{first}` and `{second}`")]
    DuplicateDiscriminatorValue {
        root: &'static str,
        value: &'static str,
        first: &'static str,
        second: &'static str,
    },

    #[error("`{type_name}` has no contract declaration")]
    MissingContract { type_name: &'static str },

    #[error(
        "`{type_name}` declares a contract of the `{root}` hierarchy but was not supplied as a related type, register it"
    )]
    NotRegistered {
        type_name: &'static str,
        root: &'static str,
    },

    #[error("`{type_name}` is not part of the `{root}` hierarchy")]
    NotInHierarchy {
        type_name: &'static str,
        root: &'static str,
    },

    #[error("discriminator value `{value}` does not denote a type of the `{root}` hierarchy")]
    UnknownDiscriminatorValue { value: String, root: &'static str },

    #[error("`{type_name}` is not a contract type")]
    NotAContractType { type_name: &'static str },
}

impl ContractError {
    /// Returns `true` for errors in the declarations themselves, as opposed
    /// to lookups of types or values a hierarchy does not contain.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::AmbiguousDiscriminatorName { .. } | Self::DuplicateDiscriminatorValue { .. }
        )
    }
}
