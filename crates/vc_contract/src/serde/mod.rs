//! Discriminator-aware serialization through serde.
//!
//! ## Menu
//!
//! - [`ContractObject`]: a value the converter can write.
//! - [`ContractConverter`]: writes values with their discriminator and reads
//!   them back by resolving the discriminator.
//! - [`serialize_contract`] / [`deserialize_contract`]: the serde entry
//!   points used by `#[contract_trait]`.
//! - [`Tagged`]: a concrete value written with its discriminator.
//! - [`ConvertError`], [`Position`]: data and configuration errors with
//!   their context.
//!
//! ## Protocol
//!
//! Writing looks up the hierarchy of the value's runtime type, serializes
//! the value with its own `Serialize` implementation, and emits the
//! discriminator as the first field of the resulting object.
//!
//! Reading buffers the object, takes the discriminator out, resolves the
//! concrete type, and binds the remaining fields with that type's own
//! `Deserialize` implementation from the [`TypeRegistry`]. Payload errors
//! keep their `serde_json` source and gain the discriminator context.
//!
//! With the `debug` feature in debug builds, errors crossing a serde
//! boundary also list the contract types being converted on the thread.
//!
//! [`TypeRegistry`]: crate::registry::TypeRegistry

// -----------------------------------------------------------------------------
// Modules

mod converter;
mod error;
mod info_stack;
mod object;
mod tagged;
mod trait_object;

// -----------------------------------------------------------------------------
// Exports

pub(crate) use converter::value_kind;

pub use converter::ContractConverter;
pub use error::{ConvertError, Position};
pub use object::ContractObject;
pub use tagged::Tagged;
pub use trait_object::{deserialize_contract, serialize_contract};
