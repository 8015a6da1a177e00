use alloc::boxed::Box;

use serde_core::de::{Deserialize, Deserializer, Unexpected};
use serde_core::ser::{Serialize, Serializer};
use serde_json::Value;

use super::info_stack::{make_de_error, make_ser_error};
use super::{ContractConverter, ContractObject};
use crate::info::Typed;

/// Serializes a contract value with its discriminator through the
/// [current](ContractConverter::current) converter.
///
/// This is the body of the `Serialize for dyn Trait` implementation
/// generated by `#[contract_trait]`.
pub fn serialize_contract<S: Serializer>(
    value: &dyn ContractObject,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    ContractConverter::current(|converter| converter.to_value(value))
        .map_err(make_ser_error::<S::Error, _>)?
        .serialize(serializer)
}

/// Deserializes a value declared as `T` through the
/// [current](ContractConverter::current) converter.
///
/// The input is buffered before the discriminator is looked up, so it may
/// appear anywhere in the object. `null` is rejected; wrap the target in
/// `Option` to accept it.
///
/// A serde `Deserializer` does not expose where the buffered object began,
/// so errors carry no [`Position`] of their own. `serde_json` appends the
/// line and column it reached, which is the end of the object. Use
/// [`ObjectReader`], or pass a position to [`ContractConverter::from_value`],
/// when the start of each object matters.
///
/// This is the body of the `Deserialize for Box<dyn Trait>` implementation
/// generated by `#[contract_trait]`.
///
/// [`Position`]: super::Position
/// [`ObjectReader`]: crate::json::ObjectReader
pub fn deserialize_contract<'de, T, D>(deserializer: D) -> Result<Box<T>, D::Error>
where
    T: Typed + ?Sized,
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match ContractConverter::current(|converter| converter.from_value::<T>(value, None)) {
        Ok(Some(value)) => Ok(value),
        Ok(None) => Err(<D::Error as serde_core::de::Error>::invalid_type(
            Unexpected::Unit,
            &"a contract object",
        )),
        Err(err) => Err(make_de_error::<D::Error, _>(err)),
    }
}
