use core::ops::{Deref, DerefMut};

use serde_core::{Deserialize, Deserializer, Serialize, Serializer};

use super::{ContractObject, deserialize_contract, serialize_contract};
use crate::info::Typed;

/// A concrete contract value written with its discriminator.
///
/// Trait objects get discriminators from `#[contract_trait]`. For a field
/// of a concrete type, wrap it in `Tagged`: it writes the discriminator
/// first and, on read, checks that the discriminator denotes `T` itself.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use vc_contract::derive::Contract;
/// use vc_contract::registry::TypeRegistry;
/// use vc_contract::serde::{ContractConverter, Tagged};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Contract, Serialize, Deserialize, Debug, PartialEq)]
/// #[contract(name = "Type", value = "Base-B")]
/// struct BaseB {
///     id: u32,
/// }
///
/// let mut types = TypeRegistry::new();
/// types.register::<BaseB>();
/// let converter = Arc::new(ContractConverter::with_types(types.into()));
///
/// let json = converter
///     .scope(|| serde_json::to_string(&Tagged(BaseB { id: 7 })))
///     .unwrap();
/// assert_eq!(json, r#"{"Type":"Base-B","id":7}"#);
///
/// let back: Tagged<BaseB> = converter.scope(|| serde_json::from_str(&json)).unwrap();
/// assert_eq!(back.0, BaseB { id: 7 });
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tagged<T>(pub T);

impl<T> Tagged<T> {
    /// Unwraps the value.
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Tagged<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for Tagged<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<T: ContractObject> Serialize for Tagged<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_contract(&self.0, serializer)
    }
}

impl<'de, T: Typed> Deserialize<'de> for Tagged<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_contract::<T, D>(deserializer).map(|value| Tagged(*value))
    }
}
