use alloc::boxed::Box;
use core::any::Any;

use serde_core::{Deserialize, Deserializer};

use crate::info::Typed;
use crate::registry::FromType;

/// Binds a value of one registered type from a serde deserializer.
///
/// This is the "bind the fields of this exact type" half of the contract
/// converter: it calls the type's own [`Deserialize`] implementation and
/// never looks at discriminators.
///
/// # Examples
///
/// ```
/// use core::any::TypeId;
/// use vc_contract::derive::Contract;
/// use vc_contract::registry::{TypeRegistry, TypeTraitDeserialize};
/// use serde::Deserialize;
///
/// #[derive(Contract, Deserialize, PartialEq, Debug)]
/// #[contract(name = "kind")]
/// struct Point {
///     x: i32,
/// }
///
/// let mut registry = TypeRegistry::new();
/// registry.register::<Point>();
///
/// let binder = registry
///     .get_type_trait::<TypeTraitDeserialize>(TypeId::of::<Point>())
///     .unwrap();
///
/// let value = binder.deserialize(serde_json::json!({ "x": 3 })).unwrap();
/// assert_eq!(*value.downcast::<Point>().unwrap(), Point { x: 3 });
/// ```
#[derive(Clone)]
pub struct TypeTraitDeserialize {
    func: fn(
        deserializer: &mut dyn erased_serde::Deserializer,
    ) -> Result<Box<dyn Any>, erased_serde::Error>,
}

impl TypeTraitDeserialize {
    /// Deserializes a value of the registered type.
    #[inline]
    pub fn deserialize<'de, D: Deserializer<'de>>(
        &self,
        deserializer: D,
    ) -> Result<Box<dyn Any>, D::Error> {
        let mut erased = <dyn erased_serde::Deserializer>::erase(deserializer);
        (self.func)(&mut erased).map_err(<D::Error as serde_core::de::Error>::custom)
    }
}

impl<T: for<'de> Deserialize<'de> + Typed> FromType<T> for TypeTraitDeserialize {
    fn from_type() -> Self {
        Self {
            func: |deserializer| Ok(Box::new(erased_serde::deserialize::<T>(deserializer)?)),
        }
    }
}
