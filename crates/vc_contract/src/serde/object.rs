use core::any::Any;

use serde_core::Serialize;

use crate::info::{TypeInfo, Typed};

/// A value that can be written through the contract converter.
///
/// Blanket implemented for every sized `Typed + Serialize` type.
/// `#[contract_trait]` adds it as a supertrait, so a `&dyn Trait` converts
/// to a `&dyn ContractObject` and to the [`erased_serde::Serialize`] of the
/// concrete type.
pub trait ContractObject: Any + erased_serde::Serialize {
    /// Returns the [`TypeInfo`] of the concrete type behind the reference.
    fn contract_type_info(&self) -> &'static TypeInfo;
}

impl<T: Typed + Serialize> ContractObject for T {
    #[inline]
    fn contract_type_info(&self) -> &'static TypeInfo {
        T::type_info()
    }
}
