use alloc::boxed::Box;
use core::any::Any;
use core::fmt;

use crate::info::Typed;
use crate::registry::FromType;

/// Boxes a value of one registered type as the declared type `T`.
///
/// A bound value leaves [`TypeTraitDeserialize`] as `Box<dyn Any>`. Turning
/// it into `Box<dyn Shape>` needs the unsizing coercion of the concrete type,
/// which only code that names both types can perform. `#[derive(Contract)]`
/// therefore registers one `TypeTraitCast<T>` for the type itself and one for
/// every `dyn Trait` listed in `implements(...)`.
/// Traits reached only through `extends(...)` go through
/// [`TypeTraitUpcast`] instead.
///
/// # Examples
///
/// ```
/// use core::any::Any;
/// use vc_contract::registry::TypeTraitCast;
///
/// trait Named {
///     fn name(&self) -> &str;
/// }
///
/// struct Dog;
/// impl Named for Dog {
///     fn name(&self) -> &str { "dog" }
/// }
///
/// let cast = TypeTraitCast::<dyn Named>::new(|value| {
///     value.downcast::<Dog>().map(|dog| dog as Box<dyn Named>)
/// });
///
/// let named = cast.cast(Box::new(Dog)).ok().unwrap();
/// assert_eq!(named.name(), "dog");
///
/// assert!(cast.cast(Box::new(1_u8)).is_err());
/// ```
///
/// [`TypeTraitDeserialize`]: crate::registry::TypeTraitDeserialize
/// [`TypeTraitUpcast`]: crate::registry::TypeTraitUpcast
pub struct TypeTraitCast<T: ?Sized> {
    func: fn(Box<dyn Any>) -> Result<Box<T>, Box<dyn Any>>,
}

impl<T: ?Sized> TypeTraitCast<T> {
    /// Creates a cast from a conversion function.
    #[inline]
    pub const fn new(func: fn(Box<dyn Any>) -> Result<Box<T>, Box<dyn Any>>) -> Self {
        Self { func }
    }

    /// Converts `value`, handing it back unchanged if it has the wrong type.
    #[inline]
    pub fn cast(&self, value: Box<dyn Any>) -> Result<Box<T>, Box<dyn Any>> {
        (self.func)(value)
    }
}

impl<T: ?Sized> Clone for TypeTraitCast<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for TypeTraitCast<T> {}

impl<T: ?Sized> fmt::Debug for TypeTraitCast<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeTraitCast")
            .field("target", &core::any::type_name::<T>())
            .finish()
    }
}

impl<T: Typed> FromType<T> for TypeTraitCast<T> {
    fn from_type() -> Self {
        Self::new(|value| value.downcast::<T>())
    }
}
