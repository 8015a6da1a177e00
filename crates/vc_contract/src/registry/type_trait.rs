use alloc::boxed::Box;
use core::any::Any;

/// A capability of a registered type, stored in its [`TypeMeta`].
///
/// Blanket implemented for every `Clone + Send + Sync + 'static` type,
/// which in practice are small structs of function pointers created
/// through [`FromType`].
///
/// [`TypeMeta`]: crate::registry::TypeMeta
/// [`FromType`]: crate::registry::FromType
pub trait TypeTrait: Any + Send + Sync {
    /// Clones the capability behind a box.
    fn clone_type_trait(&self) -> Box<dyn TypeTrait>;
}

impl<T: Clone + Any + Send + Sync> TypeTrait for T {
    #[inline]
    fn clone_type_trait(&self) -> Box<dyn TypeTrait> {
        Box::new(self.clone())
    }
}

impl dyn TypeTrait {
    /// Returns the capability as `T` if it is one.
    #[inline]
    pub fn downcast_ref<T: TypeTrait>(&self) -> Option<&T> {
        (self as &dyn Any).downcast_ref::<T>()
    }

    /// Returns `true` if the capability is a `T`.
    #[inline]
    pub fn is<T: TypeTrait>(&self) -> bool {
        (self as &dyn Any).is::<T>()
    }
}
