use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::fmt;

/// Erased conversion from a boxed value to a `Box<Box<dyn I>>`, itself boxed as `dyn Any`.
pub type UpcastFn = fn(Box<dyn Any>) -> Result<Box<dyn Any>, Box<dyn Any>>;

/// The interfaces a registered type can be boxed as, without naming them.
///
/// [`TypeTraitCast<T>`] needs the declared type at compile time, so it only
/// exists for the interfaces a type lists itself. A type implementing
/// `dyn Ext`, where `Ext` extends `Base`, is still a member of the `dyn Base`
/// hierarchy. The converter reaches `dyn Base` by chaining steps:
///
/// - a concrete type carries one step per `implements(...)` entry, taking
///   `Box<Self>` to `Box<Box<dyn I>>`;
/// - `dyn Ext` carries one step per `extends(...)` entry, taking
///   `Box<Box<dyn Ext>>` to `Box<Box<dyn Base>>` by trait upcasting.
///
/// # Examples
///
/// ```
/// use core::any::{Any, TypeId};
/// use vc_contract::registry::TypeTraitUpcast;
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
/// let upcast = TypeTraitUpcast::new().with::<dyn Named>(|value| {
///     value
///         .downcast::<Dog>()
///         .map(|dog| Box::new(dog as Box<dyn Named>) as Box<dyn Any>)
/// });
///
/// let step = upcast.get(TypeId::of::<dyn Named>()).unwrap();
/// let named = step(Box::new(Dog)).ok().unwrap();
/// let named = named.downcast::<Box<dyn Named>>().ok().unwrap();
/// assert_eq!(named.name(), "dog");
/// ```
///
/// [`TypeTraitCast<T>`]: crate::registry::TypeTraitCast
#[derive(Clone, Default)]
pub struct TypeTraitUpcast {
    steps: Vec<(TypeId, UpcastFn)>,
}

impl TypeTraitUpcast {
    /// Creates an empty step table.
    #[inline]
    pub const fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Adds the step to the interface `I`.
    #[inline]
    pub fn with<I: ?Sized + 'static>(mut self, func: UpcastFn) -> Self {
        self.steps.push((TypeId::of::<I>(), func));
        self
    }

    /// Returns the step to the interface with `type_id`.
    pub fn get(&self, type_id: TypeId) -> Option<UpcastFn> {
        self.steps
            .iter()
            .find(|(id, _)| *id == type_id)
            .map(|(_, func)| *func)
    }

    /// Iterates over the ids of the reachable interfaces.
    pub fn interfaces(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.steps.iter().map(|(id, _)| *id)
    }
}

impl fmt::Debug for TypeTraitUpcast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeTraitUpcast")
            .field("steps", &self.steps.len())
            .finish()
    }
}
