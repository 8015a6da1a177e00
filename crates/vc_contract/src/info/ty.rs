use core::any::TypeId;
use core::fmt;
use core::hash::{Hash, Hasher};

use crate::info::TypePath;

// -----------------------------------------------------------------------------
// Type

/// The identity of a type: its [`TypeId`] plus its [`TypePath`] accessors.
///
/// Equality and hashing only consider the `TypeId`.
#[derive(Clone, Copy)]
pub struct Type {
    id: TypeId,
    type_path: fn() -> &'static str,
    type_name: fn() -> &'static str,
    module_path: fn() -> Option<&'static str>,
}

impl Type {
    /// Creates the `Type` of `T`.
    ///
    /// # Examples
    ///
    /// ```
    /// use core::any::TypeId;
    /// use vc_contract::info::{Type, TypePath};
    ///
    /// struct Square;
    /// impl TypePath for Square {
    ///     fn type_path() -> &'static str { "shapes::Square" }
    ///     fn type_name() -> &'static str { "Square" }
    /// }
    ///
    /// let ty = Type::of::<Square>();
    /// assert_eq!(ty.id(), TypeId::of::<Square>());
    /// assert_eq!(ty.path(), "shapes::Square");
    /// assert!(ty.is::<Square>());
    /// ```
    #[inline]
    pub fn of<T: TypePath + ?Sized>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            type_path: T::type_path,
            type_name: T::type_name,
            module_path: T::module_path,
        }
    }

    /// Returns the [`TypeId`].
    #[inline(always)]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    /// See [`TypePath::type_path`].
    #[inline]
    pub fn path(&self) -> &'static str {
        (self.type_path)()
    }

    /// See [`TypePath::type_name`].
    #[inline]
    pub fn name(&self) -> &'static str {
        (self.type_name)()
    }

    /// See [`TypePath::module_path`].
    #[inline]
    pub fn module_path(&self) -> Option<&'static str> {
        (self.module_path)()
    }

    /// Returns `true` if this is the type `T`.
    #[inline]
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for Type {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Type {}

impl Hash for Type {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
