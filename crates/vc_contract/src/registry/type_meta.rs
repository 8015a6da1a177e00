use alloc::boxed::Box;
use core::any::TypeId;
use core::ops::Deref;

use vc_utils::TypeIdMap;

use crate::info::{Type, TypeInfo, Typed};
use crate::registry::{TypeRegistry, TypeTrait};

// -----------------------------------------------------------------------------
// TypeMeta

/// Runtime storage for one registered type: its [`TypeInfo`] and its
/// [`TypeTrait`] table.
///
/// Usually produced by the [`GetTypeMeta`] implementation generated by
/// `#[derive(Contract)]`.
///
/// # Example
///
/// ```
/// # use vc_contract::registry::{FromType, TypeMeta, TypeTraitCast};
/// # use vc_contract::derive::Typed;
/// #[derive(Typed)]
/// struct Plain;
///
/// let mut meta = TypeMeta::of::<Plain>();
/// meta.insert_trait::<TypeTraitCast<Plain>>(FromType::<Plain>::from_type());
///
/// assert_eq!(meta.type_name(), "Plain");
/// assert!(meta.has_trait::<TypeTraitCast<Plain>>());
/// ```
pub struct TypeMeta {
    type_info: &'static TypeInfo,
    trait_table: TypeIdMap<Box<dyn TypeTrait>>,
}

impl TypeMeta {
    /// Creates a `TypeMeta` for `T` with an empty trait table.
    #[inline]
    pub fn of<T: Typed + ?Sized>() -> Self {
        Self {
            type_info: T::type_info(),
            trait_table: TypeIdMap::new(),
        }
    }

    /// Creates a `TypeMeta` for `T` with room for `capacity` traits.
    #[inline]
    pub fn with_capacity<T: Typed + ?Sized>(capacity: usize) -> Self {
        Self {
            type_info: T::type_info(),
            trait_table: TypeIdMap::with_capacity(capacity),
        }
    }

    /// Returns the [`TypeInfo`].
    #[inline(always)]
    pub const fn type_info(&self) -> &'static TypeInfo {
        self.type_info
    }

    /// Returns the [`Type`].
    #[inline]
    pub fn ty(&self) -> &'static Type {
        self.type_info.ty()
    }

    /// Returns the [`TypeId`].
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_info.type_id()
    }

    /// Returns the type path.
    #[inline]
    pub fn type_path(&self) -> &'static str {
        self.type_info.type_path()
    }

    /// Returns the type name.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_info.type_name()
    }

    /// Inserts (or replaces) a [`TypeTrait`].
    #[inline]
    pub fn insert_trait<T: TypeTrait>(&mut self, data: T) {
        self.trait_table.insert(TypeId::of::<T>(), Box::new(data));
    }

    /// Returns the [`TypeTrait`] `T`, if present.
    #[inline]
    pub fn get_trait<T: TypeTrait>(&self) -> Option<&T> {
        self.trait_table
            .get(&TypeId::of::<T>())
            .map(Deref::deref)
            .and_then(<dyn TypeTrait>::downcast_ref)
    }

    /// Returns `true` if the [`TypeTrait`] `T` is present.
    #[inline]
    pub fn has_trait<T: TypeTrait>(&self) -> bool {
        self.trait_table.contains(&TypeId::of::<T>())
    }

    /// Returns the number of stored traits.
    #[inline]
    pub fn trait_count(&self) -> usize {
        self.trait_table.len()
    }
}

impl Clone for TypeMeta {
    fn clone(&self) -> Self {
        let mut trait_table = TypeIdMap::with_capacity(self.trait_table.len());
        for (id, data) in self.trait_table.iter() {
            trait_table.insert(*id, (**data).clone_type_trait());
        }
        Self {
            type_info: self.type_info,
            trait_table,
        }
    }
}

impl core::fmt::Debug for TypeMeta {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TypeMeta")
            .field("type_info", self.type_info)
            .field("trait_count", &self.trait_table.len())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// GetTypeMeta

/// Creates the [`TypeMeta`] of a type.
///
/// Implemented by `#[derive(Contract)]`, `#[derive(Typed)]` and
/// `#[contract_trait]`.
pub trait GetTypeMeta: Typed {
    /// Returns the default [`TypeMeta`] for this type.
    fn get_type_meta() -> TypeMeta;

    /// Registers other types this type needs, such as its declared ancestors.
    #[inline]
    fn register_dependencies(_registry: &mut TypeRegistry) {}
}
