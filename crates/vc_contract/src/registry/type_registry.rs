use alloc::vec::Vec;
use core::any::TypeId;
use std::sync::{Arc, OnceLock, PoisonError};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use vc_utils::TypeIdMap;
use vc_utils::hash::HashMap;

use crate::info::TypeInfo;
use crate::registry::{GetTypeMeta, TypeMeta, TypeTrait};

// -----------------------------------------------------------------------------
// TypeRegistry

/// A registry of contract participants.
///
/// [Registering] a type stores the [`TypeMeta`] produced by its
/// [`GetTypeMeta`] implementation, together with the metas of its declared
/// ancestors. The registry then serves two purposes:
///
/// - it is the default related-types supplier: hierarchy members are
///   discovered among the registered types;
/// - the converter reads the [`TypeTraitDeserialize`] and [`TypeTraitCast`]
///   capabilities of resolved types from it.
///
/// # Example
///
/// ```
/// use vc_contract::derive::{Contract, contract_trait};
/// use vc_contract::registry::TypeRegistry;
/// use serde::{Deserialize, Serialize};
///
/// #[contract_trait(name = "kind")]
/// trait Animal {}
///
/// #[derive(Contract, Serialize, Deserialize)]
/// #[contract(value = "dog", implements(dyn Animal))]
/// struct Dog;
///
/// impl Animal for Dog {}
///
/// let mut registry = TypeRegistry::new();
/// registry.register::<Dog>();
///
/// // Declared ancestors are registered as dependencies.
/// assert!(registry.contains_type::<dyn Animal>());
/// assert!(registry.get_with_type_name("Dog").is_some());
/// ```
///
/// [Registering]: TypeRegistry::register
/// [`TypeTraitDeserialize`]: crate::registry::TypeTraitDeserialize
/// [`TypeTraitCast`]: crate::registry::TypeTraitCast
#[derive(Clone, Default)]
pub struct TypeRegistry {
    type_meta_table: TypeIdMap<TypeMeta>,
    // `None` marks a name shared by several types.
    type_name_to_id: HashMap<&'static str, Option<TypeId>>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    fn add_indices(&mut self, meta: &TypeMeta) {
        let name = meta.type_name();
        self.type_name_to_id
            .entry(name)
            .and_modify(|id| *id = None)
            .or_insert(Some(meta.type_id()));
    }

    fn register_internal(&mut self, type_id: TypeId, get_type_meta: impl FnOnce() -> TypeMeta) -> bool {
        if self.type_meta_table.contains(&type_id) {
            return false;
        }
        let meta = get_type_meta();
        self.add_indices(&meta);
        self.type_meta_table.insert(type_id, meta);
        true
    }

    /// Registers `T` and its dependencies unless `T` is already registered.
    ///
    /// Returns `true` if `T` was newly registered.
    pub fn register<T: GetTypeMeta + ?Sized>(&mut self) -> bool {
        let fresh = self.register_internal(TypeId::of::<T>(), T::get_type_meta);
        if fresh {
            T::register_dependencies(self);
        }
        fresh
    }

    /// Registers every type marked `#[contract(auto_register)]`.
    ///
    /// Repeated calls do not insert duplicates. Returns `false` when the
    /// `auto_register` feature is disabled.
    pub fn auto_register(&mut self) -> bool {
        #[cfg(feature = "auto_register")]
        {
            crate::__macro_exports::auto_register::__register_types(self);
            true
        }
        #[cfg(not(feature = "auto_register"))]
        {
            false
        }
    }

    /// Returns `true` if the type with `type_id` is registered.
    #[inline]
    pub fn contains(&self, type_id: TypeId) -> bool {
        self.type_meta_table.contains(&type_id)
    }

    /// Returns `true` if `T` is registered.
    #[inline]
    pub fn contains_type<T: ?Sized + 'static>(&self) -> bool {
        self.type_meta_table.contains_type::<T>()
    }

    /// Returns the [`TypeMeta`] of the type with `type_id`.
    #[inline]
    pub fn get(&self, type_id: TypeId) -> Option<&TypeMeta> {
        self.type_meta_table.get(&type_id)
    }

    /// Returns the [`TypeMeta`] of the type with the given [type name],
    /// unless several registered types share that name.
    ///
    /// [type name]: crate::info::TypePath::type_name
    pub fn get_with_type_name(&self, type_name: &str) -> Option<&TypeMeta> {
        match self.type_name_to_id.get(type_name) {
            Some(Some(id)) => self.get(*id),
            _ => None,
        }
    }

    /// Returns the [`TypeTrait`] `T` of the type with `type_id`.
    pub fn get_type_trait<T: TypeTrait>(&self, type_id: TypeId) -> Option<&T> {
        self.get(type_id).and_then(TypeMeta::get_trait::<T>)
    }

    /// Returns the [`TypeInfo`] of the type with `type_id`.
    pub fn get_type_info(&self, type_id: TypeId) -> Option<&'static TypeInfo> {
        self.get(type_id).map(TypeMeta::type_info)
    }

    /// Returns the number of registered types.
    #[inline]
    pub fn len(&self) -> usize {
        self.type_meta_table.len()
    }

    /// Returns `true` if nothing is registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.type_meta_table.is_empty()
    }

    /// Iterates over the registered [`TypeMeta`]s in arbitrary order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &TypeMeta> {
        self.type_meta_table.values()
    }

    /// Returns the infos of all registered types, sorted by type path.
    pub fn type_infos(&self) -> Vec<&'static TypeInfo> {
        let mut infos: Vec<_> = self.iter().map(TypeMeta::type_info).collect();
        infos.sort_unstable_by_key(|info| info.type_path());
        infos
    }
}

impl core::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set()
            .entries(self.type_infos().iter().map(|info| info.type_path()))
            .finish()
    }
}

// -----------------------------------------------------------------------------
// TypeRegistryArc

/// A shared [`TypeRegistry`] behind a read-write lock.
#[derive(Clone, Default)]
pub struct TypeRegistryArc {
    /// The wrapped [`TypeRegistry`].
    pub internal: Arc<RwLock<TypeRegistry>>,
}

impl TypeRegistryArc {
    /// Wraps `registry`.
    pub fn new(registry: TypeRegistry) -> Self {
        Self {
            internal: Arc::new(RwLock::new(registry)),
        }
    }

    /// The process-wide registry, filled with all auto-registered types on first access.
    pub fn global() -> &'static TypeRegistryArc {
        static GLOBAL: OnceLock<TypeRegistryArc> = OnceLock::new();
        GLOBAL.get_or_init(|| {
            let mut registry = TypeRegistry::new();
            registry.auto_register();
            log::debug!("global type registry initialized with {} types", registry.len());
            TypeRegistryArc::new(registry)
        })
    }

    /// Takes a read lock on the underlying [`TypeRegistry`].
    pub fn read(&self) -> RwLockReadGuard<'_, TypeRegistry> {
        self.internal.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes a write lock on the underlying [`TypeRegistry`].
    pub fn write(&self) -> RwLockWriteGuard<'_, TypeRegistry> {
        self.internal
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl From<TypeRegistry> for TypeRegistryArc {
    #[inline]
    fn from(registry: TypeRegistry) -> Self {
        Self::new(registry)
    }
}

impl core::fmt::Debug for TypeRegistryArc {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.read().fmt(f)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::TypeRegistry;
    use crate::derive::{Contract, contract_trait};
    use crate::registry::{TypeTraitCast, TypeTraitUpcast};

    #[contract_trait(name = "kind")]
    trait Animal {}

    #[contract_trait(extends(dyn Animal))]
    trait Pet {}

    #[derive(Contract, Serialize, Deserialize)]
    #[contract(value = "cat", implements(dyn Pet))]
    struct Cat;

    #[derive(Contract, Serialize, Deserialize)]
    #[contract(value = "dog", implements(dyn Animal))]
    struct Dog;

    impl Animal for Cat {}
    impl Pet for Cat {}
    impl Animal for Dog {}

    #[test]
    fn extended_traits_are_dependencies() {
        let mut registry = TypeRegistry::new();
        assert!(registry.register::<Cat>());
        assert!(!registry.register::<Cat>());

        assert!(registry.contains_type::<dyn Pet>());
        assert!(registry.contains_type::<dyn Animal>());
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn upcast_steps_follow_declarations() {
        let mut registry = TypeRegistry::new();
        registry.register::<Cat>();
        let cat = core::any::TypeId::of::<Cat>();
        let pet = core::any::TypeId::of::<dyn Pet>();
        let animal = core::any::TypeId::of::<dyn Animal>();

        assert!(registry.get_type_trait::<TypeTraitCast<dyn Pet>>(cat).is_some());
        assert!(registry.get_type_trait::<TypeTraitCast<dyn Animal>>(cat).is_none());

        let steps = registry.get_type_trait::<TypeTraitUpcast>(cat).unwrap();
        assert_eq!(steps.interfaces().collect::<Vec<_>>(), [pet]);
        let steps = registry.get_type_trait::<TypeTraitUpcast>(pet).unwrap();
        assert_eq!(steps.interfaces().collect::<Vec<_>>(), [animal]);
        assert!(registry.get_type_trait::<TypeTraitUpcast>(animal).is_none());
    }

    #[test]
    fn clone_is_independent() {
        let mut registry = TypeRegistry::new();
        registry.register::<Dog>();

        let mut copy = registry.clone();
        copy.register::<Cat>();

        assert_eq!(registry.len(), 2);
        assert!(!registry.contains_type::<Cat>());
        assert!(copy.contains_type::<Cat>());
        assert!(copy.get_with_type_name("Dog").is_some());
    }
}
