use core::any::TypeId;
use core::fmt::Debug;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use crate::TypeIdMap;

// -----------------------------------------------------------------------------
// TypeIdOnceMap

/// A thread-safe cache that computes each value at most once per [`TypeId`].
///
/// The lock only guards the slot table. Initialization runs on the slot
/// itself through [`OnceLock::get_or_init`], so concurrent callers asking
/// for the same key block on one computation instead of racing to insert
/// different values, and callers for other keys are not blocked at all.
///
/// The initializer must not query the same key again, that would deadlock.
///
/// # Examples
///
/// ```
/// use core::any::TypeId;
/// use vc_utils::TypeIdOnceMap;
///
/// let cache = TypeIdOnceMap::new();
///
/// let first = cache.get_or_init(TypeId::of::<u8>(), || 1);
/// let second = cache.get_or_init(TypeId::of::<u8>(), || 2);
///
/// assert_eq!((first, second), (1, 1));
/// ```
pub struct TypeIdOnceMap<V> {
    slots: RwLock<TypeIdMap<Arc<OnceLock<V>>>>,
}

impl<V> TypeIdOnceMap<V> {
    /// Creates an empty cache.
    #[inline]
    pub const fn new() -> Self {
        Self {
            slots: RwLock::new(TypeIdMap::new()),
        }
    }

    fn slot(&self, type_id: TypeId) -> Arc<OnceLock<V>> {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(slot) = slots.get(&type_id) {
            return Arc::clone(slot);
        }
        drop(slots);

        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.get_or_insert(type_id, || Arc::new(OnceLock::new())))
    }

    /// Returns the cached value for `type_id`, or computes it with `f`.
    ///
    /// `f` runs at most once per key for the lifetime of the cache.
    pub fn get_or_init(&self, type_id: TypeId, f: impl FnOnce() -> V) -> V
    where
        V: Clone,
    {
        self.slot(type_id).get_or_init(f).clone()
    }

    /// Returns the cached value for `type_id` if it has been computed.
    pub fn get(&self, type_id: &TypeId) -> Option<V>
    where
        V: Clone,
    {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        slots.get(type_id).and_then(|slot| slot.get().cloned())
    }

    /// Returns the number of computed values.
    pub fn len(&self) -> usize {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        slots.values().filter(|slot| slot.get().is_some()).count()
    }

    /// Returns `true` if no value has been computed yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V> Default for TypeIdOnceMap<V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Debug> Debug for TypeIdOnceMap<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_list()
            .entries(slots.values().filter_map(|slot| slot.get()))
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use core::any::TypeId;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    use super::TypeIdOnceMap;

    #[test]
    fn computes_once_per_key() {
        let cache = TypeIdOnceMap::new();
        assert!(cache.is_empty());

        assert_eq!(cache.get_or_init(TypeId::of::<u8>(), || "u8"), "u8");
        assert_eq!(cache.get_or_init(TypeId::of::<u8>(), || "other"), "u8");
        assert_eq!(cache.get_or_init(TypeId::of::<u16>(), || "u16"), "u16");

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&TypeId::of::<u16>()), Some("u16"));
        assert_eq!(cache.get(&TypeId::of::<u32>()), None);
    }

    #[test]
    fn concurrent_first_access_runs_initializer_once() {
        let cache = Arc::new(TypeIdOnceMap::<Arc<usize>>::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                thread::spawn(move || {
                    cache.get_or_init(TypeId::of::<String>(), || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        thread::yield_now();
                        Arc::new(7)
                    })
                })
            })
            .collect();

        let values: Vec<Arc<usize>> = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(values.iter().all(|v| Arc::ptr_eq(v, &values[0])));
    }
}
