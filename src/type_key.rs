use parking_lot::Mutex;
use std::{
    any::TypeId,
    collections::BTreeMap,
    sync::atomic::{AtomicU64, Ordering},
};

/// A process-lifetime-unique integer identifying a type.
///
/// Keys are assigned lazily on first reference to a type and are stable for
/// the rest of the process run. They are never persisted and are not stable
/// across runs or builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeKey(u64);

static NEXT_KEY: AtomicU64 = AtomicU64::new(0);
static ASSIGNED: Mutex<BTreeMap<TypeId, TypeKey>> = Mutex::new(BTreeMap::new());

impl TypeKey {
    /// Returns the key assigned to `T`, assigning one on first use.
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        let type_id = TypeId::of::<T>();
        *ASSIGNED
            .lock()
            .entry(type_id)
            .or_insert_with(|| Self(NEXT_KEY.fetch_add(1, Ordering::Relaxed)))
    }
}
