//! Typed resource handles and the pools that own the resources behind them.
//!
//! Scenes never hold GPU objects directly in their draw items. They hold a
//! [`Handle<T>`] and look the value up in a [`ResourcePool<T>`]. Ids come from a
//! single process-wide counter, so a handle minted after a scene restart can
//! never alias one from a previous generation.

use std::{
    collections::HashMap,
    fmt::Debug,
    hash::{Hash, Hasher},
    marker::PhantomData,
    sync::atomic::{AtomicU64, Ordering},
};

static NEXT_HANDLE_ID: AtomicU64 = AtomicU64::new(1);

/// A typed id for a value stored in a [`ResourcePool<T>`].
pub struct Handle<T> {
    id: u64,
    _kind: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    fn fresh() -> Self {
        Self {
            id: NEXT_HANDLE_ID.fetch_add(1, Ordering::Relaxed),
            _kind: PhantomData,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

// Manual impls: deriving would put bounds on `T`, which GPU types don't meet.
impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> Debug for Handle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Handle#{}", self.id)
    }
}

/// Owns every value of one resource kind allocated by a scene.
///
/// Values leave the pool exactly once, either through [`remove`](Self::remove)
/// or [`drain`](Self::drain). After that their handles resolve to `None`.
pub struct ResourcePool<T> {
    values: HashMap<Handle<T>, T>,
}

impl<T> ResourcePool<T> {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    pub fn insert(&mut self, value: T) -> Handle<T> {
        let handle = Handle::fresh();
        self.values.insert(handle, value);
        handle
    }

    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        self.values.get(&handle)
    }

    /// Look up a value that the caller expects to be alive. A dangling handle
    /// is an error.
    pub fn fetch(&self, handle: Handle<T>) -> anyhow::Result<&T> {
        self.values
            .get(&handle)
            .ok_or_else(|| anyhow::anyhow!("{handle:?} is not alive in this pool"))
    }

    pub fn remove(&mut self, handle: Handle<T>) -> Option<T> {
        self.values.remove(&handle)
    }

    pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.values.drain().map(|(_, value)| value)
    }

    pub fn handles(&self) -> impl Iterator<Item = Handle<T>> + '_ {
        self.values.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<T> Default for ResourcePool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Debug for ResourcePool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourcePool")
            .field("len", &self.values.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn removed_values_are_returned_once() {
        let mut pool = ResourcePool::new();
        let a = pool.insert("a");
        let b = pool.insert("b");
        assert_eq!(pool.remove(a), Some("a"));
        assert_eq!(pool.remove(a), None);
        assert!(pool.fetch(a).is_err());
        assert_eq!(pool.get(b), Some(&"b"));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn drain_empties_the_pool() {
        let mut pool = ResourcePool::new();
        let handles: Vec<_> = (0..4).map(|i| pool.insert(i)).collect();
        let mut drained: Vec<_> = pool.drain().collect();
        drained.sort();
        assert_eq!(drained, vec![0, 1, 2, 3]);
        assert!(pool.is_empty());
        assert!(handles.iter().all(|h| pool.get(*h).is_none()));
    }

    #[test]
    fn refilled_pool_never_reuses_ids() {
        let mut pool = ResourcePool::new();
        let first: HashSet<_> = (0..8).map(|i| pool.insert(i)).collect();
        pool.drain().for_each(drop);
        let second: HashSet<_> = (0..8).map(|i| pool.insert(i)).collect();
        assert!(first.is_disjoint(&second));
    }
}
