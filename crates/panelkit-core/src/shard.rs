//! Lock-striped hash map shared by the registry and the widget index.
//!
//! Keys hash to one of N shards, each behind its own `RwLock`, so operations
//! on different users or panels rarely touch the same lock.

use std::collections::hash_map::RandomState;
use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub(crate) const DEFAULT_SHARDS: usize = 16;

pub(crate) struct ShardedMap<K, V> {
    shards: Box<[RwLock<HashMap<K, V>>]>,
    hasher: RandomState,
}

impl<K: Hash + Eq, V: Clone> ShardedMap<K, V> {
    pub(crate) fn new(shards: usize) -> Self {
        let shards = (0..shards.max(1))
            .map(|_| RwLock::new(HashMap::new()))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self {
            shards,
            hasher: RandomState::new(),
        }
    }

    fn shard_for(&self, key: &K) -> &RwLock<HashMap<K, V>> {
        let hash = self.hasher.hash_one(key) as usize;
        &self.shards[hash % self.shards.len()]
    }

    pub(crate) fn read(&self, key: &K) -> RwLockReadGuard<'_, HashMap<K, V>> {
        read_lock(self.shard_for(key))
    }

    pub(crate) fn write(&self, key: &K) -> RwLockWriteGuard<'_, HashMap<K, V>> {
        write_lock(self.shard_for(key))
    }

    pub(crate) fn get(&self, key: &K) -> Option<V> {
        self.read(key).get(key).cloned()
    }

    pub(crate) fn contains_key(&self, key: &K) -> bool {
        self.read(key).contains_key(key)
    }

    /// Write-lock each shard in turn.
    pub(crate) fn for_each_shard_mut(&self, mut f: impl FnMut(&mut HashMap<K, V>)) {
        for shard in self.shards.iter() {
            f(&mut write_lock(shard));
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.shards.iter().map(|s| read_lock(s).len()).sum()
    }

    pub(crate) fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.shards
            .iter()
            .flat_map(|s| read_lock(s).keys().cloned().collect::<Vec<_>>())
            .collect()
    }
}

/// Poisoned locks are recovered. Widget actions never run under these locks.
pub(crate) fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
