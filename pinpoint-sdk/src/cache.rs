//! Bounded LRU interning caches.
//!
//! `IdCache` assigns a small integer id the first time a string is seen so
//! spans can reference operations, error names and SQL statements by id
//! while the full text is uploaded out-of-band exactly once. When an
//! upload fails the entry is evicted so the next observation reassigns and
//! retries.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::util;

/// Result of an [`IdCache::get`] lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheResult {
    pub id: i32,
    /// True when the key was already cached (no upload needed).
    pub old: bool,
}

/// Result of a [`SqlUidCache::get`] lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SqlUidCacheResult {
    pub uid: Vec<u8>,
    pub old: bool,
}

struct IdCacheInner {
    map: HashMap<String, i32>,
    // LRU order, least recently used first.
    order: Vec<String>,
    id_sequence: i32,
}

/// LRU cache mapping strings to freshly minted int32 ids.
pub struct IdCache {
    inner: Mutex<IdCacheInner>,
    max_size: usize,
}

impl IdCache {
    pub fn new(max_size: usize) -> IdCache {
        IdCache {
            inner: Mutex::new(IdCacheInner {
                map: HashMap::new(),
                order: Vec::new(),
                id_sequence: 0,
            }),
            max_size,
        }
    }

    /// Looks up `key`, assigning the next id on first sight.
    pub fn get(&self, key: &str) -> CacheResult {
        let mut inner = match self.inner.lock() {
            Ok(inner) => inner,
            Err(_) => return CacheResult { id: 0, old: false },
        };

        if let Some(&id) = inner.map.get(key) {
            touch(&mut inner.order, key);
            return CacheResult { id, old: true };
        }

        inner.id_sequence += 1;
        let id = inner.id_sequence;
        inner.map.insert(key.to_string(), id);
        inner.order.push(key.to_string());

        if inner.map.len() > self.max_size {
            if !inner.order.is_empty() {
                let evicted = inner.order.remove(0);
                inner.map.remove(&evicted);
            }
        }

        CacheResult { id, old: false }
    }

    /// Drops `key` so the next `get` assigns a fresh id.
    pub fn remove(&self, key: &str) {
        if let Ok(mut inner) = self.inner.lock() {
            if inner.map.remove(key).is_some() {
                inner.order.retain(|k| k != key);
            }
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.inner.lock().map(|i| i.map.len()).unwrap_or(0)
    }
}

fn touch(order: &mut Vec<String>, key: &str) {
    if let Some(pos) = order.iter().position(|k| k == key) {
        let k = order.remove(pos);
        order.push(k);
    }
}

struct SqlUidCacheInner {
    map: HashMap<String, Vec<u8>>,
    order: Vec<String>,
}

/// LRU cache mapping normalized SQL statements to stable byte uids.
pub struct SqlUidCache {
    inner: Mutex<SqlUidCacheInner>,
    max_size: usize,
}

impl SqlUidCache {
    pub fn new(max_size: usize) -> SqlUidCache {
        SqlUidCache {
            inner: Mutex::new(SqlUidCacheInner {
                map: HashMap::new(),
                order: Vec::new(),
            }),
            max_size,
        }
    }

    pub fn get(&self, key: &str) -> SqlUidCacheResult {
        let mut inner = match self.inner.lock() {
            Ok(inner) => inner,
            Err(_) => {
                return SqlUidCacheResult {
                    uid: Vec::new(),
                    old: false,
                }
            }
        };

        if let Some(uid) = inner.map.get(key) {
            let uid = uid.clone();
            touch(&mut inner.order, key);
            return SqlUidCacheResult { uid, old: true };
        }

        let uid = util::generate_sql_uid(key);
        inner.map.insert(key.to_string(), uid.clone());
        inner.order.push(key.to_string());

        if inner.map.len() > self.max_size {
            if !inner.order.is_empty() {
                let evicted = inner.order.remove(0);
                inner.map.remove(&evicted);
            }
        }

        SqlUidCacheResult { uid, old: false }
    }

    pub fn remove(&self, key: &str) {
        if let Ok(mut inner) = self.inner.lock() {
            if inner.map.remove(key).is_some() {
                inner.order.retain(|k| k != key);
            }
        }
    }
}
