//! Capacity-bounded LRU table backing the bounded eviction strategy.
//!
//! ## Layout
//!
//! ```text
//!   map: FxHashMap<K, slot>          nodes: Vec<Node>
//!   ┌─────┬──────┐                   ┌──────┬──────┬──────┬──────┐
//!   │ "a" │  2   │──────────────────►│ slot0│ slot1│ slot2│ slot3│
//!   │ "b" │  0   │                   └──────┴──────┴──────┴──────┘
//!   └─────┴──────┘
//!   head (MRU) ─► 2 ◄──► 0 ◄──► 3 ◄──► 1 ◄─ tail (LRU)
//! ```
//!
//! Nodes live in a `Vec` and link to each other by slot index, so the list is
//! plain safe Rust. Slots are never freed: once the table is full, inserting a
//! new key reuses the tail slot in place.
//!
//! | Operation  | Recency effect | Cost |
//! |------------|----------------|------|
//! | `get`      | moves to head  | O(1) |
//! | `peek`     | none           | O(1) |
//! | `insert`   | moves to head, evicts tail when full | O(1) |
//!
//! [`BoundedLru`] is single-threaded. [`ConcurrentLru`] wraps it in a
//! `parking_lot::Mutex` (a lookup updates recency, so even reads need
//! exclusive access) and counts evictions.

use std::hash::Hash;
use std::mem;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::error::InvariantError;

const NIL: usize = usize::MAX;

struct Node<K, V> {
    prev: usize,
    next: usize,
    key: K,
    value: V,
}

/// Single-threaded LRU table with a fixed entry capacity.
///
/// # Example
///
/// ```
/// use syncbench::ds::lru::BoundedLru;
///
/// let mut lru = BoundedLru::new(2);
/// lru.insert(1, "one");
/// lru.insert(2, "two");
/// lru.get(&1);
///
/// // 2 is now least recently used
/// assert_eq!(lru.insert(3, "three"), Some((2, "two")));
/// assert_eq!(lru.get(&2), None);
/// ```
pub struct BoundedLru<K, V> {
    map: FxHashMap<K, usize>,
    nodes: Vec<Node<K, V>>,
    head: usize,
    tail: usize,
    capacity: usize,
}

impl<K, V> BoundedLru<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty table. A capacity of zero stores nothing.
    pub fn new(capacity: usize) -> Self {
        Self {
            map: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            nodes: Vec::with_capacity(capacity),
            head: NIL,
            tail: NIL,
            capacity,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns `true` if `key` is stored. Does not touch recency.
    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Looks up `key` and marks it most recently used.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let slot = *self.map.get(key)?;
        self.move_to_front(slot);
        Some(&self.nodes[slot].value)
    }

    /// Looks up `key` without changing recency.
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.map.get(key).map(|&slot| &self.nodes[slot].value)
    }

    /// Stores `value` under `key` as the most recently used entry.
    ///
    /// Returns the entry evicted to make room, if any. Overwriting an
    /// existing key never evicts.
    pub fn insert(&mut self, key: K, value: V) -> Option<(K, V)> {
        if self.capacity == 0 {
            return None;
        }

        if let Some(&slot) = self.map.get(&key) {
            self.nodes[slot].value = value;
            self.move_to_front(slot);
            return None;
        }

        if self.nodes.len() < self.capacity {
            let slot = self.nodes.len();
            self.nodes.push(Node {
                prev: NIL,
                next: NIL,
                key: key.clone(),
                value,
            });
            self.map.insert(key, slot);
            self.attach_front(slot);
            return None;
        }

        // Full: recycle the LRU slot for the new entry.
        let slot = self.tail;
        self.detach(slot);
        let node = &mut self.nodes[slot];
        let old_key = mem::replace(&mut node.key, key.clone());
        let old_value = mem::replace(&mut node.value, value);
        self.map.remove(&old_key);
        self.map.insert(key, slot);
        self.attach_front(slot);
        Some((old_key, old_value))
    }

    /// Keys from most to least recently used.
    pub fn keys_by_recency(&self) -> Vec<K> {
        let mut keys = Vec::with_capacity(self.len());
        let mut cursor = self.head;
        while cursor != NIL {
            keys.push(self.nodes[cursor].key.clone());
            cursor = self.nodes[cursor].next;
        }
        keys
    }

    /// Verifies that the map and the recency list agree.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "len {} exceeds capacity {}",
                self.len(),
                self.capacity
            )));
        }
        if self.nodes.len() != self.map.len() {
            return Err(InvariantError::new(format!(
                "{} slots but {} mapped keys",
                self.nodes.len(),
                self.map.len()
            )));
        }

        let mut visited = 0;
        let mut prev = NIL;
        let mut cursor = self.head;
        while cursor != NIL {
            let node = &self.nodes[cursor];
            if node.prev != prev {
                return Err(InvariantError::new(format!(
                    "slot {cursor} has prev {} but was reached from {prev}",
                    node.prev
                )));
            }
            if self.map.get(&node.key) != Some(&cursor) {
                return Err(InvariantError::new(format!(
                    "slot {cursor} is not mapped by its own key"
                )));
            }
            visited += 1;
            if visited > self.nodes.len() {
                return Err(InvariantError::new("recency list contains a cycle"));
            }
            prev = cursor;
            cursor = node.next;
        }

        if prev != self.tail {
            return Err(InvariantError::new("tail does not end the recency list"));
        }
        if visited != self.len() {
            return Err(InvariantError::new(format!(
                "recency list has {visited} nodes, map has {}",
                self.len()
            )));
        }
        Ok(())
    }

    fn move_to_front(&mut self, slot: usize) {
        if self.head != slot {
            self.detach(slot);
            self.attach_front(slot);
        }
    }

    fn detach(&mut self, slot: usize) {
        let (prev, next) = (self.nodes[slot].prev, self.nodes[slot].next);
        match prev {
            NIL => self.head = next,
            p => self.nodes[p].next = next,
        }
        match next {
            NIL => self.tail = prev,
            n => self.nodes[n].prev = prev,
        }
        self.nodes[slot].prev = NIL;
        self.nodes[slot].next = NIL;
    }

    fn attach_front(&mut self, slot: usize) {
        self.nodes[slot].prev = NIL;
        self.nodes[slot].next = self.head;
        match self.head {
            NIL => self.tail = slot,
            h => self.nodes[h].prev = slot,
        }
        self.head = slot;
    }
}

/// Thread-safe [`BoundedLru`] that counts evictions.
pub struct ConcurrentLru<K, V> {
    inner: Mutex<BoundedLru<K, V>>,
    evictions: AtomicU64,
}

impl<K, V> ConcurrentLru<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(BoundedLru::new(capacity)),
            evictions: AtomicU64::new(0),
        }
    }

    /// Clones the value for `key` and marks it most recently used.
    pub fn get(&self, key: &K) -> Option<V> {
        self.inner.lock().get(key).cloned()
    }

    /// Stores `value`; returns `true` if another entry was evicted.
    pub fn insert(&self, key: K, value: V) -> bool {
        let evicted = self.inner.lock().insert(key, value);
        if evicted.is_some() {
            self.evictions.fetch_add(1, Ordering::Relaxed);
        }
        evicted.is_some()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }

    /// Entries evicted since creation.
    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }
}
