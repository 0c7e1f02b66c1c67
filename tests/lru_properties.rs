// ==============================================
// BOUNDED LRU PROPERTY TESTS (integration)
// ==============================================
//
// Random operation sequences run against `BoundedLru` and a naive model
// (a Vec ordered most recently used first). Results, evictions and recency
// order must match after every step.

use proptest::prelude::*;
use syncbench::ds::lru::BoundedLru;

#[derive(Debug, Clone)]
enum Op {
    Insert(u8, u32),
    Get(u8),
    Peek(u8),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..24, any::<u32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        (0u8..24).prop_map(Op::Get),
        (0u8..24).prop_map(Op::Peek),
    ]
}

#[derive(Default)]
struct Model {
    entries: Vec<(u8, u32)>,
}

impl Model {
    fn position(&self, key: u8) -> Option<usize> {
        self.entries.iter().position(|(k, _)| *k == key)
    }

    fn get(&mut self, key: u8) -> Option<u32> {
        let idx = self.position(key)?;
        let entry = self.entries.remove(idx);
        self.entries.insert(0, entry);
        Some(entry.1)
    }

    fn peek(&self, key: u8) -> Option<u32> {
        self.position(key).map(|idx| self.entries[idx].1)
    }

    fn insert(&mut self, key: u8, value: u32, capacity: usize) -> Option<(u8, u32)> {
        if capacity == 0 {
            return None;
        }
        if let Some(idx) = self.position(key) {
            self.entries.remove(idx);
            self.entries.insert(0, (key, value));
            return None;
        }
        let evicted = if self.entries.len() == capacity {
            self.entries.pop()
        } else {
            None
        };
        self.entries.insert(0, (key, value));
        evicted
    }

    fn keys(&self) -> Vec<u8> {
        self.entries.iter().map(|(k, _)| *k).collect()
    }
}

proptest! {
    #[test]
    fn matches_model(capacity in 0usize..12, ops in prop::collection::vec(op(), 1..200)) {
        let mut lru = BoundedLru::new(capacity);
        let mut model = Model::default();

        for op in ops {
            match op {
                Op::Insert(k, v) => {
                    prop_assert_eq!(lru.insert(k, v), model.insert(k, v, capacity));
                },
                Op::Get(k) => {
                    prop_assert_eq!(lru.get(&k).copied(), model.get(k));
                },
                Op::Peek(k) => {
                    prop_assert_eq!(lru.peek(&k).copied(), model.peek(k));
                },
            }
            prop_assert_eq!(lru.keys_by_recency(), model.keys());
            prop_assert!(lru.check_invariants().is_ok());
        }
    }

    #[test]
    fn never_exceeds_capacity(capacity in 1usize..16, keys in prop::collection::vec(any::<u16>(), 1..300)) {
        let mut lru = BoundedLru::new(capacity);
        let mut evictions = 0usize;
        let mut distinct = std::collections::HashSet::new();

        for key in keys {
            distinct.insert(key);
            if lru.insert(key, ()).is_some() {
                evictions += 1;
            }
            prop_assert!(lru.len() <= capacity);
        }

        prop_assert_eq!(lru.len(), distinct.len().min(capacity));
        prop_assert!(evictions >= distinct.len().saturating_sub(capacity));
    }

    #[test]
    fn most_recent_insert_is_always_present(capacity in 1usize..8, keys in prop::collection::vec(0u32..32, 1..100)) {
        let mut lru = BoundedLru::new(capacity);
        for key in keys {
            lru.insert(key, key);
            prop_assert_eq!(lru.peek(&key), Some(&key));
            let recency = lru.keys_by_recency();
            prop_assert_eq!(recency.first(), Some(&key));
        }
    }
}
