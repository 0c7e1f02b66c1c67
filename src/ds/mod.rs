pub mod lru;

pub use lru::{BoundedLru, ConcurrentLru};
