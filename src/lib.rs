//! A skiplist is a way of storing entries in such a way that they can be
//! efficiently searched, inserted and removed, all in `O(log(n))` on average.
//!
//! Conceptually, a skiplist resembles something like:
//!
//! ```text
//! <head> ----------> [2] --------------------------------------------------> [9] ---------->
//! <head> ----------> [2] ------------------------------------[7] ----------> [9] ---------->
//! <head> ----------> [2] ----------> [4] ------------------> [7] ----------> [9] --> [10] ->
//! <head> --> [1] --> [2] --> [3] --> [4] --> [5] --> [6] --> [7] --> [8] --> [9] --> [10] ->
//! ```
//!
//! where each node `[x]` has links to nodes further down the list, allowing the
//! search to effectively skip ahead. How many levels a node is linked into is
//! decided at random by a [`LevelGenerator`] when the node is inserted.
//!
//! This crate provides:
//!
//! - [`SkipList`], an ordered map with unique keys. Inserting an existing key
//!   is rejected rather than overwriting it.
//! - [`ConcurrentSkipList`], the same map behind a reader-writer lock.
//! - [`snapshot`], a line-oriented `<key>:<value>` text format used by
//!   [`SkipList::dump`] and [`SkipList::load`].
//!
//! ```
//! use skipkv::{InsertError, SkipList};
//!
//! let mut skiplist = SkipList::with_max_height(6).unwrap();
//! for (key, value) in [(1, "a"), (3, "b"), (7, "c"), (8, "d"), (9, "e"), (19, "f")] {
//!     skiplist.insert(key, value).unwrap();
//! }
//! assert_eq!(skiplist.insert(19, "g"), Err(InsertError::KeyExists));
//! assert_eq!(skiplist.len(), 6);
//! assert_eq!(skiplist.get(&9), Some(&"e"));
//! assert_eq!(skiplist.get(&18), None);
//!
//! skiplist.remove(&3);
//! skiplist.remove(&7);
//! assert_eq!(skiplist.len(), 4);
//! ```

mod concurrent;
mod level_generator;
mod node;
mod skiplist;
pub mod snapshot;

pub use concurrent::ConcurrentSkipList;
pub use level_generator::{DEFAULT_P, Geometric, GeometricError, LevelGenerator, MAX_HEIGHT_LIMIT};
pub use skiplist::{DEFAULT_MAX_HEIGHT, InsertError, IntoIter, Iter, Keys, SkipList, Values};
pub use snapshot::{LoadReport, SnapshotError};
