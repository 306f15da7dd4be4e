//! A [`SkipList`] shared between threads.
//!
//! Every operation is a blocking call that runs to completion. Structural
//! mutations take the write side of a single reader-writer lock for the whole
//! traversal and splice, so at most one is in flight at any time, while reads
//! share the read side and therefore never observe a partially spliced node.

use std::{borrow::Borrow, fmt, io::BufRead, path::Path, str::FromStr};

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{
    level_generator::{Geometric, GeometricError, LevelGenerator},
    skiplist::{InsertError, SkipList},
    snapshot::{self, LoadReport, SnapshotError},
};

/// A thread-safe skiplist guarded by a single reader-writer lock.
///
/// # Examples
///
/// ```
/// use std::thread;
///
/// use skipkv::ConcurrentSkipList;
///
/// let skiplist = ConcurrentSkipList::new();
/// thread::scope(|s| {
///     for t in 0..4 {
///         let skiplist = &skiplist;
///         s.spawn(move || {
///             for i in 0..100 {
///                 skiplist.insert(t * 100 + i, "a").unwrap();
///             }
///         });
///     }
/// });
/// assert_eq!(skiplist.len(), 400);
/// assert_eq!(skiplist.get(&250), Some("a"));
/// ```
pub struct ConcurrentSkipList<K, V, G = Geometric> {
    inner: RwLock<SkipList<K, V, G>>,
}

impl<K: Ord, V> ConcurrentSkipList<K, V> {
    /// Create a new, empty list with the default maximum height.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::from(SkipList::new())
    }

    /// Create a new, empty list whose nodes reach at most `max_height`.
    ///
    /// # Errors
    ///
    /// `max_height` must be between 1 and
    /// [`MAX_HEIGHT_LIMIT`][crate::MAX_HEIGHT_LIMIT].
    #[inline]
    pub fn with_max_height(max_height: usize) -> Result<Self, GeometricError> {
        SkipList::with_max_height(max_height).map(Self::from)
    }
}

impl<K, V, G: LevelGenerator> ConcurrentSkipList<K, V, G> {
    /// Create a new, empty list drawing node heights from `level_generator`.
    #[inline]
    pub fn with_level_generator(level_generator: G) -> Self {
        Self::from(SkipList::with_level_generator(level_generator))
    }
}

impl<K: Ord, V, G: LevelGenerator> ConcurrentSkipList<K, V, G> {
    /// Insert the key-value pair, holding the write lock throughout.
    ///
    /// # Errors
    ///
    /// Returns [`InsertError::KeyExists`] if the key is already present, in
    /// which case nothing is modified.
    #[inline]
    pub fn insert(&self, key: K, value: V) -> Result<(), InsertError> {
        self.inner.write().insert(key, value)
    }

    /// Read a snapshot from `reader`.
    ///
    /// Each record is inserted under its own acquisition of the write lock,
    /// so concurrent writers may interleave between records.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Io`] if reading fails. Records read before the
    /// failure remain inserted.
    pub fn load_from<R: BufRead>(&self, reader: R) -> Result<LoadReport, SnapshotError>
    where
        K: FromStr,
        V: FromStr,
    {
        snapshot::read_records(reader, |key, value| self.insert(key, value))
    }

    /// Read a snapshot from the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Io`] if the file cannot be opened or read.
    #[inline]
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<LoadReport, SnapshotError>
    where
        K: FromStr,
        V: FromStr,
    {
        let file = std::fs::File::open(path)?;
        self.load_from(std::io::BufReader::new(file))
    }
}

impl<K: Ord, V, G> ConcurrentSkipList<K, V, G> {
    /// Returns a clone of the value of the given key, or `None` if the key is
    /// not present.
    #[inline]
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
        V: Clone,
    {
        self.inner.read().get(key).cloned()
    }

    /// Returns `true` if the list contains the given key.
    #[inline]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.inner.read().contains_key(key)
    }

    /// Removes the given key, returning its value. Removing a key which is not
    /// present does nothing and returns `None`.
    #[inline]
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.inner.write().remove(key)
    }
}

impl<K, V, G> ConcurrentSkipList<K, V, G> {
    /// Returns the number of entries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Returns `true` if the list contains no entries.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// The highest level currently holding at least one node.
    #[inline]
    #[must_use]
    pub fn height(&self) -> usize {
        self.inner.read().height()
    }

    /// Removes all entries.
    #[inline]
    pub fn clear(&self) {
        self.inner.write().clear();
    }

    /// Lock the list for reading, blocking until no writer holds it. Useful
    /// for iterating, or for several lookups against one consistent state.
    #[inline]
    pub fn read(&self) -> RwLockReadGuard<'_, SkipList<K, V, G>> {
        self.inner.read()
    }

    /// Lock the list for writing, blocking until it is free.
    #[inline]
    pub fn write(&self) -> RwLockWriteGuard<'_, SkipList<K, V, G>> {
        self.inner.write()
    }

    /// Consumes the wrapper, returning the underlying list.
    #[inline]
    pub fn into_inner(self) -> SkipList<K, V, G> {
        self.inner.into_inner()
    }
}

impl<K: fmt::Display, V: fmt::Display, G> ConcurrentSkipList<K, V, G> {
    /// Write a snapshot to `writer`. The read lock is held for the whole walk,
    /// so the snapshot reflects a single consistent state.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Io`] if writing fails.
    #[inline]
    pub fn dump_to<W: std::io::Write>(&self, writer: W) -> Result<usize, SnapshotError> {
        self.inner.read().dump_to(writer)
    }

    /// Write a snapshot to the file at `path`, creating or truncating it.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Io`] if the file cannot be created or
    /// written.
    #[inline]
    pub fn dump<P: AsRef<Path>>(&self, path: P) -> Result<usize, SnapshotError> {
        self.inner.read().dump(path)
    }
}

impl<K, V, G> From<SkipList<K, V, G>> for ConcurrentSkipList<K, V, G> {
    #[inline]
    fn from(skiplist: SkipList<K, V, G>) -> Self {
        ConcurrentSkipList {
            inner: RwLock::new(skiplist),
        }
    }
}

impl<K: Ord, V> Default for ConcurrentSkipList<K, V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, V: fmt::Debug, G> fmt::Debug for ConcurrentSkipList<K, V, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.inner.read(), f)
    }
}

impl<K: fmt::Display, V: fmt::Display, G> fmt::Display for ConcurrentSkipList<K, V, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.inner.read(), f)
    }
}
