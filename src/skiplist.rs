//! SkipList stores key-value pairs, with the keys being unique and always
//! sorted.

use std::{borrow::Borrow, fmt, iter};

use slab::Slab;
use thiserror::Error;
use tracing::trace;

use crate::{
    level_generator::{Geometric, GeometricError, LevelGenerator, MAX_HEIGHT_LIMIT},
    node::{Link, NodeId, SkipNode},
};

/// Maximum height used by [`SkipList::new`].
pub const DEFAULT_MAX_HEIGHT: usize = 16;

/// The head node is always the first node allocated in the arena.
const HEAD: NodeId = 0;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
/// Errors that can occur when inserting into a [`SkipList`].
#[non_exhaustive]
pub enum InsertError {
    /// The key is already present. The existing value is left untouched.
    #[error("key already exists.")]
    KeyExists,
}

// ////////////////////////////////////////////////////////////////////////////
// SkipList
// ////////////////////////////////////////////////////////////////////////////

/// The skiplist provides a way of storing key-value pairs such that the keys
/// are always sorted whilst at the same time providing an efficient way to
/// access, insert and remove entries.
///
/// Nodes are kept in an arena and refer to each other by index. Level 0 links
/// every node in ascending key order; each level above links a random subset
/// of the level below, as decided by the [`LevelGenerator`] `G`.
///
/// Insertion never overwrites: inserting a key which is already present
/// returns [`InsertError::KeyExists`] and keeps the original value.
///
/// Cloning a skiplist also clones its level generator, so a seeded clone
/// draws the same heights as the list it was cloned from.
#[derive(Clone)]
pub struct SkipList<K, V, G = Geometric> {
    // The head node lives at `HEAD` and is never removed.
    nodes: Slab<SkipNode<K, V>>,
    // Highest level currently holding at least one node, or 0 when empty.
    height: usize,
    max_height: usize,
    len: usize,
    level_generator: G,
}

// ///////////////////////////////////////////////
// Inherent methods
// ///////////////////////////////////////////////

impl<K: Ord, V> SkipList<K, V> {
    /// Create a new skiplist with the default maximum height of
    /// [`DEFAULT_MAX_HEIGHT`].
    ///
    /// # Examples
    ///
    /// ```
    /// use skipkv::SkipList;
    ///
    /// let mut skiplist: SkipList<i64, String> = SkipList::new();
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_level_generator(Geometric::default())
    }

    /// Create a new skiplist whose nodes reach at most `max_height`.
    ///
    /// # Errors
    ///
    /// `max_height` must be between 1 and [`MAX_HEIGHT_LIMIT`].
    ///
    /// # Examples
    ///
    /// ```
    /// use skipkv::SkipList;
    ///
    /// let skiplist: SkipList<i64, String> = SkipList::with_max_height(6).unwrap();
    /// assert_eq!(skiplist.max_height(), 6);
    /// assert!(SkipList::<i64, String>::with_max_height(0).is_err());
    /// assert!(SkipList::<i64, String>::with_max_height(usize::MAX).is_err());
    /// ```
    #[inline]
    pub fn with_max_height(max_height: usize) -> Result<Self, GeometricError> {
        Geometric::new(max_height, crate::level_generator::DEFAULT_P)
            .map(Self::with_level_generator)
    }

    /// Constructs a new, empty skiplist with the optimal maximum height for
    /// the intended capacity. Specifically, it uses `floor(log2(capacity))`
    /// levels, ensuring that only *a few* nodes occupy the highest level.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipkv::SkipList;
    ///
    /// let mut skiplist = SkipList::with_capacity(100);
    /// skiplist.extend((0..100).map(|x| (x, x)));
    /// assert_eq!(skiplist.max_height(), 6);
    /// ```
    #[inline]
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let levels = capacity
            .checked_ilog2()
            .and_then(|bits| usize::try_from(bits).ok())
            .map_or(1, |bits| bits.max(1));
        Self::with_level_generator(Geometric::fair(levels))
    }
}

impl<K, V, G: LevelGenerator> SkipList<K, V, G> {
    /// Create a new skiplist drawing node heights from `level_generator`.
    ///
    /// The generator's maximum height is brought into
    /// `[1, MAX_HEIGHT_LIMIT]`, and heights it draws are clamped to match.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipkv::{Geometric, SkipList};
    ///
    /// let generator = Geometric::seeded(8, 0.5, 42).unwrap();
    /// let mut skiplist = SkipList::with_level_generator(generator);
    /// skiplist.insert(1, "one").unwrap();
    /// assert_eq!(skiplist.max_height(), 8);
    /// ```
    #[inline]
    pub fn with_level_generator(level_generator: G) -> Self {
        let max_height = level_generator.max_height().clamp(1, MAX_HEIGHT_LIMIT);
        let mut nodes = Slab::new();
        let head = nodes.insert(SkipNode::head(max_height));
        debug_assert_eq!(head, HEAD);
        SkipList {
            nodes,
            height: 0,
            max_height,
            len: 0,
            level_generator,
        }
    }
}

impl<K: Ord, V, G: LevelGenerator> SkipList<K, V, G> {
    /// Insert the key-value pair into the skiplist.
    ///
    /// # Errors
    ///
    /// If the key is already present, nothing is modified and
    /// [`InsertError::KeyExists`] is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipkv::{InsertError, SkipList};
    ///
    /// let mut skiplist = SkipList::new();
    ///
    /// assert_eq!(skiplist.insert(1, "Hello"), Ok(()));
    /// assert_eq!(skiplist.insert(1, "World"), Err(InsertError::KeyExists));
    /// assert_eq!(skiplist.get(&1), Some(&"Hello"));
    /// assert_eq!(skiplist.len(), 1);
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Result<(), InsertError> {
        let mut update = self.predecessors(&key);

        if let Some(next) = self.nodes[update[0]].next(0) {
            if self.nodes[next].key() == Some(&key) {
                trace!(len = self.len, "insert rejected, key exists");
                return Err(InsertError::KeyExists);
            }
        }

        let height = self.level_generator.height().clamp(1, self.max_height);
        if height > self.height {
            // Nothing is linked on the new levels yet, so the head precedes
            // the new node there.
            update.resize(height + 1, HEAD);
            self.height = height;
        }

        let node = self.nodes.insert(SkipNode::new(key, value, height));
        for (level, &prev) in update.iter().enumerate().take(height + 1) {
            let next = self.nodes[prev].next(level);
            self.nodes[node].set_next(level, next);
            self.nodes[prev].set_next(level, Some(node));
        }
        self.len += 1;

        trace!(height, len = self.len, "inserted node");
        Ok(())
    }
}

impl<K: Ord, V, G> SkipList<K, V, G> {
    /// Returns a reference to the value of the given key, or `None` if the
    /// key is not present.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipkv::SkipList;
    ///
    /// let mut skiplist = SkipList::new();
    /// assert!(skiplist.get(&0).is_none());
    /// skiplist.extend((0..10).map(|x| (x, x)));
    /// assert_eq!(skiplist.get(&0), Some(&0));
    /// assert!(skiplist.get(&10).is_none());
    /// ```
    #[inline]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).and_then(|id| self.nodes[id].value())
    }

    /// Returns a mutable reference to the value of the given key, or `None`
    /// if the key is not present.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipkv::SkipList;
    ///
    /// let mut skiplist: SkipList<_, _> = (0..10).map(|x| (x, x)).collect();
    /// if let Some(x) = skiplist.get_mut(&0) {
    ///     *x = 100;
    /// }
    /// assert_eq!(skiplist.get(&0), Some(&100));
    /// ```
    #[inline]
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let id = self.find(key)?;
        self.nodes[id].value_mut()
    }

    /// Returns `true` if the skiplist contains the given key.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipkv::SkipList;
    ///
    /// let skiplist: SkipList<_, _> = (0..10).map(|x| (x, x)).collect();
    /// assert!(skiplist.contains_key(&4));
    /// assert!(!skiplist.contains_key(&15));
    /// ```
    #[inline]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).is_some()
    }

    /// Removes the given key from the skiplist, returning its value. Removing
    /// a key which is not present does nothing and returns `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipkv::SkipList;
    ///
    /// let mut skiplist: SkipList<_, _> = (0..10).map(|x| (x, x)).collect();
    /// assert_eq!(skiplist.remove(&4), Some(4));
    /// assert_eq!(skiplist.remove(&4), None);
    /// assert_eq!(skiplist.len(), 9);
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let update = self.predecessors(key);
        let target = self.nodes[update[0]].next(0)?;
        if self.nodes[target].key()?.borrow() != key {
            return None;
        }

        let height = self.nodes[target].height();
        for (level, &prev) in update.iter().enumerate().take(height + 1) {
            if self.nodes[prev].next(level) != Some(target) {
                break;
            }
            let next = self.nodes[target].next(level);
            self.nodes[prev].set_next(level, next);
        }

        while self.height > 0 && self.nodes[HEAD].next(self.height).is_none() {
            self.height -= 1;
        }
        self.len -= 1;

        trace!(height = self.height, len = self.len, "removed node");
        self.nodes
            .try_remove(target)
            .and_then(SkipNode::into_entry)
            .map(|(_, value)| value)
    }
}

impl<K, V, G> SkipList<K, V, G> {
    /// Clears the skiplist, removing all entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipkv::SkipList;
    ///
    /// let mut skiplist: SkipList<_, _> = (0..10).map(|x| (x, x)).collect();
    /// skiplist.clear();
    /// assert!(skiplist.is_empty());
    /// assert_eq!(skiplist.height(), 0);
    /// ```
    #[inline]
    pub fn clear(&mut self) {
        self.nodes.retain(|id, _| id == HEAD);
        for level in 0..=self.height {
            self.nodes[HEAD].set_next(level, None);
        }
        self.height = 0;
        self.len = 0;
    }

    /// Returns the number of entries in the skiplist.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipkv::SkipList;
    ///
    /// let skiplist: SkipList<_, _> = (0..10).map(|x| (x, x)).collect();
    /// assert_eq!(skiplist.len(), 10);
    /// ```
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the skiplist contains no entries.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The highest level currently holding at least one node, or 0 when the
    /// skiplist is empty.
    #[inline]
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// The highest level a node may ever be linked into.
    #[inline]
    #[must_use]
    pub fn max_height(&self) -> usize {
        self.max_height
    }

    /// Provides a reference to the entry with the smallest key, or `None` if
    /// the skiplist is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipkv::SkipList;
    ///
    /// let mut skiplist = SkipList::new();
    /// assert!(skiplist.first().is_none());
    ///
    /// skiplist.insert(2, "World").unwrap();
    /// skiplist.insert(1, "Hello").unwrap();
    /// assert_eq!(skiplist.first(), Some((&1, &"Hello")));
    /// ```
    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<(&K, &V)> {
        self.iter().next()
    }

    /// Provides a reference to the entry with the largest key, or `None` if
    /// the skiplist is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipkv::SkipList;
    ///
    /// let mut skiplist = SkipList::new();
    /// assert!(skiplist.last().is_none());
    ///
    /// skiplist.insert(2, "World").unwrap();
    /// skiplist.insert(1, "Hello").unwrap();
    /// assert_eq!(skiplist.last(), Some((&2, &"World")));
    /// ```
    #[must_use]
    pub fn last(&self) -> Option<(&K, &V)> {
        let mut current = HEAD;
        for level in (0..=self.height).rev() {
            while let Some(next) = self.nodes[current].next(level) {
                current = next;
            }
        }
        self.nodes[current].entry()
    }

    /// Creates an iterator over the entries of the skiplist, in ascending key
    /// order.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipkv::SkipList;
    ///
    /// let skiplist: SkipList<_, _> = (0..10).rev().map(|x| (x, 2 * x)).collect();
    /// assert!(skiplist.iter().map(|(&k, &v)| (k, v)).eq((0..10).map(|x| (x, 2 * x))));
    /// ```
    #[inline]
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V> {
        self.iter_level(0)
    }

    /// Creates an iterator over the entries linked into `level`, in ascending
    /// key order. Levels above the current [`height`][SkipList::height] are
    /// empty.
    #[inline]
    #[must_use]
    pub fn iter_level(&self, level: usize) -> Iter<'_, K, V> {
        let next = if level <= self.height {
            self.nodes[HEAD].next(level)
        } else {
            None
        };
        Iter {
            nodes: &self.nodes,
            next,
            level,
        }
    }

    /// Creates an iterator over the keys of the skiplist, in ascending order.
    #[inline]
    #[must_use]
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys(self.iter())
    }

    /// Creates an iterator over the values of the skiplist, in ascending key
    /// order.
    #[inline]
    #[must_use]
    pub fn values(&self) -> Values<'_, K, V> {
        Values(self.iter())
    }
}

// ///////////////////////////////////////////////
// Internal methods
// ///////////////////////////////////////////////

impl<K, V, G> SkipList<K, V, G> {
    /// Starting at `current`, follow the links on `level` for as long as the
    /// next key is strictly less than `key`, returning the last node visited.
    fn advance_while_less<Q>(&self, mut current: NodeId, level: usize, key: &Q) -> NodeId
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        while let Some(next) = self.nodes[current].next(level) {
            match self.nodes[next].key() {
                Some(next_key) if next_key.borrow() < key => current = next,
                _ => break,
            }
        }
        current
    }

    /// Walk from the current height down to level 0, recording on every
    /// level the last node whose key is strictly less than `key`.
    ///
    /// The returned vector has `height + 1` entries, indexed by level.
    fn predecessors<Q>(&self, key: &Q) -> Vec<NodeId>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut update = vec![HEAD; self.height + 1];
        let mut current = HEAD;
        for level in (0..=self.height).rev() {
            current = self.advance_while_less(current, level, key);
            update[level] = current;
        }
        update
    }

    /// Find the node holding `key`.
    fn find<Q>(&self, key: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let prev = (0..=self.height)
            .rev()
            .fold(HEAD, |current, level| self.advance_while_less(current, level, key));
        let candidate = self.nodes[prev].next(0)?;
        (self.nodes[candidate].key()?.borrow() == key).then_some(candidate)
    }
}

#[cfg(test)]
impl<K: Ord, V, G> SkipList<K, V, G> {
    /// Checks the integrity of the skiplist.
    pub(crate) fn check(&self) {
        let head = &self.nodes[HEAD];
        assert!(head.key().is_none());
        assert_eq!(head.height(), self.max_height);
        assert!(self.height <= self.max_height);
        for level in self.height + 1..=self.max_height {
            assert!(head.next(level).is_none(), "head links level {level} above height");
        }

        // Level 0 holds every node in strictly ascending order, and tells us
        // how many nodes should appear on each level above.
        let mut per_level = vec![0_usize; self.max_height + 1];
        let mut prev: Option<&K> = None;
        let mut link = head.next(0);
        while let Some(id) = link {
            let node = &self.nodes[id];
            let key = node.key().expect("data node without a key");
            if let Some(prev) = prev {
                assert!(prev < key, "level 0 is not strictly ascending");
            }
            for count in &mut per_level[..=node.height()] {
                *count += 1;
            }
            prev = Some(key);
            link = node.next(0);
        }
        assert_eq!(per_level[0], self.len);
        assert_eq!(self.nodes.len(), self.len + 1);

        let tallest = per_level.iter().rposition(|&count| count > 0).unwrap_or(0);
        assert_eq!(self.height, tallest);

        for level in 1..=self.height {
            let mut count = 0;
            let mut prev: Option<&K> = None;
            let mut link = head.next(level);
            while let Some(id) = link {
                let node = &self.nodes[id];
                assert!(node.height() >= level, "node linked above its height");
                let key = node.key().expect("data node without a key");
                if let Some(prev) = prev {
                    assert!(prev < key, "level {level} is not strictly ascending");
                }
                count += 1;
                prev = Some(key);
                link = node.next(level);
            }
            assert_eq!(count, per_level[level], "level {level} is missing nodes");
        }
    }
}

// ///////////////////////////////////////////////
// Trait implementation
// ///////////////////////////////////////////////

impl<K: Ord, V> Default for SkipList<K, V> {
    #[inline]
    fn default() -> Self {
        SkipList::new()
    }
}

/// Two skiplists are equal when they hold the same entries, regardless of
/// their internal structure.
impl<K, V, G, H> PartialEq<SkipList<K, V, H>> for SkipList<K, V, G>
where
    K: PartialEq,
    V: PartialEq,
{
    #[inline]
    fn eq(&self, other: &SkipList<K, V, H>) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq, G> Eq for SkipList<K, V, G> {}

/// Entries are inserted in order; a key seen more than once keeps its first
/// value.
impl<K: Ord, V, G: LevelGenerator> Extend<(K, V)> for SkipList<K, V, G> {
    #[inline]
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iterable: I) {
        for (key, value) in iterable {
            self.insert(key, value).ok();
        }
    }
}

impl<K: Ord, V> iter::FromIterator<(K, V)> for SkipList<K, V> {
    #[inline]
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut skiplist = SkipList::new();
        skiplist.extend(iter);
        skiplist
    }
}

impl<K, V, G> IntoIterator for SkipList<K, V, G> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    /// Consumes the skiplist, yielding its entries in ascending key order.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipkv::SkipList;
    ///
    /// let skiplist: SkipList<_, _> = [(2, "b"), (1, "a")].into_iter().collect();
    /// assert_eq!(skiplist.into_iter().collect::<Vec<_>>(), vec![(1, "a"), (2, "b")]);
    /// ```
    fn into_iter(self) -> Self::IntoIter {
        let next = self.nodes[HEAD].next(0);
        IntoIter {
            nodes: self.nodes,
            next,
            len: self.len,
        }
    }
}

impl<'a, K, V, G> IntoIterator for &'a SkipList<K, V, G> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: fmt::Debug, V: fmt::Debug, G> fmt::Debug for SkipList<K, V, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Lists every level from 0 up to the current height, one line per level:
///
/// ```text
/// Level 0: 1:a 3:b 7:c
/// Level 1: 3:b
/// ```
impl<K: fmt::Display, V: fmt::Display, G> fmt::Display for SkipList<K, V, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for level in 0..=self.height {
            write!(f, "Level {level}:")?;
            for (key, value) in self.iter_level(level) {
                write!(f, " {key}{}{value}", crate::snapshot::DELIMITER)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

// ///////////////////////////////////////////////
// Iterators
// ///////////////////////////////////////////////

/// An iterator over the entries linked into one level of a [`SkipList`].
pub struct Iter<'a, K, V> {
    nodes: &'a Slab<SkipNode<K, V>>,
    next: Link,
    level: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let nodes: &'a Slab<SkipNode<K, V>> = self.nodes;
        let node = &nodes[self.next?];
        self.next = node.next(self.level);
        node.entry()
    }
}

impl<K, V> iter::FusedIterator for Iter<'_, K, V> {}

/// An owning iterator over the entries of a [`SkipList`], in ascending key
/// order.
pub struct IntoIter<K, V> {
    nodes: Slab<SkipNode<K, V>>,
    next: Link,
    len: usize,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.nodes.try_remove(self.next?)?;
        self.next = node.next(0);
        self.len -= 1;
        node.into_entry()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

impl<K, V> iter::FusedIterator for IntoIter<K, V> {}

/// An iterator over the keys of a [`SkipList`].
pub struct Keys<'a, K, V>(Iter<'a, K, V>);

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(key, _)| key)
    }
}

/// An iterator over the values of a [`SkipList`].
pub struct Values<'a, K, V>(Iter<'a, K, V>);

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(_, value)| value)
    }
}

// ////////////////////////////////////////////////////////////////////////////
// Tests
// ////////////////////////////////////////////////////////////////////////////
