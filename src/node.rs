//! The nodes making up a [`SkipList`][crate::SkipList].

/// Index of a node within the list's arena.
pub(crate) type NodeId = usize;

/// A forward link: the next node on some level, or `None` at the end of that
/// level.
pub(crate) type Link = Option<NodeId>;

// ////////////////////////////////////////////////////////////////////////////
// SkipNode
// ////////////////////////////////////////////////////////////////////////////

/// SkipNodes make up the SkipList. The list owns every node through its arena;
/// nodes refer to each other only by index.
///
/// A node of height `h` has `h + 1` forward links, one for each of the levels
/// `0..=h` it is linked into. The height is fixed at creation.
///
/// The head node is the only node without an entry. It is created with the
/// list's maximum height so that it can start every level.
#[derive(Clone, Debug)]
pub(crate) struct SkipNode<K, V> {
    // key and value are never None, with the sole exception being the head
    // node.
    entry: Option<(K, V)>,
    // links[i] is the next node on level i. This slice *must* be of length
    // `height + 1`.
    links: Box<[Link]>,
}

// ///////////////////////////////////////////////
// Inherent methods
// ///////////////////////////////////////////////

impl<K, V> SkipNode<K, V> {
    /// Create a new head node able to start `max_height + 1` levels.
    pub(crate) fn head(max_height: usize) -> Self {
        SkipNode {
            entry: None,
            links: vec![None; max_height + 1].into_boxed_slice(),
        }
    }

    /// Create a new node with the given entry, linked into levels
    /// `0..=height`. All links default to the end of level.
    pub(crate) fn new(key: K, value: V, height: usize) -> Self {
        SkipNode {
            entry: Some((key, value)),
            links: vec![None; height + 1].into_boxed_slice(),
        }
    }

    /// The highest level this node is linked into.
    pub(crate) fn height(&self) -> usize {
        self.links.len() - 1
    }

    pub(crate) fn key(&self) -> Option<&K> {
        self.entry.as_ref().map(|(key, _)| key)
    }

    pub(crate) fn value(&self) -> Option<&V> {
        self.entry.as_ref().map(|(_, value)| value)
    }

    pub(crate) fn value_mut(&mut self) -> Option<&mut V> {
        self.entry.as_mut().map(|(_, value)| value)
    }

    pub(crate) fn entry(&self) -> Option<(&K, &V)> {
        self.entry.as_ref().map(|(key, value)| (key, value))
    }

    /// Consumes the node returning the entry it contains.
    pub(crate) fn into_entry(self) -> Option<(K, V)> {
        self.entry
    }

    // /////////////////////////////
    // Link Manipulation
    // /////////////////////////////

    /// The next node on `level`.
    ///
    /// Panics if the node is not linked into `level`.
    pub(crate) fn next(&self, level: usize) -> Link {
        self.links[level]
    }

    /// Point this node's link on `level` at `link`.
    ///
    /// Panics if the node is not linked into `level`.
    pub(crate) fn set_next(&mut self, level: usize, link: Link) {
        self.links[level] = link;
    }
}
