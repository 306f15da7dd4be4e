//! Skiplists use a probabilistic distribution of nodes over the internal
//! levels, whereby the lowest level (level 0) contains all the nodes, and each
//! level $n > 0$ will contain a random subset of the nodes on level `n - 1`.
//!
//! Most commonly, a geometric distribution is used whereby the chance that a
//! node occupies level $n$ is $p$ times the chance of occupying level $n-1$
//! (with $0 < p < 1$).
//!
//! The generator is a dependency of the list rather than ambient state, so a
//! seeded or scripted generator can be supplied to obtain an exact structure.

mod geometric;

pub use geometric::{Geometric, GeometricError};

/// Probability used by the default generator that a node reaching level `n`
/// also reaches level `n + 1`.
pub const DEFAULT_P: f64 = 0.5;

/// The largest maximum height a list may be built with: one level per address
/// bit. Lists built from a generator claiming more are capped here.
#[expect(
    clippy::as_conversions,
    reason = "usize::BITS always fits in a usize."
)]
pub const MAX_HEIGHT_LIMIT: usize = usize::BITS as usize;

// ////////////////////////////////////////////////////////////////////////////
// Level Generator
// ////////////////////////////////////////////////////////////////////////////

/// Upon the insertion of a new node in the list, the node is linked into a
/// number of levels as determined by a [`LevelGenerator`].
///
/// A node of height `h` is linked into levels `0..=h`.
pub trait LevelGenerator {
    /// The largest height this generator will ever produce. Lists cap this
    /// at [`MAX_HEIGHT_LIMIT`].
    #[must_use]
    fn max_height(&self) -> usize;

    /// Draw the height of a new node in the range `[1, max_height]`.
    ///
    /// This function should _never_ return zero nor a value greater than
    /// [`max_height`][LevelGenerator::max_height].
    #[must_use]
    fn height(&mut self) -> usize;
}

impl<G: LevelGenerator + ?Sized> LevelGenerator for Box<G> {
    #[inline]
    fn max_height(&self) -> usize {
        (**self).max_height()
    }

    #[inline]
    fn height(&mut self) -> usize {
        (**self).height()
    }
}

/// A generator replaying a fixed sequence of heights, so tests can assert
/// exact structural outcomes.
#[cfg(test)]
#[derive(Debug, Clone)]
pub(crate) struct Scripted {
    max: usize,
    heights: std::collections::VecDeque<usize>,
}

#[cfg(test)]
impl Scripted {
    /// Replays `heights` in order, then falls back to height 1.
    pub(crate) fn new(max: usize, heights: impl IntoIterator<Item = usize>) -> Self {
        Scripted {
            max,
            heights: heights.into_iter().collect(),
        }
    }
}

#[cfg(test)]
impl LevelGenerator for Scripted {
    fn max_height(&self) -> usize {
        self.max
    }

    fn height(&mut self) -> usize {
        self.heights.pop_front().unwrap_or(1)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{LevelGenerator, Scripted};

    #[test]
    fn scripted_replays_then_falls_back() {
        let mut generator = Scripted::new(4, [3, 1, 4]);
        assert_eq!(generator.max_height(), 4);
        assert_eq!(generator.height(), 3);
        assert_eq!(generator.height(), 1);
        assert_eq!(generator.height(), 4);
        assert_eq!(generator.height(), 1);
    }

    #[test]
    fn boxed_generator() {
        let mut generator: Box<dyn LevelGenerator> = Box::new(Scripted::new(2, [2]));
        assert_eq!(generator.max_height(), 2);
        assert_eq!(generator.height(), 2);
    }
}
