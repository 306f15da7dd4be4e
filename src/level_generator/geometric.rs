//! Geometric level generator.

use rand::{Rng, SeedableRng, rngs::SmallRng};
use thiserror::Error;

use crate::level_generator::{DEFAULT_P, LevelGenerator, MAX_HEIGHT_LIMIT};
use crate::skiplist::DEFAULT_MAX_HEIGHT;

#[derive(Error, Debug, PartialEq, Eq)]
/// Errors that can occur when creating a [`Geometric`] level generator.
#[expect(
    clippy::module_name_repetitions,
    reason = "Using 'Error' would be too generic and may cause confusion."
)]
#[non_exhaustive]
pub enum GeometricError {
    /// The maximum height must be non-zero.
    #[error("max must be non-zero.")]
    ZeroMax,
    /// The maximum height must not exceed [`MAX_HEIGHT_LIMIT`].
    #[error("max must be at most {MAX_HEIGHT_LIMIT}.")]
    MaxTooLarge,
    /// The probability `$p$` must be in the range `$(0, 1)$`.
    #[error("p must be in (0, 1).")]
    InvalidProbability,
}

/// A level generator using a geometric distribution.
///
/// Starting from height 1, a biased coin landing on "continue" with
/// probability `$p$` is flipped until it lands on "stop", incrementing the
/// height on every "continue". The result is truncated at the maximum height,
/// so the probability that a node reaches height `$n$` is `$p^{n-1}$`.
///
/// The random number generator is a type parameter so that callers may
/// supply a seeded one.
#[derive(Debug, Clone)]
pub struct Geometric<R = SmallRng> {
    /// The largest height that will be produced.
    max: usize,
    /// The probability that a node continues to the next level.
    p: f64,
    /// The random number generator.
    rng: R,
}

impl Geometric<SmallRng> {
    /// Create a new geometric level generator producing heights in
    /// `[1, max]`, with `p` as the probability that a node continues to the
    /// next level. The generator is seeded from the thread-local RNG.
    ///
    /// # Errors
    ///
    /// `p` must be strictly between 0 and 1, and `max` must be between 1 and
    /// [`MAX_HEIGHT_LIMIT`].
    #[inline]
    pub fn new(max: usize, p: f64) -> Result<Self, GeometricError> {
        Self::with_rng(max, p, SmallRng::from_rng(&mut rand::rng()))
    }

    /// Create a generator whose sequence of heights is fully determined by
    /// `seed`.
    ///
    /// # Errors
    ///
    /// Same as [`Geometric::new`].
    #[inline]
    pub fn seeded(max: usize, p: f64, seed: u64) -> Result<Self, GeometricError> {
        Self::with_rng(max, p, SmallRng::seed_from_u64(seed))
    }

    /// A fair coin capped at `max`, which is brought into
    /// `[1, MAX_HEIGHT_LIMIT]`.
    pub(crate) fn fair(max: usize) -> Self {
        Geometric {
            max: max.clamp(1, MAX_HEIGHT_LIMIT),
            p: DEFAULT_P,
            rng: SmallRng::from_rng(&mut rand::rng()),
        }
    }
}

impl<R: Rng> Geometric<R> {
    /// Create a generator drawing its coin flips from `rng`.
    ///
    /// # Errors
    ///
    /// Same as [`Geometric::new`].
    #[inline]
    pub fn with_rng(max: usize, p: f64, rng: R) -> Result<Self, GeometricError> {
        if max == 0 {
            return Err(GeometricError::ZeroMax);
        }
        if max > MAX_HEIGHT_LIMIT {
            return Err(GeometricError::MaxTooLarge);
        }
        if !(0.0 < p && p < 1.0) {
            return Err(GeometricError::InvalidProbability);
        }
        Ok(Geometric { max, p, rng })
    }

    /// The probability that a node continues to the next level.
    #[inline]
    #[must_use]
    pub fn p(&self) -> f64 {
        self.p
    }
}

impl Default for Geometric<SmallRng> {
    /// A fair coin capped at [`DEFAULT_MAX_HEIGHT`].
    #[inline]
    fn default() -> Self {
        Self::fair(DEFAULT_MAX_HEIGHT)
    }
}

impl<R: Rng> LevelGenerator for Geometric<R> {
    #[inline]
    fn max_height(&self) -> usize {
        self.max
    }

    #[inline]
    fn height(&mut self) -> usize {
        let mut height = 1;
        while height < self.max && self.rng.random_bool(self.p) {
            height += 1;
        }
        height
    }
}

#[cfg(test)]
mod tests {
    use anyhow::{Result, bail};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::{Geometric, GeometricError, LevelGenerator};
    use crate::{level_generator::MAX_HEIGHT_LIMIT, skiplist::DEFAULT_MAX_HEIGHT};

    #[test]
    fn invalid_max() {
        assert_eq!(Geometric::new(0, 0.5).err(), Some(GeometricError::ZeroMax));
    }

    #[rstest]
    fn max_too_large(#[values(MAX_HEIGHT_LIMIT + 1, usize::MAX / 2, usize::MAX)] max: usize) {
        assert_eq!(
            Geometric::new(max, 0.5).err(),
            Some(GeometricError::MaxTooLarge)
        );
        assert_eq!(
            Geometric::seeded(max, 0.5, 1).err(),
            Some(GeometricError::MaxTooLarge)
        );
    }

    #[test]
    fn max_at_limit() -> Result<()> {
        let mut generator = Geometric::seeded(MAX_HEIGHT_LIMIT, 0.9, 3)?;
        assert_eq!(generator.max_height(), MAX_HEIGHT_LIMIT);
        assert!((0..1000).all(|_| (1..=MAX_HEIGHT_LIMIT).contains(&generator.height())));
        Ok(())
    }

    #[rstest]
    fn invalid_p(#[values(0.0, 1.0, -0.5, 2.0, f64::NAN)] p: f64) {
        assert_eq!(
            Geometric::new(1, p).err(),
            Some(GeometricError::InvalidProbability)
        );
    }

    #[test]
    fn error_messages() {
        assert_eq!(GeometricError::ZeroMax.to_string(), "max must be non-zero.");
        assert_eq!(
            GeometricError::MaxTooLarge.to_string(),
            format!("max must be at most {MAX_HEIGHT_LIMIT}.")
        );
        assert_eq!(
            GeometricError::InvalidProbability.to_string(),
            "p must be in (0, 1)."
        );
    }

    #[test]
    fn default() {
        let generator: Geometric = Geometric::default();
        assert_eq!(generator.max_height(), DEFAULT_MAX_HEIGHT);
        assert!((generator.p() - 0.5).abs() < f64::EPSILON);
    }

    #[rstest]
    fn heights_in_range(
        #[values(1, 2, 16, 32)] n: usize,
        #[values(0.1, 0.5, 0.9)] p: f64,
    ) -> Result<()> {
        let mut generator = Geometric::new(n, p)?;
        assert_eq!(generator.max_height(), n);
        for _ in 0..100_000 {
            let height = generator.height();
            assert!((1..=n).contains(&height));
        }
        Ok(())
    }

    #[test]
    fn reaches_both_ends() -> Result<()> {
        let mut generator = Geometric::seeded(4, 0.5, 7)?;
        let heights: Vec<usize> = (0..10_000).map(|_| generator.height()).collect();
        if !heights.contains(&1) {
            bail!("Failed to generate a height-1 node.");
        }
        if !heights.contains(&4) {
            bail!("Failed to generate a height-4 node.");
        }
        Ok(())
    }

    #[test]
    fn roughly_halves_per_level() -> Result<()> {
        let mut generator = Geometric::seeded(32, 0.5, 0x1234_abcd)?;
        let samples = 200_000;
        let mut counts = [0_usize; 4];
        for _ in 0..samples {
            let height = generator.height();
            if height <= counts.len() {
                counts[height - 1] += 1;
            }
        }
        // P(h = 1) = 1/2, P(h = 2) = 1/4, ...
        for (i, &count) in counts.iter().enumerate() {
            let expected = samples >> (i + 1);
            let tolerance = expected / 10;
            assert!(
                count.abs_diff(expected) < tolerance,
                "height {} drawn {count} times, expected about {expected}",
                i + 1
            );
        }
        Ok(())
    }

    #[test]
    fn seeded_is_reproducible() -> Result<()> {
        let mut a = Geometric::seeded(16, 0.5, 42)?;
        let mut b = Geometric::seeded(16, 0.5, 42)?;
        let xs: Vec<usize> = (0..1000).map(|_| a.height()).collect();
        let ys: Vec<usize> = (0..1000).map(|_| b.height()).collect();
        assert_eq!(xs, ys);
        Ok(())
    }
}
