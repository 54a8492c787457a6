//! Rayon-based parallelisation utilities.
//!
//! Portfolio legs and scenario cells are independent pure evaluations.
//! These helpers run them sequentially for small inputs and with Rayon
//! above a threshold. Results always come back in input order, so callers
//! can assemble matrices and position lists by index.

use rayon::prelude::*;

/// Minimum number of items handed to one Rayon task.
///
/// Empirically tuned for cache efficiency.
pub const DEFAULT_BATCH_SIZE: usize = 64;

/// Configuration for parallel execution.
///
/// # Example
///
/// ```
/// use pricer_risk::parallel::ParallelConfig;
///
/// let config = ParallelConfig::default();
/// assert!(!config.should_parallelize(10));
/// assert!(config.should_parallelize(1_000));
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ParallelConfig {
    /// Minimum items per Rayon task
    pub batch_size: usize,
    /// Minimum items before using parallelism
    pub parallel_threshold: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            parallel_threshold: 100,
        }
    }
}

impl ParallelConfig {
    /// Creates a new parallel configuration.
    pub fn new(batch_size: usize, parallel_threshold: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
            parallel_threshold,
        }
    }

    /// Configuration that never spawns Rayon tasks.
    pub fn sequential() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            parallel_threshold: usize::MAX,
        }
    }

    /// Returns whether to use parallel processing for the given item count.
    #[inline]
    pub fn should_parallelize(&self, n_items: usize) -> bool {
        n_items >= self.parallel_threshold
    }

    /// Maps every item, in parallel when the slice is large enough.
    ///
    /// The output has the same length and order as `items`.
    pub fn map<T, R, F>(&self, items: &[T], mapper: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync + Send,
    {
        if self.should_parallelize(items.len()) {
            items
                .par_iter()
                .with_min_len(self.batch_size.max(1))
                .map(mapper)
                .collect()
        } else {
            items.iter().map(mapper).collect()
        }
    }

    /// Maps every index in `0..n`, in parallel when `n` is large enough.
    ///
    /// Element `i` of the output is `mapper(i)`.
    pub fn map_indices<R, F>(&self, n: usize, mapper: F) -> Vec<R>
    where
        R: Send,
        F: Fn(usize) -> R + Sync + Send,
    {
        if self.should_parallelize(n) {
            (0..n)
                .into_par_iter()
                .with_min_len(self.batch_size.max(1))
                .map(mapper)
                .collect()
        } else {
            (0..n).map(mapper).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parallel_config_default() {
        let config = ParallelConfig::default();
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(config.parallel_threshold, 100);
    }

    #[test]
    fn test_should_parallelize() {
        let config = ParallelConfig::default();
        assert!(!config.should_parallelize(50));
        assert!(config.should_parallelize(100));
        assert!(config.should_parallelize(1000));
        assert!(!ParallelConfig::sequential().should_parallelize(1_000_000));
    }

    #[test]
    fn test_new_clamps_batch_size() {
        assert_eq!(ParallelConfig::new(0, 10).batch_size, 1);
    }

    #[test]
    fn test_map_preserves_order_both_paths() {
        let items: Vec<i32> = (0..500).collect();
        let expected: Vec<i32> = items.iter().map(|x| x * 2).collect();

        let parallel = ParallelConfig::new(8, 1).map(&items, |&x| x * 2);
        let sequential = ParallelConfig::sequential().map(&items, |&x| x * 2);

        assert_eq!(parallel, expected);
        assert_eq!(sequential, expected);
    }

    #[test]
    fn test_map_indices() {
        let squares = ParallelConfig::new(4, 1).map_indices(300, |i| i * i);
        assert_eq!(squares.len(), 300);
        assert_eq!(squares[17], 289);
        assert!(ParallelConfig::default().map_indices(0, |i| i).is_empty());
    }
}
