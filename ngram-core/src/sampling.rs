use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::{NGramError, Result};

/// K-fold partitioning of a corpus.
///
/// The corpus is shuffled once with a seeded generator, then cut into `k`
/// contiguous test folds. The train fold `i` is everything outside test fold `i`,
/// in shuffled order.
///
/// # Invariants
/// - Test folds are disjoint and together cover the whole corpus
/// - `train_fold(i).len() + test_fold(i).len() == corpus.len()`
#[derive(Debug, Clone)]
pub struct KFoldCrossValidation<T> {
	instances: Vec<T>,
	k: usize,
}

impl<T: Clone> KFoldCrossValidation<T> {
	/// Shuffles a copy of `instances` with `seed` and prepares `k` folds.
	///
	/// # Errors
	/// Returns an error if `k == 0`.
	pub fn new(instances: &[T], k: usize, seed: u64) -> Result<Self> {
		if k == 0 {
			return Err(NGramError::InvalidArgument("k must be >= 1".to_owned()));
		}
		let mut instances = instances.to_vec();
		let mut rng = StdRng::seed_from_u64(seed);
		instances.shuffle(&mut rng);
		Ok(Self { instances, k })
	}

	pub fn k(&self) -> usize {
		self.k
	}

	fn bounds(&self, fold: usize) -> (usize, usize) {
		let n = self.instances.len();
		(fold * n / self.k, (fold + 1) * n / self.k)
	}

	/// Returns every instance outside test fold `fold`.
	pub fn train_fold(&self, fold: usize) -> Vec<T> {
		let (start, end) = self.bounds(fold);
		self.instances[..start]
			.iter()
			.chain(&self.instances[end..])
			.cloned()
			.collect()
	}

	/// Returns the instances of test fold `fold`.
	pub fn test_fold(&self, fold: usize) -> Vec<T> {
		let (start, end) = self.bounds(fold);
		self.instances[start..end].to_vec()
	}
}
