//! Cross-validated bracket search shared by the trained smoothings.
//!
//! A round scores every grid value between the lower and upper bound on all
//! fold models, keeps the value with the lowest summed perplexity, then
//! narrows the bracket around it. Rounds repeat until the best perplexity
//! settles.
//!
//! A candidate giving some test window a probability of zero or below fails
//! the whole search with `ProbabilityDomain`.

use std::panic;
use std::thread;

use log::debug;

use crate::config::SearchConfig;
use crate::error::{NGramError, Result};
use crate::model::NGram;
use crate::sampling::KFoldCrossValidation;
use crate::Sentence;

/// Lower bound of the next round.
///
/// When `current` already is the lower bound, the bracket extends below it by
/// dividing by `number_of_parts`.
pub fn new_lower_bound(current: f64, lower_bound: f64, upper_bound: f64, number_of_parts: usize) -> f64 {
	if current != lower_bound {
		current - (upper_bound - lower_bound) / number_of_parts as f64
	} else {
		current / number_of_parts as f64
	}
}

/// Upper bound of the next round.
///
/// When `current` already is the upper bound, the bracket extends above it by
/// multiplying by `number_of_parts`.
pub fn new_upper_bound(current: f64, lower_bound: f64, upper_bound: f64, number_of_parts: usize) -> f64 {
	if current != upper_bound {
		current + (upper_bound - lower_bound) / number_of_parts as f64
	} else {
		current * number_of_parts as f64
	}
}

/// Narrows `[lower_bound, upper_bound]` around `best`.
///
/// The new upper bound is computed from the already narrowed lower bound.
pub fn narrow_bracket(best: f64, lower_bound: f64, upper_bound: f64, number_of_parts: usize) -> (f64, f64) {
	let lower = new_lower_bound(best, lower_bound, upper_bound, number_of_parts);
	let upper = new_upper_bound(best, lower, upper_bound, number_of_parts);
	(lower, upper)
}

/// Grid values `lower, lower + step, ...` up to `upper` included, with
/// `step = (upper - lower) / number_of_parts`.
///
/// A non-positive step yields `lower` alone.
pub(crate) fn grid(lower: f64, upper: f64, number_of_parts: usize) -> Vec<f64> {
	let step = (upper - lower) / number_of_parts as f64;
	let mut values = Vec::new();
	let mut value = lower;
	while value <= upper {
		values.push(value);
		if step <= 0.0 || !step.is_finite() {
			break;
		}
		value += step;
	}
	values
}

/// Tracks the best perplexity between rounds.
#[derive(Debug)]
pub(crate) struct Convergence {
	tolerance: f64,
	max_rounds: usize,
	rounds: usize,
	previous: Option<f64>,
}

impl Convergence {
	pub(crate) fn new(config: &SearchConfig) -> Self {
		Self {
			tolerance: config.tolerance,
			max_rounds: config.max_rounds,
			rounds: 0,
			previous: None,
		}
	}

	/// Records the outcome of a round and returns `true` once the relative
	/// change of the best perplexity drops under the tolerance.
	///
	/// # Errors
	/// `SearchDidNotConverge` when the round cap is reached first.
	pub(crate) fn settled(&mut self, best_value: f64, best_perplexity: f64) -> Result<bool> {
		self.rounds += 1;
		debug!(
			"round {}: best value {} with perplexity {}",
			self.rounds, best_value, best_perplexity
		);
		if let Some(previous) = self.previous {
			if (previous - best_perplexity).abs() / best_perplexity < self.tolerance {
				return Ok(true);
			}
		}
		if self.rounds >= self.max_rounds {
			return Err(NGramError::SearchDidNotConverge {
				rounds: self.rounds,
				best_value,
				best_perplexity,
			});
		}
		self.previous = Some(best_perplexity);
		Ok(false)
	}
}

/// Fold models trained on the train folds of `corpus`, with the matching
/// test folds.
pub(crate) struct FoldModels {
	pub(crate) models: Vec<NGram>,
	pub(crate) test_folds: Vec<Vec<Sentence>>,
}

/// Partitions `corpus` into `config.folds` folds and builds one order-`n`
/// model per train fold.
pub(crate) fn build_fold_models(corpus: &[Sentence], n: usize, config: &SearchConfig) -> Result<FoldModels> {
	config.validate().map_err(NGramError::InvalidArgument)?;
	let cross_validation = KFoldCrossValidation::new(corpus, config.folds, config.seed)?;
	let mut models = Vec::with_capacity(cross_validation.k());
	let mut test_folds = Vec::with_capacity(cross_validation.k());
	for fold in 0..cross_validation.k() {
		models.push(NGram::from_corpus(n, &cross_validation.train_fold(fold))?);
		test_folds.push(cross_validation.test_fold(fold));
	}
	Ok(FoldModels { models, test_folds })
}

fn score_fold<F>(model: &mut NGram, test_fold: &[Sentence], apply: &F) -> Result<f64>
where
	F: Fn(&mut NGram) -> Result<()> + Sync,
{
	apply(model)?;
	model.get_perplexity(test_fold)
}

/// Applies `apply` to every fold model and sums the perplexities on the test
/// folds.
///
/// With `parallel`, each fold runs on its own scoped thread. The sum is always
/// taken in fold order.
pub(crate) fn score_folds<F>(folds: &mut FoldModels, parallel: bool, apply: &F) -> Result<f64>
where
	F: Fn(&mut NGram) -> Result<()> + Sync,
{
	let FoldModels { models, test_folds } = folds;
	let scores: Vec<Result<f64>> = if parallel {
		thread::scope(|scope| {
			let handles: Vec<_> = models
				.iter_mut()
				.zip(test_folds.iter())
				.map(|(model, test_fold)| scope.spawn(move || score_fold(model, test_fold, apply)))
				.collect();
			handles
				.into_iter()
				.map(|handle| handle.join().unwrap_or_else(|payload| panic::resume_unwind(payload)))
				.collect()
		})
	} else {
		models
			.iter_mut()
			.zip(test_folds.iter())
			.map(|(model, test_fold)| score_fold(model, test_fold, apply))
			.collect()
	};

	let mut total = 0.0;
	for score in scores {
		total += score?;
	}
	Ok(total)
}

/// One-dimensional bracket search starting from `[lower_bound, upper_bound]`.
///
/// `apply(model, value)` prepares a fold model for the candidate `value`.
/// Returns the value with the lowest summed perplexity of the last round.
pub(crate) fn search_one_dimension<F>(
	folds: &mut FoldModels,
	config: &SearchConfig,
	mut lower_bound: f64,
	mut upper_bound: f64,
	apply: F,
) -> Result<f64>
where
	F: Fn(&mut NGram, f64) -> Result<()> + Sync,
{
	let mut best_value = (lower_bound + upper_bound) / 2.0;
	let mut convergence = Convergence::new(config);
	loop {
		let mut best_perplexity = f64::INFINITY;
		for value in grid(lower_bound, upper_bound, config.number_of_parts) {
			let perplexity = score_folds(folds, config.parallel, &|model: &mut NGram| apply(model, value))?;
			if perplexity < best_perplexity {
				best_perplexity = perplexity;
				best_value = value;
			}
		}
		(lower_bound, upper_bound) = narrow_bracket(best_value, lower_bound, upper_bound, config.number_of_parts);
		debug!("next bracket [{lower_bound}, {upper_bound}]");
		if convergence.settled(best_value, best_perplexity)? {
			return Ok(best_value);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::smoothing::{NoSmoothing, SimpleSmoothing};
	use approx::assert_abs_diff_eq;

	fn corpus(lines: &[&str]) -> Vec<Sentence> {
		lines
			.iter()
			.map(|line| line.split_whitespace().map(str::to_owned).collect())
			.collect()
	}

	#[test]
	fn bracket_extends_past_the_edges() {
		assert_abs_diff_eq!(new_lower_bound(0.1, 0.1, 1.0, 5), 0.02);
		assert_abs_diff_eq!(new_upper_bound(1.0, 0.1, 1.0, 5), 5.0);
	}

	#[test]
	fn bracket_narrows_around_interior_best() {
		let (lower, upper) = narrow_bracket(0.46, 0.1, 1.0, 5);
		assert_abs_diff_eq!(lower, 0.46 - 0.9 / 5.0, epsilon = 1e-12);
		// width uses the narrowed lower bound
		assert_abs_diff_eq!(upper, 0.46 + (1.0 - lower) / 5.0, epsilon = 1e-12);
	}

	#[test]
	fn grid_covers_both_ends() {
		let values = grid(0.0, 1.0, 4);
		assert_eq!(values, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
		assert_eq!(grid(0.5, 0.5, 5), vec![0.5]);
		assert!(grid(1.0, 0.5, 5).is_empty());
	}

	#[test]
	fn convergence_needs_two_rounds() {
		let mut convergence = Convergence::new(&SearchConfig::default());
		assert!(!convergence.settled(0.5, 10.0).unwrap());
		assert!(convergence.settled(0.5, 10.0001).unwrap());
	}

	#[test]
	fn round_cap_reports_best_value() {
		let config = SearchConfig { max_rounds: 2, ..SearchConfig::default() };
		let mut convergence = Convergence::new(&config);
		assert!(!convergence.settled(0.3, 10.0).unwrap());
		let error = convergence.settled(0.4, 5.0).unwrap_err();
		assert!(matches!(
			error,
			NGramError::SearchDidNotConverge { rounds: 2, best_value, .. } if best_value == 0.4
		));
	}

	#[test]
	fn domain_error_of_a_fold_propagates() {
		let config = SearchConfig { folds: 2, ..SearchConfig::default() };
		let mut folds = build_fold_models(&corpus(&["a b", "a c", "b c", "c a"]), 2, &config).unwrap();
		let result = score_folds(&mut folds, true, &|_: &mut NGram| -> Result<()> {
			Err(NGramError::ProbabilityDomain {
				probability: -0.2,
				window: vec!["a".to_owned()],
			})
		});
		assert!(matches!(result, Err(NGramError::ProbabilityDomain { probability, .. }) if probability == -0.2));
	}

	#[test]
	fn search_stops_on_unseen_windows() {
		// every bigram of a test fold is missing from its train fold
		let config = SearchConfig { folds: 2, ..SearchConfig::default() };
		let mut folds = build_fold_models(&corpus(&["a b", "c d", "e f", "g h"]), 2, &config).unwrap();
		let result = search_one_dimension(&mut folds, &config, 0.1, 1.0, |model: &mut NGram, _| {
			NoSmoothing.set_probabilities_general(model)
		});
		assert!(matches!(result, Err(NGramError::ProbabilityDomain { probability, .. }) if probability == 0.0));
	}
}
