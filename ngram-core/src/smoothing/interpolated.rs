use log::{debug, info};

use super::search::{
	build_fold_models, grid, narrow_bracket, score_folds, search_one_dimension, Convergence, FoldModels,
};
use super::{GoodTuringSmoothing, SimpleSmoothing, TrainedSmoothing};
use crate::config::SearchConfig;
use crate::error::Result;
use crate::model::NGram;
use crate::Sentence;

const LAMBDA_LOWER_BOUND: f64 = 0.1;
const LAMBDA_UPPER_BOUND: f64 = 0.999;

/// Linear interpolation of the unigram, bigram and trigram estimates of a base
/// smoothing, with weights chosen by k-fold cross validation.
///
/// - Bigram models: `lambda1 * P(w2 | w1) + (1 - lambda1) * P(w2)`
/// - Trigram models: `lambda1 * P(w3 | w1 w2) + lambda2 * P(w3 | w2) + (1 - lambda1 - lambda2) * P(w3)`
///
/// Models of any other order only get the base smoothing.
pub struct InterpolatedSmoothing {
	base: Box<dyn SimpleSmoothing>,
	/// `(lambda1, lambda2)`, `None` until trained
	lambdas: Option<(f64, f64)>,
	config: SearchConfig,
}

impl InterpolatedSmoothing {
	/// Interpolates Good-Turing estimates.
	pub fn new() -> Self {
		Self::with_config(SearchConfig::default())
	}

	pub fn with_config(config: SearchConfig) -> Self {
		Self::with_base(Box::new(GoodTuringSmoothing), config)
	}

	pub fn with_base(base: Box<dyn SimpleSmoothing>, config: SearchConfig) -> Self {
		Self {
			base,
			lambdas: None,
			config,
		}
	}

	pub fn lambda1(&self) -> Option<f64> {
		self.lambdas.map(|(lambda1, _)| lambda1)
	}

	pub fn lambda2(&self) -> Option<f64> {
		self.lambdas.map(|(_, lambda2)| lambda2)
	}

	/// Applies the base smoothing to levels `2..=n`, then to level 1.
	fn apply_base(&self, model: &mut NGram) -> Result<()> {
		for level in 2..=model.n() {
			self.base.set_probabilities(model, level)?;
		}
		self.base.set_probabilities(model, 1)
	}

	/// Joint search of `(lambda1, lambda2)` with `lambda1 + lambda2 < 1`.
	///
	/// Both brackets are narrowed around the best pair after every round.
	fn learn_best_lambdas(&self, folds: &mut FoldModels) -> Result<(f64, f64)> {
		let parts = self.config.number_of_parts;
		let (mut lower1, mut upper1) = (LAMBDA_LOWER_BOUND, LAMBDA_UPPER_BOUND);
		let (mut lower2, mut upper2) = (LAMBDA_LOWER_BOUND, LAMBDA_UPPER_BOUND);
		let mut best = ((lower1 + upper1) / 2.0, (lower2 + upper2) / 2.0);
		let mut convergence = Convergence::new(&self.config);
		loop {
			let mut best_perplexity = f64::INFINITY;
			for (value1, value2) in lambda_pairs((lower1, upper1), (lower2, upper2), parts) {
				let perplexity = score_folds(folds, self.config.parallel, &|model: &mut NGram| {
					model.set_lambda3(value1, value2);
					Ok(())
				})?;
				if perplexity < best_perplexity {
					best_perplexity = perplexity;
					best = (value1, value2);
				}
			}
			(lower1, upper1) = narrow_bracket(best.0, lower1, upper1, parts);
			(lower2, upper2) = narrow_bracket(best.1, lower2, upper2, parts);
			debug!("next brackets [{lower1}, {upper1}] x [{lower2}, {upper2}]");
			if convergence.settled(best.0, best_perplexity)? {
				return Ok(best);
			}
		}
	}
}

/// Candidate pairs of one round of the trigram weight search.
///
/// `lambda1` walks the grid of its own bracket. For each of its values,
/// `lambda2` starts at its lower bound and advances by the same step as
/// `lambda1` while it stays inside its bracket and `lambda1 + lambda2 < 1`.
fn lambda_pairs(bracket1: (f64, f64), bracket2: (f64, f64), number_of_parts: usize) -> Vec<(f64, f64)> {
	let (lower1, upper1) = bracket1;
	let (lower2, upper2) = bracket2;
	let step = (upper1 - lower1) / number_of_parts as f64;
	let mut pairs = Vec::new();
	for value1 in grid(lower1, upper1, number_of_parts) {
		let mut value2 = lower2;
		while value2 <= upper2 && value1 + value2 < 1.0 {
			pairs.push((value1, value2));
			if step <= 0.0 || !step.is_finite() {
				break;
			}
			value2 += step;
		}
	}
	pairs
}

impl Default for InterpolatedSmoothing {
	fn default() -> Self {
		Self::new()
	}
}

impl SimpleSmoothing for InterpolatedSmoothing {
	/// Applies the base smoothing to every level, then the learned weights.
	fn set_probabilities(&self, model: &mut NGram, _level: usize) -> Result<()> {
		self.apply_base(model)?;
		if let Some((lambda1, lambda2)) = self.lambdas {
			match model.n() {
				2 => model.set_lambda2(lambda1),
				3 => model.set_lambda3(lambda1, lambda2),
				_ => {}
			}
		}
		Ok(())
	}
}

impl TrainedSmoothing for InterpolatedSmoothing {
	fn learn_parameters(&mut self, corpus: &[Sentence], n: usize) -> Result<()> {
		if n <= 1 {
			return Ok(());
		}
		info!(
			"learning interpolation weights for {n}-grams on {} sentences ({} folds)",
			corpus.len(),
			self.config.folds
		);
		let mut folds = build_fold_models(corpus, n, &self.config)?;
		for model in &mut folds.models {
			self.apply_base(model)?;
		}
		match n {
			2 => {
				let lambda1 = search_one_dimension(
					&mut folds,
					&self.config,
					LAMBDA_LOWER_BOUND,
					LAMBDA_UPPER_BOUND,
					|model: &mut NGram, value| {
						model.set_lambda2(value);
						Ok(())
					},
				)?;
				self.lambdas = Some((lambda1, 0.0));
			}
			3 => {
				self.lambdas = Some(self.learn_best_lambdas(&mut folds)?);
			}
			_ => return Ok(()),
		}
		if let Some((lambda1, lambda2)) = self.lambdas {
			info!("learned interpolation weights lambda1 = {lambda1}, lambda2 = {lambda2}");
		}
		Ok(())
	}
}
