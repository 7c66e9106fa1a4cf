use log::info;

use super::search::{build_fold_models, search_one_dimension};
use super::{SimpleSmoothing, TrainedSmoothing};
use crate::config::SearchConfig;
use crate::error::Result;
use crate::model::NGram;
use crate::Sentence;

const DELTA_LOWER_BOUND: f64 = 0.1;
const DELTA_UPPER_BOUND: f64 = 1.0;

/// Additive smoothing whose pseudo-count `delta` is chosen by k-fold cross
/// validation.
///
/// Before training, `delta` is 1 (Laplace).
#[derive(Debug, Clone)]
pub struct AdditiveSmoothing {
	delta: f64,
	config: SearchConfig,
}

impl AdditiveSmoothing {
	pub fn new() -> Self {
		Self::with_config(SearchConfig::default())
	}

	pub fn with_config(config: SearchConfig) -> Self {
		Self { delta: 1.0, config }
	}

	/// The learned pseudo-count.
	pub fn delta(&self) -> f64 {
		self.delta
	}

	pub fn config(&self) -> &SearchConfig {
		&self.config
	}
}

impl Default for AdditiveSmoothing {
	fn default() -> Self {
		Self::new()
	}
}

impl SimpleSmoothing for AdditiveSmoothing {
	fn set_probabilities(&self, model: &mut NGram, level: usize) -> Result<()> {
		model.set_probability_with_pseudo_count(self.delta, level);
		Ok(())
	}
}

impl TrainedSmoothing for AdditiveSmoothing {
	/// Searches `delta` in `[0.1, 1]` (extended when the best value sits on an
	/// edge) minimizing the summed test fold perplexities.
	fn learn_parameters(&mut self, corpus: &[Sentence], n: usize) -> Result<()> {
		info!(
			"learning additive delta for {n}-grams on {} sentences ({} folds)",
			corpus.len(),
			self.config.folds
		);
		let mut folds = build_fold_models(corpus, n, &self.config)?;
		self.delta = search_one_dimension(
			&mut folds,
			&self.config,
			DELTA_LOWER_BOUND,
			DELTA_UPPER_BOUND,
			|model: &mut NGram, value| {
				let level = model.n();
				model.set_probability_with_pseudo_count(value, level);
				Ok(())
			},
		)?;
		info!("learned additive delta {}", self.delta);
		Ok(())
	}
}
