//! Smoothing strategies turning n-gram counts into probabilities.
//!
//! - Simple strategies (`SimpleSmoothing`) only look at the model itself.
//! - Trained strategies (`TrainedSmoothing`) first learn parameters on a corpus
//!   with k-fold cross validation, then apply them like a simple strategy.

use crate::error::Result;
use crate::model::NGram;
use crate::Sentence;

mod additive;
mod good_turing;
mod interpolated;
mod laplace;
mod no_smoothing;
pub mod search;

pub use additive::AdditiveSmoothing;
pub use good_turing::GoodTuringSmoothing;
pub use interpolated::InterpolatedSmoothing;
pub use laplace::LaplaceSmoothing;
pub use no_smoothing::{NoSmoothing, NoSmoothingWithDictionary, NoSmoothingWithNonRareWords};

/// A smoothing that needs nothing but the model.
///
/// Implementations must be `Send + Sync` so fold models can be scored on
/// several threads.
pub trait SimpleSmoothing: Send + Sync {
	/// Sets the probabilities of level `level` (1 = unigrams, 2 = bigrams, ...).
	fn set_probabilities(&self, model: &mut NGram, level: usize) -> Result<()>;

	/// Sets the probabilities of the model's top level.
	fn set_probabilities_general(&self, model: &mut NGram) -> Result<()> {
		let level = model.n();
		self.set_probabilities(model, level)
	}
}

/// A smoothing whose parameters are learned from a corpus.
pub trait TrainedSmoothing: SimpleSmoothing {
	/// Learns the parameters for models of order `n` on `corpus`.
	fn learn_parameters(&mut self, corpus: &[Sentence], n: usize) -> Result<()>;

	/// Learns the parameters on `corpus`, then sets the probabilities of `model`.
	fn train(&mut self, corpus: &[Sentence], model: &mut NGram) -> Result<()> {
		self.learn_parameters(corpus, model.n())?;
		self.set_probabilities_general(model)
	}
}
