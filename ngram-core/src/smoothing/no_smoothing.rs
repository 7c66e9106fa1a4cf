use std::collections::HashSet;

use super::SimpleSmoothing;
use crate::error::Result;
use crate::model::NGram;

/// Maximum likelihood estimates: `count / parent count`, nothing for unseen
/// sequences.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSmoothing;

impl SimpleSmoothing for NoSmoothing {
	fn set_probabilities(&self, model: &mut NGram, level: usize) -> Result<()> {
		model.set_probability_with_pseudo_count(0.0, level);
		Ok(())
	}
}

/// [`NoSmoothing`] after folding every symbol outside a fixed dictionary into
/// the `unknown` aggregates.
#[derive(Debug, Clone, Default)]
pub struct NoSmoothingWithDictionary {
	dictionary: HashSet<String>,
}

impl NoSmoothingWithDictionary {
	pub fn new(dictionary: HashSet<String>) -> Self {
		Self { dictionary }
	}

	pub fn dictionary(&self) -> &HashSet<String> {
		&self.dictionary
	}
}

impl SimpleSmoothing for NoSmoothingWithDictionary {
	fn set_probabilities(&self, model: &mut NGram, level: usize) -> Result<()> {
		model.replace_unknown_words(&self.dictionary);
		NoSmoothing.set_probabilities(model, level)
	}
}

/// [`NoSmoothing`] after folding the rare symbols of the smoothed level into
/// the `unknown` aggregates.
///
/// A symbol is rare when its share of the level's occurrences is not above
/// `probability`.
#[derive(Debug, Clone, Copy)]
pub struct NoSmoothingWithNonRareWords {
	probability: f64,
}

impl NoSmoothingWithNonRareWords {
	pub fn new(probability: f64) -> Self {
		Self { probability }
	}
}

impl SimpleSmoothing for NoSmoothingWithNonRareWords {
	fn set_probabilities(&self, model: &mut NGram, level: usize) -> Result<()> {
		let dictionary = model.construct_dictionary_with_non_rare_words(level, self.probability);
		model.replace_unknown_words(&dictionary);
		NoSmoothing.set_probabilities(model, level)
	}
}
