use serde::{Deserialize, Serialize};

/// Settings of the cross-validated parameter search used by the trained
/// smoothing strategies.
///
/// # Invariants
/// - `folds >= 2`
/// - `number_of_parts >= 1`
/// - `max_rounds >= 1`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
	/// Number of cross-validation folds (and fold models).
	pub folds: usize,

	/// Seed of the shuffle performed before partitioning the corpus.
	pub seed: u64,

	/// Number of grid steps between the lower and upper bound of a round.
	pub number_of_parts: usize,

	/// Relative change of the best perplexity under which the search stops.
	pub tolerance: f64,

	/// Maximum number of rounds before giving up.
	pub max_rounds: usize,

	/// Evaluate fold models on scoped threads.
	/// Results are identical either way.
	pub parallel: bool,
}

impl Default for SearchConfig {
	fn default() -> Self {
		Self {
			folds: 10,
			seed: 0,
			number_of_parts: 5,
			tolerance: 0.001,
			max_rounds: 100,
			parallel: true,
		}
	}
}

impl SearchConfig {
	/// Checks the invariants listed on the type.
	pub fn validate(&self) -> Result<(), String> {
		if self.folds < 2 {
			return Err(format!("folds must be >= 2, got {}", self.folds));
		}
		if self.number_of_parts == 0 {
			return Err("number_of_parts must be >= 1".to_owned());
		}
		if self.max_rounds == 0 {
			return Err("max_rounds must be >= 1".to_owned());
		}
		if !(self.tolerance > 0.0) {
			return Err(format!("tolerance must be positive, got {}", self.tolerance));
		}
		Ok(())
	}
}
