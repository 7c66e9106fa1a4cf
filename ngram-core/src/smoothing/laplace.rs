use super::SimpleSmoothing;
use crate::error::Result;
use crate::model::NGram;

/// Add-`delta` smoothing with a fixed pseudo-count (add-one by default).
#[derive(Debug, Clone, Copy)]
pub struct LaplaceSmoothing {
	delta: f64,
}

impl LaplaceSmoothing {
	pub fn new(delta: f64) -> Self {
		Self { delta }
	}

	pub fn delta(&self) -> f64 {
		self.delta
	}
}

impl Default for LaplaceSmoothing {
	fn default() -> Self {
		Self { delta: 1.0 }
	}
}

impl SimpleSmoothing for LaplaceSmoothing {
	fn set_probabilities(&self, model: &mut NGram, level: usize) -> Result<()> {
		model.set_probability_with_pseudo_count(self.delta, level);
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::Sentence;
	use approx::assert_abs_diff_eq;

	#[test]
	fn seen_and_unseen_mass_sum_to_one() {
		let corpus: Vec<Sentence> = ["x y z y", "y z x x"]
			.iter()
			.map(|line| line.split_whitespace().map(str::to_owned).collect())
			.collect();
		let mut model = NGram::from_corpus(2, &corpus).unwrap();
		LaplaceSmoothing::new(0.5).set_probabilities_general(&mut model).unwrap();

		// one slot reserved for symbols outside the vocabulary
		let effective_vocabulary = model.vocabulary_size() + 1;
		for (_, context) in model.root().children() {
			let seen: f64 = context.children().map(|(_, child)| child.probability()).sum();
			let unseen = (effective_vocabulary - context.size()) as f64 * context.probability_of_unseen();
			assert_abs_diff_eq!(seen + unseen, 1.0, epsilon = 1e-9);
		}
		assert_abs_diff_eq!(model.probability_of_unseen()[1], 1.0 / 4.0);
	}
}
