use log::debug;

use super::SimpleSmoothing;
use crate::error::{NGramError, Result};
use crate::math::{Matrix2, Vector2};
use crate::model::NGram;

/// Good-Turing discounting with log-linear smoothing of the counts of counts.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoodTuringSmoothing;

impl GoodTuringSmoothing {
	/// Estimates the smoothed counts of counts `N*` from the raw ones.
	///
	/// Only the non-zero entries `(r, N_r)` take part. Each is averaged over
	/// the gap to its neighbours, `Z_r = 2 N_r / (r_next - r_prev)` (the first
	/// keeps `N_r`, the last uses `N_r / (r - r_prev)`), then
	/// `ln Z_r = w1 ln r + w0` is fitted by least squares and
	/// `N*[r] = exp(w1 ln r + w0)` for `r >= 1`.
	///
	/// # Errors
	/// `SingularMatrix` when fewer than two distinct counts are present.
	pub fn linear_regression_on_counts_of_counts(counts_of_counts: &[usize]) -> Result<Vec<f64>> {
		let observed: Vec<(f64, f64)> = counts_of_counts
			.iter()
			.enumerate()
			.skip(1)
			.filter(|(_, count)| **count != 0)
			.map(|(r, count)| (r as f64, *count as f64))
			.collect();

		let mut a = Matrix2::zeros();
		let mut y = Vector2::zeros();
		for (i, &(r, c)) in observed.iter().enumerate() {
			let xt = r.ln();
			let rt = if i == 0 {
				c.ln()
			} else if i == observed.len() - 1 {
				(c / (r - observed[i - 1].0)).ln()
			} else {
				(2.0 * c / (observed[i + 1].0 - observed[i - 1].0)).ln()
			};
			a.add_value(0, 0, 1.0);
			a.add_value(0, 1, xt);
			a.add_value(1, 0, xt);
			a.add_value(1, 1, xt * xt);
			y.add_value(0, rt);
			y.add_value(1, rt * xt);
		}
		a.inverse()?;
		let w = a.multiply_with_vector_from_right(&y);
		let (w0, w1) = (w.value(0), w.value(1));
		debug!("Good-Turing regression: w0 = {w0}, w1 = {w1}");

		let mut n_star = vec![0.0; counts_of_counts.len()];
		for (r, estimate) in n_star.iter_mut().enumerate().skip(1) {
			*estimate = ((r as f64).ln() * w1 + w0).exp();
		}
		Ok(n_star)
	}
}

impl SimpleSmoothing for GoodTuringSmoothing {
	/// Sets Good-Turing probabilities; `N*[1] / sum(r * N_r)` is reserved for
	/// unseen sequences.
	fn set_probabilities(&self, model: &mut NGram, level: usize) -> Result<()> {
		if level == 0 || level > model.n() {
			return Err(NGramError::InvalidArgument(format!(
				"level {level} outside 1..={}",
				model.n()
			)));
		}
		let counts_of_counts = model.calculate_counts_of_counts(level);
		let n_star = Self::linear_regression_on_counts_of_counts(&counts_of_counts)?;
		let total: f64 = counts_of_counts
			.iter()
			.enumerate()
			.skip(1)
			.map(|(r, count)| (r * count) as f64)
			.sum();
		model.set_adjusted_probability(&n_star, level, n_star[1] / total);
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use approx::assert_abs_diff_eq;
	use std::collections::HashSet;

	#[test]
	fn regression_fits_power_law() {
		// N_r = 8 / r^2 at r = 1, 2 reconstructs exactly through both points
		let n_star = GoodTuringSmoothing::linear_regression_on_counts_of_counts(&[0, 8, 2]).unwrap();
		assert_eq!(n_star[0], 0.0);
		// Z_1 = 8, Z_2 = 2 / (2 - 1) = 2
		assert_abs_diff_eq!(n_star[1], 8.0, epsilon = 1e-9);
		assert_abs_diff_eq!(n_star[2], 2.0, epsilon = 1e-9);
	}

	#[test]
	fn single_distinct_count_is_singular() {
		let result = GoodTuringSmoothing::linear_regression_on_counts_of_counts(&[0, 0, 5, 0]);
		assert!(matches!(result, Err(NGramError::SingularMatrix { .. })));
	}

	#[test]
	fn observed_mass_is_one_minus_unseen_mass() {
		let corpus: Vec<crate::Sentence> = ["a b a c a b d", "e a b c c"]
			.iter()
			.map(|line| line.split_whitespace().map(str::to_owned).collect())
			.collect();
		let mut model = NGram::from_corpus(1, &corpus).unwrap();
		GoodTuringSmoothing.set_probabilities_general(&mut model).unwrap();

		let counts_of_counts = model.calculate_counts_of_counts(1);
		let n_star = GoodTuringSmoothing::linear_regression_on_counts_of_counts(&counts_of_counts).unwrap();
		let total: f64 = counts_of_counts.iter().enumerate().map(|(r, c)| (r * c) as f64).sum();
		let p_zero = n_star[1] / total;
		let seen: f64 = model.root().children().map(|(_, child)| child.probability()).sum();
		assert_abs_diff_eq!(seen, 1.0 - p_zero, epsilon = 1e-12);
	}

	#[test]
	fn unknown_aggregate_shares_the_observed_mass() {
		let corpus: Vec<crate::Sentence> = ["a b a c a b d", "e a b c c"]
			.iter()
			.map(|line| line.split_whitespace().map(str::to_owned).collect())
			.collect();
		let mut model = NGram::from_corpus(1, &corpus).unwrap();
		let dictionary: HashSet<String> = ["a", "b", "c"].iter().map(|symbol| symbol.to_string()).collect();
		model.replace_unknown_words(&dictionary);
		GoodTuringSmoothing.set_probabilities_general(&mut model).unwrap();

		// a: 4, b: 3, c: 3, unknown (d + e): 2
		let counts_of_counts = model.calculate_counts_of_counts(1);
		assert_eq!(counts_of_counts, vec![0, 0, 1, 2, 1, 0]);

		let unknown = model.root().unknown().unwrap();
		assert!(unknown.probability() > 0.0);
		assert_eq!(model.get_probability(&["d"]), unknown.probability());

		let n_star = GoodTuringSmoothing::linear_regression_on_counts_of_counts(&counts_of_counts).unwrap();
		let p_zero = n_star[1] / 12.0;
		let seen: f64 = model.root().children().map(|(_, child)| child.probability()).sum::<f64>() + unknown.probability();
		assert_abs_diff_eq!(seen, 1.0 - p_zero, epsilon = 1e-12);
	}
}
