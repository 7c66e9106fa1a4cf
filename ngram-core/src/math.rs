//! Minimal 2x2 linear algebra used by the Good-Turing regression.

use crate::error::{NGramError, Result};

/// A 2-component vector.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vector2 {
	values: [f64; 2],
}

impl Vector2 {
	/// Creates a zero vector.
	pub fn zeros() -> Self {
		Self::default()
	}

	pub fn new(x: f64, y: f64) -> Self {
		Self { values: [x, y] }
	}

	/// Adds `value` to the component at `index`.
	pub fn add_value(&mut self, index: usize, value: f64) {
		self.values[index] += value;
	}

	pub fn value(&self, index: usize) -> f64 {
		self.values[index]
	}
}

/// A 2x2 matrix supporting element accumulation, in-place inversion and
/// right multiplication by a [`Vector2`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Matrix2 {
	values: [[f64; 2]; 2],
}

impl Matrix2 {
	/// Creates a zero matrix.
	pub fn zeros() -> Self {
		Self::default()
	}

	/// Adds `value` to the element at (`row`, `column`).
	pub fn add_value(&mut self, row: usize, column: usize, value: f64) {
		self.values[row][column] += value;
	}

	pub fn value(&self, row: usize, column: usize) -> f64 {
		self.values[row][column]
	}

	pub fn determinant(&self) -> f64 {
		let [[a, b], [c, d]] = self.values;
		a * d - b * c
	}

	/// Inverts the matrix in place.
	///
	/// # Errors
	/// Returns `SingularMatrix` if the determinant is zero or not finite.
	pub fn inverse(&mut self) -> Result<()> {
		let determinant = self.determinant();
		if determinant == 0.0 || !determinant.is_finite() {
			return Err(NGramError::SingularMatrix { determinant });
		}
		let [[a, b], [c, d]] = self.values;
		self.values = [
			[d / determinant, -b / determinant],
			[-c / determinant, a / determinant],
		];
		Ok(())
	}

	/// Computes `self * vector`.
	pub fn multiply_with_vector_from_right(&self, vector: &Vector2) -> Vector2 {
		let [[a, b], [c, d]] = self.values;
		Vector2::new(
			a * vector.value(0) + b * vector.value(1),
			c * vector.value(0) + d * vector.value(1),
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use approx::assert_abs_diff_eq;

	#[test]
	fn solves_two_by_two_system() {
		// x + 2y = 5, 3x + 4y = 11 -> x = 1, y = 2
		let mut a = Matrix2::zeros();
		a.add_value(0, 0, 1.0);
		a.add_value(0, 1, 2.0);
		a.add_value(1, 0, 3.0);
		a.add_value(1, 1, 4.0);
		let b = Vector2::new(5.0, 11.0);
		a.inverse().unwrap();
		let x = a.multiply_with_vector_from_right(&b);
		assert_abs_diff_eq!(x.value(0), 1.0, epsilon = 1e-12);
		assert_abs_diff_eq!(x.value(1), 2.0, epsilon = 1e-12);
	}

	#[test]
	fn singular_matrix_is_reported() {
		let mut a = Matrix2::zeros();
		let xt = 3.0_f64.ln();
		a.add_value(0, 0, 1.0);
		a.add_value(0, 1, xt);
		a.add_value(1, 0, xt);
		a.add_value(1, 1, xt * xt);
		assert!(matches!(a.inverse(), Err(NGramError::SingularMatrix { .. })));
	}
}
