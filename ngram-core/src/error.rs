//! Error types for the n-gram library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for n-gram construction, smoothing and persistence.
#[derive(Error, Debug)]
pub enum NGramError {
	/// I/O error with file context
	#[error("I/O error for {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	/// A line was requested past the last line of the last file
	#[error("End of input reached after {files} file(s)")]
	EndOfInput { files: usize },

	/// A field of a persisted model could not be parsed
	#[error("Parse error on line {line}: {message}")]
	Parse { line: usize, message: String },

	/// A record of a persisted model has the wrong shape
	#[error("Format error: {0}")]
	Format(String),

	/// `ln(p)` is undefined for a window probability during perplexity
	#[error("Probability {probability} of {window:?} is outside the domain of the logarithm")]
	ProbabilityDomain { probability: f64, window: Vec<String> },

	/// Perplexity was requested over a corpus without a single window
	#[error("Corpus has no window of the model order")]
	EmptyCorpus,

	/// The Good-Turing normal equations have no unique solution
	#[error("Singular matrix (determinant {determinant})")]
	SingularMatrix { determinant: f64 },

	/// The bracket search hit its round cap before the perplexity settled
	#[error(
		"Search did not converge after {rounds} rounds (best value {best_value}, perplexity {best_perplexity})"
	)]
	SearchDidNotConverge {
		rounds: usize,
		best_value: f64,
		best_perplexity: f64,
	},

	/// Invalid argument passed to a constructor
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),

	/// Binary snapshot encoding/decoding error
	#[error("Snapshot error: {0}")]
	Snapshot(#[from] postcard::Error),
}

impl NGramError {
	/// Wraps an `io::Error` with the path it happened on.
	pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
		Self::Io {
			path: path.into(),
			source,
		}
	}
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, NGramError>;
