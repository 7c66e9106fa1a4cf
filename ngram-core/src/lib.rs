//! N-gram language models over symbol sequences.
//!
//! This crate provides:
//! - A prefix-tree n-gram model (`NGram`) with counts for every order up to N
//! - Smoothing strategies, from plain maximum likelihood to cross-validated
//!   additive and interpolated smoothing
//! - Perplexity evaluation and sampling
//! - Text (single or multi-part) and binary persistence

/// N-gram model, tree nodes and persistence.
pub mod model;

/// Smoothing strategies and the parameter search they share.
pub mod smoothing;

/// I/O utilities (corpus loading, multi-part line reading, path helpers).
pub mod io;

/// Error type of the crate.
pub mod error;

/// Parameter search settings.
pub mod config;

/// 2x2 linear algebra for the Good-Turing regression.
pub mod math;

/// K-fold cross validation.
pub mod sampling;

/// A sentence: an ordered sequence of symbols.
pub type Sentence = Vec<String>;

/// A corpus: an ordered list of sentences.
pub type Corpus = Vec<Sentence>;

pub use config::SearchConfig;
pub use error::{NGramError, Result};
pub use model::{NGram, NGramNode};
pub use smoothing::{
	AdditiveSmoothing, GoodTuringSmoothing, InterpolatedSmoothing, LaplaceSmoothing, NoSmoothing,
	NoSmoothingWithDictionary, NoSmoothingWithNonRareWords, SimpleSmoothing, TrainedSmoothing,
};
