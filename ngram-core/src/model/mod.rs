//! N-gram model and its prefix tree.
//!
//! - `NGram`: the model (counts, vocabulary, unseen fallbacks, lambdas)
//! - `NGramNode`: a node of the prefix tree
//! - `SymbolCounter`: insertion-ordered symbol counts
//! - Text and binary persistence of `NGram`

/// The n-gram model: construction, queries, smoothing hooks and generation.
pub mod ngram;

/// Prefix tree node holding counts and probabilities.
pub mod node;

/// Symbol occurrence counter used to build dictionaries.
pub mod counter;

/// Text format reading/writing, single or multi-part.
mod text_format;

/// Binary snapshots (`postcard`) and build-or-load caching.
mod snapshot;

pub use counter::SymbolCounter;
pub use ngram::NGram;
pub use node::NGramNode;
