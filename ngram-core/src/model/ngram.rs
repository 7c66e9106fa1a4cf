use std::collections::{BTreeSet, HashSet};
use std::sync::mpsc;
use std::thread;

use log::{debug, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::counter::SymbolCounter;
use super::node::NGramNode;
use crate::error::{NGramError, Result};
use crate::smoothing::{SimpleSmoothing, TrainedSmoothing};
use crate::Sentence;

/// Represents an n-gram language model over sequences of symbols.
///
/// The `NGram` stores every sequence of length `n` seen in the training
/// sentences in a prefix tree, so the counts of all the shorter prefixes are
/// available as well. A smoothing strategy then turns the counts into
/// probabilities.
///
/// # Responsibilities
/// - Build the tree and the vocabulary from sentences
/// - Answer count, probability and perplexity queries
/// - Hold the per-level fallback probabilities and the interpolation weights
/// - Merge with another model of the same order `n`
///
/// # Invariants
/// - `n` is always >= 1
/// - `probability_of_unseen.len() == n`
/// - Probabilities are meaningful only once a smoothing has been applied
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct NGram {
	/// The order of the model (number of symbols in the n-gram)
	n: usize,
	lambda1: f64,
	lambda2: f64,
	/// Whether probabilities blend the levels with `lambda1` / `lambda2`
	interpolated: bool,
	/// Fallback probability of a totally unseen sequence, per level
	probability_of_unseen: Vec<f64>,
	vocabulary: BTreeSet<String>,
	root: NGramNode,
}

impl NGram {
	/// Creates a new empty n-gram model of order `n`.
	///
	/// # Errors
	/// Returns an error if `n < 1`.
	pub fn new(n: usize) -> Result<Self> {
		if n < 1 {
			return Err(NGramError::InvalidArgument("n must be >= 1".to_owned()));
		}
		Ok(Self::empty(n))
	}

	fn empty(n: usize) -> Self {
		Self {
			n,
			lambda1: 0.0,
			lambda2: 0.0,
			interpolated: false,
			probability_of_unseen: vec![0.0; n],
			vocabulary: BTreeSet::new(),
			root: NGramNode::new(),
		}
	}

	/// Creates a model of order `n` and adds every sentence of `corpus`.
	pub fn from_corpus(n: usize, corpus: &[Sentence]) -> Result<Self> {
		let mut model = Self::new(n)?;
		for sentence in corpus {
			model.add_sentence(sentence);
		}
		Ok(model)
	}

	/// Builds the same model as [`NGram::from_corpus`] on several threads.
	///
	/// The corpus is split into chunks (CPU cores * factor), each chunk is
	/// turned into a partial model on its own thread, and the partial models
	/// are merged as they arrive.
	pub fn from_corpus_parallel(n: usize, corpus: &[Sentence]) -> Result<Self> {
		let mut final_model = Self::new(n)?;
		if corpus.is_empty() {
			return Ok(final_model);
		}

		let cpus = num_cpus::get();
		let factor = 8;
		let chunks = cpus * factor;
		let chunk_size = corpus.len().div_ceil(chunks);

		let (tx, rx) = mpsc::channel();
		thread::scope(|scope| {
			for chunk in corpus.chunks(chunk_size) {
				let tx = tx.clone();
				scope.spawn(move || {
					let mut partial_model = Self::empty(n);
					for sentence in chunk {
						partial_model.add_sentence(sentence);
					}
					// the receiver outlives the scope
					let _ = tx.send(partial_model);
				});
			}
		});
		drop(tx);

		for partial_model in rx.iter() {
			final_model.merge(&partial_model);
		}
		debug!(
			"built {}-gram model from {} sentences in {} chunks",
			n,
			corpus.len(),
			corpus.len().div_ceil(chunk_size)
		);
		Ok(final_model)
	}

	/// Rebuilds a model from its persisted parts.
	///
	/// Interpolation is considered active when a model of order 2 or 3 carries
	/// a non-zero lambda.
	pub(super) fn from_parts(
		n: usize,
		lambda1: f64,
		lambda2: f64,
		probability_of_unseen: Vec<f64>,
		vocabulary: BTreeSet<String>,
		root: NGramNode,
	) -> Self {
		Self {
			n,
			lambda1,
			lambda2,
			interpolated: (n == 2 || n == 3) && (lambda1 != 0.0 || lambda2 != 0.0),
			probability_of_unseen,
			vocabulary,
			root,
		}
	}

	pub fn n(&self) -> usize {
		self.n
	}

	pub fn lambda1(&self) -> f64 {
		self.lambda1
	}

	pub fn lambda2(&self) -> f64 {
		self.lambda2
	}

	pub fn is_interpolated(&self) -> bool {
		self.interpolated
	}

	/// Fallback probabilities of unseen sequences, index `level - 1`.
	pub fn probability_of_unseen(&self) -> &[f64] {
		&self.probability_of_unseen
	}

	pub fn vocabulary(&self) -> &BTreeSet<String> {
		&self.vocabulary
	}

	pub fn vocabulary_size(&self) -> usize {
		self.vocabulary.len()
	}

	pub fn root(&self) -> &NGramNode {
		&self.root
	}

	/// Adds a sentence once. See [`NGram::add_sentence_repeated`].
	pub fn add_sentence<S: AsRef<str>>(&mut self, symbols: &[S]) {
		self.add_sentence_repeated(symbols, 1);
	}

	/// Adds a sentence as if it had been seen `repeat` times.
	///
	/// Every symbol joins the vocabulary and every window of `n` symbols is
	/// counted. Sentences shorter than `n` only extend the vocabulary.
	pub fn add_sentence_repeated<S: AsRef<str>>(&mut self, symbols: &[S], repeat: usize) {
		for symbol in symbols {
			if !self.vocabulary.contains(symbol.as_ref()) {
				self.vocabulary.insert(symbol.as_ref().to_owned());
			}
		}
		if symbols.len() < self.n {
			return;
		}
		for start in 0..=symbols.len() - self.n {
			self.root.add_sequence(symbols, start, self.n, repeat);
		}
	}

	/// Adds `symbols` as a single n-gram (no sliding window).
	pub fn add_ngram<S: AsRef<str>>(&mut self, symbols: &[S]) {
		for symbol in symbols {
			if !self.vocabulary.contains(symbol.as_ref()) {
				self.vocabulary.insert(symbol.as_ref().to_owned());
			}
		}
		self.root.add_ngram(symbols, 0, self.n.min(symbols.len()));
	}

	/// Merges another n-gram model into this one.
	///
	/// # Notes
	/// - Both models must have the same order `n`, otherwise nothing happens.
	/// - Occurrence counts of matching sequences are summed.
	pub fn merge(&mut self, other: &Self) {
		if self.n != other.n {
			warn!("ignoring merge of a {}-gram model into a {}-gram model", other.n, self.n);
			return;
		}
		self.vocabulary.extend(other.vocabulary.iter().cloned());
		self.root.merge(&other.root);
	}

	/// Number of occurrences of `symbols` (length <= `n`) in the training data.
	pub fn get_count<S: AsRef<str>>(&self, symbols: &[S]) -> usize {
		self.root.get_count_for_sequence(symbols, 0)
	}

	fn get_unigram_probability(&self, w1: &str) -> f64 {
		self.root.get_unigram_probability(w1)
	}

	fn get_bigram_probability(&self, w1: &str, w2: &str) -> f64 {
		self.root
			.get_bigram_probability(w1, w2)
			.unwrap_or(self.probability_of_unseen[1])
	}

	fn get_trigram_probability(&self, w1: &str, w2: &str, w3: &str) -> f64 {
		self.root
			.get_trigram_probability(w1, w2, w3)
			.unwrap_or(self.probability_of_unseen[2])
	}

	/// Probability of the last symbol of `symbols` given the ones before it.
	///
	/// - 1 symbol: unigram probability
	/// - 2 symbols: bigram probability, interpolated with the unigram one for
	///   an interpolated bigram model
	/// - 3 symbols: trigram probability, interpolated with the bigram and
	///   unigram ones for an interpolated trigram model
	///
	/// # Notes
	/// Returns `0.0` when the number of symbols is not 1, 2 or 3, exceeds `n`,
	/// or when `n > 3`.
	pub fn get_probability<S: AsRef<str>>(&self, symbols: &[S]) -> f64 {
		match (self.n, symbols.len()) {
			(1..=3, 1) => self.get_unigram_probability(symbols[0].as_ref()),
			(2, 2) => {
				let (w1, w2) = (symbols[0].as_ref(), symbols[1].as_ref());
				if self.interpolated {
					self.lambda1 * self.get_bigram_probability(w1, w2)
						+ (1.0 - self.lambda1) * self.get_unigram_probability(w2)
				} else {
					self.get_bigram_probability(w1, w2)
				}
			}
			(3, 2) => self.get_bigram_probability(symbols[0].as_ref(), symbols[1].as_ref()),
			(3, 3) => {
				let (w1, w2, w3) = (symbols[0].as_ref(), symbols[1].as_ref(), symbols[2].as_ref());
				if self.interpolated {
					self.lambda1 * self.get_trigram_probability(w1, w2, w3)
						+ self.lambda2 * self.get_bigram_probability(w2, w3)
						+ (1.0 - self.lambda1 - self.lambda2) * self.get_unigram_probability(w3)
				} else {
					self.get_trigram_probability(w1, w2, w3)
				}
			}
			_ => 0.0,
		}
	}

	/// Perplexity of `corpus`: `exp` of the mean negative log probability of
	/// every window of `n` symbols.
	///
	/// Returns `Ok(0.0)` for `n > 3`.
	///
	/// # Errors
	/// - `ProbabilityDomain` if a window has a probability `<= 0` (typically an
	///   unseen window under no smoothing)
	/// - `EmptyCorpus` if no sentence holds a full window
	pub fn get_perplexity(&self, corpus: &[Sentence]) -> Result<f64> {
		if self.n > 3 {
			return Ok(0.0);
		}
		let mut total = 0.0;
		let mut count = 0usize;
		for sentence in corpus {
			for window in sentence.windows(self.n) {
				let probability = self.get_probability(window);
				if probability <= 0.0 || probability.is_nan() {
					return Err(NGramError::ProbabilityDomain {
						probability,
						window: window.to_vec(),
					});
				}
				total -= probability.ln();
				count += 1;
			}
		}
		if count == 0 {
			return Err(NGramError::EmptyCorpus);
		}
		Ok((total / count as f64).exp())
	}

	fn check_height(&self, height: usize) -> bool {
		if height == 0 || height > self.n {
			warn!("ignoring level {} on a {}-gram model", height, self.n);
			return false;
		}
		true
	}

	/// Sets the probabilities of level `height` by adding `pseudo_count` to
	/// every count.
	///
	/// A non-zero pseudo-count reserves one extra vocabulary slot for unseen
	/// symbols, and `1 / (vocabulary + 1)` becomes the level's fallback.
	pub fn set_probability_with_pseudo_count(&mut self, pseudo_count: f64, height: usize) {
		if !self.check_height(height) {
			return;
		}
		let vocabulary_size = if pseudo_count != 0.0 {
			self.vocabulary_size() + 1
		} else {
			self.vocabulary_size()
		} as f64;
		self.root
			.set_probability_with_pseudo_count(pseudo_count, height, vocabulary_size);
		self.probability_of_unseen[height - 1] = if pseudo_count != 0.0 {
			1.0 / vocabulary_size
		} else {
			0.0
		};
	}

	/// Histogram of the counts of level `height`: entry `r` is the number of
	/// distinct sequences seen exactly `r` times.
	pub fn calculate_counts_of_counts(&self, height: usize) -> Vec<usize> {
		let max_count = self.root.max_occurrence(height);
		let mut counts_of_counts = vec![0; max_count + 2];
		self.root.update_counts_of_counts(&mut counts_of_counts, height);
		counts_of_counts
	}

	/// Sets Good-Turing probabilities of level `height` from the smoothed
	/// counts of counts `n_star` and the unseen mass `p_zero`.
	pub fn set_adjusted_probability(&mut self, n_star: &[f64], height: usize, p_zero: f64) {
		if !self.check_height(height) {
			return;
		}
		let vocabulary_size = (self.vocabulary_size() + 1) as f64;
		self.root
			.set_adjusted_probability(n_star, height, vocabulary_size, p_zero);
		self.probability_of_unseen[height - 1] = 1.0 / vocabulary_size;
	}

	/// Symbols of level `level` whose share of all the level's occurrences is
	/// strictly above `probability`.
	pub fn construct_dictionary_with_non_rare_words(&self, level: usize, probability: f64) -> HashSet<String> {
		let mut word_counter = SymbolCounter::new();
		self.root.count_words(&mut word_counter, level);
		let total = word_counter.sum_of_counts() as f64;
		word_counter
			.iter()
			.filter(|(_, count)| *count as f64 / total > probability)
			.map(|(symbol, _)| symbol.to_owned())
			.collect()
	}

	/// Moves every sequence with a symbol outside `dictionary` under the
	/// `unknown` aggregates of the tree.
	pub fn replace_unknown_words(&mut self, dictionary: &HashSet<String>) {
		self.root.replace_unknown_words(dictionary);
	}

	/// Removes the last-level continuations whose share of their context count
	/// is below `threshold`.
	///
	/// # Notes
	/// - Does nothing unless `0 < threshold <= 1`.
	/// - Probabilities are not recomputed.
	pub fn prune(&mut self, threshold: f64) {
		if threshold > 0.0 && threshold <= 1.0 {
			self.root.prune(threshold, self.n - 1);
		} else {
			warn!("ignoring prune threshold {}", threshold);
		}
	}

	/// Interpolation weight for bigram models:
	/// `lambda1 * P(w2 | w1) + (1 - lambda1) * P(w2)`.
	///
	/// Ignored unless `n == 2`.
	pub fn set_lambda2(&mut self, lambda1: f64) {
		if self.n == 2 {
			self.interpolated = true;
			self.lambda1 = lambda1;
		}
	}

	/// Interpolation weights for trigram models:
	/// `lambda1 * P(w3 | w1 w2) + lambda2 * P(w3 | w2) + (1 - lambda1 - lambda2) * P(w3)`.
	///
	/// Ignored unless `n == 3`.
	pub fn set_lambda3(&mut self, lambda1: f64, lambda2: f64) {
		if self.n == 3 {
			self.interpolated = true;
			self.lambda1 = lambda1;
			self.lambda2 = lambda2;
		}
	}

	/// Applies `smoothing` to the top level of the model.
	pub fn calculate_ngram_probabilities_simple(&mut self, smoothing: &dyn SimpleSmoothing) -> Result<()> {
		smoothing.set_probabilities_general(self)
	}

	/// Applies `smoothing` to level `level` of the model.
	pub fn calculate_ngram_probabilities_simple_level(
		&mut self,
		smoothing: &dyn SimpleSmoothing,
		level: usize,
	) -> Result<()> {
		smoothing.set_probabilities(self, level)
	}

	/// Learns the parameters of `smoothing` on `corpus`, then applies it.
	pub fn calculate_ngram_probabilities_trained(
		&mut self,
		corpus: &[Sentence],
		smoothing: &mut dyn TrainedSmoothing,
	) -> Result<()> {
		smoothing.train(corpus, self)
	}

	/// Samples the symbol following `context` (`n - 1` symbols).
	pub fn generate_next<S, R>(&self, context: &[S], rng: &mut R) -> Option<&str>
	where
		S: AsRef<str>,
		R: Rng + ?Sized,
	{
		self.root.generate_next(context, 0, rng)
	}

	/// Extends `start` by sampling one symbol at a time from the last `n - 1`
	/// symbols.
	///
	/// Stops after `max_len` new symbols, after `end_symbol` is produced, or when
	/// the current context has no continuation.
	pub fn generate_sequence<S, R>(&self, start: &[S], end_symbol: &str, max_len: usize, rng: &mut R) -> Vec<String>
	where
		S: AsRef<str>,
		R: Rng + ?Sized,
	{
		let mut sequence: Vec<String> = start.iter().map(|s| s.as_ref().to_owned()).collect();
		let context_len = self.n - 1;
		for _ in 0..max_len {
			if sequence.len() < context_len {
				break;
			}
			let context = &sequence[sequence.len() - context_len..];
			match self.generate_next(context, rng) {
				Some(symbol) => {
					let symbol = symbol.to_owned();
					let finished = symbol == end_symbol;
					sequence.push(symbol);
					if finished {
						break;
					}
				}
				None => break,
			}
		}
		sequence
	}
}
