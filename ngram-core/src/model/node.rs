use std::collections::{BTreeMap, HashSet};
use std::io::{self, Write};

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::counter::SymbolCounter;
use crate::error::{NGramError, Result};
use crate::io::{parse_field, LineSource};

/// A node of the n-gram prefix tree.
///
/// A node at depth `d` (the root being depth 0) stands for one symbol sequence
/// of length `d`: the symbols on the path from the root. The node's own symbol
/// is the key under which its parent stores it, so the root has none.
///
/// # Responsibilities
/// - Accumulate occurrence counts while sentences are ingested
/// - Hold the smoothed probability of its sequence and the probability mass
///   its parent reserves for unseen continuations
/// - Aggregate out-of-dictionary children under a single `unknown` node
///
/// # Invariants
/// - Children keys are unique and iterated in lexicographic order
/// - Until pruning or unknown-word replacement, a non-root node's `count`
///   equals the sum of its children's counts (for inner levels)
/// - Ownership is a tree: `unknown` owns the subtrees it absorbed
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct NGramNode {
	/// Occurrences of the sequence ending at this node.
	count: usize,
	/// Smoothed probability, `0.0` until a smoothing sets it.
	probability: f64,
	/// Mass reserved for continuations not present among `children`.
	probability_of_unseen: f64,
	children: BTreeMap<String, NGramNode>,
	/// Aggregate of the children outside the last replacement dictionary.
	unknown: Option<Box<NGramNode>>,
}

impl NGramNode {
	/// Creates an empty node.
	pub fn new() -> Self {
		Self::default()
	}

	pub fn count(&self) -> usize {
		self.count
	}

	pub fn probability(&self) -> f64 {
		self.probability
	}

	pub fn probability_of_unseen(&self) -> f64 {
		self.probability_of_unseen
	}

	/// Number of children (the `unknown` aggregate excluded).
	pub fn size(&self) -> usize {
		self.children.len()
	}

	pub fn child(&self, symbol: &str) -> Option<&NGramNode> {
		self.children.get(symbol)
	}

	pub fn children(&self) -> impl Iterator<Item = (&str, &NGramNode)> {
		self.children.iter().map(|(symbol, child)| (symbol.as_str(), child))
	}

	pub fn unknown(&self) -> Option<&NGramNode> {
		self.unknown.as_deref()
	}

	/// Adds the n-gram `symbols[index..index + height]` below this node.
	///
	/// Exactly one child is found or created per level and its count is
	/// increased by `repeat`. Does nothing when `height == 0`.
	pub fn add_sequence<S: AsRef<str>>(&mut self, symbols: &[S], index: usize, height: usize, repeat: usize) {
		if height == 0 {
			return;
		}
		let child = self.children.entry(symbols[index].as_ref().to_owned()).or_default();
		child.count += repeat;
		child.add_sequence(symbols, index + 1, height - 1, repeat);
	}

	/// Single-occurrence variant of [`NGramNode::add_sequence`].
	pub fn add_ngram<S: AsRef<str>>(&mut self, symbols: &[S], index: usize, height: usize) {
		self.add_sequence(symbols, index, height, 1);
	}

	/// Maximum count among the descendants exactly `height` levels below,
	/// `unknown` aggregates included.
	///
	/// `height == 0` returns this node's own count.
	pub fn max_occurrence(&self, height: usize) -> usize {
		if height == 0 {
			return self.count;
		}
		self.children
			.values()
			.chain(self.unknown.as_deref())
			.map(|child| child.max_occurrence(height - 1))
			.max()
			.unwrap_or(0)
	}

	/// Sum of the children's counts, `unknown` included.
	pub fn child_sum(&self) -> usize {
		let known: usize = self.children.values().map(|child| child.count).sum();
		known + self.unknown.as_ref().map_or(0, |unknown| unknown.count)
	}

	/// Increments `counts_of_counts[c]` for every descendant `height` levels
	/// below (`unknown` aggregates included) whose count is `c`.
	///
	/// The table must hold at least `max_occurrence(height) + 1` entries.
	pub fn update_counts_of_counts(&self, counts_of_counts: &mut [usize], height: usize) {
		if height == 0 {
			counts_of_counts[self.count] += 1;
		} else {
			for child in self.children.values().chain(self.unknown.as_deref()) {
				child.update_counts_of_counts(counts_of_counts, height - 1);
			}
		}
	}

	/// Sets additive (pseudo-count) probabilities on the level `height` below.
	///
	/// At the parents of that level, each child gets
	/// `(count + pseudo_count) / (child_sum + pseudo_count * vocabulary_size)`
	/// and the parent keeps `pseudo_count / denominator` as its unseen mass.
	pub fn set_probability_with_pseudo_count(&mut self, pseudo_count: f64, height: usize, vocabulary_size: f64) {
		if height == 1 {
			let total = self.child_sum() as f64 + pseudo_count * vocabulary_size;
			if total == 0.0 {
				self.probability_of_unseen = 0.0;
				return;
			}
			for child in self.children.values_mut() {
				child.probability = (child.count as f64 + pseudo_count) / total;
			}
			if let Some(unknown) = self.unknown.as_mut() {
				unknown.probability = (unknown.count as f64 + pseudo_count) / total;
			}
			self.probability_of_unseen = pseudo_count / total;
		} else {
			for child in self.children.values_mut() {
				child.set_probability_with_pseudo_count(pseudo_count, height - 1, vocabulary_size);
			}
			if let Some(unknown) = self.unknown.as_mut() {
				unknown.set_probability_with_pseudo_count(pseudo_count, height - 1, vocabulary_size);
			}
		}
	}

	/// Sets Good-Turing discounted probabilities on the level `height` below.
	///
	/// A raw count `r <= 5` is replaced by `(r + 1) * n_star[r + 1] / n_star[r]`,
	/// larger counts are kept. The values of the children and of the `unknown`
	/// aggregate are normalized to `1 - p_zero` and the parent spreads `p_zero`
	/// over the symbols it has not seen.
	pub fn set_adjusted_probability(&mut self, n_star: &[f64], height: usize, vocabulary_size: f64, p_zero: f64) {
		if height == 1 {
			let adjusted = |r: usize| -> f64 {
				if r <= 5 {
					let next = n_star.get(r + 1).copied().unwrap_or(0.0);
					let current = n_star.get(r).copied().unwrap_or(0.0);
					(r + 1) as f64 * next / current
				} else {
					r as f64
				}
			};
			let total: f64 = self
				.children
				.values()
				.chain(self.unknown.as_deref())
				.map(|child| adjusted(child.count))
				.sum();
			for child in self.children.values_mut().chain(self.unknown.as_deref_mut()) {
				child.probability = (1.0 - p_zero) * (adjusted(child.count) / total);
			}
			self.probability_of_unseen = p_zero / (vocabulary_size - self.children.len() as f64);
		} else {
			for child in self.children.values_mut() {
				child.set_adjusted_probability(n_star, height - 1, vocabulary_size, p_zero);
			}
			if let Some(unknown) = self.unknown.as_mut() {
				unknown.set_adjusted_probability(n_star, height - 1, vocabulary_size, p_zero);
			}
		}
	}

	/// Probability of `w1` as a child of this node.
	///
	/// Falls back to the `unknown` aggregate, then to this node's unseen mass.
	pub fn get_unigram_probability(&self, w1: &str) -> f64 {
		match self.children.get(w1) {
			Some(child) => child.probability,
			None => match &self.unknown {
				Some(unknown) => unknown.probability,
				None => self.probability_of_unseen,
			},
		}
	}

	/// Probability of `w2` after `w1`, or `None` when `w1` is neither a child
	/// nor covered by an `unknown` aggregate.
	pub fn get_bigram_probability(&self, w1: &str, w2: &str) -> Option<f64> {
		match self.children.get(w1) {
			Some(child) => Some(child.get_unigram_probability(w2)),
			None => self.unknown.as_ref().map(|unknown| unknown.get_unigram_probability(w2)),
		}
	}

	/// Probability of `w3` after `w1 w2`, or `None` when a hop is missing.
	pub fn get_trigram_probability(&self, w1: &str, w2: &str, w3: &str) -> Option<f64> {
		match self.children.get(w1) {
			Some(child) => child.get_bigram_probability(w2, w3),
			None => self.unknown.as_ref()?.get_bigram_probability(w2, w3),
		}
	}

	/// Pushes `(symbol, count)` of every descendant `height` levels below
	/// (`height >= 1`) into `counter`.
	pub fn count_words(&self, counter: &mut SymbolCounter, height: usize) {
		for (symbol, child) in &self.children {
			if height <= 1 {
				counter.put_n_times(symbol, child.count);
			} else {
				child.count_words(counter, height - 1);
			}
		}
	}

	/// Moves every child whose symbol is outside `dictionary` under the
	/// `unknown` aggregate, merging their subtrees, then recurses.
	pub fn replace_unknown_words(&mut self, dictionary: &HashSet<String>) {
		let unknown_symbols: Vec<String> = self
			.children
			.keys()
			.filter(|symbol| !dictionary.contains(*symbol))
			.cloned()
			.collect();
		if !unknown_symbols.is_empty() {
			let aggregate = self.unknown.get_or_insert_with(Box::default);
			for symbol in unknown_symbols {
				if let Some(child) = self.children.remove(&symbol) {
					aggregate.absorb(child);
				}
			}
			// merged grandchildren may be out of the dictionary too
			aggregate.replace_unknown_words(dictionary);
		}
		for child in self.children.values_mut() {
			child.replace_unknown_words(dictionary);
		}
	}

	/// Takes ownership of `other`, summing counts of matching symbols.
	fn absorb(&mut self, other: NGramNode) {
		self.count += other.count;
		for (symbol, child) in other.children {
			match self.children.get_mut(&symbol) {
				Some(existing) => existing.absorb(child),
				None => {
					self.children.insert(symbol, child);
				}
			}
		}
		if let Some(unknown) = other.unknown {
			match self.unknown.as_mut() {
				Some(existing) => existing.absorb(*unknown),
				None => self.unknown = Some(unknown),
			}
		}
	}

	/// Merges a copy of `other` into this node.
	///
	/// Counts of matching symbols are summed, disjoint subtrees are grafted.
	pub fn merge(&mut self, other: &NGramNode) {
		self.count += other.count;
		for (symbol, child) in &other.children {
			match self.children.get_mut(symbol) {
				Some(existing) => existing.merge(child),
				None => {
					self.children.insert(symbol.clone(), child.clone());
				}
			}
		}
		if let Some(unknown) = &other.unknown {
			match self.unknown.as_mut() {
				Some(existing) => existing.merge(unknown),
				None => self.unknown = Some(unknown.clone()),
			}
		}
	}

	/// Count of `symbols[index..]` below this node, 0 if any hop is missing.
	pub fn get_count_for_sequence<S: AsRef<str>>(&self, symbols: &[S], index: usize) -> usize {
		match symbols.get(index) {
			Some(symbol) => self
				.children
				.get(symbol.as_ref())
				.map_or(0, |child| child.get_count_for_sequence(symbols, index + 1)),
			None => self.count,
		}
	}

	/// Removes, `remaining_depth` levels below, the children whose share of
	/// their parent's count is under `threshold`.
	///
	/// Nodes without occurrences (the root) are left untouched.
	pub fn prune(&mut self, threshold: f64, remaining_depth: usize) {
		if remaining_depth == 0 {
			if self.count == 0 {
				return;
			}
			let parent_count = self.count as f64;
			self.children
				.retain(|_, child| child.count as f64 / parent_count >= threshold);
		} else {
			for child in self.children.values_mut() {
				child.prune(threshold, remaining_depth - 1);
			}
			if let Some(unknown) = self.unknown.as_mut() {
				unknown.prune(threshold, remaining_depth - 1);
			}
		}
	}

	/// Samples the symbol following `context[index..]`.
	///
	/// Walks down the context, then draws `u` in `[0, 1)` and returns the first
	/// child (in key order) whose cumulative probability exceeds `u`.
	///
	/// Returns `None` if the context is not in the tree or if the children's
	/// probabilities do not cover the draw.
	pub fn generate_next<S, R>(&self, context: &[S], index: usize, rng: &mut R) -> Option<&str>
	where
		S: AsRef<str>,
		R: Rng + ?Sized,
	{
		match context.get(index) {
			Some(symbol) => self.children.get(symbol.as_ref())?.generate_next(context, index + 1, rng),
			None => {
				let draw: f64 = rng.random();
				let mut total = 0.0;
				for (symbol, child) in &self.children {
					if draw < child.probability + total {
						return Some(symbol.as_str());
					}
					total += child.probability;
				}
				None
			}
		}
	}

	/// Writes this subtree in the text model format.
	///
	/// Every node but the root writes its symbol line first; children are
	/// indented one tab deeper than their parent.
	pub(crate) fn write_text<W: Write>(&self, symbol: Option<&str>, out: &mut W, level: usize) -> io::Result<()> {
		let indent = "\t".repeat(level);
		if let Some(symbol) = symbol {
			writeln!(out, "{indent}{symbol}")?;
		}
		writeln!(
			out,
			"{indent}{} {:?} {:?} {}",
			self.count,
			self.probability,
			self.probability_of_unseen,
			self.children.len()
		)?;
		for (child_symbol, child) in &self.children {
			child.write_text(Some(child_symbol.as_str()), out, level + 1)?;
		}
		Ok(())
	}

	/// Reads a subtree written by [`NGramNode::write_text`].
	///
	/// Returns the node's symbol (`None` for the root) with the node.
	pub(crate) fn read_text<L: LineSource>(source: &mut L, is_root: bool) -> Result<(Option<String>, Self)> {
		let symbol = if is_root {
			None
		} else {
			Some(source.read_line()?.trim().to_owned())
		};

		let line = source.read_line()?;
		let line_number = source.line_number();
		let items: Vec<&str> = line.split_whitespace().collect();
		if items.len() != 4 {
			return Err(NGramError::Format(format!(
				"line {line_number}: expected 'count probability unseen children', got {} field(s)",
				items.len()
			)));
		}

		let mut node = Self {
			count: parse_field(items[0], line_number, "count")?,
			probability: parse_field(items[1], line_number, "probability")?,
			probability_of_unseen: parse_field(items[2], line_number, "probability of unseen")?,
			..Self::default()
		};
		let number_of_children: usize = parse_field(items[3], line_number, "child count")?;

		for _ in 0..number_of_children {
			let (child_symbol, child) = Self::read_text(source, false)?;
			node.children.insert(child_symbol.unwrap_or_default(), child);
		}
		Ok((symbol, node))
	}
}
