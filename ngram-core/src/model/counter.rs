use std::collections::HashMap;

/// Symbol occurrence counter that enumerates symbols in first-insertion order.
#[derive(Debug, Clone, Default)]
pub struct SymbolCounter {
	/// Symbol -> position in `entries`
	index: HashMap<String, usize>,
	entries: Vec<(String, usize)>,
}

impl SymbolCounter {
	pub fn new() -> Self {
		Self::default()
	}

	/// Records `n` more occurrences of `symbol`.
	pub fn put_n_times(&mut self, symbol: &str, n: usize) {
		match self.index.get(symbol) {
			Some(&position) => self.entries[position].1 += n,
			None => {
				self.index.insert(symbol.to_owned(), self.entries.len());
				self.entries.push((symbol.to_owned(), n));
			}
		}
	}

	/// Returns the count of `symbol` (0 if never seen).
	pub fn get(&self, symbol: &str) -> usize {
		self.index.get(symbol).map_or(0, |&position| self.entries[position].1)
	}

	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.entries.iter().map(|(symbol, _)| symbol.as_str())
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
		self.entries.iter().map(|(symbol, count)| (symbol.as_str(), *count))
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Sum of every recorded count.
	pub fn sum_of_counts(&self) -> usize {
		self.entries.iter().map(|(_, count)| count).sum()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn keeps_insertion_order_and_sums() {
		let mut counter = SymbolCounter::new();
		counter.put_n_times("b", 2);
		counter.put_n_times("a", 1);
		counter.put_n_times("b", 3);
		assert_eq!(counter.keys().collect::<Vec<_>>(), vec!["b", "a"]);
		assert_eq!(counter.get("b"), 5);
		assert_eq!(counter.get("zzz"), 0);
		assert_eq!(counter.sum_of_counts(), 6);
	}
}
