use std::path::Path;

use log::info;

use super::ngram::NGram;
use crate::error::{NGramError, Result};
use crate::io::{build_output_path, read_corpus};

impl NGram {
	/// Encodes the model with `postcard`.
	pub fn to_bytes(&self) -> Result<Vec<u8>> {
		Ok(postcard::to_stdvec(self)?)
	}

	/// Decodes a model produced by [`NGram::to_bytes`].
	pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
		Ok(postcard::from_bytes(bytes)?)
	}

	/// Writes the binary snapshot of the model into `path`.
	pub fn save_binary<P: AsRef<Path>>(&self, path: P) -> Result<()> {
		let path = path.as_ref();
		let bytes = self.to_bytes()?;
		std::fs::write(path, bytes).map_err(|err| NGramError::io(path, err))?;
		info!("saved {}-gram snapshot to {}", self.n(), path.display());
		Ok(())
	}

	/// Reads a binary snapshot written by [`NGram::save_binary`].
	pub fn load_binary<P: AsRef<Path>>(path: P) -> Result<Self> {
		let path = path.as_ref();
		let bytes = std::fs::read(path).map_err(|err| NGramError::io(path, err))?;
		let model = Self::from_bytes(&bytes)?;
		info!("loaded {}-gram snapshot from {}", model.n(), path.display());
		Ok(model)
	}

	/// Loads the order-`n` model of a corpus file.
	///
	/// If a snapshot (`corpus.<n>.bin` next to `corpus.txt`) exists, it is
	/// loaded. Otherwise the corpus is read, the model built in parallel and
	/// the snapshot written for the next call.
	///
	/// # Notes
	/// - The model holds counts only, no smoothing is applied.
	/// - A stale snapshot is not detected.
	pub fn load_or_build<P: AsRef<Path>>(corpus_path: P, n: usize) -> Result<Self> {
		let binary_data_path = build_output_path(&corpus_path, &format!("{n}.bin"))?;
		if binary_data_path.exists() {
			return Self::load_binary(&binary_data_path);
		}
		let corpus = read_corpus(&corpus_path)?;
		let model = Self::from_corpus_parallel(n, &corpus)?;
		model.save_binary(&binary_data_path)?;
		Ok(model)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;
	use tempfile::tempdir;

	#[test]
	fn load_or_build_writes_then_reuses_snapshot() {
		let dir = tempdir().unwrap();
		let corpus = dir.path().join("corpus.txt");
		fs::write(&corpus, "<s> a b </s>\n<s> a c </s>\n").unwrap();

		let built = NGram::load_or_build(&corpus, 2).unwrap();
		let snapshot = dir.path().join("corpus.2.bin");
		assert!(snapshot.exists());
		assert_eq!(built.get_count(&["<s>", "a"]), 2);

		// the corpus is no longer read once the snapshot exists
		fs::write(&corpus, "").unwrap();
		let loaded = NGram::load_or_build(&corpus, 2).unwrap();
		assert_eq!(loaded, built);
	}

	#[test]
	fn corrupted_snapshot_is_reported() {
		assert!(matches!(NGram::from_bytes(&[0xff, 0xff, 0xff]), Err(NGramError::Snapshot(_))));
	}
}
