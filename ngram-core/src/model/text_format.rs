use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::info;

use super::ngram::NGram;
use super::node::NGramNode;
use crate::error::{NGramError, Result};
use crate::io::{parse_field, LineSource, MultipleFile, TextLines};

impl NGram {
	/// Writes the model in the text format:
	///
	/// ```text
	/// N lambda1 lambda2
	/// unseen_1 unseen_2 ... unseen_N
	/// vocabulary_size
	/// symbol (one per line)
	/// count probability probability_of_unseen child_count   (root)
	/// \tsymbol
	/// \tcount probability probability_of_unseen child_count
	/// ...
	/// ```
	///
	/// The `unknown` aggregates are not written.
	pub fn write_text<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
		writeln!(out, "{} {:?} {:?}", self.n(), self.lambda1(), self.lambda2())?;
		for probability in self.probability_of_unseen() {
			write!(out, "{probability:?} ")?;
		}
		writeln!(out)?;
		writeln!(out, "{}", self.vocabulary_size())?;
		for symbol in self.vocabulary() {
			writeln!(out, "{symbol}")?;
		}
		self.root().write_text(None, out, 0)
	}

	/// Returns the text format of the model as a string.
	pub fn to_text(&self) -> String {
		let mut buffer = Vec::new();
		// writing into a Vec cannot fail
		let _ = self.write_text(&mut buffer);
		String::from_utf8_lossy(&buffer).into_owned()
	}

	/// Saves the model as text into `path`.
	pub fn save_as_text<P: AsRef<Path>>(&self, path: P) -> Result<()> {
		let path = path.as_ref();
		let file = File::create(path).map_err(|err| NGramError::io(path, err))?;
		let mut out = BufWriter::new(file);
		self.write_text(&mut out)
			.and_then(|_| out.flush())
			.map_err(|err| NGramError::io(path, err))?;
		info!("saved {}-gram model to {}", self.n(), path.display());
		Ok(())
	}

	/// Loads a model saved by [`NGram::save_as_text`].
	pub fn from_text_file<P: AsRef<Path>>(path: P) -> Result<Self> {
		Self::from_multiple_files(&[path])
	}

	/// Loads a model whose text is split across several files, read in order.
	pub fn from_multiple_files<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
		let mut source = MultipleFile::new(paths)?;
		let model = Self::read_model(&mut source)?;
		info!(
			"loaded {}-gram model ({} symbols) from {} file(s)",
			model.n(),
			model.vocabulary_size(),
			paths.len()
		);
		Ok(model)
	}

	/// Parses a model from its text format.
	pub fn from_text(text: &str) -> Result<Self> {
		Self::read_model(&mut TextLines::new(text))
	}

	/// Reads a whole model from a line source.
	pub fn read_model<L: LineSource>(source: &mut L) -> Result<Self> {
		let header = source.read_line()?;
		let line = source.line_number();
		let items: Vec<&str> = header.split_whitespace().collect();
		if items.len() != 3 {
			return Err(NGramError::Format(format!(
				"line {line}: expected 'N lambda1 lambda2', got {} field(s)",
				items.len()
			)));
		}
		let n: usize = parse_field(items[0], line, "N")?;
		if n == 0 {
			return Err(NGramError::Format(format!("line {line}: N must be >= 1")));
		}
		let lambda1: f64 = parse_field(items[1], line, "lambda1")?;
		let lambda2: f64 = parse_field(items[2], line, "lambda2")?;

		let unseen = source.read_line()?;
		let line = source.line_number();
		let probability_of_unseen = unseen
			.split_whitespace()
			.map(|token| parse_field(token, line, "probability of unseen"))
			.collect::<Result<Vec<f64>>>()?;
		if probability_of_unseen.len() != n {
			return Err(NGramError::Format(format!(
				"line {line}: expected {n} unseen probabilities, got {}",
				probability_of_unseen.len()
			)));
		}

		let size_line = source.read_line()?;
		let vocabulary_size: usize = parse_field(size_line.trim(), source.line_number(), "vocabulary size")?;
		let mut vocabulary = BTreeSet::new();
		for _ in 0..vocabulary_size {
			vocabulary.insert(source.read_line()?.trim().to_owned());
		}

		let (_, root) = NGramNode::read_text(source, true)?;
		Ok(Self::from_parts(n, lambda1, lambda2, probability_of_unseen, vocabulary, root))
	}
}
