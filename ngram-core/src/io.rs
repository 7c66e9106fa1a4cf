use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{NGramError, Result};
use crate::Sentence;

/// Reads a text file and returns all its lines as a `Vec<String>`.
///
/// - Reads the entire file into memory
/// - Splits on `\n` / `\r\n`
pub(crate) fn read_file<P: AsRef<Path>>(filename: P) -> Result<Vec<String>> {
	let path = filename.as_ref();
	let mut contents = String::new();
	File::open(path)
		.and_then(|mut file| file.read_to_string(&mut contents))
		.map_err(|err| NGramError::io(path, err))?;
	Ok(contents.lines().map(str::to_owned).collect())
}

/// Reads an already tokenized corpus: one sentence per line, symbols
/// separated by whitespace. Blank lines are skipped.
pub fn read_corpus<P: AsRef<Path>>(filename: P) -> Result<Vec<Sentence>> {
	Ok(read_file(filename)?
		.iter()
		.map(|line| line.split_whitespace().map(str::to_owned).collect::<Sentence>())
		.filter(|sentence| !sentence.is_empty())
		.collect())
}

/// Builds an output path based on an input path and a new extension.
///
/// Example:
/// `data/input.txt` + `"bin"` → `data/input.bin`
pub(crate) fn build_output_path<P: AsRef<Path>>(input_path: P, output_extension: &str) -> Result<PathBuf> {
	let input_path = input_path.as_ref();

	let parent = input_path.parent().unwrap_or_else(|| Path::new("."));
	let file_stem = input_path
		.file_stem()
		.ok_or_else(|| NGramError::InvalidArgument(format!("{} has no filename", input_path.display())))?;

	let mut output = PathBuf::from(parent);
	output.push(file_stem);
	output.set_extension(output_extension);

	Ok(output)
}

/// Parses one whitespace-separated field of a persisted model.
pub(crate) fn parse_field<T: FromStr>(token: &str, line: usize, name: &str) -> Result<T> {
	token.parse().map_err(|_| NGramError::Parse {
		line,
		message: format!("invalid {name} '{token}'"),
	})
}

/// Supplier of the lines of a persisted model, one at a time.
pub trait LineSource {
	/// Returns the next line (without its terminator).
	///
	/// # Errors
	/// Returns `EndOfInput` once every line has been read.
	fn read_line(&mut self) -> Result<String>;

	/// 1-based number of the last line returned, counted across the whole
	/// logical stream.
	fn line_number(&self) -> usize;
}

/// A text stream split over an ordered list of files.
///
/// Each file is read entirely when it becomes current. When its lines are
/// exhausted, the next file is opened transparently.
#[derive(Debug)]
pub struct MultipleFile {
	file_names: Vec<PathBuf>,
	/// Index of the current file in `file_names`
	index: usize,
	lines: Vec<String>,
	line_index: usize,
	line_number: usize,
}

impl MultipleFile {
	/// Opens the first file of `file_names`.
	///
	/// # Errors
	/// Returns an error if the list is empty or the first file cannot be read.
	pub fn new<P: AsRef<Path>>(file_names: &[P]) -> Result<Self> {
		let file_names: Vec<PathBuf> = file_names.iter().map(|p| p.as_ref().to_path_buf()).collect();
		let first = file_names
			.first()
			.ok_or_else(|| NGramError::InvalidArgument("at least one file is required".to_owned()))?;
		let lines = read_file(first)?;
		Ok(Self {
			file_names,
			index: 0,
			lines,
			line_index: 0,
			line_number: 0,
		})
	}
}

impl LineSource for MultipleFile {
	fn read_line(&mut self) -> Result<String> {
		while self.line_index == self.lines.len() {
			if self.index + 1 >= self.file_names.len() {
				return Err(NGramError::EndOfInput { files: self.file_names.len() });
			}
			self.index += 1;
			self.lines = read_file(&self.file_names[self.index])?;
			self.line_index = 0;
		}
		let line = std::mem::take(&mut self.lines[self.line_index]);
		self.line_index += 1;
		self.line_number += 1;
		Ok(line)
	}

	fn line_number(&self) -> usize {
		self.line_number
	}
}

/// Lines of an in-memory text.
#[derive(Debug)]
pub struct TextLines<'a> {
	lines: std::str::Lines<'a>,
	line_number: usize,
}

impl<'a> TextLines<'a> {
	pub fn new(text: &'a str) -> Self {
		Self { lines: text.lines(), line_number: 0 }
	}
}

impl LineSource for TextLines<'_> {
	fn read_line(&mut self) -> Result<String> {
		let line = self.lines.next().ok_or(NGramError::EndOfInput { files: 1 })?;
		self.line_number += 1;
		Ok(line.to_owned())
	}

	fn line_number(&self) -> usize {
		self.line_number
	}
}
