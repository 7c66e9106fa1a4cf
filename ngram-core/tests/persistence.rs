mod common;

use std::fs;

use common::{simple_corpus, simple_models};
use ngram_core::{GoodTuringSmoothing, LaplaceSmoothing, NGram, NGramError};
use tempfile::tempdir;

fn smoothed_trigram() -> NGram {
	let (_, _, mut trigram) = simple_models();
	trigram.calculate_ngram_probabilities_simple(&GoodTuringSmoothing).unwrap();
	trigram
}

#[test]
fn text_file_round_trip() {
	let dir = tempdir().unwrap();
	let (mut unigram, mut bigram, _) = simple_models();
	unigram.calculate_ngram_probabilities_simple(&LaplaceSmoothing::default()).unwrap();
	bigram.calculate_ngram_probabilities_simple(&GoodTuringSmoothing).unwrap();
	bigram.set_lambda2(0.3);

	for (i, model) in [unigram, bigram, smoothed_trigram()].into_iter().enumerate() {
		let path = dir.path().join(format!("simple{}.txt", i + 1));
		model.save_as_text(&path).unwrap();
		let reloaded = NGram::from_text_file(&path).unwrap();
		assert_eq!(reloaded, model);
		assert_eq!(reloaded.get_perplexity(&simple_corpus()).unwrap(), model.get_perplexity(&simple_corpus()).unwrap());
	}
}

#[test]
fn multi_part_round_trip_at_any_split() {
	let dir = tempdir().unwrap();
	let model = smoothed_trigram();
	let text = model.to_text();
	let lines: Vec<&str> = text.lines().collect();

	for (first_cut, second_cut) in [(1, 2), (3, 20), (17, 18), (40, lines.len() - 1), (lines.len() - 1, lines.len())] {
		let parts = [&lines[..first_cut], &lines[first_cut..second_cut], &lines[second_cut..]];
		let paths: Vec<_> = parts
			.iter()
			.enumerate()
			.map(|(i, part)| {
				let path = dir.path().join(format!("part{i}.txt"));
				let content: String = part.iter().map(|line| format!("{line}\n")).collect();
				fs::write(&path, content).unwrap();
				path
			})
			.collect();
		let reloaded = NGram::from_multiple_files(&paths).unwrap();
		assert_eq!(reloaded, model, "split at {first_cut}/{second_cut}");
	}
}

#[test]
fn interpolation_flag_is_restored() {
	let (_, mut bigram, _) = simple_models();
	bigram.calculate_ngram_probabilities_simple(&LaplaceSmoothing::default()).unwrap();
	bigram.set_lambda2(0.4);
	let reloaded = NGram::from_text(&bigram.to_text()).unwrap();
	assert!(reloaded.is_interpolated());
	assert_eq!(reloaded.get_probability(&["<s>", "ali"]), bigram.get_probability(&["<s>", "ali"]));
}

#[test]
fn missing_part_is_end_of_input() {
	let dir = tempdir().unwrap();
	let text = smoothed_trigram().to_text();
	let head: String = text.lines().take(25).map(|line| format!("{line}\n")).collect();
	let path = dir.path().join("head.txt");
	fs::write(&path, head).unwrap();
	assert!(matches!(NGram::from_text_file(&path), Err(NGramError::EndOfInput { files: 1 })));
}

#[test]
fn missing_file_is_an_io_error() {
	let dir = tempdir().unwrap();
	let result = NGram::from_text_file(dir.path().join("absent.txt"));
	assert!(matches!(result, Err(NGramError::Io { .. })));
}

#[test]
fn binary_snapshot_round_trip() {
	let dir = tempdir().unwrap();
	let model = smoothed_trigram();
	let path = dir.path().join("simple3.bin");
	model.save_binary(&path).unwrap();
	assert_eq!(NGram::load_binary(&path).unwrap(), model);
	assert_eq!(NGram::from_bytes(&model.to_bytes().unwrap()).unwrap(), model);
}

#[test]
fn snapshot_keeps_unknown_aggregates() {
	let (mut unigram, _, _) = simple_models();
	let dictionary = unigram.construct_dictionary_with_non_rare_words(1, 0.05);
	unigram.replace_unknown_words(&dictionary);
	unigram.calculate_ngram_probabilities_simple(&LaplaceSmoothing::default()).unwrap();
	let reloaded = NGram::from_bytes(&unigram.to_bytes().unwrap()).unwrap();
	assert!(reloaded.root().unknown().is_some());
	assert_eq!(reloaded.get_probability(&["mahmut"]), unigram.get_probability(&["mahmut"]));
}
