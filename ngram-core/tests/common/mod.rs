#![allow(dead_code)]

use ngram_core::{NGram, Sentence};

pub fn sentence(line: &str) -> Sentence {
	line.split_whitespace().map(str::to_owned).collect()
}

/// Five short Turkish sentences with boundary markers, 15 distinct symbols.
pub fn simple_corpus() -> Vec<Sentence> {
	[
		"<s> ali topu at mehmet ayşeye gitti </s>",
		"<s> ali top at ayşe eve gitti </s>",
		"<s> ayşe kitabı ver </s>",
		"<s> ali topu mehmete at </s>",
		"<s> ali topu at mehmet ayşeyle gitti </s>",
	]
	.iter()
	.map(|line| sentence(line))
	.collect()
}

/// Unigram, bigram and trigram models of the simple corpus.
pub fn simple_models() -> (NGram, NGram, NGram) {
	let corpus = simple_corpus();
	(
		NGram::from_corpus(1, &corpus).unwrap(),
		NGram::from_corpus(2, &corpus).unwrap(),
		NGram::from_corpus(3, &corpus).unwrap(),
	)
}

/// Sixty template sentences: enough repetition for every fold model to see
/// each symbol, with varied continuations.
pub fn template_corpus() -> Vec<Sentence> {
	let subjects = ["ali", "ayşe", "mehmet", "zeynep"];
	let verbs = ["gördü", "aldı", "sevdi"];
	let objects = ["topu", "kitabı", "elmayı", "kalemi", "defteri"];
	let adverbs = ["dün", "bugün", "hızlıca", "yavaşça", "sessizce", "yine", "çabucak"];
	(0..60)
		.map(|i| {
			let mut symbols = vec!["<s>".to_owned(), subjects[i % 4].to_owned()];
			if i % 2 == 0 {
				symbols.push(adverbs[i % 7].to_owned());
			}
			symbols.push(objects[i % 5].to_owned());
			symbols.push(verbs[i % 3].to_owned());
			symbols.push("</s>".to_owned());
			symbols
		})
		.collect()
}
