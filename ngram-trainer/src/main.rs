//! Command-line trainer: builds an n-gram model from a tokenized corpus,
//! smooths it, reports perplexity and saves it.
//!
//! The corpus holds one sentence per line, symbols separated by whitespace.
//! Logging goes through `env_logger` (`RUST_LOG=info` for progress).

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;

use ngram_core::io::read_corpus;
use ngram_core::{
	AdditiveSmoothing, GoodTuringSmoothing, InterpolatedSmoothing, LaplaceSmoothing, NGram, NoSmoothing,
	SearchConfig, TrainedSmoothing,
};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
enum Smoothing {
	/// Maximum likelihood, unseen sequences get 0
	None,
	/// Add-one
	Laplace,
	/// Add-delta with delta learned by cross validation
	Additive,
	/// Good-Turing discounting
	GoodTuring,
	/// Interpolation of Good-Turing estimates with learned weights
	Interpolated,
}

#[derive(Parser, Debug)]
#[command(name = "ngram-trainer")]
#[command(about = "Train and evaluate n-gram language models")]
#[command(version)]
struct Args {
	/// Training corpus (one tokenized sentence per line)
	#[arg(long)]
	corpus: PathBuf,

	/// Order of the model
	#[arg(short, default_value_t = 3)]
	n: usize,

	/// Smoothing strategy
	#[arg(long, value_enum, default_value_t = Smoothing::Laplace)]
	smoothing: Smoothing,

	/// Corpus used to learn the smoothing parameters (defaults to the training corpus)
	#[arg(long)]
	validation: Option<PathBuf>,

	/// Held-out corpus to report the perplexity on
	#[arg(long)]
	test: Option<PathBuf>,

	/// Drop continuations whose share of their context is below this threshold
	#[arg(long)]
	prune: Option<f64>,

	/// Save the model in the text format
	#[arg(long)]
	output: Option<PathBuf>,

	/// Save the model as a binary snapshot
	#[arg(long)]
	binary: Option<PathBuf>,

	/// Seed of the cross validation shuffle and of the sampling
	#[arg(long, default_value_t = 0)]
	seed: u64,

	/// Number of cross validation folds
	#[arg(long, default_value_t = 10)]
	folds: usize,

	/// Number of sentences to sample from the trained model
	#[arg(long, default_value_t = 0)]
	generate: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
	env_logger::init();
	let args = Args::parse();

	let corpus = read_corpus(&args.corpus)?;
	info!("read {} sentences from {}", corpus.len(), args.corpus.display());
	let mut model = NGram::from_corpus_parallel(args.n, &corpus)?;
	info!("vocabulary size {}", model.vocabulary_size());

	let validation = match &args.validation {
		Some(path) => read_corpus(path)?,
		None => corpus,
	};
	let config = SearchConfig {
		folds: args.folds,
		seed: args.seed,
		..SearchConfig::default()
	};

	match args.smoothing {
		Smoothing::None => model.calculate_ngram_probabilities_simple(&NoSmoothing)?,
		Smoothing::Laplace => model.calculate_ngram_probabilities_simple(&LaplaceSmoothing::default())?,
		Smoothing::GoodTuring => model.calculate_ngram_probabilities_simple(&GoodTuringSmoothing)?,
		Smoothing::Additive => {
			let mut smoothing = AdditiveSmoothing::with_config(config);
			smoothing.train(&validation, &mut model)?;
			println!("delta: {}", smoothing.delta());
		}
		Smoothing::Interpolated => {
			let mut smoothing = InterpolatedSmoothing::with_config(config);
			smoothing.train(&validation, &mut model)?;
			println!("lambda1: {}", model.lambda1());
			println!("lambda2: {}", model.lambda2());
		}
	}

	if let Some(threshold) = args.prune {
		model.prune(threshold);
	}

	if let Some(path) = &args.test {
		let test = read_corpus(path)?;
		println!("perplexity: {}", model.get_perplexity(&test)?);
	}

	if args.generate > 0 {
		let mut rng = StdRng::seed_from_u64(args.seed);
		let start = vec!["<s>"; args.n.saturating_sub(1)];
		for _ in 0..args.generate {
			let sentence = model.generate_sequence(&start, "</s>", 50, &mut rng);
			println!("{}", sentence.join(" "));
		}
	}

	if let Some(path) = &args.output {
		model.save_as_text(path)?;
	}
	if let Some(path) = &args.binary {
		model.save_binary(path)?;
	}

	Ok(())
}
