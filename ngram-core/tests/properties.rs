use approx::assert_abs_diff_eq;
use proptest::prelude::*;

use ngram_core::{LaplaceSmoothing, NGram, NoSmoothing, Sentence};

fn corpus_strategy() -> impl Strategy<Value = Vec<Sentence>> {
	let symbol = prop::sample::select(vec!["a", "b", "c", "d", "e", "f"]).prop_map(str::to_owned);
	prop::collection::vec(prop::collection::vec(symbol, 1..9), 1..12)
}

proptest! {
	#![proptest_config(ProptestConfig::with_cases(64))]

	#[test]
	fn window_counts_are_conserved(corpus in corpus_strategy(), n in 1usize..4) {
		let model = NGram::from_corpus(n, &corpus).unwrap();
		let windows: usize = corpus.iter().map(|s| s.len().saturating_sub(n - 1)).sum();
		let roots: usize = model.root().children().map(|(_, child)| child.count()).sum();
		prop_assert_eq!(roots, windows);

		// an inner node counts exactly what its children count
		if n > 1 {
			for (_, child) in model.root().children() {
				prop_assert_eq!(child.count(), child.child_sum());
			}
		}
	}

	#[test]
	fn maximum_likelihood_is_normalized(corpus in corpus_strategy(), n in 1usize..4) {
		let mut model = NGram::from_corpus(n, &corpus).unwrap();
		model.calculate_ngram_probabilities_simple(&NoSmoothing).unwrap();
		let mut contexts = vec![model.root()];
		for _ in 1..n {
			contexts = contexts.into_iter().flat_map(|node| node.children().map(|(_, child)| child)).collect();
		}
		for context in contexts {
			if context.size() > 0 {
				let total: f64 = context.children().map(|(_, child)| child.probability()).sum();
				assert_abs_diff_eq!(total, 1.0, epsilon = 1e-9);
			}
		}
	}

	#[test]
	fn laplace_reserves_unseen_mass(corpus in corpus_strategy(), delta in 0.05f64..2.0) {
		let mut model = NGram::from_corpus(2, &corpus).unwrap();
		model.calculate_ngram_probabilities_simple(&LaplaceSmoothing::new(delta)).unwrap();
		let effective_vocabulary = model.vocabulary_size() + 1;
		for (_, context) in model.root().children() {
			let seen: f64 = context.children().map(|(_, child)| child.probability()).sum();
			let unseen = (effective_vocabulary - context.size()) as f64 * context.probability_of_unseen();
			assert_abs_diff_eq!(seen + unseen, 1.0, epsilon = 1e-9);
		}
	}

	#[test]
	fn pruning_only_removes(corpus in corpus_strategy(), threshold in 0.01f64..1.0) {
		let mut model = NGram::from_corpus(2, &corpus).unwrap();
		let before = model.clone();
		model.prune(threshold);
		for (symbol, context) in model.root().children() {
			let original = before.root().child(symbol).unwrap();
			prop_assert_eq!(context.count(), original.count());
			prop_assert!(context.size() <= original.size());
			for (next, child) in context.children() {
				prop_assert!(child.count() as f64 / context.count() as f64 >= threshold);
				prop_assert_eq!(child.count(), original.child(next).unwrap().count());
			}
		}
	}

	#[test]
	fn pruning_again_with_a_lower_threshold_changes_nothing(
		corpus in corpus_strategy(),
		n in 1usize..4,
		threshold in 0.01f64..=1.0,
		ratio in 0.0f64..=1.0,
	) {
		let mut model = NGram::from_corpus(n, &corpus).unwrap();
		model.prune(threshold);
		let pruned = model.clone();
		model.prune(threshold * ratio);
		prop_assert_eq!(model, pruned);
	}

	#[test]
	fn text_round_trip(corpus in corpus_strategy(), n in 1usize..4) {
		let mut model = NGram::from_corpus(n, &corpus).unwrap();
		model.calculate_ngram_probabilities_simple(&LaplaceSmoothing::new(0.3)).unwrap();
		let reloaded = NGram::from_text(&model.to_text()).unwrap();
		prop_assert_eq!(reloaded, model);
	}
}
