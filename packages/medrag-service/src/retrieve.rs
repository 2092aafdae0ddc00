mod bm25;
mod dense;
mod threshold;

pub use dense::FlatL2Index;

use serde::Serialize;

use medrag_config::Config;
use medrag_domain::{Document, LexicalScorer, lexical::NEUTRAL_SCORE};

use crate::SemanticScorer;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalPath {
	/// Dense similarity fused with BM25.
	Dense,
	/// Weighted overlap scoring with the threshold cascade.
	Lexical,
	/// No usable query signal; input order is kept and every document gets the neutral score.
	Neutral,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdStage {
	Strict,
	Relaxed,
	Unfiltered,
}

#[derive(Clone, Debug)]
pub struct RetrievalOutcome {
	pub documents: Vec<Document>,
	pub path: RetrievalPath,
	/// Set on the lexical path only.
	pub threshold: Option<ThresholdStage>,
}
impl RetrievalOutcome {
	fn neutral(documents: &[Document], top_k: usize) -> Self {
		Self {
			documents: documents
				.iter()
				.take(top_k)
				.map(|document| document.with_relevance_score_1(NEUTRAL_SCORE))
				.collect(),
			path: RetrievalPath::Neutral,
			threshold: None,
		}
	}
}

pub fn retrieve(
	cfg: &Config,
	semantic: &dyn SemanticScorer,
	query: &str,
	documents: &[Document],
	top_k: usize,
) -> Vec<Document> {
	retrieve_explained(cfg, semantic, query, documents, top_k).documents
}

/// First-pass ranking. Returns at most `top_k` copies of the input documents, each carrying
/// `relevance_score_1`, best first.
///
/// The dense path is preferred when the semantic scorer is available. Any failure on that path
/// is logged and the call is answered by the lexical path instead.
pub fn retrieve_explained(
	cfg: &Config,
	semantic: &dyn SemanticScorer,
	query: &str,
	documents: &[Document],
	top_k: usize,
) -> RetrievalOutcome {
	if documents.is_empty() || top_k == 0 || query.trim().is_empty() {
		return RetrievalOutcome::neutral(documents, top_k);
	}

	let scorer = LexicalScorer::from_config(cfg);
	let query_tokens = scorer.tokenize(query);

	if semantic.is_available() {
		match dense::retrieve(cfg, semantic, query, &query_tokens, documents, top_k) {
			Ok(ranked) =>
				return RetrievalOutcome {
					documents: ranked,
					path: RetrievalPath::Dense,
					threshold: None,
				},
			Err(err) => {
				tracing::warn!(error = %err, "Dense retrieval failed. Falling back to lexical scoring.");
			},
		}
	} else {
		tracing::debug!("Semantic scorer unavailable. Using lexical scoring.");
	}

	if query_tokens.is_empty() {
		return RetrievalOutcome::neutral(documents, top_k);
	}

	let scores = documents
		.iter()
		.map(|document| scorer.score_document(&query_tokens, document).score)
		.collect::<Vec<_>>();
	let (selected, stage) = threshold::select(&scores, &cfg.retrieval.threshold, top_k);

	tracing::debug!(
		candidates = documents.len(),
		selected = selected.len(),
		stage = ?stage,
		"Lexical retrieval completed."
	);

	RetrievalOutcome {
		documents: selected
			.into_iter()
			.map(|idx| documents[idx].with_relevance_score_1(scores[idx]))
			.collect(),
		path: RetrievalPath::Lexical,
		threshold: Some(stage),
	}
}
