use serde::Serialize;

use medrag_domain::Document;

use crate::{Error, PairwiseRelevanceScorer, Result, scoring};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RerankPath {
	/// Scores from the pairwise relevance model.
	Pairwise,
	/// First-pass scores, or inverse input rank where none are present.
	FirstPass,
}

#[derive(Clone, Debug)]
pub struct RerankOutcome {
	pub documents: Vec<Document>,
	pub path: RerankPath,
}

pub fn rerank(
	pairwise: &dyn PairwiseRelevanceScorer,
	query: &str,
	documents: &[Document],
	top_k: usize,
) -> Vec<Document> {
	rerank_explained(pairwise, query, documents, top_k).documents
}

/// Second-pass ranking over first-pass output.
///
/// Both paths attach `relevance_score_2`. The fallback reuses `relevance_score_1`, or
/// `1 / (position + 1)` for documents without one.
pub fn rerank_explained(
	pairwise: &dyn PairwiseRelevanceScorer,
	query: &str,
	documents: &[Document],
	top_k: usize,
) -> RerankOutcome {
	if documents.is_empty() || top_k == 0 {
		return RerankOutcome { documents: Vec::new(), path: RerankPath::FirstPass };
	}

	if pairwise.is_available() {
		match pairwise_rerank(pairwise, query, documents, top_k) {
			Ok(ranked) => return RerankOutcome { documents: ranked, path: RerankPath::Pairwise },
			Err(err) => {
				tracing::warn!(error = %err, "Pairwise rerank failed. Keeping first-pass order.");
			},
		}
	} else {
		tracing::debug!("Pairwise relevance scorer unavailable. Keeping first-pass order.");
	}

	RerankOutcome { documents: first_pass_rerank(documents, top_k), path: RerankPath::FirstPass }
}

fn pairwise_rerank(
	pairwise: &dyn PairwiseRelevanceScorer,
	query: &str,
	documents: &[Document],
	top_k: usize,
) -> Result<Vec<Document>> {
	let abstracts =
		documents.iter().map(|document| document.abstract_text.clone()).collect::<Vec<_>>();
	let scores = pairwise.score(query, &abstracts)?;

	if scores.len() != documents.len() {
		return Err(Error::InvalidScores {
			message: format!(
				"Pairwise scorer returned {} scores for {} documents.",
				scores.len(),
				documents.len()
			),
		});
	}
	if scores.iter().any(|score| !score.is_finite()) {
		return Err(Error::InvalidScores {
			message: "Pairwise scorer returned non-finite scores.".to_string(),
		});
	}

	Ok(scoring::rank_desc(&scores)
		.into_iter()
		.take(top_k)
		.map(|idx| documents[idx].with_relevance_score_2(scores[idx]))
		.collect())
}

fn first_pass_rerank(documents: &[Document], top_k: usize) -> Vec<Document> {
	let scores = documents
		.iter()
		.enumerate()
		.map(|(idx, document)| document.relevance_score_1.unwrap_or(1.0 / (idx as f32 + 1.0)))
		.collect::<Vec<_>>();

	scoring::rank_desc(&scores)
		.into_iter()
		.take(top_k)
		.map(|idx| documents[idx].with_relevance_score_2(scores[idx]))
		.collect()
}
