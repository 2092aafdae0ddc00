use serde::{Deserialize, Serialize};

/// A candidate abstract as handed over by the document supplier.
///
/// Scores are only comparable within the result set of a single query. Stages copy documents
/// before attaching scores and never touch the caller's records.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
	pub title: String,
	#[serde(rename = "abstract")]
	pub abstract_text: String,
	/// Set by the first-pass retriever.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub relevance_score_1: Option<f32>,
	/// Set by the reranker.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub relevance_score_2: Option<f32>,
}
impl Document {
	pub fn new(title: impl Into<String>, abstract_text: impl Into<String>) -> Self {
		Self { title: title.into(), abstract_text: abstract_text.into(), ..Self::default() }
	}

	pub fn with_relevance_score_1(&self, score: f32) -> Self {
		Self { relevance_score_1: Some(score), ..self.clone() }
	}

	pub fn with_relevance_score_2(&self, score: f32) -> Self {
		Self { relevance_score_2: Some(score), ..self.clone() }
	}
}
