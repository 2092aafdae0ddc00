use serde::{Deserialize, Serialize};

use medrag_domain::Document;

use crate::{MedragService, RerankPath, RetrievalPath, ThresholdStage};

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SearchRequest {
	pub query: String,
	pub documents: Vec<Document>,
	/// Overrides `retrieval.top_k`.
	#[serde(default)]
	pub top_k: Option<u32>,
	/// Overrides `rerank.top_k`.
	#[serde(default)]
	pub rerank_top_k: Option<u32>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SearchResponse {
	/// First-pass shortlist.
	pub retrieved: Vec<Document>,
	/// Final ranking, a subset of `retrieved`.
	pub ranked: Vec<Document>,
	pub retrieval_path: RetrievalPath,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub threshold: Option<ThresholdStage>,
	pub rerank_path: RerankPath,
}

impl MedragService {
	/// Retrieval followed by reranking with the configured `top_k` values.
	pub fn search(&self, query: &str, documents: &[Document]) -> SearchResponse {
		self.run_search(query, documents, None, None)
	}

	pub fn search_with(&self, req: &SearchRequest) -> SearchResponse {
		self.run_search(&req.query, &req.documents, req.top_k, req.rerank_top_k)
	}

	fn run_search(
		&self,
		query: &str,
		documents: &[Document],
		top_k: Option<u32>,
		rerank_top_k: Option<u32>,
	) -> SearchResponse {
		let top_k = top_k.unwrap_or(self.cfg.retrieval.top_k) as usize;
		let rerank_top_k = rerank_top_k.unwrap_or(self.cfg.rerank.top_k) as usize;
		let retrieval = crate::retrieve_explained(
			&self.cfg,
			self.providers.semantic.as_ref(),
			query,
			documents,
			top_k,
		);
		let rerank = crate::rerank_explained(
			self.providers.pairwise.as_ref(),
			query,
			&retrieval.documents,
			rerank_top_k,
		);

		tracing::info!(
			candidates = documents.len(),
			retrieved = retrieval.documents.len(),
			ranked = rerank.documents.len(),
			retrieval_path = ?retrieval.path,
			rerank_path = ?rerank.path,
			"Search completed."
		);

		SearchResponse {
			retrieved: retrieval.documents,
			ranked: rerank.documents,
			retrieval_path: retrieval.path,
			threshold: retrieval.threshold,
			rerank_path: rerank.path,
		}
	}
}
