use reqwest::blocking::Client;
use serde_json::Value;

use crate::{Error, Result};
use medrag_config::ProviderConfig;

/// Blocking client for a Cohere/Jina style `/rerank` endpoint backed by a cross-encoder.
#[derive(Debug)]
pub struct RerankClient {
	client: Client,
	url: String,
	model: String,
}
impl RerankClient {
	pub fn new(cfg: &ProviderConfig) -> Result<Self> {
		let client = crate::build_client(cfg.timeout_ms, &cfg.api_key, &cfg.default_headers)?;

		Ok(Self { client, url: crate::endpoint(&cfg.api_base, &cfg.path), model: cfg.model.clone() })
	}

	/// One relevance score per document, aligned with `docs`.
	pub fn rerank(&self, query: &str, docs: &[String]) -> Result<Vec<f32>> {
		if docs.is_empty() {
			return Ok(Vec::new());
		}

		let body = serde_json::json!({ "model": self.model, "query": query, "documents": docs });
		let res = self.client.post(&self.url).json(&body).send()?;
		let json: Value = res.error_for_status()?.json()?;

		parse_rerank_response(json, docs.len())
	}
}

fn parse_rerank_response(json: Value, doc_count: usize) -> Result<Vec<f32>> {
	let results = json
		.get("results")
		.or_else(|| json.get("data"))
		.and_then(|v| v.as_array())
		.ok_or_else(|| Error::InvalidResponse {
			message: "Rerank response is missing results array.".to_string(),
		})?;
	let mut scores: Vec<Option<f32>> = vec![None; doc_count];

	for item in results {
		let index = item.get("index").and_then(|v| v.as_u64()).ok_or_else(|| {
			Error::InvalidResponse { message: "Rerank result missing index.".to_string() }
		})? as usize;
		let score = item
			.get("relevance_score")
			.or_else(|| item.get("score"))
			.and_then(|v| v.as_f64())
			.ok_or_else(|| Error::InvalidResponse {
				message: "Rerank result missing score.".to_string(),
			})? as f32;

		if let Some(slot) = scores.get_mut(index) {
			*slot = Some(score);
		}
	}

	// A partial response would silently rank the missing documents last.
	scores
		.into_iter()
		.enumerate()
		.map(|(index, score)| {
			score.ok_or_else(|| Error::InvalidResponse {
				message: format!("Rerank response has no score for document {index}."),
			})
		})
		.collect()
}
