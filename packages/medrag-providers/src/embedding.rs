use reqwest::blocking::Client;
use serde_json::Value;

use crate::{Error, Result};
use medrag_config::EmbeddingProviderConfig;

/// Blocking client for an OpenAI-compatible `/embeddings` endpoint.
#[derive(Debug)]
pub struct EmbeddingClient {
	client: Client,
	url: String,
	model: String,
	dimensions: u32,
}
impl EmbeddingClient {
	pub fn new(cfg: &EmbeddingProviderConfig) -> Result<Self> {
		let client = crate::build_client(cfg.timeout_ms, &cfg.api_key, &cfg.default_headers)?;

		Ok(Self {
			client,
			url: crate::endpoint(&cfg.api_base, &cfg.path),
			model: cfg.model.clone(),
			dimensions: cfg.dimensions,
		})
	}

	pub fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
		if texts.is_empty() {
			return Ok(Vec::new());
		}

		let body = serde_json::json!({
			"model": self.model,
			"input": texts,
			"dimensions": self.dimensions,
		});
		let res = self.client.post(&self.url).json(&body).send()?;
		let json: Value = res.error_for_status()?.json()?;
		let vectors = parse_embedding_response(json)?;

		if vectors.len() != texts.len() {
			return Err(Error::InvalidResponse {
				message: format!(
					"Embedding response has {} vectors for {} inputs.",
					vectors.len(),
					texts.len()
				),
			});
		}

		tracing::debug!(inputs = texts.len(), model = %self.model, "Embedded texts.");

		Ok(vectors)
	}
}

fn parse_embedding_response(json: Value) -> Result<Vec<Vec<f32>>> {
	let data = json.get("data").and_then(|v| v.as_array()).ok_or_else(|| {
		Error::InvalidResponse { message: "Embedding response is missing data array.".to_string() }
	})?;

	let mut indexed: Vec<(usize, Vec<f32>)> = Vec::with_capacity(data.len());

	for (fallback_index, item) in data.iter().enumerate() {
		let index = item
			.get("index")
			.and_then(|v| v.as_u64())
			.map(|v| v as usize)
			.unwrap_or(fallback_index);
		let embedding = item.get("embedding").and_then(|v| v.as_array()).ok_or_else(|| {
			Error::InvalidResponse {
				message: "Embedding item missing embedding array.".to_string(),
			}
		})?;
		let mut vec = Vec::with_capacity(embedding.len());

		for value in embedding {
			let number = value.as_f64().ok_or_else(|| Error::InvalidResponse {
				message: "Embedding value must be numeric.".to_string(),
			})?;

			vec.push(number as f32);
		}

		indexed.push((index, vec));
	}

	indexed.sort_by_key(|(index, _)| *index);

	Ok(indexed.into_iter().map(|(_, vec)| vec).collect())
}
