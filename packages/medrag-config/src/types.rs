use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
	pub service: Service,
	pub retrieval: Retrieval,
	pub lexical: Lexical,
	pub rerank: Rerank,
	pub synonyms: Synonyms,
	pub providers: Providers,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Service {
	pub log_level: String,
}
impl Default for Service {
	fn default() -> Self {
		Self { log_level: "info".to_string() }
	}
}

/// First-pass settings. The weights fuse the min-max normalized dense and BM25 signals.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Retrieval {
	pub top_k: u32,
	pub dense_weight: f32,
	pub lexical_weight: f32,
	pub bm25: Bm25,
	pub threshold: Threshold,
}
impl Default for Retrieval {
	fn default() -> Self {
		Self {
			top_k: 10,
			dense_weight: 0.5,
			lexical_weight: 0.5,
			bm25: Bm25::default(),
			threshold: Threshold::default(),
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Bm25 {
	pub k1: f32,
	pub b: f32,
}
impl Default for Bm25 {
	fn default() -> Self {
		Self { k1: 1.5, b: 0.75 }
	}
}

/// Adaptive cutoff for the lexical fallback.
///
/// A document survives a stage when `score >= max(ratio * max_score, floor)`. The relaxed stage
/// only runs when the strict stage keeps nothing; when both keep nothing the cutoff is dropped.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Threshold {
	pub strict_ratio: f32,
	pub strict_floor: f32,
	pub relaxed_ratio: f32,
	pub relaxed_floor: f32,
}
impl Default for Threshold {
	fn default() -> Self {
		Self { strict_ratio: 0.4, strict_floor: 1.0, relaxed_ratio: 0.2, relaxed_floor: 0.5 }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Lexical {
	pub title_weight: f32,
	pub synonym_weight: f32,
	pub abstract_weight: f32,
	/// Tokens shorter than this are dropped by the normalizer.
	pub min_token_len: usize,
}
impl Default for Lexical {
	fn default() -> Self {
		Self { title_weight: 3.0, synonym_weight: 1.5, abstract_weight: 1.0, min_token_len: 3 }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Rerank {
	pub top_k: u32,
}
impl Default for Rerank {
	fn default() -> Self {
		Self { top_k: 3 }
	}
}

/// Concept key to related terms. Keys and terms are single lowercase ASCII tokens.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Synonyms {
	pub version: String,
	pub terms: BTreeMap<String, Vec<String>>,
}
impl Default for Synonyms {
	fn default() -> Self {
		Self {
			version: crate::synonyms::DEFAULT_VERSION.to_string(),
			terms: crate::synonyms::default_terms(),
		}
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Providers {
	pub embedding: Option<EmbeddingProviderConfig>,
	pub rerank: Option<ProviderConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	#[serde(default = "default_timeout_ms")]
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	#[serde(default = "default_timeout_ms")]
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

fn default_timeout_ms() -> u64 {
	10_000
}
