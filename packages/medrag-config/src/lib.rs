mod error;
mod synonyms;
mod types;

pub use error::{Error, Result};
pub use synonyms::{DEFAULT_VERSION, default_terms};
pub use types::{
	Bm25, Config, EmbeddingProviderConfig, Lexical, ProviderConfig, Providers, Rerank, Retrieval,
	Service, Synonyms, Threshold,
};

use std::{fs, path::Path};

use serde_json::{Map, Value};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}
	if cfg.retrieval.top_k == 0 {
		return Err(Error::Validation {
			message: "retrieval.top_k must be greater than zero.".to_string(),
		});
	}
	if cfg.rerank.top_k == 0 {
		return Err(Error::Validation {
			message: "rerank.top_k must be greater than zero.".to_string(),
		});
	}

	for (label, weight) in [
		("retrieval.dense_weight", cfg.retrieval.dense_weight),
		("retrieval.lexical_weight", cfg.retrieval.lexical_weight),
		("lexical.title_weight", cfg.lexical.title_weight),
		("lexical.synonym_weight", cfg.lexical.synonym_weight),
		("lexical.abstract_weight", cfg.lexical.abstract_weight),
	] {
		require_non_negative(label, weight)?;
	}

	if cfg.retrieval.dense_weight + cfg.retrieval.lexical_weight <= 0.0 {
		return Err(Error::Validation {
			message: "retrieval.dense_weight and retrieval.lexical_weight must not both be zero."
				.to_string(),
		});
	}

	require_non_negative("retrieval.bm25.k1", cfg.retrieval.bm25.k1)?;

	if !(0.0..=1.0).contains(&cfg.retrieval.bm25.b) {
		return Err(Error::Validation {
			message: "retrieval.bm25.b must be in the range 0.0-1.0.".to_string(),
		});
	}

	let threshold = &cfg.retrieval.threshold;

	for (label, ratio) in [
		("retrieval.threshold.strict_ratio", threshold.strict_ratio),
		("retrieval.threshold.relaxed_ratio", threshold.relaxed_ratio),
	] {
		if !ratio.is_finite() || !(0.0..=1.0).contains(&ratio) {
			return Err(Error::Validation {
				message: format!("{label} must be in the range 0.0-1.0."),
			});
		}
	}
	for (label, floor) in [
		("retrieval.threshold.strict_floor", threshold.strict_floor),
		("retrieval.threshold.relaxed_floor", threshold.relaxed_floor),
	] {
		require_non_negative(label, floor)?;
	}

	if threshold.relaxed_ratio > threshold.strict_ratio {
		return Err(Error::Validation {
			message: "retrieval.threshold.relaxed_ratio must not exceed strict_ratio.".to_string(),
		});
	}
	if threshold.relaxed_floor > threshold.strict_floor {
		return Err(Error::Validation {
			message: "retrieval.threshold.relaxed_floor must not exceed strict_floor.".to_string(),
		});
	}
	if cfg.lexical.title_weight <= cfg.lexical.synonym_weight {
		return Err(Error::Validation {
			message: "lexical.title_weight must be greater than lexical.synonym_weight."
				.to_string(),
		});
	}
	if cfg.lexical.synonym_weight <= cfg.lexical.abstract_weight {
		return Err(Error::Validation {
			message: "lexical.synonym_weight must be greater than lexical.abstract_weight."
				.to_string(),
		});
	}
	if cfg.lexical.min_token_len == 0 {
		return Err(Error::Validation {
			message: "lexical.min_token_len must be greater than zero.".to_string(),
		});
	}
	if cfg.synonyms.version.trim().is_empty() {
		return Err(Error::Validation {
			message: "synonyms.version must be non-empty.".to_string(),
		});
	}

	for (key, terms) in &cfg.synonyms.terms {
		if !is_single_token(key) {
			return Err(Error::Validation {
				message: format!("synonyms.terms key {key:?} must be a single [a-z0-9] token."),
			});
		}

		for term in terms {
			if !is_single_token(term) {
				return Err(Error::Validation {
					message: format!(
						"synonyms.terms.{key} term {term:?} must be a single [a-z0-9] token."
					),
				});
			}
		}
	}

	if let Some(embedding) = cfg.providers.embedding.as_ref() {
		validate_provider(
			"providers.embedding",
			&embedding.api_base,
			&embedding.api_key,
			embedding.timeout_ms,
			&embedding.default_headers,
		)?;

		if embedding.dimensions == 0 {
			return Err(Error::Validation {
				message: "providers.embedding.dimensions must be greater than zero.".to_string(),
			});
		}
	}
	if let Some(rerank) = cfg.providers.rerank.as_ref() {
		validate_provider(
			"providers.rerank",
			&rerank.api_base,
			&rerank.api_key,
			rerank.timeout_ms,
			&rerank.default_headers,
		)?;
	}

	Ok(())
}

fn validate_provider(
	label: &str,
	api_base: &str,
	api_key: &str,
	timeout_ms: u64,
	default_headers: &Map<String, Value>,
) -> Result<()> {
	if api_base.trim().is_empty() {
		return Err(Error::Validation { message: format!("{label}.api_base must be non-empty.") });
	}
	if api_key.trim().is_empty() {
		return Err(Error::Validation { message: format!("{label}.api_key must be non-empty.") });
	}
	if timeout_ms == 0 {
		return Err(Error::Validation {
			message: format!("{label}.timeout_ms must be greater than zero."),
		});
	}
	if default_headers.values().any(|value| !value.is_string()) {
		return Err(Error::Validation {
			message: format!("{label}.default_headers values must be strings."),
		});
	}

	Ok(())
}

fn require_non_negative(label: &str, value: f32) -> Result<()> {
	if !value.is_finite() {
		return Err(Error::Validation { message: format!("{label} must be a finite number.") });
	}
	if value < 0.0 {
		return Err(Error::Validation { message: format!("{label} must be zero or greater.") });
	}

	Ok(())
}

fn is_single_token(value: &str) -> bool {
	!value.is_empty() && value.chars().all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit())
}

fn normalize(cfg: &mut Config) {
	cfg.service.log_level = cfg.service.log_level.trim().to_string();

	let terms = std::mem::take(&mut cfg.synonyms.terms);

	// Keys that collapse onto the same lowercase form are merged.
	for (key, values) in terms {
		let merged = cfg.synonyms.terms.entry(key.trim().to_lowercase()).or_default();

		for value in values {
			let value = value.trim().to_lowercase();

			if value.is_empty() || merged.contains(&value) {
				continue;
			}

			merged.push(value);
		}
	}
}
