use std::sync::{
	Arc,
	atomic::{AtomicUsize, Ordering},
};

use medrag_config::{Config, EmbeddingProviderConfig};
use medrag_service::{
	Error, LazyProvider, MedragService, PairwiseRelevanceScorer, Providers, RetrievalPath,
	SemanticScorer,
};
use serde_json::Map;

use super::{KeywordEmbedding, clinical_candidates, service_with, unavailable_pairwise};

#[test]
fn unconfigured_providers_are_unavailable() {
	let providers = Providers::from_config(&Config::default());

	assert!(!providers.semantic.is_available());
	assert!(!providers.pairwise.is_available());
}

#[test]
fn lazy_encoder_is_built_once_across_searches() {
	let builds = Arc::new(AtomicUsize::new(0));
	let counter = builds.clone();
	let semantic = LazyProvider::new("keyword", move || {
		counter.fetch_add(1, Ordering::SeqCst);

		Ok(KeywordEmbedding::new())
	});
	let service = service_with(Arc::new(semantic), unavailable_pairwise());

	assert_eq!(builds.load(Ordering::SeqCst), 0);

	for _ in 0..3 {
		let response = service.search("insulin", &clinical_candidates());

		assert_eq!(response.retrieval_path, RetrievalPath::Dense);
	}

	assert_eq!(builds.load(Ordering::SeqCst), 1);
}

#[test]
fn failed_lazy_build_is_not_retried() {
	let builds = Arc::new(AtomicUsize::new(0));
	let counter = builds.clone();
	let semantic: LazyProvider<KeywordEmbedding> = LazyProvider::new("keyword", move || {
		counter.fetch_add(1, Ordering::SeqCst);

		Err(Error::Provider { message: "weights not found".to_string() })
	});
	let service = service_with(Arc::new(semantic), unavailable_pairwise());

	for _ in 0..3 {
		let response = service.search("diabetes", &clinical_candidates());

		assert_eq!(response.retrieval_path, RetrievalPath::Lexical);
		assert!(!response.retrieved.is_empty());
	}

	assert_eq!(builds.load(Ordering::SeqCst), 1);
}

#[test]
fn misconfigured_embedding_client_degrades_to_lexical() {
	let mut cfg = Config::default();
	let mut default_headers = Map::new();

	default_headers.insert("x-tenant".to_string(), serde_json::json!(7));
	cfg.providers.embedding = Some(EmbeddingProviderConfig {
		provider_id: "local".to_string(),
		api_base: "http://127.0.0.1:9000".to_string(),
		api_key: "test-key".to_string(),
		path: "/v1/embeddings".to_string(),
		model: "test-model".to_string(),
		dimensions: 3,
		timeout_ms: 1_000,
		default_headers,
	});

	let service = MedragService::new(cfg);

	assert!(!service.providers.semantic.is_available());
	assert!(!service.providers.pairwise.is_available());

	let response = service.search("diabetes", &clinical_candidates());

	assert_eq!(response.retrieval_path, RetrievalPath::Lexical);
	assert!(!response.retrieved.is_empty());
}

#[test]
fn pairwise_trait_objects_share_the_lazy_handle() {
	struct Constant;
	impl PairwiseRelevanceScorer for Constant {
		fn score(&self, _: &str, documents: &[String]) -> medrag_service::Result<Vec<f32>> {
			Ok(vec![0.5; documents.len()])
		}
	}

	let builds = Arc::new(AtomicUsize::new(0));
	let counter = builds.clone();
	let pairwise: Arc<dyn PairwiseRelevanceScorer> =
		Arc::new(LazyProvider::new("constant", move || {
			counter.fetch_add(1, Ordering::SeqCst);

			Ok(Constant)
		}));
	let semantic: Arc<dyn SemanticScorer> = Arc::new(KeywordEmbedding::new());
	let first = service_with(semantic.clone(), pairwise.clone());
	let second = service_with(semantic, pairwise);

	let _ = first.search("insulin", &clinical_candidates());
	let _ = second.search("insulin", &clinical_candidates());

	assert_eq!(builds.load(Ordering::SeqCst), 1);
}
