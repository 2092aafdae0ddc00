pub mod lazy;
pub mod rerank;
pub mod retrieve;
pub mod scoring;
pub mod search;

mod error;

pub use error::{Error, Result};
pub use lazy::LazyProvider;
pub use rerank::{RerankOutcome, RerankPath, rerank, rerank_explained};
pub use retrieve::{RetrievalOutcome, RetrievalPath, ThresholdStage, retrieve, retrieve_explained};
pub use search::{SearchRequest, SearchResponse};

use std::sync::Arc;

use medrag_config::Config;
use medrag_domain::Document;
use medrag_providers::{EmbeddingClient, RerankClient};

/// Bi-encoder capability: one vector per input text, in input order.
pub trait SemanticScorer
where
	Self: Send + Sync,
{
	fn is_available(&self) -> bool {
		true
	}

	fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Cross-encoder capability: one relevance score per `(query, document)` pair, in input order.
pub trait PairwiseRelevanceScorer
where
	Self: Send + Sync,
{
	fn is_available(&self) -> bool {
		true
	}

	fn score(&self, query: &str, documents: &[String]) -> Result<Vec<f32>>;
}

/// Stands in for a capability that is not installed or not configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unavailable;
impl SemanticScorer for Unavailable {
	fn is_available(&self) -> bool {
		false
	}

	fn encode(&self, _: &[String]) -> Result<Vec<Vec<f32>>> {
		Err(Error::Unavailable { capability: "semantic scorer".to_string() })
	}
}
impl PairwiseRelevanceScorer for Unavailable {
	fn is_available(&self) -> bool {
		false
	}

	fn score(&self, _: &str, _: &[String]) -> Result<Vec<f32>> {
		Err(Error::Unavailable { capability: "pairwise relevance scorer".to_string() })
	}
}

impl SemanticScorer for EmbeddingClient {
	fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
		Ok(self.embed(texts)?)
	}
}

impl PairwiseRelevanceScorer for RerankClient {
	fn score(&self, query: &str, documents: &[String]) -> Result<Vec<f32>> {
		Ok(self.rerank(query, documents)?)
	}
}

#[derive(Clone)]
pub struct Providers {
	pub semantic: Arc<dyn SemanticScorer>,
	pub pairwise: Arc<dyn PairwiseRelevanceScorer>,
}
impl Providers {
	pub fn new(
		semantic: Arc<dyn SemanticScorer>,
		pairwise: Arc<dyn PairwiseRelevanceScorer>,
	) -> Self {
		Self { semantic, pairwise }
	}

	pub fn unavailable() -> Self {
		Self { semantic: Arc::new(Unavailable), pairwise: Arc::new(Unavailable) }
	}

	/// HTTP-backed scorers for every configured provider section. Clients are built on first use.
	pub fn from_config(cfg: &Config) -> Self {
		let semantic: Arc<dyn SemanticScorer> = match cfg.providers.embedding.clone() {
			Some(embedding) => Arc::new(LazyProvider::new("embedding", move || {
				Ok(EmbeddingClient::new(&embedding)?)
			})),
			None => Arc::new(Unavailable),
		};
		let pairwise: Arc<dyn PairwiseRelevanceScorer> = match cfg.providers.rerank.clone() {
			Some(rerank) =>
				Arc::new(LazyProvider::new("rerank", move || Ok(RerankClient::new(&rerank)?))),
			None => Arc::new(Unavailable),
		};

		Self { semantic, pairwise }
	}
}
impl Default for Providers {
	fn default() -> Self {
		Self::unavailable()
	}
}

pub struct MedragService {
	pub cfg: Config,
	pub providers: Providers,
}
impl MedragService {
	pub fn new(cfg: Config) -> Self {
		let providers = Providers::from_config(&cfg);

		Self { cfg, providers }
	}

	pub fn with_providers(cfg: Config, providers: Providers) -> Self {
		Self { cfg, providers }
	}

	pub fn retrieve(&self, query: &str, documents: &[Document], top_k: usize) -> Vec<Document> {
		retrieve::retrieve(&self.cfg, self.providers.semantic.as_ref(), query, documents, top_k)
	}

	pub fn rerank(&self, query: &str, documents: &[Document], top_k: usize) -> Vec<Document> {
		rerank::rerank(self.providers.pairwise.as_ref(), query, documents, top_k)
	}
}
