use medrag_config::Config;
use medrag_domain::{Document, text};

use crate::{Error, Result, SemanticScorer, retrieve::bm25, scoring};

/// Exhaustive nearest-neighbour index over squared L2 distance.
///
/// Built for one retrieval call and dropped with it.
#[derive(Clone, Debug)]
pub struct FlatL2Index {
	dim: usize,
	vectors: Vec<Vec<f32>>,
}
impl FlatL2Index {
	pub fn new(dim: usize) -> Self {
		Self { dim, vectors: Vec::new() }
	}

	pub fn len(&self) -> usize {
		self.vectors.len()
	}

	pub fn is_empty(&self) -> bool {
		self.vectors.is_empty()
	}

	pub fn add(&mut self, vector: Vec<f32>) -> Result<()> {
		self.check(&vector)?;
		self.vectors.push(vector);

		Ok(())
	}

	/// Distance from `query` to every stored vector, in insertion order.
	pub fn distances(&self, query: &[f32]) -> Result<Vec<f32>> {
		self.check(query)?;

		Ok(self.vectors.iter().map(|vector| squared_l2(vector, query)).collect())
	}

	fn check(&self, vector: &[f32]) -> Result<()> {
		if vector.len() != self.dim {
			return Err(Error::InvalidEmbedding {
				message: format!(
					"Embedding dimension mismatch. Expected {}, got {}.",
					self.dim,
					vector.len()
				),
			});
		}
		if vector.iter().any(|value| !value.is_finite()) {
			return Err(Error::InvalidEmbedding {
				message: "Embedding contains non-finite values.".to_string(),
			});
		}

		Ok(())
	}
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
	a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Dense similarity fused with BM25. Errors leave the caller free to fall back.
pub(super) fn retrieve(
	cfg: &Config,
	semantic: &dyn SemanticScorer,
	query: &str,
	query_tokens: &[String],
	documents: &[Document],
	top_k: usize,
) -> Result<Vec<Document>> {
	let mut inputs =
		documents.iter().map(|document| document.abstract_text.clone()).collect::<Vec<_>>();

	inputs.push(query.to_string());

	let mut vectors = semantic.encode(&inputs)?;

	if vectors.len() != inputs.len() {
		return Err(Error::InvalidEmbedding {
			message: format!(
				"Semantic scorer returned {} vectors for {} inputs.",
				vectors.len(),
				inputs.len()
			),
		});
	}

	let query_vector = vectors.pop().ok_or_else(|| Error::InvalidEmbedding {
		message: "Semantic scorer returned no query vector.".to_string(),
	})?;

	if query_vector.is_empty() {
		return Err(Error::InvalidEmbedding {
			message: "Semantic scorer returned zero-dimensional vectors.".to_string(),
		});
	}

	let mut index = FlatL2Index::new(query_vector.len());

	for vector in vectors {
		index.add(vector)?;
	}

	let similarity = index
		.distances(&query_vector)?
		.into_iter()
		.map(|distance| 1.0 / (1.0 + distance))
		.collect::<Vec<_>>();
	let document_tokens = documents
		.iter()
		.map(|document| {
			text::normalize_with_min_len(
				&format!("{} {}", document.title, document.abstract_text),
				cfg.lexical.min_token_len,
			)
		})
		.collect::<Vec<_>>();
	let lexical = bm25::score_documents(&cfg.retrieval.bm25, query_tokens, &document_tokens);
	let dense = scoring::min_max_normalize(&similarity);
	let lexical = scoring::min_max_normalize(&lexical);
	let fused = dense
		.iter()
		.zip(&lexical)
		.map(|(dense, lexical)| {
			cfg.retrieval.dense_weight * dense + cfg.retrieval.lexical_weight * lexical
		})
		.collect::<Vec<_>>();

	tracing::debug!(
		candidates = documents.len(),
		dim = query_vector.len(),
		"Dense retrieval completed."
	);

	Ok(scoring::rank_desc(&fused)
		.into_iter()
		.take(top_k)
		.map(|idx| documents[idx].with_relevance_score_1(fused[idx]))
		.collect())
}
