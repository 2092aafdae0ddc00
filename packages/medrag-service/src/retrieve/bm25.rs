use std::collections::{HashMap, HashSet};

use medrag_config::Bm25;

/// Okapi BM25 of `query_tokens` against each tokenized document, in document order.
///
/// The collection statistics come from `documents` alone, so scores are only comparable within
/// one call.
pub(super) fn score_documents(
	params: &Bm25,
	query_tokens: &[String],
	documents: &[Vec<String>],
) -> Vec<f32> {
	let doc_count = documents.len();

	if doc_count == 0 || query_tokens.is_empty() {
		return vec![0.0; doc_count];
	}

	let total_len = documents.iter().map(Vec::len).sum::<usize>();
	let avg_len = if total_len == 0 { 1.0 } else { total_len as f32 / doc_count as f32 };
	let mut terms = Vec::new();
	let mut seen = HashSet::new();

	for token in query_tokens {
		if seen.insert(token.as_str()) {
			terms.push(token.as_str());
		}
	}

	let frequencies = documents
		.iter()
		.map(|tokens| {
			let mut tf: HashMap<&str, usize> = HashMap::new();

			for token in tokens {
				*tf.entry(token.as_str()).or_default() += 1;
			}

			tf
		})
		.collect::<Vec<_>>();
	let idf = terms
		.iter()
		.map(|term| {
			let containing = frequencies.iter().filter(|tf| tf.contains_key(term)).count();

			inverse_document_frequency(doc_count, containing)
		})
		.collect::<Vec<_>>();

	documents
		.iter()
		.zip(&frequencies)
		.map(|(tokens, tf)| {
			let length_norm = 1.0 - params.b + params.b * tokens.len() as f32 / avg_len;

			terms
				.iter()
				.zip(&idf)
				.map(|(term, idf)| {
					let freq = tf.get(term).copied().unwrap_or(0) as f32;

					if freq == 0.0 {
						return 0.0;
					}

					idf * freq * (params.k1 + 1.0) / (freq + params.k1 * length_norm)
				})
				.sum()
		})
		.collect()
}

fn inverse_document_frequency(doc_count: usize, containing: usize) -> f32 {
	let n = containing as f32;

	(1.0 + (doc_count as f32 - n + 0.5) / (n + 0.5)).ln()
}
