use std::sync::{Arc, atomic::Ordering};

use medrag_domain::Document;
use medrag_service::{RetrievalPath, SemanticScorer, retrieve, retrieve_explained};

use super::{
	FailingEmbedding, KeywordEmbedding, NanEmbedding, TruncatingEmbedding, clinical_candidates,
	lexical_service, titles,
};

fn candidates() -> Vec<Document> {
	vec![
		Document::new("Insulin therapy", "insulin dosing"),
		Document::new("Hypertension", "blood pressure"),
		Document::new("Pneumonia", "lung imaging"),
	]
}

#[test]
fn fuses_dense_and_bm25_signals() {
	let service = lexical_service();
	let embedding = KeywordEmbedding::new();
	let outcome = retrieve_explained(&service.cfg, &embedding, "insulin therapy", &candidates(), 2);

	assert_eq!(outcome.path, RetrievalPath::Dense);
	assert_eq!(outcome.threshold, None);
	assert_eq!(titles(&outcome.documents), vec!["Insulin therapy", "Hypertension"]);
	assert_eq!(outcome.documents[0].relevance_score_1, Some(1.0));
	assert_eq!(outcome.documents[1].relevance_score_1, Some(0.0));
}

#[test]
fn encodes_abstracts_and_query_in_one_call() {
	let service = lexical_service();
	let embedding = KeywordEmbedding::new();
	let _ = retrieve(&service.cfg, &embedding, "insulin", &candidates(), 3);

	assert_eq!(embedding.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn runs_for_queries_without_lexical_tokens() {
	let service = lexical_service();
	let embedding = KeywordEmbedding::new();
	let outcome = retrieve_explained(&service.cfg, &embedding, "of", &candidates(), 3);

	assert_eq!(outcome.path, RetrievalPath::Dense);
	assert_eq!(outcome.documents.len(), 3);
}

#[test]
fn failing_encoder_degrades_to_lexical_ranking() {
	let service = lexical_service();
	let documents = clinical_candidates();
	let failures: [Arc<dyn SemanticScorer>; 3] =
		[Arc::new(FailingEmbedding), Arc::new(TruncatingEmbedding), Arc::new(NanEmbedding)];
	let expected = retrieve_explained(
		&service.cfg,
		service.providers.semantic.as_ref(),
		"diabetes adults",
		&documents,
		3,
	);

	assert_eq!(expected.path, RetrievalPath::Lexical);

	for semantic in failures {
		let outcome =
			retrieve_explained(&service.cfg, semantic.as_ref(), "diabetes adults", &documents, 3);

		assert_eq!(outcome.path, RetrievalPath::Lexical);
		assert_eq!(outcome.threshold, expected.threshold);
		assert_eq!(outcome.documents, expected.documents);
	}
}

#[test]
fn dense_ranking_is_repeatable() {
	let service = lexical_service();
	let embedding = KeywordEmbedding::new();
	let documents = clinical_candidates();
	let first = retrieve(&service.cfg, &embedding, "insulin lung", &documents, 4);
	let second = retrieve(&service.cfg, &embedding, "insulin lung", &documents, 4);

	assert_eq!(first, second);
	assert_eq!(first.len(), 4);
}
