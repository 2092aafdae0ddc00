use std::sync::Arc;

use medrag_domain::Document;
use medrag_service::{RerankPath, RetrievalPath, SearchRequest, Unavailable, rerank};

use super::{
	KeywordEmbedding, LengthRerank, clinical_candidates, lexical_service, service_with, titles,
	unavailable_pairwise,
};

#[test]
fn ranked_documents_come_from_retrieved_set() {
	let service = service_with(Arc::new(KeywordEmbedding::new()), Arc::new(LengthRerank));
	let response = service.search("diabetes insulin", &clinical_candidates());

	assert_eq!(response.retrieval_path, RetrievalPath::Dense);
	assert_eq!(response.rerank_path, RerankPath::Pairwise);
	assert!(response.ranked.len() <= service.cfg.rerank.top_k as usize);

	for doc in &response.ranked {
		assert!(doc.relevance_score_1.is_some());
		assert!(doc.relevance_score_2.is_some());
		assert!(response.retrieved.iter().any(|candidate| candidate.title == doc.title));
	}
}

#[test]
fn pairwise_scores_reorder_shortlist() {
	let service = service_with(Arc::new(KeywordEmbedding::new()), Arc::new(LengthRerank));
	let documents = vec![
		Document::new("Short", "insulin"),
		Document::new("Long", "insulin pump outcomes over ten years"),
	];
	let response = service.search("insulin", &documents);

	assert_eq!(titles(&response.ranked), vec!["Long", "Short"]);
}

#[test]
fn unavailable_reranker_keeps_first_pass_order() {
	let service = lexical_service();
	let response = service.search("diabetes adults", &clinical_candidates());

	assert_eq!(response.retrieval_path, RetrievalPath::Lexical);
	assert_eq!(response.rerank_path, RerankPath::FirstPass);
	assert_eq!(
		titles(&response.ranked),
		titles(&response.retrieved[..response.ranked.len()]),
		"First-pass fallback must preserve retrieval order."
	);
	assert!(response.ranked.iter().all(|doc| doc.relevance_score_2.is_some()));
	assert!(response.ranked.iter().all(|doc| doc.relevance_score_2 == doc.relevance_score_1));
}

#[test]
fn empty_candidates_stay_empty() {
	let service = service_with(Arc::new(KeywordEmbedding::new()), Arc::new(LengthRerank));
	let response = service.search("diabetes", &[]);

	assert!(response.retrieved.is_empty());
	assert!(response.ranked.is_empty());
	assert!(rerank(&Unavailable, "diabetes", &[], 3).is_empty());
}

#[test]
fn request_overrides_configured_top_k() {
	let service = service_with(Arc::new(KeywordEmbedding::new()), unavailable_pairwise());
	let req: SearchRequest = serde_json::from_value(serde_json::json!({
		"query": "diabetes",
		"documents": [
			{ "title": "Diabetes", "abstract": "insulin" },
			{ "title": "Diabetes care", "abstract": "glucose" },
			{ "title": "Asthma", "abstract": "inhaler" }
		],
		"top_k": 2,
		"rerank_top_k": 1
	}))
	.expect("Request must deserialize.");
	let response = service.search_with(&req);

	assert_eq!(response.retrieved.len(), 2);
	assert_eq!(response.ranked.len(), 1);
}

#[test]
fn response_serializes_paths_in_snake_case() {
	let service = lexical_service();
	let response = service.search("diabetes", &clinical_candidates());
	let json = serde_json::to_value(&response).expect("Response must serialize.");

	assert_eq!(json["retrieval_path"], "lexical");
	assert_eq!(json["threshold"], "strict");
	assert_eq!(json["rerank_path"], "first_pass");
	assert!(json["ranked"][0]["relevance_score_1"].is_number());
	assert_eq!(json["ranked"][0]["relevance_score_2"], json["ranked"][0]["relevance_score_1"]);
}
