use medrag_domain::{Document, lexical::NEUTRAL_SCORE};
use medrag_service::{RetrievalPath, ThresholdStage, Unavailable, retrieve, retrieve_explained};

use super::{clinical_candidates, lexical_service, titles};

#[test]
fn keeps_only_overlapping_document() {
	let service = lexical_service();
	let documents = vec![
		Document::new("Diabetes", "insulin"),
		Document::new("Hypertension in older adults", "Blood pressure targets in a cohort."),
	];
	let outcome =
		retrieve_explained(&service.cfg, &Unavailable, "diabetes treatment", &documents, 10);

	assert_eq!(outcome.path, RetrievalPath::Lexical);
	assert_eq!(outcome.threshold, Some(ThresholdStage::Strict));
	assert_eq!(titles(&outcome.documents), vec!["Diabetes"]);

	// (title 3.0 + synonym 1.5) / 2 query tokens
	let score = outcome.documents[0].relevance_score_1.expect("Score must be attached.");

	assert!((score - 2.25).abs() < 1e-6, "Unexpected score: {score}");
}

#[test]
fn empty_query_returns_leading_candidates_with_neutral_score() {
	let service = lexical_service();
	let documents = clinical_candidates();
	let outcome = retrieve_explained(&service.cfg, &Unavailable, "", &documents, 3);

	assert_eq!(outcome.path, RetrievalPath::Neutral);
	assert_eq!(outcome.documents.len(), 3);
	assert_eq!(
		titles(&outcome.documents),
		titles(&documents[..3]),
		"Neutral retrieval must keep input order."
	);
	assert!(outcome.documents.iter().all(|doc| doc.relevance_score_1 == Some(NEUTRAL_SCORE)));
}

#[test]
fn query_without_usable_tokens_is_neutral() {
	let service = lexical_service();
	let outcome =
		retrieve_explained(&service.cfg, &Unavailable, "of a ?", &clinical_candidates(), 2);

	assert_eq!(outcome.path, RetrievalPath::Neutral);
	assert_eq!(outcome.documents.len(), 2);
}

#[test]
fn weak_evidence_is_still_returned() {
	let service = lexical_service();
	let documents = vec![
		Document::new("Unrelated", "Nothing here matches."),
		Document::new("Registry report", "Mortality was tracked for a year."),
	];
	let outcome = retrieve_explained(
		&service.cfg,
		&Unavailable,
		"pneumonia outcomes mortality cohort",
		&documents,
		10,
	);

	assert_eq!(outcome.threshold, Some(ThresholdStage::Unfiltered));
	assert_eq!(titles(&outcome.documents), vec!["Registry report"]);
	assert_eq!(outcome.documents[0].relevance_score_1, Some(0.25));
}

#[test]
fn weak_synonym_match_excludes_rejected_documents() {
	let service = lexical_service();
	let documents = vec![
		Document::new("Insulin pumps", "Adherence over two years."),
		Document::new("Hypertension", "Blood pressure targets."),
	];
	let outcome = retrieve_explained(
		&service.cfg,
		&Unavailable,
		"diabetes treatment outcomes management",
		&documents,
		10,
	);

	// synonym 1.5 / 4 query tokens
	assert_eq!(outcome.threshold, Some(ThresholdStage::Unfiltered));
	assert_eq!(titles(&outcome.documents), vec!["Insulin pumps"]);
	assert_eq!(outcome.documents[0].relevance_score_1, Some(0.375));
}

#[test]
fn all_rejected_candidates_still_return_something() {
	let service = lexical_service();
	let documents = vec![
		Document::new("Hospital staffing", "Nurse rosters."),
		Document::new("Hypertension", "Blood pressure targets."),
		Document::new("Asthma", "Inhaler technique."),
	];
	let outcome = retrieve_explained(&service.cfg, &Unavailable, "sepsis", &documents, 2);

	assert_eq!(outcome.threshold, Some(ThresholdStage::Unfiltered));
	assert_eq!(titles(&outcome.documents), vec!["Hospital staffing", "Hypertension"]);
	assert!(outcome.documents.iter().all(|doc| doc.relevance_score_1 == Some(0.0)));
}

#[test]
fn rejected_documents_are_dropped_when_anything_matches() {
	let service = lexical_service();
	let documents = clinical_candidates();

	for query in ["diabetes", "asthma inhaler adherence", "lung pneumonia", "blood pressure"] {
		let ranked = retrieve(&service.cfg, &Unavailable, query, &documents, documents.len());
		let scores =
			ranked.iter().map(|doc| doc.relevance_score_1.unwrap_or(0.0)).collect::<Vec<_>>();

		assert!(!ranked.is_empty(), "Query {query:?} returned nothing.");
		assert!(
			scores.windows(2).all(|pair| pair[0] >= pair[1]),
			"Scores must be non-increasing for {query:?}: {scores:?}"
		);
		if scores.iter().any(|score| *score > 0.0) {
			assert!(
				scores.iter().all(|score| *score > 0.0),
				"Rejected documents returned next to matches for {query:?}: {scores:?}"
			);
		}
	}
}

#[test]
fn never_returns_more_than_requested_or_available() {
	let service = lexical_service();
	let documents = clinical_candidates();

	for top_k in 0..8 {
		let ranked = retrieve(&service.cfg, &Unavailable, "diabetes adults", &documents, top_k);

		assert!(ranked.len() <= top_k);
		assert!(ranked.len() <= documents.len());
		if top_k > 0 {
			assert!(!ranked.is_empty());
		}
	}
}

#[test]
fn repeated_calls_are_identical() {
	let service = lexical_service();
	let documents = clinical_candidates();
	let first = retrieve(&service.cfg, &Unavailable, "diabetes adults", &documents, 3);
	let second = retrieve(&service.cfg, &Unavailable, "diabetes adults", &documents, 3);

	assert_eq!(first, second);
}

#[test]
fn ties_keep_candidate_order() {
	let service = lexical_service();
	let documents = vec![
		Document::new("Stroke", "first"),
		Document::new("Other", "none"),
		Document::new("Stroke", "second"),
	];
	let ranked = retrieve(&service.cfg, &Unavailable, "stroke", &documents, 3);

	assert_eq!(ranked.len(), 2);
	assert_eq!(ranked[0].abstract_text, "first");
	assert_eq!(ranked[1].abstract_text, "second");
}

#[test]
fn caller_documents_are_left_untouched() {
	let service = lexical_service();
	let documents = clinical_candidates();
	let snapshot = documents.clone();
	let _ = retrieve(&service.cfg, &Unavailable, "diabetes", &documents, 3);

	assert_eq!(documents, snapshot);
	assert!(documents.iter().all(|doc| doc.relevance_score_1.is_none()));
}
