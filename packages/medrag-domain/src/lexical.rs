use std::collections::HashSet;

use medrag_config::{Config, Lexical};

use crate::{Document, synonyms::SynonymExpander, text};

/// Score given when the query has no usable tokens. Uniform, so it carries no ranking signal.
pub const NEUTRAL_SCORE: f32 = 0.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LexicalWeights {
	pub title: f32,
	pub synonym: f32,
	pub abstract_text: f32,
}
impl From<&Lexical> for LexicalWeights {
	fn from(cfg: &Lexical) -> Self {
		Self {
			title: cfg.title_weight,
			synonym: cfg.synonym_weight,
			abstract_text: cfg.abstract_weight,
		}
	}
}
impl Default for LexicalWeights {
	fn default() -> Self {
		Self::from(&Lexical::default())
	}
}

/// Per-document explanation of a lexical score.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LexicalBreakdown {
	/// Distinct query tokens found in the title.
	pub title_hits: usize,
	/// Distinct query tokens found in the abstract.
	pub abstract_hits: usize,
	/// Distinct synonym terms, not themselves query tokens, found in the title or abstract.
	pub synonym_hits: usize,
	pub score: f32,
}
impl LexicalBreakdown {
	pub fn is_rejected(&self) -> bool {
		self.title_hits == 0 && self.abstract_hits == 0 && self.synonym_hits == 0
	}
}

#[derive(Clone, Copy, Debug)]
pub struct LexicalScorer<'a> {
	weights: LexicalWeights,
	expander: SynonymExpander<'a>,
	min_token_len: usize,
}
impl<'a> LexicalScorer<'a> {
	pub fn new(weights: LexicalWeights, expander: SynonymExpander<'a>, min_token_len: usize) -> Self {
		Self { weights, expander, min_token_len }
	}

	pub fn from_config(cfg: &'a Config) -> Self {
		Self::new(
			LexicalWeights::from(&cfg.lexical),
			SynonymExpander::new(&cfg.synonyms),
			cfg.lexical.min_token_len,
		)
	}

	pub fn tokenize(&self, text: &str) -> Vec<String> {
		text::normalize_with_min_len(text, self.min_token_len)
	}

	pub fn score(
		&self,
		query_tokens: &[String],
		title_tokens: &[String],
		abstract_tokens: &[String],
	) -> f32 {
		self.breakdown(query_tokens, title_tokens, abstract_tokens).score
	}

	pub fn score_document(&self, query_tokens: &[String], document: &Document) -> LexicalBreakdown {
		let title_tokens = self.tokenize(&document.title);
		let abstract_tokens = self.tokenize(&document.abstract_text);

		self.breakdown(query_tokens, &title_tokens, &abstract_tokens)
	}

	/// Weighted title, abstract and synonym overlap divided by the query length.
	///
	/// A document sharing neither a literal token nor a synonym with the query scores exactly
	/// zero, whatever its length.
	pub fn breakdown(
		&self,
		query_tokens: &[String],
		title_tokens: &[String],
		abstract_tokens: &[String],
	) -> LexicalBreakdown {
		if query_tokens.is_empty() {
			return LexicalBreakdown { score: NEUTRAL_SCORE, ..LexicalBreakdown::default() };
		}

		let query = text::token_set(query_tokens);
		let title = text::token_set(title_tokens);
		let abstract_text = text::token_set(abstract_tokens);
		let title_hits = query.intersection(&title).count();
		let abstract_hits = query.intersection(&abstract_text).count();
		let mut synonym_matches = HashSet::new();

		for token in &query {
			for term in self.expander.expand(token) {
				let term = term.as_str();

				if query.contains(term) {
					continue;
				}
				if title.contains(term) || abstract_text.contains(term) {
					synonym_matches.insert(term);
				}
			}
		}

		let mut out = LexicalBreakdown {
			title_hits,
			abstract_hits,
			synonym_hits: synonym_matches.len(),
			score: 0.0,
		};

		if out.is_rejected() {
			return out;
		}

		let raw = title_hits as f32 * self.weights.title
			+ abstract_hits as f32 * self.weights.abstract_text
			+ out.synonym_hits as f32 * self.weights.synonym;

		out.score = raw / query_tokens.len() as f32;

		out
	}
}
