use std::collections::BTreeMap;

use medrag_config::Synonyms;

/// Read-only view over the configured synonym table.
///
/// Lookup is exact on the normalized token; there is no stemming, so "diabetic" does not
/// trigger the "diabetes" entry.
#[derive(Clone, Copy, Debug)]
pub struct SynonymExpander<'a> {
	terms: &'a BTreeMap<String, Vec<String>>,
}
impl<'a> SynonymExpander<'a> {
	pub fn new(synonyms: &'a Synonyms) -> Self {
		Self { terms: &synonyms.terms }
	}

	/// Related terms for `token`, in table order. Empty when `token` is not a concept key.
	pub fn expand(&self, token: &str) -> &'a [String] {
		self.terms.get(token).map(Vec::as_slice).unwrap_or(&[])
	}
}
