use std::collections::HashSet;

use unicode_normalization::UnicodeNormalization;

/// Tokens shorter than this carry too little signal ("of", "in", "a").
pub const MIN_TOKEN_LEN: usize = 3;

pub fn normalize(text: &str) -> Vec<String> {
	normalize_with_min_len(text, MIN_TOKEN_LEN)
}

/// Lowercases, maps everything outside `[a-z0-9]` to a space and keeps tokens of at least
/// `min_len` bytes in their original order.
///
/// NFKC runs before the ASCII filter, so compatibility characters are folded instead of being
/// split on: fullwidth "ＣＯＶＩＤ" becomes "covid" and the subscript in "HbA₁c" becomes "hba1c".
/// Without the fold both would turn into separators. Letters that have no ASCII compatibility
/// form, such as "ö", are still separators.
pub fn normalize_with_min_len(text: &str, min_len: usize) -> Vec<String> {
	let mut normalized = String::with_capacity(text.len());

	for ch in text.nfkc() {
		let ch = ch.to_ascii_lowercase();

		if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
			normalized.push(ch);
		} else {
			normalized.push(' ');
		}
	}

	normalized
		.split_whitespace()
		.filter(|token| token.len() >= min_len)
		.map(str::to_string)
		.collect()
}

pub fn token_set(tokens: &[String]) -> HashSet<&str> {
	tokens.iter().map(String::as_str).collect()
}
