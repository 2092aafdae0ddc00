use std::sync::OnceLock;

use crate::{Error, PairwiseRelevanceScorer, Result, SemanticScorer};

type Init<T> = Box<dyn Fn() -> Result<T> + Send + Sync>;

/// A capability handle constructed on first use.
///
/// Concurrent first uses run the constructor once and all observe the same outcome. A failed
/// construction is cached as unavailable and never retried.
pub struct LazyProvider<T> {
	label: &'static str,
	init: Init<T>,
	cell: OnceLock<Option<T>>,
}
impl<T> LazyProvider<T> {
	pub fn new<F>(label: &'static str, init: F) -> Self
	where
		F: Fn() -> Result<T> + Send + Sync + 'static,
	{
		Self { label, init: Box::new(init), cell: OnceLock::new() }
	}

	pub fn get(&self) -> Option<&T> {
		self.cell
			.get_or_init(|| match (self.init)() {
				Ok(inner) => {
					tracing::debug!(provider = self.label, "Provider initialized.");

					Some(inner)
				},
				Err(err) => {
					tracing::warn!(
						provider = self.label,
						error = %err,
						"Provider initialization failed. Capability disabled for this process."
					);

					None
				},
			})
			.as_ref()
	}

	pub fn is_initialized(&self) -> bool {
		self.cell.get().is_some()
	}

	fn unavailable(&self) -> Error {
		Error::Unavailable { capability: self.label.to_string() }
	}
}

impl<T> SemanticScorer for LazyProvider<T>
where
	T: SemanticScorer,
{
	fn is_available(&self) -> bool {
		self.get().is_some_and(|inner| inner.is_available())
	}

	fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
		self.get().ok_or_else(|| self.unavailable())?.encode(texts)
	}
}

impl<T> PairwiseRelevanceScorer for LazyProvider<T>
where
	T: PairwiseRelevanceScorer,
{
	fn is_available(&self) -> bool {
		self.get().is_some_and(|inner| inner.is_available())
	}

	fn score(&self, query: &str, documents: &[String]) -> Result<Vec<f32>> {
		self.get().ok_or_else(|| self.unavailable())?.score(query, documents)
	}
}
