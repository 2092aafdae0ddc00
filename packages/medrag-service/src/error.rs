pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures of a preferred path. They never leave `retrieve` or `rerank`; the caller degrades to
/// the documented fallback instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Capability unavailable: {capability}")]
	Unavailable { capability: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Invalid embedding: {message}")]
	InvalidEmbedding { message: String },
	#[error("Invalid scores: {message}")]
	InvalidScores { message: String },
}
impl From<medrag_providers::Error> for Error {
	fn from(err: medrag_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}
