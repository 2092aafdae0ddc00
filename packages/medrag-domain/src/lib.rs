pub mod document;
pub mod lexical;
pub mod synonyms;
pub mod text;

pub use document::Document;
pub use lexical::{LexicalBreakdown, LexicalScorer, LexicalWeights};
pub use synonyms::SynonymExpander;
