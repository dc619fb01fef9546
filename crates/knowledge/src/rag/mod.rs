//! RAG (Retrieval-Augmented Generation) answering.
//!
//! Retrieves the passages closest to a question, asks the language model
//! to answer from them, and maps the passages back to page citations.

pub mod ask;
pub mod citation;
pub mod retriever;
pub mod synthesizer;

pub use ask::{ask, ask_streaming};
pub use citation::CitationResolver;
pub use retriever::Retriever;
pub use synthesizer::{build_context, AnswerSynthesizer};
