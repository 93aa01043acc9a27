//! Per-file summarization through an external text-generation service.

pub mod backend;
pub mod client;
pub mod fence;
pub mod gemini;
pub mod prompt;

pub use backend::{BackendError, SummarizationBackend};
pub use client::SummarizationClient;
pub use fence::strip_code_fence;
pub use gemini::GeminiBackend;
