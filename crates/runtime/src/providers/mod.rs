//! Completion endpoint adapters.
//!
//! Each provider implements [`Backend`](crate::llm::Backend) for its wire
//! protocol.

mod openai;

pub use openai::{
    DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, OpenAiBackend, OpenAiBackendBuilder,
};
