//! Deckhand runtime: conversation state, completion backends and the tool
//! dispatch loop.
//!
//! # Overview
//!
//! - **Session**: owns the [`Conversation`] and drives the loop: read a user
//!   line, ask the backend for a completion, run any requested tools, and ask
//!   again until the model answers in plain text.
//! - **Backend**: a trait abstracting the completion endpoint;
//!   [`OpenAiBackend`] speaks the OpenAI-compatible chat completions protocol.
//! - **Registry**: the tools the model may call, from the `tools` crate.
//!
//! # Example
//!
//! ```ignore
//! use runtime::{OpenAiBackend, Session};
//!
//! # async fn example() -> runtime::Result<()> {
//! let backend = OpenAiBackend::builder("gsk_...").build();
//! let registry = tools::builtin().expect("built-in tool names are unique");
//!
//! let mut session = Session::new(backend, registry);
//! session.run(&mut std::io::stdin().lock(), &mut ()).await?;
//! # Ok(())
//! # }
//! ```

mod conversation;
mod error;
pub mod llm;
mod providers;
mod session;

pub use conversation::Conversation;
pub use error::{Error, Result};
pub use llm::{Backend, ModelError, ModelRequest, ModelResponse, ToolCall, Turn, Usage};
pub use providers::{
    DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, OpenAiBackend, OpenAiBackendBuilder,
};
pub use session::{Observer, Session, State, UserInput};
