//! LLM inference API integration for the assistant page.
//!
//! The provider's streaming protocol is consumed as an opaque, finite
//! sequence of text fragments; nothing here restarts or rewinds a stream.

mod client;
mod error;
pub mod types;

pub use client::LlmClient;
pub use error::LlmError;
