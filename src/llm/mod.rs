//! LLM provider abstraction layer.
//!
//! Shelf transcription and the library assistant both talk to the model
//! through [`LlmProvider`], so any OpenAI-compatible backend can be plugged in.

mod openai;
mod provider;
mod types;

pub use openai::OpenAIProvider;
pub use provider::{CompletionOptions, LlmError, LlmProvider};
pub use types::{CompletionResponse, FinishReason, ImageAttachment, Message, MessageRole, TokenUsage};
