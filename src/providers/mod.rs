//! Chat-completion backends

pub mod openai;

use async_trait::async_trait;
use crate::error::Result;
use crate::request::{ChatRequest, ChatResponse};

// Re-export for convenience
pub use openai::OpenAiClient;

/// A remote service that turns a message sequence into text
/// plus token usage. Transport, auth and any retry of its own
/// live behind this trait.
#[async_trait]
pub trait ChatCompletion: Send + Sync
{   async fn complete(&self, request: ChatRequest)
      -> Result<ChatResponse>;
}
