//! Unified chat request and response types for gptlm

use std::time::Duration;
use serde::{Deserialize, Serialize};

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role
{   System
  , User
  , Assistant
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage
{   pub role: Role
  , pub content: String
}

impl ChatMessage
{   pub fn new(role: Role, content: impl Into<String>) -> Self
    {   ChatMessage
        {   role
          , content: content.into()
        }
    }

    pub fn system(content: impl Into<String>) -> Self
    {   Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self
    {   Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self
    {   Self::new(Role::Assistant, content)
    }
}

/// Everything the chat-completion backend needs for one call
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest
{   /// Model (or Azure deployment) identifier
    pub model: String
  , /// Ordered conversation, caller prompt last
    pub messages: Vec<ChatMessage>
  , /// Sampling temperature
    pub temperature: f32
  , /// Max tokens to generate, already capped
    pub max_tokens: usize
  , /// Per-call timeout
    pub timeout: Duration
  , /// Stop sequences
    pub stop: Vec<String>
  , /// Seed for backends that support reproducible sampling
    pub seed: Option<u64>
}

/// Generated text plus the usage the backend reported for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatResponse
{   pub text: String
  , pub prompt_tokens: u64
  , pub completion_tokens: u64
}

/// Messages placed in front of every caller prompt.
///
/// The default is a few-shot scaffold teaching the model to continue
/// the user's sentence instead of repeating it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptTemplate
{   pub preamble: Vec<ChatMessage>
}

impl PromptTemplate
{   pub fn new(preamble: Vec<ChatMessage>) -> Self
    {   PromptTemplate { preamble }
    }

    /// A template that sends the caller prompt on its own
    pub fn empty() -> Self
    {   PromptTemplate { preamble: vec![] }
    }

    /// Preamble followed by `prompt` as the final user message
    pub fn render(&self, prompt: &str) -> Vec<ChatMessage>
    {   let mut messages
          = Vec::with_capacity(self.preamble.len() + 1);
        messages.extend(self.preamble.iter().cloned());
        messages.push(ChatMessage::user(prompt));
        messages
    }
}

impl Default for PromptTemplate
{   fn default() -> Self
    {   PromptTemplate
        {   preamble: vec![
              ChatMessage::system(
                "You always continue sentences provided \
                 by the user and you never repeat what \
                 the user already said."
              )
            , ChatMessage::user(
                "Question: Is Jake a turtle?\nAnswer: Jake is "
              )
            , ChatMessage::assistant("not a turtle.")
            , ChatMessage::user(
                "Question: What is Priya doing right now?\n\
                 Answer: Priya is currently "
              )
            , ChatMessage::assistant("sleeping.")
            ]
        }
    }
}
