pub mod error;
pub mod config;
pub mod providers;
pub mod request;
pub mod request_log;
pub mod sampling;
pub mod choice;
pub mod measurements;
pub mod usage;
pub mod model;

use std::collections::BTreeMap;
use std::time::Duration;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use error::{Error, Result};
pub use model::{load_azure_model, GptLanguageModel};
pub use providers::{ChatCompletion, OpenAiClient};
pub use request::{ChatMessage, PromptTemplate, Role};

// ===== Defaults =====

/// Backend ceiling; larger requests are clamped to this
pub const MAX_TOKENS_CEILING: usize = 4000;
pub const DEFAULT_MAX_TOKENS: usize = 5000;
pub const DEFAULT_TEMPERATURE: f32 = 0.5;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 60;
pub const DEFAULT_STATS_CHANNEL: &str = "language_model_stats";
pub const DEFAULT_AZURE_MODEL: &str = "gpt-4o-mini";
pub const MIN_TEMPERATURE: f32 = 0.0;
pub const MAX_TEMPERATURE: f32 = 2.0;

// ===== LanguageModel =====

/// Free-text completion and constrained multiple choice
#[async_trait]
pub trait LanguageModel: Send
{   /// Generated continuation of `request.prompt`
    async fn sample_text(&mut self, request: SamplingRequest)
      -> Result<String>;

    /// Steers the model into answering with exactly one of
    /// `responses`
    async fn sample_choice(
      &mut self
    , prompt: &str
    , responses: &[String]
    , seed: Option<u64>
    ) -> Result<ChoiceOutcome>;
}

// ===== Structures =====

/// Parameters for one free-text completion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingRequest
{   /// The prompt text
    pub prompt: String
  , /// Max tokens to generate, clamped to MAX_TOKENS_CEILING
    pub max_tokens: usize
  , /// Stop sequences
    pub terminators: Vec<String>
  , /// Temperature for sampling
    pub temperature: f32
  , /// Per-call timeout
    pub timeout: Duration
  , /// Seed, where the backend supports it
    pub seed: Option<u64>
}

impl SamplingRequest
{   pub fn new(prompt: impl Into<String>) -> Self
    {   SamplingRequest
        {   prompt: prompt.into()
          , max_tokens: DEFAULT_MAX_TOKENS
          , terminators: vec![]
          , temperature: DEFAULT_TEMPERATURE
          , timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS)
          , seed: None
        }
    }

    pub fn max_tokens(mut self, max_tokens: usize) -> Self
    {   self.max_tokens = max_tokens;
        self
    }

    pub fn terminators<I, S>(mut self, terminators: I) -> Self
    where
      I: IntoIterator<Item = S>,
      S: Into<String>,
    {   self.terminators
          = terminators.into_iter().map(Into::into).collect();
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self
    {   self.temperature = temperature;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self
    {   self.timeout = timeout;
        self
    }

    pub fn seed(mut self, seed: Option<u64>) -> Self
    {   self.seed = seed;
        self
    }
}

/// A successful multiple choice resolution
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceOutcome
{   /// Position of the match in the candidate list
    pub index: usize
  , /// The candidate string itself
    pub response: String
  , /// Diagnostics: "attempts" (zero-based index of the
    /// successful attempt) and "temperature"
    pub debug: BTreeMap<String, f64>
}

impl ChoiceOutcome
{   /// Zero-based index of the attempt that matched
    pub fn attempts(&self) -> usize
    {   self.debug
          .get(choice::ATTEMPTS_KEY)
          .map(|a| *a as usize)
          .unwrap_or_default()
    }
}
