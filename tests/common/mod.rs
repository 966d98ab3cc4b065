#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use async_trait::async_trait;
use gptlm::error::{Error, Result};
use gptlm::request::{ChatRequest, ChatResponse};
use gptlm::ChatCompletion;

pub const PROMPT_TOKENS: u64 = 10;
pub const COMPLETION_TOKENS: u64 = 3;

pub fn init_logging()
{   let _ = env_logger::builder().is_test(true).try_init();
}

/// Scripted backend: replies in order, then repeats `fallback`.
/// Every request is captured for inspection.
#[derive(Clone)]
pub struct StubBackend
{   script: Arc<Mutex<VecDeque<Result<String>>>>
  , fallback: String
  , pub requests: Arc<Mutex<Vec<ChatRequest>>>
}

impl StubBackend
{   pub fn new<I, S>(script: I, fallback: &str) -> Self
    where
      I: IntoIterator<Item = S>,
      S: Into<String>,
    {   Self::with_results(
          script.into_iter().map(|s| Ok::<String, Error>(s.into())),
          fallback
        )
    }

    pub fn always(text: &str) -> Self
    {   Self::new(Vec::<String>::new(), text)
    }

    pub fn with_results<I>(script: I, fallback: &str) -> Self
    where
      I: IntoIterator<Item = Result<String>>,
    {   StubBackend
        {   script: Arc::new(Mutex::new(script.into_iter().collect()))
          , fallback: fallback.to_string()
          , requests: Arc::new(Mutex::new(vec![]))
        }
    }

    pub fn calls(&self) -> usize
    {   self.requests.lock().unwrap().len()
    }

    pub fn captured(&self) -> Vec<ChatRequest>
    {   self.requests.lock().unwrap().clone()
    }

    pub fn temperatures(&self) -> Vec<f32>
    {   self.captured().iter().map(|r| r.temperature).collect()
    }
}

#[async_trait]
impl ChatCompletion for StubBackend
{   async fn complete(&self, request: ChatRequest)
      -> Result<ChatResponse>
    {   self.requests.lock().unwrap().push(request);
        let next = self.script.lock().unwrap().pop_front();
        let text = match next
        {   Some(result) => result?
          , None => self.fallback.clone()
        };
        Ok(ChatResponse
        {   text
          , prompt_tokens: PROMPT_TOKENS
          , completion_tokens: COMPLETION_TOKENS
        })
    }
}

pub fn rate_limited() -> Result<String>
{   Err(Error::RateLimitExceeded)
}

pub fn strings(items: &[&str]) -> Vec<String>
{   items.iter().map(|s| s.to_string()).collect()
}
