use std::path::Path;
use std::sync::Arc;
use async_trait::async_trait;
use log::{debug, error, info, trace};
use serde_json::json;
use crate::choice;
use crate::config::{ModelConfig, ProviderConfig};
use crate::error::{Error, Result};
use crate::measurements::Measurements;
use crate::providers::{ChatCompletion, OpenAiClient};
use crate::request::{ChatRequest, PromptTemplate};
use crate::request_log::RequestLog;
use crate::sampling::{AnswerExtractor, ChoiceExtractor, EscalationPolicy};
use crate::usage::{self, UsageStats};
use crate::{ChoiceOutcome, LanguageModel, SamplingRequest};

/// Log file used by `load_azure_model`
pub const AZURE_REQUEST_LOG: &str = "request_logs.json";

/// Language model adapter over a chat-completion backend.
///
/// Owns its usage counters; sampling takes `&mut self`, so share
/// an instance across tasks only behind a lock.
pub struct GptLanguageModel<C>
{   client: C
  , model_name: String
  , template: PromptTemplate
  , extractor: Arc<dyn AnswerExtractor>
  , policy: EscalationPolicy
  , measurements: Option<Arc<dyn Measurements>>
  , channel: String
  , request_log: Option<RequestLog>
  , stats: UsageStats
}

impl<C: ChatCompletion> GptLanguageModel<C>
{   pub fn new(client: C, model_name: impl Into<String>) -> Self
    {   let model_name = model_name.into();
        debug!("Creating GptLanguageModel for {}", model_name);
        GptLanguageModel
        {   client
          , model_name
          , template: PromptTemplate::default()
          , extractor: Arc::new(ChoiceExtractor)
          , policy: EscalationPolicy::default()
          , measurements: None
          , channel: crate::DEFAULT_STATS_CHANNEL.to_string()
          , request_log: None
          , stats: UsageStats::default()
        }
    }

    /// Adapter configured from a `ModelConfig`; truncates the
    /// request log if one is set
    pub fn from_config(client: C, config: ModelConfig)
      -> Result<Self>
    {   let mut model = Self::new(client, config.model_name);
        model.channel = config.stats_channel;
        if let Some(path) = config.request_logging_file
        {   model = model.with_request_log(path)?;
        }
        Ok(model)
    }

    pub fn with_template(mut self, template: PromptTemplate) -> Self
    {   self.template = template;
        self
    }

    pub fn with_extractor(
      mut self
    , extractor: Arc<dyn AnswerExtractor>
    ) -> Self
    {   self.extractor = extractor;
        self
    }

    pub fn with_policy(mut self, policy: EscalationPolicy)
      -> Result<Self>
    {   policy.validate()?;
        self.policy = policy;
        Ok(self)
    }

    pub fn with_measurements(
      mut self
    , measurements: Arc<dyn Measurements>
    , channel: impl Into<String>
    ) -> Self
    {   self.measurements = Some(measurements);
        self.channel = channel.into();
        self
    }

    pub fn with_request_log(mut self, path: impl AsRef<Path>)
      -> Result<Self>
    {   self.request_log = Some(RequestLog::create(path)?);
        Ok(self)
    }

    pub fn model_name(&self) -> &str
    {   &self.model_name
    }

    pub fn client(&self) -> &C
    {   &self.client
    }

    pub fn stats(&self) -> UsageStats
    {   self.stats
    }

    /// USD cost of everything sampled so far
    pub fn compute_cost(
      &self
    , input_token_cost: Option<f64>
    , output_token_cost: Option<f64>
    ) -> Result<f64>
    {   usage::estimate_cost(
          &self.stats,
          &self.model_name,
          input_token_cost,
          output_token_cost
        )
    }

    fn publish(&self, datum: serde_json::Value)
    {   if let Some(measurements) = &self.measurements
        {   measurements.publish_datum(&self.channel, datum);
        }
    }

    fn build_request(&self, request: SamplingRequest)
      -> Result<ChatRequest>
    {   let temperature = request.temperature;
        if !(crate::MIN_TEMPERATURE..=crate::MAX_TEMPERATURE)
          .contains(&temperature)
        {   error!("Temperature {} out of range", temperature);
            return Err(Error::InvalidRequest(format!(
              "temperature {} outside [{}, {}]",
              temperature,
              crate::MIN_TEMPERATURE,
              crate::MAX_TEMPERATURE
            )));
        }
        Ok(ChatRequest
        {   model: self.model_name.clone()
          , messages: self.template.render(&request.prompt)
          , temperature
          , max_tokens: request.max_tokens
              .min(crate::MAX_TOKENS_CEILING)
          , timeout: request.timeout
          , stop: request.terminators
          , seed: request.seed
        })
    }
}

#[async_trait]
impl<C: ChatCompletion> LanguageModel for GptLanguageModel<C>
{   async fn sample_text(&mut self, request: SamplingRequest)
      -> Result<String>
    {   let chat_request = self.build_request(request)?;
        trace!(
          "sample_text: {} messages, max_tokens {}",
          chat_request.messages.len(),
          chat_request.max_tokens
        );
        let messages = chat_request.messages.clone();

        let response = self.client.complete(chat_request).await?;
        self.stats.record(
          response.prompt_tokens,
          response.completion_tokens
        );

        if let Some(log) = &self.request_log
        {   if let Err(e) = log.append(&messages, &response.text).await
            {   error!(
                  "Failed to write request log {}: {}",
                  log.path().display(), e
                );
            }
        }

        self.publish(json!({
          "raw_text_length": response.text.chars().count()
        }));
        Ok(response.text)
    }

    async fn sample_choice(
      &mut self
    , prompt: &str
    , responses: &[String]
    , seed: Option<u64>
    ) -> Result<ChoiceOutcome>
    {   let policy = self.policy.clone();
        let extractor = Arc::clone(&self.extractor);
        let outcome = choice::resolve_choice(
          &mut *self,
          prompt,
          responses,
          seed,
          &policy,
          &*extractor
        ).await?;
        self.publish(json!({
          "choices_calls": outcome.attempts()
        }));
        Ok(outcome)
    }
}

/// Azure-backed adapter for `model_name` (default
/// `gpt-4o-mini`), credentials from `~/.env` and the
/// environment, logging requests to `request_logs.json`
pub fn load_azure_model(model_name: Option<&str>)
  -> Result<GptLanguageModel<OpenAiClient>>
{   let model_name = model_name
      .unwrap_or(crate::DEFAULT_AZURE_MODEL);
    info!("Loading Azure model {}", model_name);
    let client = OpenAiClient::new(ProviderConfig::azure_from_env()?)?;
    let mut config = ModelConfig::new(model_name);
    config.request_logging_file = Some(AZURE_REQUEST_LOG.into());
    GptLanguageModel::from_config(client, config)
}
