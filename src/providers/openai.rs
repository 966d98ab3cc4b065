use std::time::Duration;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use log::{debug, trace, error};
use crate::config::{ApiFlavor, ProviderConfig};
use crate::error::{Error, Result};
use crate::request::{ChatMessage, ChatRequest, ChatResponse};

// ===== Wire Types =====

#[derive(Debug, Clone, Serialize)]
pub struct WireChatRequest
{   #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>
  , pub messages: Vec<ChatMessage>
  , pub temperature: f32
  , pub max_tokens: usize
  , #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stop: Vec<String>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>
}

impl WireChatRequest
{   /// Azure selects the model through the deployment path,
    /// so the body leaves it out
    pub fn build(flavor: ApiFlavor, request: &ChatRequest) -> Self
    {   WireChatRequest
        {   model: match flavor
            {   ApiFlavor::OpenAi => Some(request.model.clone())
              , ApiFlavor::Azure => None
            }
          , messages: request.messages.clone()
          , temperature: request.temperature
          , max_tokens: request.max_tokens
          , stop: request.stop.clone()
          , seed: request.seed
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireChatResponse
{   pub choices: Vec<Choice>
  , #[serde(default)]
    pub usage: Option<Usage>
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice
{   pub message: ResponseMessage
  , pub finish_reason: Option<String>
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage
{   #[serde(default)]
    pub content: Option<String>
}

#[derive(Debug, Clone, Deserialize)]
pub struct Usage
{   pub prompt_tokens: u64
  , pub completion_tokens: u64
}

impl WireChatResponse
{   /// First choice text plus reported usage
    pub fn into_chat_response(self) -> Result<ChatResponse>
    {   let (prompt_tokens, completion_tokens) = self.usage
          .map(|u| (u.prompt_tokens, u.completion_tokens))
          .unwrap_or((0, 0));
        let choice = self.choices.into_iter().next()
          .ok_or_else(|| {
            error!("No choices in response");
            Error::NoChoicesInResponse
          })?;
        trace!("finish_reason: {:?}", choice.finish_reason);
        Ok(ChatResponse
        {   text: choice.message.content.unwrap_or_default()
          , prompt_tokens
          , completion_tokens
        })
    }
}

// ===== OpenAI / Azure Client =====

/// reqwest-backed chat-completion client for OpenAI and
/// Azure OpenAI
pub struct OpenAiClient
{   config: ProviderConfig
  , http_client: reqwest::Client
}

impl OpenAiClient
{   pub fn new(config: ProviderConfig) -> Result<Self>
    {   config.validate()?;
        debug!(
          "Creating OpenAiClient ({:?}) for {}",
          config.flavor, config.api_base
        );
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs
        {   builder = builder
              .connect_timeout(Duration::from_secs(secs));
        }
        let http_client = builder.build().map_err(|e| {
          error!("Failed to build HTTP client: {}", e);
          Error::HttpError(e.to_string())
        })?;
        Ok(OpenAiClient
        {   config
          , http_client
        })
    }

    pub fn config(&self) -> &ProviderConfig
    {   &self.config
    }

    /// Chat completions URL for `model`
    pub fn endpoint_url(&self, model: &str) -> String
    {   let base = self.config.api_base.trim_end_matches('/');
        match self.config.flavor
        {   ApiFlavor::OpenAi => {
              format!("{}/chat/completions", base)
            }
          , ApiFlavor::Azure => {
              format!(
                "{}/openai/deployments/{}/chat/completions\
                 ?api-version={}",
                base,
                model,
                self.config.api_version.as_deref()
                  .unwrap_or(crate::config::AZURE_API_VERSION)
              )
            }
        }
    }
}

#[async_trait]
impl super::ChatCompletion for OpenAiClient
{   async fn complete(&self, request: ChatRequest)
      -> Result<ChatResponse>
    {   debug!("Sending chat completion for: {}", request.model);

        let url = self.endpoint_url(&request.model);
        let body = WireChatRequest::build(
          self.config.flavor, &request
        );
        trace!("Chat request: {:?}", body);

        let builder = self.http_client
          .post(url)
          .timeout(request.timeout)
          .header("Content-Type", "application/json")
          .json(&body);
        let builder = match self.config.flavor
        {   ApiFlavor::OpenAi => builder.header(
              "Authorization",
              format!("Bearer {}", self.config.api_key)
            )
          , ApiFlavor::Azure => builder.header(
              "api-key", self.config.api_key.as_str()
            )
        };

        let response = builder
          .send()
          .await
          .map_err(|e| {
            if e.is_timeout()
            {   error!("Request timed out: {}", e);
                Error::Timeout
            } else
            {   error!("HTTP error: {}", e);
                Error::HttpError(e.to_string())
            }
          })?;

        let status = response.status();
        trace!("Chat response status: {}", status);

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS
        {   error!("Rate limited by {}", self.config.api_base);
            return Err(Error::RateLimitExceeded);
        }

        if !status.is_success()
        {   let error_text = response.text().await
              .unwrap_or_else(|_|
                "Unknown error".to_string()
              );
            error!("API error {}: {}", status, error_text);
            return Err(Error::ApiError(
              format!("{}: {}", status, error_text)
            ));
        }

        let chat_response: WireChatResponse
          = response.json().await.map_err(|e| {
            if e.is_timeout()
            {   error!("Timed out reading response: {}", e);
                Error::Timeout
            } else
            {   error!("Parse error: {}", e);
                Error::ParseError(e.to_string())
            }
          })?;

        chat_response.into_chat_response()
    }
}
