mod common;

use std::time::Duration;
use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use gptlm::config::{ApiFlavor, ModelConfig, ProviderConfig};
use gptlm::error::Error;
use gptlm::providers::openai::{WireChatRequest, WireChatResponse};
use gptlm::request::{ChatMessage, ChatRequest};
use gptlm::{GptLanguageModel, LanguageModel, OpenAiClient, SamplingRequest};
use common::{strings, StubBackend};

fn azure_config() -> ProviderConfig
{   ProviderConfig
    {   flavor: ApiFlavor::Azure
      , api_key: "test-key".to_string()
      , api_base: "https://example.openai.azure.com/".to_string()
      , api_version: Some("2024-02-01".to_string())
      , timeout_secs: Some(10)
    }
}

fn openai_config() -> ProviderConfig
{   ProviderConfig
    {   flavor: ApiFlavor::OpenAi
      , api_key: "test-key".to_string()
      , api_base: gptlm::config::OPENAI_API_BASE.to_string()
      , api_version: None
      , timeout_secs: None
    }
}

fn chat_request(seed: Option<u64>, stop: Vec<String>) -> ChatRequest
{   ChatRequest
    {   model: "gpt-4o-mini".to_string()
      , messages: vec![ChatMessage::user("Hello")]
      , temperature: 0.0
      , max_tokens: 100
      , timeout: Duration::from_secs(60)
      , stop
      , seed
    }
}

#[test]
fn test_client_creation_endpoints()
{   let azure = assert_ok!(OpenAiClient::new(azure_config()));
    assert_eq!(
      azure.endpoint_url("gpt-4o-mini"),
      "https://example.openai.azure.com/openai/deployments/gpt-4o-mini\
       /chat/completions?api-version=2024-02-01"
    );

    let openai = assert_ok!(OpenAiClient::new(openai_config()));
    assert_eq!(
      openai.endpoint_url("gpt-4o"),
      "https://api.openai.com/v1/chat/completions"
    );
}

#[test]
fn test_client_requires_api_key()
{   let mut config = openai_config();
    config.api_key = String::new();
    let err = OpenAiClient::new(config).err()
      .expect("empty key must be rejected");
    assert!(matches!(err, Error::MissingApiKey(_)));

    let mut config = azure_config();
    config.api_version = None;
    let err = OpenAiClient::new(config).err()
      .expect("azure without api_version must be rejected");
    assert!(matches!(err, Error::InvalidConfiguration(_)));
}

#[test]
fn test_wire_request_shape()
{   let openai = WireChatRequest::build(
      ApiFlavor::OpenAi, &chat_request(None, vec![])
    );
    assert_eq!(
      serde_json::to_value(&openai).unwrap(),
      json!({
        "model": "gpt-4o-mini",
        "messages": [{ "role": "user", "content": "Hello" }],
        "temperature": 0.0,
        "max_tokens": 100,
      })
    );

    let azure = WireChatRequest::build(
      ApiFlavor::Azure, &chat_request(Some(3), strings(&["\n"]))
    );
    let value = serde_json::to_value(&azure).unwrap();
    assert!(value.get("model").is_none());
    assert_eq!(value["seed"], json!(3));
    assert_eq!(value["stop"], json!(["\n"]));
}

#[test]
fn test_wire_response_parsing()
{   let body = json!({
      "choices": [{
        "message": { "role": "assistant", "content": "not a turtle." },
        "finish_reason": "stop"
      }],
      "usage": { "prompt_tokens": 12, "completion_tokens": 4, "total_tokens": 16 }
    });
    let parsed: WireChatResponse = serde_json::from_value(body).unwrap();
    let response = assert_ok!(parsed.into_chat_response());
    assert_eq!(response.text, "not a turtle.");
    assert_eq!(response.prompt_tokens, 12);
    assert_eq!(response.completion_tokens, 4);

    let empty: WireChatResponse
      = serde_json::from_value(json!({ "choices": [] })).unwrap();
    assert_eq!(
      assert_err!(empty.into_chat_response()),
      Error::NoChoicesInResponse
    );
}

#[tokio::test]
async fn test_model_from_config()
{   let dir = tempfile::tempdir().unwrap();
    let mut config = ModelConfig::new("gpt-35-turbo");
    config.request_logging_file = Some(dir.path().join("log.json"));
    config.stats_channel = "custom".to_string();

    let mut model = assert_ok!(
      GptLanguageModel::from_config(StubBackend::always("ok"), config)
    );
    assert_eq!(model.model_name(), "gpt-35-turbo");
    assert_ok!(model.sample_text(SamplingRequest::new("x")).await);
    assert!(dir.path().join("log.json").exists());
}

#[tokio::test]
#[ignore]
async fn test_azure_send_prompt()
{   common::init_logging();
    let mut model = match gptlm::load_azure_model(None)
    {   Ok(model) => model
      , Err(e) => {
          println!("Skipping: {}", e);
          return;
        }
    };

    match model
      .sample_text(
        SamplingRequest::new("Question: Is the sky blue?\nAnswer: ")
          .max_tokens(20)
      )
      .await
    {   Ok(response) => {
          println!("Response: {}", response);
          assert!(!response.is_empty());
          assert_eq!(model.stats().requests, 1);
          println!("Cost: {:?}", model.compute_cost(None, None));
        }
      , Err(e) => {
          println!("API Error: {}", e);
        }
    }
}

#[tokio::test]
#[ignore]
async fn test_openai_sample_choice()
{   common::init_logging();
    let config = match ProviderConfig::openai_from_env()
    {   Ok(c) => c
      , Err(_) => {
          println!("Skipping: OPENAI_API_KEY not set");
          return;
        }
    };
    let client = assert_ok!(OpenAiClient::new(config));
    let mut model = GptLanguageModel::new(client, "gpt-4o-mini");

    match model
      .sample_choice(
        "What colour is grass?",
        &strings(&["green", "purple"]),
        Some(1)
      )
      .await
    {   Ok(outcome) => {
          println!(
            "Chose {} after {} retries",
            outcome.response, outcome.attempts()
          );
          assert_eq!(outcome.response, "green");
        }
      , Err(e) => {
          println!("API Error: {}", e);
        }
    }
}
