//! Configuration for the chat-completion backend and the model adapter

use std::path::PathBuf;
use log::{debug, error, warn};
use serde::{Deserialize, Serialize};
use crate::error::{Error, Result};

pub const OPENAI_API_BASE: &str
  = "https://api.openai.com/v1";
pub const AZURE_API_VERSION: &str = "2024-02-01";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Which wire dialect the backend speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiFlavor
{   /// api.openai.com style: bearer auth, model in the body
    OpenAi
  , /// Azure OpenAI: api-key header, model as deployment in the path
    Azure
}

/// Backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig
{   /// Wire dialect
    pub flavor: ApiFlavor
  , /// Secret key
    pub api_key: String
  , /// API base URL (OpenAI) or resource endpoint (Azure)
    pub api_base: String
  , /// Azure api-version query parameter
    pub api_version: Option<String>
  , /// Connect timeout in seconds; per-request timeouts come
    /// from each sampling call
    pub timeout_secs: Option<u64>
}

impl ProviderConfig
{   /// OpenAI config from `OPENAI_API_KEY` and optional
    /// `OPENAI_BASE_URL`
    pub fn openai_from_env() -> Result<Self>
    {   debug!("Loading OpenAI config from environment");
        let api_key = require_env("OPENAI_API_KEY")?;
        let api_base = std::env::var("OPENAI_BASE_URL")
          .ok()
          .filter(|s| !s.is_empty())
          .unwrap_or_else(|| OPENAI_API_BASE.to_string());
        Ok(ProviderConfig
        {   flavor: ApiFlavor::OpenAi
          , api_key
          , api_base
          , api_version: None
          , timeout_secs: None
        })
    }

    /// Azure config from `~/.env` (overriding the process
    /// environment) plus `AZURE_OPENAI_API_KEY` and
    /// `AZURE_OPENAI_ENDPOINT`
    pub fn azure_from_env() -> Result<Self>
    {   debug!("Loading Azure OpenAI config from environment");
        load_home_dotenv();
        let api_key = require_env("AZURE_OPENAI_API_KEY")?;
        let api_base = require_env("AZURE_OPENAI_ENDPOINT")?;
        Ok(ProviderConfig
        {   flavor: ApiFlavor::Azure
          , api_key
          , api_base
          , api_version: Some(AZURE_API_VERSION.to_string())
          , timeout_secs: None
        })
    }

    /// Check the fields a client cannot work without
    pub fn validate(&self) -> Result<()>
    {   if self.api_key.trim().is_empty()
        {   return Err(Error::MissingApiKey(
              format!("{:?}", self.flavor)
            ));
        }
        if self.api_base.trim().is_empty()
        {   return Err(Error::InvalidConfiguration(
              format!("{:?} api_base is empty", self.flavor)
            ));
        }
        if self.flavor == ApiFlavor::Azure
          && self.api_version.is_none()
        {   return Err(Error::InvalidConfiguration(
              "Azure requires an api_version".to_string()
            ));
        }
        Ok(())
    }
}

/// Model adapter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig
{   /// Model name (deployment name on Azure)
    pub model_name: String
  , /// File truncated at construction and appended per call
    pub request_logging_file: Option<PathBuf>
  , /// Measurements channel for usage datums
    pub stats_channel: String
}

impl ModelConfig
{   pub fn new(model_name: impl Into<String>) -> Self
    {   ModelConfig
        {   model_name: model_name.into()
          , ..ModelConfig::default()
        }
    }
}

impl Default for ModelConfig
{   fn default() -> Self
    {   ModelConfig
        {   model_name: crate::DEFAULT_AZURE_MODEL.to_string()
          , request_logging_file: None
          , stats_channel: crate::DEFAULT_STATS_CHANNEL.to_string()
        }
    }
}

fn require_env(name: &str) -> Result<String>
{   match std::env::var(name)
    {   Ok(value) if !value.trim().is_empty() => Ok(value)
      , _ => {
          error!("{} is not set", name);
          Err(Error::MissingApiKey(name.to_string()))
        }
    }
}

fn load_home_dotenv()
{   let Some(home) = std::env::var_os("HOME")
    else
    {   return;
    };
    let path = PathBuf::from(home).join(".env");
    if !path.exists()
    {   return;
    }
    if let Err(e) = dotenvy::from_path_override(&path)
    {   warn!("Failed to load {}: {}", path.display(), e);
    }
}
