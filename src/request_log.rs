//! Optional on-disk log of every chat exchange

use std::path::{Path, PathBuf};
use log::debug;
use serde_json::json;
use tokio::io::AsyncWriteExt;
use crate::error::Result;
use crate::request::ChatMessage;

/// Role label attached to the backend's reply in the log
pub const RESPONSE_ROLE: &str = "assistant (response)";

#[derive(Debug, Clone)]
pub struct RequestLog
{   path: PathBuf
}

impl RequestLog
{   /// Truncates (or creates) the file at `path`
    pub fn create(path: impl AsRef<Path>) -> Result<Self>
    {   let path = path.as_ref().to_path_buf();
        debug!("Truncating request log {}", path.display());
        std::fs::File::create(&path)?;
        Ok(RequestLog { path })
    }

    pub fn path(&self) -> &Path
    {   &self.path
    }

    /// Appends a newline and the exchange as a pretty-printed
    /// JSON array
    pub async fn append(
      &self
    , messages: &[ChatMessage]
    , response: &str
    ) -> Result<()>
    {   let mut entries = Vec::with_capacity(messages.len() + 1);
        for message in messages
        {   entries.push(serde_json::to_value(message)?);
        }
        entries.push(json!({
          "role": RESPONSE_ROLE,
          "content": response,
        }));
        let block = serde_json::to_string_pretty(&entries)?;

        let mut file = tokio::fs::OpenOptions::new()
          .append(true)
          .create(true)
          .open(&self.path)
          .await?;
        file.write_all(b"\n").await?;
        file.write_all(block.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}
