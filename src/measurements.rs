//! Fire-and-forget metrics sink

use std::collections::BTreeMap;
use std::sync::Mutex;
use log::{trace, warn};
use serde_json::Value;

/// Receives datums published on named channels
pub trait Measurements: Send + Sync
{   fn publish_datum(&self, channel: &str, datum: Value);
}

/// In-memory sink keeping every datum per channel
#[derive(Debug, Default)]
pub struct MeasurementsLog
{   channels: Mutex<BTreeMap<String, Vec<Value>>>
}

impl MeasurementsLog
{   pub fn new() -> Self
    {   Self::default()
    }

    /// All datums published on `channel`, oldest first
    pub fn get_channel(&self, channel: &str) -> Vec<Value>
    {   match self.channels.lock()
        {   Ok(channels) => channels
              .get(channel)
              .cloned()
              .unwrap_or_default()
          , Err(poisoned) => poisoned.into_inner()
              .get(channel)
              .cloned()
              .unwrap_or_default()
        }
    }

    /// Channel names that have at least one datum
    pub fn available_channels(&self) -> Vec<String>
    {   match self.channels.lock()
        {   Ok(channels) => channels.keys().cloned().collect()
          , Err(poisoned) => poisoned.into_inner()
              .keys()
              .cloned()
              .collect()
        }
    }
}

impl Measurements for MeasurementsLog
{   fn publish_datum(&self, channel: &str, datum: Value)
    {   trace!("Publishing on {}: {}", channel, datum);
        let mut channels = match self.channels.lock()
        {   Ok(channels) => channels
          , Err(poisoned) => {
              warn!("Measurements lock poisoned, recovering");
              poisoned.into_inner()
            }
        };
        channels
          .entry(channel.to_string())
          .or_default()
          .push(datum);
    }
}
