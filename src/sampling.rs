//! Temperature escalation and answer extraction for multiple choice

use log::{debug, error};
use crate::error::{Error, Result};

/// Hard ceiling on attempts in `sample_choice`
pub const MAX_CHOICE_ATTEMPTS: usize = 20;

/// Maps attempt index to sampling temperature.
///
/// The first attempt samples greedily; every later attempt
/// ramps linearly from just above `floor` toward `ceiling` so a
/// model that keeps missing the exact strings gets more varied
/// samples.
#[derive(Debug, Clone, PartialEq)]
pub struct EscalationPolicy
{   pub max_attempts: usize
  , pub floor: f32
  , pub ceiling: f32
}

impl EscalationPolicy
{   pub fn new(max_attempts: usize) -> Self
    {   EscalationPolicy
        {   max_attempts
          , ..EscalationPolicy::default()
        }
    }

    /// Rejects policies that could never produce a sample or
    /// that climb past what the backend accepts
    pub fn validate(&self) -> Result<()>
    {   let problem = if self.max_attempts == 0
        {   Some("max_attempts must be at least 1".to_string())
        } else if !(crate::MIN_TEMPERATURE..=crate::MAX_TEMPERATURE)
          .contains(&self.floor)
        {   Some(format!("floor {} outside [{}, {}]",
              self.floor,
              crate::MIN_TEMPERATURE,
              crate::MAX_TEMPERATURE
            ))
        } else if !(crate::MIN_TEMPERATURE..=crate::MAX_TEMPERATURE)
          .contains(&self.ceiling)
        {   Some(format!("ceiling {} outside [{}, {}]",
              self.ceiling,
              crate::MIN_TEMPERATURE,
              crate::MAX_TEMPERATURE
            ))
        } else if self.floor > self.ceiling
        {   Some(format!("floor {} above ceiling {}",
              self.floor, self.ceiling
            ))
        } else
        {   None
        };
        match problem
        {   Some(msg) => {
              error!("Invalid escalation policy: {}", msg);
              Err(Error::InvalidConfiguration(msg))
            }
          , None => Ok(())
        }
    }

    /// Temperature for zero-based `attempt`
    pub fn temperature(&self, attempt: usize) -> f32
    {   let temperature = dynamically_adjust_temperature(
          attempt,
          self.max_attempts,
          self.floor,
          self.ceiling
        );
        debug!(
          "Temperature for attempt {}/{}: {}",
          attempt, self.max_attempts, temperature
        );
        temperature
    }
}

impl Default for EscalationPolicy
{   fn default() -> Self
    {   EscalationPolicy
        {   max_attempts: MAX_CHOICE_ATTEMPTS
          , floor: 0.5
          , ceiling: 1.0
        }
    }
}

/// 0.0 on attempt 0, then `floor + (ceiling - floor) * attempt /
/// max_attempts`, never above `ceiling`.
pub fn dynamically_adjust_temperature(
  attempt: usize
, max_attempts: usize
, floor: f32
, ceiling: f32
) -> f32
{   if attempt == 0 || max_attempts == 0
    {   return 0.0;
    }
    let progress = attempt as f32 / max_attempts as f32;
    (floor + (ceiling - floor) * progress).min(ceiling)
}

/// Pulls the literal answer out of a raw model sample
pub trait AnswerExtractor: Send + Sync
{   fn extract(&self, sample: &str) -> String;
}

/// Default extractor.
///
/// `"(a) because..."` and `"a) because..."` give `"a"`; anything
/// else is trimmed, unquoted and loses one trailing period.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChoiceExtractor;

impl AnswerExtractor for ChoiceExtractor
{   fn extract(&self, sample: &str) -> String
    {   extract_choice_response(sample)
    }
}

pub fn extract_choice_response(sample: &str) -> String
{   let sample = sample.trim();
    if let Some(label) = option_label(sample)
    {   return label.to_string();
    }

    let mut answer = sample;
    for quote in ['"', '\'', '`']
    {   if answer.len() >= 2
          && answer.starts_with(quote)
          && answer.ends_with(quote)
        {   answer = answer[1..answer.len() - 1].trim();
        }
    }
    answer.strip_suffix('.').unwrap_or(answer).trim().to_string()
}

/// Leading `(x)` or `x)` where x is alphanumeric
fn option_label(sample: &str) -> Option<&str>
{   let rest = sample.strip_prefix('(').unwrap_or(sample);
    let end = rest
      .char_indices()
      .find(|(_, c)| !c.is_alphanumeric())
      .map(|(i, _)| i)?;
    if end == 0 || !rest[end..].starts_with(')')
    {   return None;
    }
    Some(&rest[..end])
}
