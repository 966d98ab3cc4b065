//! Constrained multiple choice: resample until the answer is
//! one of the candidates verbatim

use std::collections::BTreeMap;
use log::{debug, info, warn};
use crate::error::{Error, Result};
use crate::sampling::{AnswerExtractor, EscalationPolicy};
use crate::{ChoiceOutcome, LanguageModel, SamplingRequest};

pub const ATTEMPTS_KEY: &str = "attempts";
pub const TEMPERATURE_KEY: &str = "temperature";

/// `prompt` followed by the instruction listing every candidate
pub fn choice_prompt(prompt: &str, responses: &[String]) -> String
{   format!(
      "{}\nRespond EXACTLY with one of the following strings:\n{}.",
      prompt,
      responses.join("\n")
    )
}

/// Samples from `model` with escalating temperature until the
/// extracted answer equals a candidate, at most
/// `policy.max_attempts` times.
///
/// A trimmed sample equal to a candidate is taken as is; only
/// otherwise does `extractor` get to normalise it. Backend errors
/// end the loop immediately. Matching is exact and the first
/// equal candidate in list order wins.
pub async fn resolve_choice<M>(
  model: &mut M
, prompt: &str
, responses: &[String]
, seed: Option<u64>
, policy: &EscalationPolicy
, extractor: &dyn AnswerExtractor
) -> Result<ChoiceOutcome>
where
  M: LanguageModel + ?Sized,
{   if responses.is_empty()
    {   return Err(Error::EmptyChoices);
    }
    policy.validate()?;
    let prompt = choice_prompt(prompt, responses);

    let mut sample = String::new();
    let mut answer = String::new();
    for attempt in 0..policy.max_attempts
    {   let temperature = policy.temperature(attempt);
        sample = model
          .sample_text(
            SamplingRequest::new(prompt.as_str())
              .temperature(temperature)
              .seed(seed)
          )
          .await?;
        let verbatim = sample.trim();
        answer = if responses.iter().any(|r| r == verbatim)
        {   verbatim.to_string()
        } else
        {   extractor.extract(&sample)
        };

        match responses.iter().position(|r| *r == answer)
        {   Some(index) => {
              info!(
                "Choice {:?} matched on attempt {}",
                answer, attempt
              );
              let mut diagnostics = BTreeMap::new();
              diagnostics.insert(
                ATTEMPTS_KEY.to_string(), attempt as f64
              );
              diagnostics.insert(
                TEMPERATURE_KEY.to_string(), temperature as f64
              );
              return Ok(ChoiceOutcome
              {   index
                , response: responses[index].clone()
                , debug: diagnostics
              });
            }
          , None => {
              debug!(
                "Attempt {} extracted {:?}, not a candidate",
                attempt, answer
              );
            }
        }
    }

    warn!(
      "No exact choice after {} attempts",
      policy.max_attempts
    );
    Err(Error::InvalidResponse
    {   sample
      , extracted: answer
    })
}
