//! Token usage bookkeeping and cost estimation

use log::{debug, error};
use serde::{Deserialize, Serialize};
use crate::error::{Error, Result};

/// Running totals for one adapter instance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageStats
{   pub requests: u64
  , pub input_tokens: u64
  , pub completion_tokens: u64
}

impl UsageStats
{   /// Count one completed backend call
    pub fn record(&mut self, prompt_tokens: u64, completion_tokens: u64)
    {   self.requests += 1;
        self.input_tokens += prompt_tokens;
        self.completion_tokens += completion_tokens;
    }
}

/// Per-token prices in USD
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostRates
{   pub input: f64
  , pub output: f64
}

/// A cost table row: matches when every substring occurs in
/// the model id
#[derive(Debug, Clone, Copy)]
pub struct CostEntry
{   pub needles: &'static [&'static str]
  , pub rates: CostRates
}

impl CostEntry
{   pub fn matches(&self, model: &str) -> bool
    {   self.needles.iter().all(|n| model.contains(n))
    }
}

/// Checked top to bottom, first match wins; more specific rows
/// must come first.
pub const COST_TABLE: &[CostEntry] = &[
  CostEntry
  {   needles: &["gpt-4o", "mini"]
    , rates: CostRates
      {   input: 0.000165 / 1000.0
        , output: 0.00066 / 1000.0
      }
  }
, CostEntry
  {   needles: &["gpt-4o"]
    , rates: CostRates
      {   input: 0.005 / 1000.0
        , output: 0.015 / 1000.0
      }
  }
, CostEntry
  {   needles: &["gpt-35"]
    , rates: CostRates
      {   input: 0.0005 / 1000.0
        , output: 0.0015 / 1000.0
      }
  }
, CostEntry
  {   needles: &["gpt-3.5"]
    , rates: CostRates
      {   input: 0.0005 / 1000.0
        , output: 0.0015 / 1000.0
      }
  }
];

/// Rates for `model` from `COST_TABLE`
pub fn lookup_rates(model: &str) -> Option<CostRates>
{   COST_TABLE
      .iter()
      .find(|entry| entry.matches(model))
      .map(|entry| entry.rates)
}

/// Total cost of `stats`. Explicit costs must be given as a
/// pair; with neither, the table is consulted.
pub fn estimate_cost(
  stats: &UsageStats
, model: &str
, input_token_cost: Option<f64>
, output_token_cost: Option<f64>
) -> Result<f64>
{   let rates = match (input_token_cost, output_token_cost)
    {   (Some(input), Some(output)) => CostRates { input, output }
      , (None, None) => lookup_rates(model).ok_or_else(|| {
          error!("No cost table entry for {}", model);
          Error::UnknownModelCost(model.to_string())
        })?
      , _ => {
          return Err(Error::InvalidConfiguration(
            "input_token_cost and output_token_cost must be \
             given together".to_string()
          ));
        }
    };
    let total = stats.input_tokens as f64 * rates.input
      + stats.completion_tokens as f64 * rates.output;
    debug!("Estimated cost for {}: {}", model, total);
    Ok(total)
}
