use std::fmt;

/// Custom error type for gptlm operations
/// Implements Clone so tests and callers can hold on to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// API key (or endpoint) is missing for a provider
    MissingApiKey(String)
  , /// HTTP transport error
    HttpError(String)
  , /// API returned an error response
    ApiError(String)
  , /// Failed to parse API response
    ParseError(String)
  , /// No choices in API response
    NoChoicesInResponse
  , /// Rate limit exceeded
    RateLimitExceeded
  , /// Timeout error
    Timeout
  , /// Invalid configuration
    InvalidConfiguration(String)
  , /// No cost table entry and no explicit costs for a model
    UnknownModelCost(String)
  , /// Sampling parameters out of range
    InvalidRequest(String)
  , /// sample_choice called with no candidates
    EmptyChoices
  , /// Multiple choice attempts exhausted without an exact match
    InvalidResponse
    {   sample: String
      , extracted: String
    }
  , /// Request log entry could not be serialized
    Serialization(String)
  , /// Request log could not be written
    Io(String)
  , /// Generic error
    Other(String)
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::MissingApiKey(what) => {
              write!(f, "Missing API key for: {}", what)
            }
          , Error::HttpError(msg) => {
              write!(f, "HTTP error: {}", msg)
            }
          , Error::ApiError(msg) => {
              write!(f, "API error: {}", msg)
            }
          , Error::ParseError(msg) => {
              write!(f, "Parse error: {}", msg)
            }
          , Error::NoChoicesInResponse => {
              write!(f, "API response contained no choices")
            }
          , Error::RateLimitExceeded => {
              write!(f, "API rate limit exceeded")
            }
          , Error::Timeout => {
              write!(f, "Request timed out")
            }
          , Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
          , Error::UnknownModelCost(model) => {
              write!(f,
                "Unknown model name: {}. Please provide \
                 input_token_cost and output_token_cost.",
                model
              )
            }
          , Error::InvalidRequest(msg) => {
              write!(f, "Invalid request: {}", msg)
            }
          , Error::EmptyChoices => {
              write!(f, "sample_choice needs at least one response")
            }
          , Error::InvalidResponse { sample, extracted } => {
              write!(f,
                "Too many multiple choice attempts.\n\
                 Last attempt: {}, extracted: {}",
                sample, extracted
              )
            }
          , Error::Serialization(msg) => {
              write!(f, "Serialization error: {}", msg)
            }
          , Error::Io(msg) => {
              write!(f, "I/O error: {}", msg)
            }
          , Error::Other(msg) => {
              write!(f, "Error: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error
{   fn from(e: std::io::Error) -> Self
    {   Error::Io(e.to_string())
    }
}

impl From<serde_json::Error> for Error
{   fn from(e: serde_json::Error) -> Self
    {   Error::Serialization(e.to_string())
    }
}

impl From<String> for Error
{   fn from(s: String) -> Self
    {   Error::Other(s)
    }
}

impl From<&str> for Error
{   fn from(s: &str) -> Self
    {   Error::Other(s.to_string())
    }
}

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, Error>;
