use std::fmt;

/// Custom error type for revlm operations
/// Implements Clone so failures can be recorded next to results
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// No credential for the named provider
    MissingApiKey(String)
  , /// Request never got a response
    HttpError(String)
  , /// Non-success HTTP status, with the body
    ApiError(String)
  , /// Response body did not decode
    ParseError(String)
  , /// Response decoded but held no text
    NoChoicesInResponse
  , /// Unusable configuration value
    InvalidConfiguration(String)
  , /// Prompt template could not be rendered
    Template(String)
  , /// Input rejected by validation
    Validation(String)
  , /// Filesystem error
    Io(String)
  , /// Request exceeded the configured timeout
    Timeout
  , /// Anything else
    Other(String)
}

impl Error
{   /// Classify an error for the completion result taxonomy.
    ///
    /// Credential, configuration and template errors can never succeed
    /// on retry; everything raised by the remote call is transient.
    pub fn failure_kind(&self) -> crate::request::FailureKind
    {   match self
        {   Error::MissingApiKey(_)
          | Error::InvalidConfiguration(_)
          | Error::Template(_) => {
              crate::request::FailureKind::ConfigError
            }
          , _ => crate::request::FailureKind::TransportError
        }
    }
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::MissingApiKey(provider) => {
              write!(f, "Missing API key for: {}", provider)
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
          , Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
          , Error::Template(msg) => {
              write!(f, "Template error: {}", msg)
            }
          , Error::Validation(msg) => {
              write!(f, "Validation error: {}", msg)
            }
          , Error::Io(msg) => {
              write!(f, "I/O error: {}", msg)
            }
          , Error::Timeout => {
              write!(f, "Request timed out")
            }
          , Error::Other(msg) => {
              write!(f, "Error: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

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

impl From<std::io::Error> for Error
{   fn from(e: std::io::Error) -> Self
    {   Error::Io(e.to_string())
    }
}

impl From<reqwest::Error> for Error
{   fn from(e: reqwest::Error) -> Self
    {   if e.is_timeout()
        {   Error::Timeout
        } else if e.is_decode()
        {   Error::ParseError(e.to_string())
        } else
        {   Error::HttpError(e.to_string())
        }
    }
}
