//! Configuration for the completion endpoint and retry behavior

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use log::debug;

/// Endpoint configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig
{   /// Provider to call
    pub provider: crate::Provider
  , /// API base URL (if custom)
    #[serde(default)]
    pub api_base: Option<String>
  , /// Model id (provider default when unset)
    #[serde(default)]
    pub model: Option<String>
  , /// Credential; never written back out
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>
  , /// Request timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>
  , /// Sampling temperature
    #[serde(default)]
    pub temperature: Option<f32>
  , /// Max tokens to generate
    #[serde(default)]
    pub max_tokens: Option<usize>
}

impl ProviderConfig
{   /// Configuration for a provider with all defaults
    pub fn new(
      provider: crate::Provider
    , api_key: Option<String>
    ) -> Self
    {   ProviderConfig
        {   provider
          , api_base: None
          , model: None
          , api_key
          , timeout_secs: None
          , temperature: None
          , max_tokens: None
        }
    }

    /// Base URL, falling back to the provider default
    pub fn api_base(&self) -> String
    {   self.api_base.clone()
          .unwrap_or_else(|| self.provider.default_api_base().to_string())
          .trim_end_matches('/')
          .to_string()
    }

    /// Model id, falling back to the provider default
    pub fn model(&self) -> String
    {   self.model.clone()
          .unwrap_or_else(|| self.provider.default_model().to_string())
    }

    /// Credential if present and non-blank
    pub fn credential(&self) -> Option<&str>
    {   self.api_key.as_deref()
          .map(str::trim)
          .filter(|k| !k.is_empty())
    }

    pub fn timeout_secs(&self) -> u64
    {   self.timeout_secs.unwrap_or(30)
    }

    pub fn temperature(&self) -> f32
    {   self.temperature.unwrap_or(0.1)
    }

    pub fn max_tokens(&self) -> usize
    {   self.max_tokens.unwrap_or(1024)
    }
}

/// Retry configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig
{   /// Total attempts per logical request, first one included
    pub max_attempts: usize
  , /// Fixed delay between attempts in milliseconds
    pub delay_ms: u64
}

impl RetryConfig
{   /// Batch evaluation: two attempts, short delay
    pub fn batch() -> Self
    {   RetryConfig
        {   max_attempts: 2
          , delay_ms: 300
        }
    }

    /// Interactive service use: three attempts, one second apart
    pub fn interactive() -> Self
    {   RetryConfig
        {   max_attempts: 3
          , delay_ms: 1000
        }
    }
}

impl Default for RetryConfig
{   fn default() -> Self
    {   RetryConfig::batch()
    }
}

/// Process-wide client configuration, built once at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig
{   /// Endpoint configuration
    pub provider: ProviderConfig
  , /// Retry configuration
    #[serde(default)]
    pub retry: RetryConfig
}

impl ClientConfig
{   pub fn new(provider: ProviderConfig, retry: RetryConfig) -> Self
    {   ClientConfig
        {   provider
          , retry
        }
    }

    /// Load from a JSON file. The credential is read from the
    /// provider's environment variable when the file has none.
    pub fn from_json_file(
      path: impl AsRef<Path>
    ) -> Result<Self, crate::error::Error>
    {   Self::from_json_file_with_preset(path, RetryConfig::default())
    }

    /// Load from a JSON file, using `preset` when it has no `retry` block
    pub fn from_json_file_with_preset(
      path: impl AsRef<Path>
    , preset: RetryConfig
    ) -> Result<Self, crate::error::Error>
    {   let path = path.as_ref();
        debug!("Loading client config from {}", path.display());
        let raw = std::fs::read_to_string(path)?;
        let file: ConfigFile = serde_json::from_str(&raw)
          .map_err(|e| {
            crate::error::Error::InvalidConfiguration(
              format!("{}: {}", path.display(), e)
            )
          })?;
        let mut config = ClientConfig::new(
          file.provider,
          file.retry.unwrap_or(preset)
        );
        if config.provider.api_key.is_none()
        {   config.provider.api_key = std::env::var(
              config.provider.provider.api_key_env()
            ).ok();
        }
        config.validate()?;
        Ok(config)
    }

    /// Load from process environment variables
    pub fn from_env() -> Result<Self, crate::error::Error>
    {   Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F)
      -> Result<Self, crate::error::Error>
    where F: Fn(&str) -> Option<String>
    {   Self::from_lookup_with_preset(lookup, RetryConfig::default())
    }

    /// Load from a variable lookup. Retry variables override the
    /// fields of `preset` one by one.
    pub fn from_lookup_with_preset<F>(lookup: F, preset: RetryConfig)
      -> Result<Self, crate::error::Error>
    where F: Fn(&str) -> Option<String>
    {   let provider = match lookup("REVLM_PROVIDER")
        {   Some(name) => crate::Provider::from_str(&name)?
          , None => crate::Provider::Groq
        };
        debug!("Configuring provider {:?} from environment", provider);

        let provider_config = ProviderConfig
        {   api_key: lookup(provider.api_key_env())
          , api_base: lookup("REVLM_API_BASE")
          , model: lookup("REVLM_MODEL")
          , timeout_secs: parse_var(&lookup, "REVLM_TIMEOUT_SECS")?
          , temperature: parse_var(&lookup, "REVLM_TEMPERATURE")?
          , max_tokens: parse_var(&lookup, "REVLM_MAX_TOKENS")?
          , provider
        };

        let retry = RetryConfig
        {   max_attempts: parse_var(&lookup, "REVLM_MAX_ATTEMPTS")?
              .unwrap_or(preset.max_attempts)
          , delay_ms: parse_var(&lookup, "REVLM_RETRY_DELAY_MS")?
              .unwrap_or(preset.delay_ms)
        };

        let config = ClientConfig::new(provider_config, retry);
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that can never work.
    /// A missing credential is not an error here.
    pub fn validate(&self) -> Result<(), crate::error::Error>
    {   if self.retry.max_attempts == 0
        {   return Err(crate::error::Error::InvalidConfiguration(
              "max_attempts must be at least 1".to_string()
            ));
        }
        if self.provider.timeout_secs == Some(0)
        {   return Err(crate::error::Error::InvalidConfiguration(
              "timeout_secs must be positive".to_string()
            ));
        }
        if let Some(t) = self.provider.temperature
        {   if !(0.0..=2.0).contains(&t)
            {   return Err(crate::error::Error::InvalidConfiguration(
                  format!("temperature {} outside 0.0..=2.0", t)
                ));
            }
        }
        Ok(())
    }
}

/// On-disk shape; `retry` stays optional so the caller's preset applies
#[derive(Deserialize)]
struct ConfigFile
{   provider: ProviderConfig
  , #[serde(default)]
    retry: Option<RetryConfig>
}

fn parse_var<F, T>(lookup: &F, key: &str)
  -> Result<Option<T>, crate::error::Error>
where F: Fn(&str) -> Option<String>
    , T: FromStr
    , T::Err: std::fmt::Display
{   match lookup(key)
    {   None => Ok(None)
      , Some(raw) => raw.trim().parse::<T>()
          .map(Some)
          .map_err(|e| {
            crate::error::Error::InvalidConfiguration(
              format!("{}={:?}: {}", key, raw, e)
            )
          })
    }
}
