//! Retry policy for completion requests

use std::time::Duration;
use async_trait::async_trait;
use log::debug;

/// Suspends the caller between attempts
#[async_trait]
pub trait Pause: Send + Sync
{   async fn pause(&self, duration: Duration);
}

/// Sleeps on the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioPause;

#[async_trait]
impl Pause for TokioPause
{   async fn pause(&self, duration: Duration)
    {   tokio::time::sleep(duration).await;
    }
}

/// Bounded, fixed-delay retry policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy
{   pub max_attempts: usize
  , pub delay: Duration
}

impl RetryPolicy
{   /// Create a new retry policy. At least one attempt is always made.
    pub fn new(
      max_attempts: usize
    , delay_ms: u64
    ) -> Self
    {   if max_attempts == 0
        {   debug!("max_attempts of 0 raised to 1");
        }
        RetryPolicy
        {   max_attempts: max_attempts.max(1)
          , delay: Duration::from_millis(delay_ms)
        }
    }

    /// Policy described by a retry configuration
    pub fn from_config(config: &crate::config::RetryConfig) -> Self
    {   RetryPolicy::new(config.max_attempts, config.delay_ms)
    }

    /// Whether another attempt follows attempt number `attempt` (1-based)
    pub fn should_retry(&self, attempt: usize) -> bool
    {   attempt < self.max_attempts
    }
}

impl Default for RetryPolicy
{   fn default() -> Self
    {   RetryPolicy::from_config(
          &crate::config::RetryConfig::default()
        )
    }
}
