use std::sync::Arc;
use log::{debug, warn, error, info};

/// Message returned for every call made without a credential
pub const MISSING_CREDENTIAL: &str = "missing credential";

/// Completion client that masks a bounded number of transient failures.
///
/// Attempts run strictly one after another. Between attempts the caller
/// is suspended for the policy's fixed delay; there is no pause before
/// the first attempt or after the last one.
pub struct ResilientCompletionClient
{   transport: Option<Arc<dyn crate::providers::CompletionTransport>>
  , policy: crate::retry::RetryPolicy
  , pause: Arc<dyn crate::retry::Pause>
}

impl ResilientCompletionClient
{   /// Create a client for the configured provider.
    ///
    /// A missing credential still yields a client; every call on it
    /// fails with a `ConfigError` without touching the network.
    pub fn new(
      config: &crate::config::ClientConfig
    ) -> Result<Self, crate::error::Error>
    {   let policy = crate::retry::RetryPolicy::from_config(&config.retry);
        match config.provider.credential()
        {   Some(key) => {
              debug!(
                "Creating completion client for {:?} ({})",
                config.provider.provider,
                config.provider.model()
              );
              let transport = crate::providers::transport_for(
                &config.provider,
                key.to_string()
              )?;
              Ok(Self::with_transport(transport, policy))
            }
          , None => {
              warn!(
                "No credential for {:?}; set {}",
                config.provider.provider,
                config.provider.provider.api_key_env()
              );
              Ok(Self::unconfigured(policy))
            }
        }
    }

    /// Create a client around an existing transport
    pub fn with_transport(
      transport: Arc<dyn crate::providers::CompletionTransport>
    , policy: crate::retry::RetryPolicy
    ) -> Self
    {   ResilientCompletionClient
        {   transport: Some(transport)
          , policy
          , pause: Arc::new(crate::retry::TokioPause)
        }
    }

    /// Create a client with no credential
    pub fn unconfigured(policy: crate::retry::RetryPolicy) -> Self
    {   ResilientCompletionClient
        {   transport: None
          , policy
          , pause: Arc::new(crate::retry::TokioPause)
        }
    }

    /// Replace the pause used between attempts
    pub fn with_pause(
      mut self
    , pause: Arc<dyn crate::retry::Pause>
    ) -> Self
    {   self.pause = pause;
        self
    }

    pub fn policy(&self) -> &crate::retry::RetryPolicy
    {   &self.policy
    }

    pub fn is_configured(&self) -> bool
    {   self.transport.is_some()
    }

    /// Pause handle, shared with callers that pace their own loops
    pub fn pause_handle(&self) -> Arc<dyn crate::retry::Pause>
    {   Arc::clone(&self.pause)
    }

    /// Render a prompt request and complete it
    pub async fn complete_request(
      &self
    , request: &crate::request::PromptRequest
    ) -> crate::request::CompletionResult
    {   match request.render()
        {   Ok(prompt) => self.complete(&prompt).await
          , Err(e) => {
              error!("Prompt render failed: {}", e);
              crate::request::CompletionResult::from_error(&e)
            }
        }
    }

    /// Complete a rendered prompt, retrying transport failures
    pub async fn complete(
      &self
    , prompt: &str
    ) -> crate::request::CompletionResult
    {   let transport = match &self.transport
        {   Some(t) => t
          , None => {
              debug!("Refusing call: {}", MISSING_CREDENTIAL);
              return crate::request::CompletionResult::Failure
              {   kind: crate::request::FailureKind::ConfigError
                , message: MISSING_CREDENTIAL.to_string()
              };
            }
        };

        let mut attempt = 0;
        let last_error = loop
        {   attempt += 1;
            debug!(
              "Completion attempt {}/{}",
              attempt, self.policy.max_attempts
            );

            let err = match transport.complete(prompt).await
            {   Ok(text) => {
                  if attempt > 1
                  {   info!("Completion succeeded on attempt {}", attempt);
                  }
                  return crate::request::CompletionResult::Success
                  {   text
                  };
                }
              , Err(e) => e
            };

            warn!(
              "LLM call failed (attempt {}): {}",
              attempt, err
            );

            if !self.policy.should_retry(attempt)
            {   break err;
            }
            self.pause.pause(self.policy.delay).await;
        };

        error!(
          "Completion failed after {} attempts: {}",
          attempt, last_error
        );
        crate::request::CompletionResult::Failure
        {   kind: crate::request::FailureKind::TransportError
          , message: last_error.to_string()
        }
    }
}
