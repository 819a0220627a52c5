//! LLM provider transports

pub mod chat;
pub mod gemini;

use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;

// Re-export for convenience
pub use chat::ChatCompletionsTransport;
pub use gemini::GeminiTransport;

/// One outbound text-generation call
#[async_trait]
pub trait CompletionTransport: Send + Sync
{   /// Send a rendered prompt and return the model's text
    async fn complete(
      &self
    , prompt: &str
    ) -> Result<String, crate::error::Error>;
}

/// Build the transport serving `config.provider`
pub fn transport_for(
  config: &crate::config::ProviderConfig
, api_key: String
) -> Result<Arc<dyn CompletionTransport>, crate::error::Error>
{   let http_client = http_client(config)?;
    let transport: Arc<dyn CompletionTransport>
      = match config.provider
      {   crate::Provider::Google => Arc::new(
            GeminiTransport::new(config, api_key, http_client)
          )
        , crate::Provider::Groq
        | crate::Provider::MistralAi
        | crate::Provider::OpenAI => Arc::new(
            ChatCompletionsTransport::new(config, api_key, http_client)
          )
      };
    Ok(transport)
}

fn http_client(
  config: &crate::config::ProviderConfig
) -> Result<reqwest::Client, crate::error::Error>
{   reqwest::Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs()))
      .build()
      .map_err(|e| {
        crate::error::Error::InvalidConfiguration(e.to_string())
      })
}
