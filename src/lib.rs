pub mod error;
pub mod config;
pub mod providers;
pub mod request;
pub mod retry;
pub mod client;
pub mod parser;
pub mod fallback;
pub mod evaluation;
pub mod analysis;
pub mod store;
pub mod csv;
use serde::{Deserialize, Serialize};

/*

revlm (Resilient Review LLM): prompt in, outcome out.

revlm/
├── Cargo.toml
├── src/
│   ├── lib.rs          # Re-exports and provider catalogue
│   ├── main.rs         # `revlm evaluate` / `revlm analyze`
│   ├── error.rs        # Error enum
│   ├── config.rs       # Endpoint + retry configuration
│   ├── request.rs      # PromptRequest, CompletionResult
│   ├── retry.rs        # Fixed-delay retry policy, Pause
│   ├── client.rs       # ResilientCompletionClient
│   ├── providers/      # HTTP transports
│   │   ├── mod.rs
│   │   ├── chat.rs     # OpenAI-compatible chat completions
│   │   └── gemini.rs   # Google generateContent
│   ├── parser.rs       # Fence extraction, rating + free-text parsing
│   ├── fallback.rs     # Canned values per rating bucket
│   ├── evaluation.rs   # Prompt variants, metrics, reports
│   ├── analysis.rs     # Review reply / summary / actions
│   ├── store.rs        # In-memory review ledger, CSV export
│   └── csv.rs          # RFC 4180 rows
└── tests/

*/

pub use client::ResilientCompletionClient;
pub use config::{ClientConfig, ProviderConfig, RetryConfig};
pub use error::Error;
pub use parser::{RatingOutcome, RatingPrediction};
pub use request::{Binding, CompletionResult, FailureKind, PromptRequest};
pub use retry::{Pause, RetryPolicy, TokioPause};

/// Hosted text-generation providers revlm can call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Hash)]
pub enum Provider
{ /// Groq (hosts Llama 3, Gemma, DeepSeek); OpenAI-compatible
  Groq
  ,
  /// Google (AI Studio: Gemini)
  Google
  ,
  /// Mistral AI; OpenAI-compatible
  MistralAi
  ,
  /// OpenAI
  OpenAI
}

impl Provider
{   pub fn default_api_base(&self) -> &'static str
    {   match self
        {   Provider::Groq => "https://api.groq.com/openai/v1"
          , Provider::Google
              => "https://generativelanguage.googleapis.com/v1beta"
          , Provider::MistralAi => "https://api.mistral.ai/v1"
          , Provider::OpenAI => "https://api.openai.com/v1"
        }
    }

    pub fn default_model(&self) -> &'static str
    {   match self
        {   Provider::Groq => "llama-3.3-70b-versatile"
          , Provider::Google => "gemini-2.5-flash"
          , Provider::MistralAi => "mistral-small-latest"
          , Provider::OpenAI => "gpt-4o-mini"
        }
    }

    /// Environment variable holding the credential
    pub fn api_key_env(&self) -> &'static str
    {   match self
        {   Provider::Groq => "GROQ_API_KEY"
          , Provider::Google => "GEMINI_API_KEY"
          , Provider::MistralAi => "MISTRAL_API_KEY"
          , Provider::OpenAI => "OPENAI_API_KEY"
        }
    }
}

impl std::str::FromStr for Provider
{   type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {   match s.trim().to_ascii_lowercase().as_str()
        {   "groq" => Ok(Provider::Groq)
          , "gemini" | "google" => Ok(Provider::Google)
          , "mistral" | "mistralai" => Ok(Provider::MistralAi)
          , "openai" => Ok(Provider::OpenAI)
          , other => Err(crate::error::Error::InvalidConfiguration(
              format!("unknown provider: {}", other)
            ))
        }
    }
}
