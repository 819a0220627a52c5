use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use log::{debug, trace, error};

// ===== Message Types =====

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage
{   pub role: String
  , pub content: String
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest
{   pub model: String
  , pub messages: Vec<ChatMessage>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<usize>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse
{   pub choices: Vec<Choice>
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice
{   pub message: ChoiceMessage
  , #[serde(default)]
    pub finish_reason: Option<String>
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage
{   #[serde(default)]
    pub content: Option<String>
}

/// OpenAI-compatible `/chat/completions` endpoint
/// (Groq, Mistral, OpenAI)
pub struct ChatCompletionsTransport
{   api_base: String
  , api_key: String
  , model: String
  , temperature: f32
  , max_tokens: usize
  , http_client: reqwest::Client
}

impl ChatCompletionsTransport
{   pub fn new(
      config: &crate::config::ProviderConfig
    , api_key: String
    , http_client: reqwest::Client
    ) -> Self
    {   debug!(
          "Creating chat completions transport for {:?}",
          config.provider
        );
        ChatCompletionsTransport
        {   api_base: config.api_base()
          , api_key
          , model: config.model()
          , temperature: config.temperature()
          , max_tokens: config.max_tokens()
          , http_client
        }
    }

    /// Request body for a single user message
    pub fn build_request(&self, prompt: &str) -> ChatRequest
    {   ChatRequest
        {   model: self.model.clone()
          , messages: vec![
              ChatMessage
              {   role: "user".to_string()
                , content: prompt.to_string()
              }
            ]
          , max_tokens: Some(self.max_tokens)
          , temperature: Some(self.temperature)
        }
    }
}

/// Text of the first choice
pub fn first_choice_text(
  response: ChatResponse
) -> Result<String, crate::error::Error>
{   response.choices
      .into_iter()
      .next()
      .and_then(|c| c.message.content)
      .map(|text| text.trim().to_string())
      .ok_or_else(|| {
        error!("No choices in response");
        crate::error::Error::NoChoicesInResponse
      })
}

#[async_trait]
impl crate::providers::CompletionTransport for ChatCompletionsTransport
{   async fn complete(
      &self
    , prompt: &str
    ) -> Result<String, crate::error::Error>
    {   debug!("Sending chat completion to model: {}", self.model);

        let request = self.build_request(prompt);
        trace!("Chat request: {:?}", request);

        let response = self.http_client
          .post(format!("{}/chat/completions", self.api_base))
          .header("Authorization", format!("Bearer {}", self.api_key))
          .header("Content-Type", "application/json")
          .json(&request)
          .send()
          .await
          .map_err(|e| {
            error!("HTTP error: {}", e);
            crate::error::Error::from(e)
          })?;

        let status = response.status();
        trace!("Chat response status: {}", status);

        if !status.is_success()
        {   let error_text = response.text().await
              .unwrap_or_else(|_|
                "Unknown error".to_string()
              );
            error!("Chat API error {}: {}", status, error_text);
            return Err(crate::error::Error::ApiError(
              format!("{}: {}", status, error_text)
            ));
        }

        let chat_response: ChatResponse
          = response.json().await.map_err(|e| {
            error!("Parse error: {}", e);
            crate::error::Error::ParseError(e.to_string())
          })?;

        first_choice_text(chat_response)
    }
}
