use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use log::{debug, trace, error};

// ===== Message Types =====

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part
{   #[serde(default)]
    pub text: Option<String>
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content
{   #[serde(default)]
    pub parts: Vec<Part>
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig
{   pub temperature: f32
  , pub max_output_tokens: usize
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest
{   pub contents: Vec<Content>
  , pub generation_config: GenerationConfig
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContentResponse
{   #[serde(default)]
    pub candidates: Vec<Candidate>
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate
{   #[serde(default)]
    pub content: Option<Content>
  , #[serde(default)]
    pub finish_reason: Option<String>
}

/// Google Gemini `generateContent` endpoint
pub struct GeminiTransport
{   api_base: String
  , api_key: String
  , model: String
  , temperature: f32
  , max_tokens: usize
  , http_client: reqwest::Client
}

impl GeminiTransport
{   pub fn new(
      config: &crate::config::ProviderConfig
    , api_key: String
    , http_client: reqwest::Client
    ) -> Self
    {   debug!("Creating Gemini transport");
        GeminiTransport
        {   api_base: config.api_base()
          , api_key
          , model: config.model()
          , temperature: config.temperature()
          , max_tokens: config.max_tokens()
          , http_client
        }
    }

    pub fn build_request(&self, prompt: &str) -> GenerateContentRequest
    {   GenerateContentRequest
        {   contents: vec![
              Content
              {   parts: vec![
                    Part { text: Some(prompt.to_string()) }
                  ]
              }
            ]
          , generation_config: GenerationConfig
            {   temperature: self.temperature
              , max_output_tokens: self.max_tokens
            }
        }
    }
}

/// Concatenated text parts of the first candidate
pub fn candidate_text(
  response: GenerateContentResponse
) -> Result<String, crate::error::Error>
{   let content = response.candidates
      .into_iter()
      .next()
      .and_then(|c| c.content)
      .ok_or_else(|| {
        error!("No candidates in response");
        crate::error::Error::NoChoicesInResponse
      })?;

    let text: String = content.parts
      .into_iter()
      .filter_map(|p| p.text)
      .collect();
    Ok(text.trim().to_string())
}

#[async_trait]
impl crate::providers::CompletionTransport for GeminiTransport
{   async fn complete(
      &self
    , prompt: &str
    ) -> Result<String, crate::error::Error>
    {   debug!("Sending generateContent to model: {}", self.model);

        let request = self.build_request(prompt);
        trace!("Gemini request: {:?}", request);

        let response = self.http_client
          .post(format!(
            "{}/models/{}:generateContent",
            self.api_base, self.model
          ))
          .header("x-goog-api-key", self.api_key.as_str())
          .json(&request)
          .send()
          .await
          .map_err(|e| {
            error!("HTTP error: {}", e);
            crate::error::Error::from(e)
          })?;

        let status = response.status();
        trace!("Gemini response status: {}", status);

        if !status.is_success()
        {   let error_text = response.text().await
              .unwrap_or_else(|_|
                "Unknown error".to_string()
              );
            error!("Gemini API error {}: {}", status, error_text);
            return Err(crate::error::Error::ApiError(
              format!("{}: {}", status, error_text)
            ));
        }

        let body: GenerateContentResponse
          = response.json().await.map_err(|e| {
            error!("Parse error: {}", e);
            crate::error::Error::ParseError(e.to_string())
          })?;

        candidate_text(body)
    }
}
