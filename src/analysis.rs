//! Reply, summary and action list for an incoming review

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use log::info;

pub const MAX_NAME_CHARS: usize = 50;
pub const MIN_REVIEW_CHARS: usize = 10;
pub const MAX_REVIEW_CHARS: usize = 5000;

const NAMED_RESPONSE_TEMPLATE: &str = r#"You are a customer service representative. A customer named {name} has left a {rating}-star review.

Review: "{review_text}"

Generate a warm, professional, and personalized response (2-3 sentences) that:
1. Addresses them by name
2. Thanks them for their feedback
3. Addresses their specific points
4. Is appropriate for a {rating}-star rating

Response:"#;

const RESPONSE_TEMPLATE: &str = r#"You are a customer service representative. A customer has left a {rating}-star review.

Review: "{review_text}"

Generate a warm, professional, and personalized response (2-3 sentences) that:
1. Thanks them for their feedback
2. Addresses their specific points
3. Is appropriate for a {rating}-star rating

Response:"#;

const SUMMARY_TEMPLATE: &str = r#"Summarize this customer review in one concise sentence (max 15 words):

Review: "{review_text}"

Summary:"#;

const ACTIONS_TEMPLATE: &str = r#"Based on this {rating}-star review, suggest 2-3 specific, actionable next steps for the business.

Review: "{review_text}"

Provide ONLY the action items as a numbered list:"#;

/// A review as submitted by a customer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewSubmission
{   #[serde(default)]
    pub name: Option<String>
  , pub rating: u8
  , pub review_text: String
}

impl ReviewSubmission
{   pub fn new(
      name: Option<String>
    , rating: u8
    , review_text: impl Into<String>
    ) -> Self
    {   ReviewSubmission
        {   name
          , rating
          , review_text: review_text.into()
        }
    }

    /// Check bounds and return a trimmed copy
    pub fn validate(&self) -> Result<ReviewSubmission, crate::error::Error>
    {   let name = match &self.name
        {   Some(raw) => {
              let name = raw.trim();
              let len = name.chars().count();
              if len == 0 || len > MAX_NAME_CHARS
              {   return Err(crate::error::Error::Validation(format!(
                    "name must be 1-{} characters",
                    MAX_NAME_CHARS
                  )));
              }
              Some(name.to_string())
            }
          , None => None
        };

        if !(1..=5).contains(&self.rating)
        {   return Err(crate::error::Error::Validation(format!(
              "rating {} outside 1-5",
              self.rating
            )));
        }

        let review_text = self.review_text.trim();
        if review_text.is_empty()
        {   return Err(crate::error::Error::Validation(
              "review text cannot be empty or just whitespace".to_string()
            ));
        }
        let len = review_text.chars().count();
        if !(MIN_REVIEW_CHARS..=MAX_REVIEW_CHARS).contains(&len)
        {   return Err(crate::error::Error::Validation(format!(
              "review text must be {}-{} characters, got {}",
              MIN_REVIEW_CHARS, MAX_REVIEW_CHARS, len
            )));
        }

        Ok(ReviewSubmission
        {   name
          , rating: self.rating
          , review_text: review_text.to_string()
        })
    }
}

/// Customer reply prompt; addresses the customer by name when known
pub fn user_response_prompt(
  name: Option<&str>
, rating: u8
, review_text: &str
) -> crate::request::PromptRequest
{   let request = match name
    {   Some(name) => crate::request::PromptRequest::new(
            NAMED_RESPONSE_TEMPLATE
          )
          .bind("name", name)
      , None => crate::request::PromptRequest::new(RESPONSE_TEMPLATE)
    };
    request
      .bind("rating", rating)
      .bind("review_text", review_text)
}

pub fn summary_prompt(review_text: &str) -> crate::request::PromptRequest
{   crate::request::PromptRequest::new(SUMMARY_TEMPLATE)
      .bind("review_text", review_text)
}

pub fn actions_prompt(
  rating: u8
, review_text: &str
) -> crate::request::PromptRequest
{   crate::request::PromptRequest::new(ACTIONS_TEMPLATE)
      .bind("rating", rating)
      .bind("review_text", review_text)
}

/// Generated outputs for one review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewAnalysis
{   pub user_response: String
  , pub summary: String
  , pub recommended_actions: Vec<String>
}

/// Produces a [`ReviewAnalysis`]; live or fallback, never an error
pub struct ReviewAnalyzer
{   client: Arc<crate::client::ResilientCompletionClient>
}

impl ReviewAnalyzer
{   pub fn new(client: Arc<crate::client::ResilientCompletionClient>) -> Self
    {   ReviewAnalyzer
        {   client
        }
    }

    pub async fn user_response(
      &self
    , name: Option<&str>
    , rating: u8
    , review_text: &str
    ) -> String
    {   let result = self.client
          .complete_request(&user_response_prompt(name, rating, review_text))
          .await;
        crate::parser::response_or_fallback(&result, rating)
    }

    pub async fn summary(&self, review_text: &str) -> String
    {   let result = self.client
          .complete_request(&summary_prompt(review_text))
          .await;
        crate::parser::summary_or_fallback(&result, review_text)
    }

    pub async fn recommended_actions(
      &self
    , rating: u8
    , review_text: &str
    ) -> Vec<String>
    {   let result = self.client
          .complete_request(&actions_prompt(rating, review_text))
          .await;
        crate::parser::actions_or_fallback(&result, rating)
    }

    /// Generate all three outputs, one call after another
    pub async fn process_review(
      &self
    , submission: &ReviewSubmission
    ) -> ReviewAnalysis
    {   info!("Processing review with rating {}", submission.rating);
        let text = submission.review_text.as_str();

        let user_response = self.user_response(
          submission.name.as_deref(),
          submission.rating,
          text
        ).await;
        let summary = self.summary(text).await;
        let recommended_actions
          = self.recommended_actions(submission.rating, text).await;

        info!("Review processing completed");
        ReviewAnalysis
        {   user_response
          , summary
          , recommended_actions
        }
    }
}
