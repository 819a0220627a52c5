//! Normalization of raw model output.
//!
//! Rating predictions are validated strictly and come back as
//! [`RatingOutcome::Invalid`] on any doubt. Free-text fields always
//! produce a usable value, substituting from [`crate::fallback`].

use serde::Serialize;
use serde_json::Value;
use log::{debug, warn};

/// Opening or closing code fence
pub const FENCE: &str = "```";

/// Fence labeled as JSON
pub const JSON_FENCE: &str = "```json";

/// Key holding the star rating
pub const STARS_KEY: &str = "predicted_stars";

/// Key holding the explanation
pub const EXPLANATION_KEY: &str = "explanation";

/// Most action items kept from a model answer
pub const MAX_ACTIONS: usize = 3;

/// A validated rating prediction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RatingPrediction
{   /// Always within 1..=5
    pub predicted_stars: u8
  , pub explanation: String
}

/// Result of parsing a rating answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RatingOutcome
{   Prediction(RatingPrediction)
  , Invalid
    {   reason: String
      , raw: String
    }
}

impl RatingOutcome
{   pub fn is_valid(&self) -> bool
    {   matches!(self, RatingOutcome::Prediction(_))
    }

    pub fn predicted_stars(&self) -> Option<u8>
    {   match self
        {   RatingOutcome::Prediction(p) => Some(p.predicted_stars)
          , RatingOutcome::Invalid { .. } => None
        }
    }

    fn invalid(reason: impl Into<String>, raw: &str) -> Self
    {   RatingOutcome::Invalid
        {   reason: reason.into()
          , raw: raw.to_string()
        }
    }
}

/// Pull the payload out of a fenced or unfenced answer.
///
/// A `json`-labeled fence wins over a bare one. An unclosed fence, or a
/// second labeled fence before the closing one, is an error.
pub fn extract_payload(text: &str) -> Result<&str, String>
{   let text = text.trim();
    // ASCII lowercasing keeps byte offsets intact
    let lowered = text.to_ascii_lowercase();

    if let Some(start) = lowered.find(JSON_FENCE)
    {   let body_start = start + JSON_FENCE.len();
        let end = lowered[body_start..].find(FENCE)
          .ok_or_else(|| "unterminated ```json fence".to_string())?;
        if lowered[body_start + end..].starts_with(JSON_FENCE)
        {   return Err("nested ```json fence".to_string());
        }
        return Ok(text[body_start..body_start + end].trim());
    }

    if let Some(start) = text.find(FENCE)
    {   let body_start = start + FENCE.len();
        let end = text[body_start..].find(FENCE)
          .ok_or_else(|| "unterminated ``` fence".to_string())?;
        return Ok(text[body_start..body_start + end].trim());
    }

    Ok(text)
}

/// Parse a completion result as a rating prediction
pub fn parse_rating(
  result: &crate::request::CompletionResult
) -> RatingOutcome
{   match result
    {   crate::request::CompletionResult::Failure { message, .. } => {
          RatingOutcome::invalid(message.clone(), "")
        }
      , crate::request::CompletionResult::Success { text } => {
          parse_rating_text(text)
        }
    }
}

/// Parse raw model text as a rating prediction
pub fn parse_rating_text(text: &str) -> RatingOutcome
{   let payload = match extract_payload(text)
    {   Ok(p) => p
      , Err(reason) => {
          warn!("Fence extraction failed: {}", reason);
          return RatingOutcome::invalid(reason, text.trim());
        }
    };

    let value: Value = match serde_json::from_str(payload)
    {   Ok(v) => v
      , Err(e) => {
          debug!("JSON decode failed: {}", e);
          return RatingOutcome::invalid(
            format!("JSON parse error: {}", e),
            payload
          );
        }
    };

    let object = match value.as_object()
    {   Some(o) => o
      , None => {
          return RatingOutcome::invalid(
            "expected a JSON object",
            payload
          );
        }
    };

    let missing: Vec<&str> = [STARS_KEY, EXPLANATION_KEY]
      .into_iter()
      .filter(|k| !object.contains_key(*k))
      .collect();
    if !missing.is_empty()
    {   return RatingOutcome::invalid(
          format!("Missing required fields: {}", missing.join(", ")),
          payload
        );
    }

    let predicted_stars = match coerce_stars(&object[STARS_KEY])
    {   Ok(stars) => stars
      , Err(reason) => return RatingOutcome::invalid(reason, payload)
    };

    let explanation = match &object[EXPLANATION_KEY]
    {   Value::String(s) => s.clone()
      , other => {
          return RatingOutcome::invalid(
            format!("explanation is not a string: {}", other),
            payload
          );
        }
    };

    RatingOutcome::Prediction(RatingPrediction
    {   predicted_stars
      , explanation
    })
}

/// Integer in 1..=5, or the reason it is not one. Never clamps.
pub fn coerce_stars(value: &Value) -> Result<u8, String>
{   let stars: i64 = match value
    {   Value::Number(n) => {
          if let Some(i) = n.as_i64()
          {   i
          } else if let Some(f) = n.as_f64().filter(|f| f.fract() == 0.0)
          {   if f.abs() > 1e15
              {   return Err(format!("rating {} out of range 1-5", n));
              }
              f as i64
          } else
          {   return Err(format!("non-integer rating: {}", n));
          }
        }
      , Value::String(s) => s.trim().parse::<i64>()
          .map_err(|_| format!("non-integer rating: {:?}", s))?
      , other => {
          return Err(format!("non-integer rating: {}", other));
        }
    };

    if (1..=5).contains(&stars)
    {   Ok(stars as u8)
    } else
    {   Err(format!("rating {} out of range 1-5", stars))
    }
}

/// Trimmed success text, if there is any
fn live_text(result: &crate::request::CompletionResult) -> Option<&str>
{   result.text()
      .map(str::trim)
      .filter(|t| !t.is_empty())
}

/// Customer reply, or the canned reply for the rating
pub fn response_or_fallback(
  result: &crate::request::CompletionResult
, rating: u8
) -> String
{   match live_text(result)
    {   Some(text) => text.to_string()
      , None => {
          debug!("Using canned response for rating {}", rating);
          crate::fallback::canned_response(rating).to_string()
        }
    }
}

/// Review summary, or the truncated source text
pub fn summary_or_fallback(
  result: &crate::request::CompletionResult
, source_text: &str
) -> String
{   match live_text(result)
    {   Some(text) => text.to_string()
      , None => {
          debug!("Using truncated review as summary");
          crate::fallback::truncate_summary(
            source_text,
            crate::fallback::SUMMARY_CHAR_BUDGET
          )
        }
    }
}

/// Recommended actions, or the fallback list for the rating
pub fn actions_or_fallback(
  result: &crate::request::CompletionResult
, rating: u8
) -> Vec<String>
{   let text = match live_text(result)
    {   Some(text) => text
      , None => {
          debug!("Using fallback actions for rating {}", rating);
          return crate::fallback::fallback_actions(rating);
        }
    };

    let actions = parse_action_lines(text);
    if actions.is_empty()
    {   debug!("No list items in model answer");
        return crate::fallback::generic_actions();
    }
    actions
}

/// List items of a model answer, markers and emphasis stripped,
/// capped at [`MAX_ACTIONS`]
pub fn parse_action_lines(text: &str) -> Vec<String>
{   text.lines()
      .map(str::trim)
      .filter(|line| is_list_item(line))
      .map(clean_list_item)
      .filter(|line| !line.is_empty())
      .take(MAX_ACTIONS)
      .collect()
}

fn is_list_item(line: &str) -> bool
{   match line.chars().next()
    {   Some(c) => c.is_ascii_digit() || c == '-' || c == '•'
      , None => false
    }
}

fn clean_list_item(line: &str) -> String
{   line.trim_start_matches(|c: char| {
        c.is_ascii_digit() || matches!(c, '.' | '-' | '•' | ')' | ' ')
      })
      .replace("**", "")
      .replace("__", "")
      .replace(['*', '_'], "")
      .trim()
      .to_string()
}
