//! Prompt request and completion result types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Value bound to a named template slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Binding
{   Text(String)
  , Number(f64)
}

impl std::fmt::Display for Binding
{   fn fmt(&self, f: &mut std::fmt::Formatter<'_>)
      -> std::fmt::Result
    {   match self
        {   Binding::Text(s) => write!(f, "{}", s)
          , Binding::Number(n) => write!(f, "{}", n)
        }
    }
}

impl From<&str> for Binding
{   fn from(s: &str) -> Self
    {   Binding::Text(s.to_string())
    }
}

impl From<String> for Binding
{   fn from(s: String) -> Self
    {   Binding::Text(s)
    }
}

impl From<u8> for Binding
{   fn from(n: u8) -> Self
    {   Binding::Number(f64::from(n))
    }
}

impl From<i64> for Binding
{   fn from(n: i64) -> Self
    {   Binding::Number(n as f64)
    }
}

impl From<f64> for Binding
{   fn from(n: f64) -> Self
    {   Binding::Number(n)
    }
}

/// A prompt template plus the values for its `{slot}` placeholders.
///
/// `{{` and `}}` render as literal braces, so JSON examples can be
/// embedded in a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptRequest
{   /// Template text with named slots
    pub template: String
  , /// Slot name to value
    pub bindings: BTreeMap<String, Binding>
}

impl PromptRequest
{   /// Create a request with no bindings
    pub fn new(template: impl Into<String>) -> Self
    {   PromptRequest
        {   template: template.into()
          , bindings: BTreeMap::new()
        }
    }

    /// Bind a value to a slot
    pub fn bind(
      mut self
    , name: impl Into<String>
    , value: impl Into<Binding>
    ) -> Self
    {   self.bindings.insert(name.into(), value.into());
        self
    }

    /// Substitute every slot, failing on unknown or malformed slots
    pub fn render(&self) -> Result<String, crate::error::Error>
    {   let mut out = String::with_capacity(self.template.len());
        let mut chars = self.template.chars().peekable();

        while let Some(c) = chars.next()
        {   match c
            {   '{' if chars.peek() == Some(&'{') => {
                  chars.next();
                  out.push('{');
                }
              , '{' => {
                  let mut name = String::new();
                  let mut closed = false;
                  for n in chars.by_ref()
                  {   if n == '}'
                      {   closed = true;
                          break;
                      }
                      name.push(n);
                  }
                  if !closed
                  {   return Err(crate::error::Error::Template(
                        format!("unterminated slot '{{{}'", name)
                      ));
                  }
                  let value = self.bindings.get(name.trim())
                    .ok_or_else(|| {
                      crate::error::Error::Template(
                        format!("no binding for slot '{}'", name)
                      )
                    })?;
                  out.push_str(&value.to_string());
                }
              , '}' if chars.peek() == Some(&'}') => {
                  chars.next();
                  out.push('}');
                }
              , '}' => {
                  return Err(crate::error::Error::Template(
                    "single '}' encountered".to_string()
                  ));
                }
              , other => out.push(other)
            }
        }

        Ok(out)
    }
}

/// Why a completion attempt sequence ended without text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind
{   /// Missing credential or unusable request; never retried
    ConfigError
  , /// Network, HTTP status or response decoding failure
    TransportError
}

/// Terminal result of one logical completion request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompletionResult
{   Success
    {   text: String
    }
  , Failure
    {   kind: FailureKind
      , message: String
    }
}

impl CompletionResult
{   /// Build a failure from a crate error
    pub fn from_error(error: &crate::error::Error) -> Self
    {   CompletionResult::Failure
        {   kind: error.failure_kind()
          , message: error.to_string()
        }
    }

    pub fn is_success(&self) -> bool
    {   matches!(self, CompletionResult::Success { .. })
    }

    /// Text of a successful completion
    pub fn text(&self) -> Option<&str>
    {   match self
        {   CompletionResult::Success { text } => Some(text)
          , CompletionResult::Failure { .. } => None
        }
    }
}
