#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use async_trait::async_trait;
use revlm::providers::CompletionTransport;

/// Transport replaying a fixed script of replies
pub struct ScriptedTransport
{   script: Mutex<VecDeque<Result<String, revlm::Error>>>
  , prompts: Mutex<Vec<String>>
}

impl ScriptedTransport
{   pub fn new(
      script: Vec<Result<String, revlm::Error>>
    ) -> Arc<Self>
    {   Arc::new(ScriptedTransport
        {   script: Mutex::new(script.into())
          , prompts: Mutex::new(Vec::new())
        })
    }

    /// Fails every call
    pub fn failing() -> Arc<Self>
    {   Self::new(vec![])
    }

    pub fn replying(texts: &[&str]) -> Arc<Self>
    {   Self::new(texts.iter().map(|t| Ok(t.to_string())).collect())
    }

    pub fn calls(&self) -> usize
    {   self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String>
    {   self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionTransport for ScriptedTransport
{   async fn complete(
      &self
    , prompt: &str
    ) -> Result<String, revlm::Error>
    {   self.prompts.lock().unwrap().push(prompt.to_string());
        self.script.lock().unwrap()
          .pop_front()
          .unwrap_or_else(|| {
            Err(revlm::Error::HttpError("connection refused".to_string()))
          })
    }
}

/// Records every pause instead of sleeping
#[derive(Default)]
pub struct CountingPause
{   pauses: Mutex<Vec<Duration>>
}

impl CountingPause
{   pub fn new() -> Arc<Self>
    {   Arc::new(CountingPause::default())
    }

    pub fn count(&self) -> usize
    {   self.pauses.lock().unwrap().len()
    }

    pub fn durations(&self) -> Vec<Duration>
    {   self.pauses.lock().unwrap().clone()
    }
}

#[async_trait]
impl revlm::Pause for CountingPause
{   async fn pause(&self, duration: Duration)
    {   self.pauses.lock().unwrap().push(duration);
    }
}

/// Client over a scripted transport with a counting pause
pub fn client(
  transport: &Arc<ScriptedTransport>
, pause: &Arc<CountingPause>
, max_attempts: usize
) -> revlm::ResilientCompletionClient
{   revlm::ResilientCompletionClient::with_transport(
      transport.clone(),
      revlm::RetryPolicy::new(max_attempts, 250)
    )
    .with_pause(pause.clone())
}
