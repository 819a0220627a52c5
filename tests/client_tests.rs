mod common;

use std::time::Duration;
use common::{client, CountingPause, ScriptedTransport};
use revlm::{CompletionResult, FailureKind, PromptRequest};

#[tokio::test]
async fn test_exhausted_attempts_sleep_between_only()
{   for attempts in 1..=4
    {   let transport = ScriptedTransport::failing();
        let pause = CountingPause::new();
        let client = client(&transport, &pause, attempts);

        let result = client.complete("hello").await;

        assert!(matches!(
          result,
          CompletionResult::Failure { kind: FailureKind::TransportError, .. }
        ));
        assert_eq!(transport.calls(), attempts);
        assert_eq!(pause.count(), attempts - 1);
        assert!(pause.durations()
          .iter()
          .all(|d| *d == Duration::from_millis(250)));
    }
}

#[tokio::test]
async fn test_two_failures_with_bound_two()
{   let transport = ScriptedTransport::new(vec![
      Err(revlm::Error::ApiError("429: rate limited".to_string()))
    , Err(revlm::Error::Timeout)
    ]);
    let pause = CountingPause::new();
    let client = client(&transport, &pause, 2);

    let result = client.complete("rate me").await;

    assert_eq!(
      result,
      CompletionResult::Failure
      {   kind: FailureKind::TransportError
        , message: "Request timed out".to_string()
      }
    );
    assert_eq!(transport.calls(), 2);
    assert_eq!(pause.count(), 1);
}

#[tokio::test]
async fn test_success_after_retry()
{   let transport = ScriptedTransport::new(vec![
      Err(revlm::Error::ApiError("503: overloaded".to_string()))
    , Ok("fine".to_string())
    ]);
    let pause = CountingPause::new();
    let client = client(&transport, &pause, 3);

    let result = client.complete("hi").await;

    assert_eq!(
      result,
      CompletionResult::Success { text: "fine".to_string() }
    );
    assert_eq!(transport.calls(), 2);
    assert_eq!(pause.count(), 1);
}

#[tokio::test]
async fn test_first_success_never_sleeps()
{   let transport = ScriptedTransport::replying(&["ok"]);
    let pause = CountingPause::new();
    let client = client(&transport, &pause, 3);

    assert!(client.complete("hi").await.is_success());
    assert_eq!(transport.calls(), 1);
    assert_eq!(pause.count(), 0);
    assert_eq!(transport.prompts(), vec!["hi".to_string()]);
}

#[tokio::test]
async fn test_zero_attempts_still_tries_once()
{   let transport = ScriptedTransport::failing();
    let pause = CountingPause::new();
    let client = client(&transport, &pause, 0);

    assert!(!client.complete("hi").await.is_success());
    assert_eq!(client.policy().max_attempts, 1);
    assert_eq!(transport.calls(), 1);
    assert_eq!(pause.count(), 0);
}

#[tokio::test]
async fn test_missing_credential_fails_without_io()
{   for key in [None, Some(String::new()), Some("   ".to_string())]
    {   let config = revlm::ClientConfig::new(
          revlm::ProviderConfig::new(revlm::Provider::Groq, key),
          revlm::RetryConfig::interactive()
        );
        let pause = CountingPause::new();
        let client = revlm::ResilientCompletionClient::new(&config)
          .unwrap()
          .with_pause(pause.clone());

        assert!(!client.is_configured());
        assert_eq!(
          client.complete("hi").await,
          CompletionResult::Failure
          {   kind: FailureKind::ConfigError
            , message: "missing credential".to_string()
          }
        );
        assert_eq!(pause.count(), 0);
    }
}

#[tokio::test]
async fn test_configured_client_builds_transport()
{   let config = revlm::ClientConfig::new(
      revlm::ProviderConfig::new(
        revlm::Provider::Google,
        Some("test-key".to_string())
      ),
      revlm::RetryConfig::batch()
    );
    let client = revlm::ResilientCompletionClient::new(&config).unwrap();
    assert!(client.is_configured());
    assert_eq!(client.policy().max_attempts, 2);
    assert_eq!(client.policy().delay, Duration::from_millis(300));
}

#[tokio::test]
async fn test_render_error_is_config_failure()
{   let transport = ScriptedTransport::replying(&["unused"]);
    let pause = CountingPause::new();
    let client = client(&transport, &pause, 2);

    let request = PromptRequest::new("Review: {review_text}");
    let result = client.complete_request(&request).await;

    match result
    {   CompletionResult::Failure { kind, message } => {
          assert_eq!(kind, FailureKind::ConfigError);
          assert!(message.contains("review_text"));
        }
      , other => panic!("expected failure, got {:?}", other)
    }
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_complete_request_sends_rendered_prompt()
{   let transport = ScriptedTransport::replying(&["ok"]);
    let pause = CountingPause::new();
    let client = client(&transport, &pause, 2);

    let request = PromptRequest::new("{rating} stars: {review_text}")
      .bind("rating", 4u8)
      .bind("review_text", "tasty");
    let _ = client.complete_request(&request).await;

    assert_eq!(transport.prompts(), vec!["4 stars: tasty".to_string()]);
}
