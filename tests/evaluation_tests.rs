mod common;

use std::time::Duration;
use common::{client, CountingPause, ScriptedTransport};
use revlm::evaluation::{
  comparison_csv, detailed_json, parse_reviews, population_std_dev,
  write_reports, Evaluator, LabeledReview, Metrics, PredictionRecord,
  PromptVariant, VariantResult, COMPARISON_FILE, DETAILED_FILE,
};
use revlm::{RatingOutcome, RatingPrediction};

fn predicted(actual: u8, stars: u8) -> PredictionRecord
{   PredictionRecord
    {   actual_stars: actual
      , outcome: RatingOutcome::Prediction(RatingPrediction
        {   predicted_stars: stars
          , explanation: "because".to_string()
        })
      , raw_response: None
    }
}

fn invalid(actual: u8) -> PredictionRecord
{   PredictionRecord
    {   actual_stars: actual
      , outcome: RatingOutcome::Invalid
        {   reason: "JSON parse error".to_string()
          , raw: "nope".to_string()
        }
      , raw_response: Some("nope".to_string())
    }
}

fn review(text: &str, stars: u8) -> LabeledReview
{   LabeledReview
    {   text: text.to_string()
      , stars
    }
}

fn answer(stars: u8) -> String
{   format!(
      "```json\n{{\"predicted_stars\": {}, \"explanation\": \"r\"}}\n```",
      stars
    )
}

#[test]
fn test_metrics_match_hand_computation()
{   let records = vec![
      predicted(5, 5)
    , predicted(4, 5)
    , predicted(1, 3)
    , invalid(2)
    ];
    let m = Metrics::compute(&records);

    assert_eq!(m.total, 4);
    assert_eq!(m.valid, 3);
    assert_eq!(m.validity_rate, 0.75);
    assert!((m.accuracy - 1.0 / 3.0).abs() < 1e-12);
    assert_eq!(m.confusion[4][4], 1);
    assert_eq!(m.confusion[3][4], 1);
    assert_eq!(m.confusion[0][2], 1);
    assert_eq!(m.confusion.iter().flatten().sum::<usize>(), 3);

    // errors 0, 1, 2: mean 1, population variance 2/3
    assert!((m.consistency - (2.0f64 / 3.0).sqrt()).abs() < 1e-12);
}

#[test]
fn test_metrics_without_valid_predictions()
{   let m = Metrics::compute(&[invalid(3), invalid(4)]);
    assert_eq!(m.valid, 0);
    assert_eq!(m.accuracy, 0.0);
    assert_eq!(m.validity_rate, 0.0);
    assert_eq!(m.consistency, 0.0);

    let empty = Metrics::compute(&[]);
    assert_eq!(empty.total, 0);
    assert_eq!(empty.validity_rate, 0.0);
}

#[test]
fn test_population_std_dev()
{   assert_eq!(population_std_dev(&[]), 0.0);
    assert_eq!(population_std_dev(&[2.0, 2.0, 2.0]), 0.0);
    assert_eq!(population_std_dev(&[0.0, 2.0]), 1.0);
}

#[tokio::test]
async fn test_records_keep_input_order()
{   let transport = ScriptedTransport::new(vec![
      Ok(answer(5))
    , Ok("I think it's a 3".to_string())
    , Ok(answer(2))
    ]);
    let pause = CountingPause::new();
    let client = client(&transport, &pause, 1);
    let reviews = vec![
      review("Loved it", 5)
    , review("It was fine", 3)
    , review("Cold fries", 1)
    ];

    let records = Evaluator::new(&client)
      .with_pacing(Duration::from_millis(100))
      .run_template(PromptVariant::Basic.template(), &reviews)
      .await;

    assert_eq!(records.len(), 3);
    assert_eq!(
      records.iter().map(|r| r.actual_stars).collect::<Vec<_>>(),
      vec![5, 3, 1]
    );
    assert_eq!(records[0].outcome.predicted_stars(), Some(5));
    assert!(!records[1].outcome.is_valid());
    assert_eq!(records[1].raw_response.as_deref(), Some("I think it's a 3"));
    assert_eq!(records[2].outcome.predicted_stars(), Some(2));

    let prompts = transport.prompts();
    assert!(prompts[0].contains("Review: \"Loved it\""));
    assert!(prompts[2].contains("Review: \"Cold fries\""));
    assert!(prompts[0].contains("{\"predicted_stars\": <number>"));

    // one pacing pause per review, no retries with a single attempt
    assert_eq!(pause.count(), 3);
}

#[tokio::test]
async fn test_failed_calls_are_recorded_not_dropped()
{   let transport = ScriptedTransport::failing();
    let pause = CountingPause::new();
    let client = client(&transport, &pause, 2);
    let reviews = vec![review("a", 4), review("b", 2)];

    let result = Evaluator::new(&client)
      .with_pacing(Duration::ZERO)
      .run(PromptVariant::FewShot, &reviews)
      .await;

    assert_eq!(result.records.len(), 2);
    assert!(result.records.iter().all(|r| !r.outcome.is_valid()));
    assert_eq!(result.metrics.validity_rate, 0.0);
    assert_eq!(transport.calls(), 4);
    assert_eq!(pause.count(), 2);
}

#[tokio::test]
async fn test_run_all_covers_every_variant()
{   let transport = ScriptedTransport::new(
      (0..3).map(|_| Ok(answer(4))).collect()
    );
    let pause = CountingPause::new();
    let client = client(&transport, &pause, 1);

    let results = Evaluator::new(&client)
      .run_all(&[review("Nice place", 4)])
      .await;

    assert_eq!(
      results.iter().map(|r| r.variant).collect::<Vec<_>>(),
      PromptVariant::all().to_vec()
    );
    assert!(results.iter().all(|r| r.metrics.accuracy == 1.0));
    assert!(transport.prompts()[1].contains("step-by-step"));
    assert!(transport.prompts()[2].contains("Example 3:"));
}

fn sample_results() -> Vec<VariantResult>
{   let records = vec![predicted(5, 5), predicted(4, 5), invalid(2)];
    let metrics = Metrics::compute(&records);
    vec![VariantResult
    {   variant: PromptVariant::ChainOfThought
      , records
      , metrics
    }]
}

#[test]
fn test_comparison_csv_format()
{   let csv = comparison_csv(&sample_results());
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(
      lines[0],
      "Prompt,Accuracy,JSON Validity Rate,Valid Predictions,Consistency (Lower is Better)"
    );
    assert_eq!(lines[1], "Prompt 2 (Chain-of-Thought),50.00%,66.67%,2/3,0.500");
}

#[test]
fn test_detailed_json_keeps_invalid_records()
{   let json: serde_json::Value
      = serde_json::from_str(&detailed_json(&sample_results()).unwrap()).unwrap();
    let records = json["Prompt 2 (Chain-of-Thought)"].as_array().unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["predicted_stars"], 5);
    assert_eq!(records[0]["is_valid"], true);
    assert_eq!(records[2]["is_valid"], false);
    assert_eq!(records[2]["error"], "JSON parse error");
    assert_eq!(records[2]["actual_stars"], 2);
    assert!(records[2].get("predicted_stars").is_none());
}

#[test]
fn test_write_reports()
{   let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("reports");
    let (comparison, detailed) = write_reports(&sample_results(), &out).unwrap();

    assert_eq!(comparison, out.join(COMPARISON_FILE));
    assert_eq!(detailed, out.join(DETAILED_FILE));
    assert!(std::fs::read_to_string(comparison).unwrap().starts_with("Prompt,"));
    assert!(std::fs::read_to_string(detailed).unwrap().contains("Chain-of-Thought"));
}

#[test]
fn test_parse_reviews_formats()
{   let array = r#"[{"text": "good", "stars": 4}, {"text": "bad", "stars": 1}]"#;
    assert_eq!(
      parse_reviews(array).unwrap(),
      vec![review("good", 4), review("bad", 1)]
    );

    let lines = "{\"text\": \"ok\", \"stars\": 3}\n\n{\"text\": \"meh\", \"stars\": 2, \"business_id\": \"x\"}\n";
    assert_eq!(
      parse_reviews(lines).unwrap(),
      vec![review("ok", 3), review("meh", 2)]
    );
}

#[test]
fn test_parse_reviews_rejects_bad_rows()
{   for raw in [
      r#"[{"text": "x", "stars": 0}]"#
    , "{\"text\": \"x\", \"stars\": 6}"
    , "{\"text\": \"x\"}"
    , "{\"text\": \"x\", \"stars\": 3}\nnot json"
    ]
    {   assert!(
          matches!(parse_reviews(raw), Err(revlm::Error::Validation(_))),
          "{}", raw
        );
    }
}

#[test]
fn test_load_reviews_from_file()
{   let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reviews.jsonl");
    std::fs::write(&path, "{\"text\": \"ok\", \"stars\": 3}\n").unwrap();
    let reviews = tokio_test::block_on(async {
      revlm::evaluation::load_reviews(&path)
    }).unwrap();
    assert_eq!(reviews, vec![review("ok", 3)]);
}
