//! Prompt-variant evaluation over a labeled review dataset

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use log::{debug, info};

/// Comparison table file name
pub const COMPARISON_FILE: &str = "prompt_comparison_results.csv";

/// Per-review records file name
pub const DETAILED_FILE: &str = "detailed_predictions.json";

/// Default pause after each review
pub const DEFAULT_PACING_MS: u64 = 100;

/// Progress is logged every this many reviews
const PROGRESS_EVERY: usize = 20;

const BASIC_TEMPLATE: &str = r#"You are a rating prediction system. Based on the review text below, predict the star rating (1-5).

Review: "{review_text}"

Return ONLY a JSON object in this exact format:
{{"predicted_stars": <number>, "explanation": "<brief reason>"}}"#;

const CHAIN_OF_THOUGHT_TEMPLATE: &str = r#"Analyze the following review step-by-step:

Review: "{review_text}"

Steps:
1. Identify the sentiment (positive, negative, neutral, mixed)
2. Look for specific indicators (complaints, praise, specific issues, enthusiasm level)
3. Based on these factors, determine the star rating (1-5)

Return ONLY a JSON object:
{{"predicted_stars": <number>, "explanation": "<reasoning based on sentiment and indicators>"}}"#;

const FEW_SHOT_TEMPLATE: &str = r#"You are an expert at predicting star ratings from reviews. Here are examples:

Example 1:
Review: "Absolutely amazing food! Best pizza I've ever had. Service was fantastic too."
Output: {{"predicted_stars": 5, "explanation": "Highly positive language with superlatives indicating excellent experience"}}

Example 2:
Review: "Food was okay, nothing special. Service took forever."
Output: {{"predicted_stars": 2, "explanation": "Mediocre food quality combined with poor service indicates below average experience"}}

Example 3:
Review: "Good food and decent prices. Could be better but satisfied overall."
Output: {{"predicted_stars": 4, "explanation": "Positive with minor reservations suggests good but not perfect experience"}}

Now predict for this review:
Review: "{review_text}"

Return ONLY a JSON object:
{{"predicted_stars": <number>, "explanation": "<brief reasoning>"}}"#;

/// The prompt strategies under comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PromptVariant
{   Basic
  , ChainOfThought
  , FewShot
}

impl PromptVariant
{   pub fn all() -> [PromptVariant; 3]
    {   [ PromptVariant::Basic
        , PromptVariant::ChainOfThought
        , PromptVariant::FewShot
        ]
    }

    /// Label used in reports
    pub fn name(&self) -> &'static str
    {   match self
        {   PromptVariant::Basic => "Prompt 1 (Basic)"
          , PromptVariant::ChainOfThought => "Prompt 2 (Chain-of-Thought)"
          , PromptVariant::FewShot => "Prompt 3 (Few-Shot)"
        }
    }

    /// Template with a single `{review_text}` slot
    pub fn template(&self) -> &'static str
    {   match self
        {   PromptVariant::Basic => BASIC_TEMPLATE
          , PromptVariant::ChainOfThought => CHAIN_OF_THOUGHT_TEMPLATE
          , PromptVariant::FewShot => FEW_SHOT_TEMPLATE
        }
    }
}

/// One dataset row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledReview
{   pub text: String
  , pub stars: u8
}

/// Load a JSON array or JSON-lines file of `{text, stars}` rows
pub fn load_reviews(
  path: impl AsRef<Path>
) -> Result<Vec<LabeledReview>, crate::error::Error>
{   let path = path.as_ref();
    let raw = std::fs::read_to_string(path)?;
    let reviews = parse_reviews(&raw)?;
    info!("Loaded {} reviews from {}", reviews.len(), path.display());
    Ok(reviews)
}

/// Parse dataset text, validating every label
pub fn parse_reviews(
  raw: &str
) -> Result<Vec<LabeledReview>, crate::error::Error>
{   let reviews: Vec<LabeledReview> = if raw.trim_start().starts_with('[')
    {   serde_json::from_str(raw).map_err(|e| {
          crate::error::Error::Validation(format!("dataset: {}", e))
        })?
    } else
    {   raw.lines()
          .enumerate()
          .filter(|(_, line)| !line.trim().is_empty())
          .map(|(i, line)| {
            serde_json::from_str::<LabeledReview>(line).map_err(|e| {
              crate::error::Error::Validation(
                format!("dataset row {}: {}", i + 1, e)
              )
            })
          })
          .collect::<Result<Vec<_>, _>>()?
    };

    if let Some((i, bad)) = reviews.iter()
      .enumerate()
      .find(|(_, r)| !(1..=5).contains(&r.stars))
    {   return Err(crate::error::Error::Validation(
          format!("dataset row {}: stars {} outside 1-5", i + 1, bad.stars)
        ));
    }
    Ok(reviews)
}

/// One evaluated review; position matches the input dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionRecord
{   pub actual_stars: u8
  , pub outcome: crate::parser::RatingOutcome
  , /// Raw model text when the call succeeded
    pub raw_response: Option<String>
}

/// Serialized shape of a record in the detailed report
#[derive(Debug, Clone, Serialize)]
pub struct DetailedRecord
{   pub actual_stars: u8
  , pub is_valid: bool
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub predicted_stars: Option<u8>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>
}

impl PredictionRecord
{   pub fn to_detail(&self) -> DetailedRecord
    {   let (predicted_stars, explanation, error) = match &self.outcome
        {   crate::parser::RatingOutcome::Prediction(p) => {
              (Some(p.predicted_stars), Some(p.explanation.clone()), None)
            }
          , crate::parser::RatingOutcome::Invalid { reason, .. } => {
              (None, None, Some(reason.clone()))
            }
        };
        DetailedRecord
        {   actual_stars: self.actual_stars
          , is_valid: self.outcome.is_valid()
          , predicted_stars
          , explanation
          , error
          , raw_response: self.raw_response.clone()
        }
    }
}

/// Render, complete and parse one rating prediction
pub async fn predict_rating(
  client: &crate::client::ResilientCompletionClient
, template: &str
, review_text: &str
) -> (crate::parser::RatingOutcome, Option<String>)
{   let request = crate::request::PromptRequest::new(template)
      .bind("review_text", review_text);
    let result = client.complete_request(&request).await;
    let outcome = crate::parser::parse_rating(&result);
    (outcome, result.text().map(str::to_string))
}

/// Accuracy and consistency figures for one variant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics
{   pub total: usize
  , pub valid: usize
  , pub validity_rate: f64
  , /// Exact matches over valid predictions
    pub accuracy: f64
  , /// `confusion[actual - 1][predicted - 1]`
    pub confusion: [[usize; 5]; 5]
  , /// Population standard deviation of the absolute error
    pub consistency: f64
}

impl Metrics
{   pub fn compute(records: &[PredictionRecord]) -> Self
    {   let mut confusion = [[0usize; 5]; 5];
        let mut errors: Vec<f64> = Vec::new();
        let mut correct = 0usize;

        for record in records
        {   if let Some(predicted) = record.outcome.predicted_stars()
            {   let actual = record.actual_stars;
                if let Some(cell) = usize::from(actual)
                  .checked_sub(1)
                  .and_then(|row| confusion.get_mut(row))
                  .and_then(|row| row.get_mut(usize::from(predicted) - 1))
                {   *cell += 1;
                }
                if actual == predicted
                {   correct += 1;
                }
                errors.push(f64::from(actual.abs_diff(predicted)));
            }
        }

        let total = records.len();
        let valid = errors.len();
        let ratio = |n: usize, d: usize| {
          if d == 0 { 0.0 } else { n as f64 / d as f64 }
        };

        Metrics
        {   total
          , valid
          , validity_rate: ratio(valid, total)
          , accuracy: ratio(correct, valid)
          , confusion
          , consistency: population_std_dev(&errors)
        }
    }
}

/// Standard deviation with divisor n; 0 for an empty slice
pub fn population_std_dev(values: &[f64]) -> f64
{   if values.is_empty()
    {   return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter()
      .map(|v| (v - mean).powi(2))
      .sum::<f64>() / n;
    variance.sqrt()
}

/// All records and metrics for one variant
#[derive(Debug, Clone)]
pub struct VariantResult
{   pub variant: PromptVariant
  , pub records: Vec<PredictionRecord>
  , pub metrics: Metrics
}

/// Runs prompt variants over a dataset, one review at a time
pub struct Evaluator<'a>
{   client: &'a crate::client::ResilientCompletionClient
  , pause: Arc<dyn crate::retry::Pause>
  , pacing: Duration
}

impl<'a> Evaluator<'a>
{   pub fn new(client: &'a crate::client::ResilientCompletionClient) -> Self
    {   Evaluator
        {   client
          , pause: client.pause_handle()
          , pacing: Duration::from_millis(DEFAULT_PACING_MS)
        }
    }

    /// Pause after each review; zero disables pacing
    pub fn with_pacing(mut self, pacing: Duration) -> Self
    {   self.pacing = pacing;
        self
    }

    /// Evaluate a template; output order matches `reviews`
    pub async fn run_template(
      &self
    , template: &str
    , reviews: &[LabeledReview]
    ) -> Vec<PredictionRecord>
    {   let mut records = Vec::with_capacity(reviews.len());
        for (idx, review) in reviews.iter().enumerate()
        {   let (outcome, raw_response)
              = predict_rating(self.client, template, &review.text).await;
            if let crate::parser::RatingOutcome::Invalid { reason, .. }
              = &outcome
            {   debug!("Review {} invalid: {}", idx + 1, reason);
            }
            records.push(PredictionRecord
            {   actual_stars: review.stars
              , outcome
              , raw_response
            });

            if (idx + 1) % PROGRESS_EVERY == 0
            {   info!("Processed {}/{} reviews...", idx + 1, reviews.len());
            }
            if !self.pacing.is_zero()
            {   self.pause.pause(self.pacing).await;
            }
        }
        records
    }

    /// Evaluate one variant and compute its metrics
    pub async fn run(
      &self
    , variant: PromptVariant
    , reviews: &[LabeledReview]
    ) -> VariantResult
    {   info!("Testing: {}", variant.name());
        let records = self.run_template(variant.template(), reviews).await;
        let metrics = Metrics::compute(&records);
        info!(
          "Completed {}: valid JSON responses {}/{}",
          variant.name(), metrics.valid, metrics.total
        );
        VariantResult
        {   variant
          , records
          , metrics
        }
    }

    /// Evaluate every variant in order
    pub async fn run_all(
      &self
    , reviews: &[LabeledReview]
    ) -> Vec<VariantResult>
    {   let mut results = Vec::new();
        for variant in PromptVariant::all()
        {   results.push(self.run(variant, reviews).await);
        }
        results
    }
}

/// Comparison table, one row per variant
pub fn comparison_csv(results: &[VariantResult]) -> String
{   let mut out = crate::csv::record(&[
      "Prompt"
    , "Accuracy"
    , "JSON Validity Rate"
    , "Valid Predictions"
    , "Consistency (Lower is Better)"
    ]);
    for result in results
    {   let m = &result.metrics;
        out.push_str(&crate::csv::record(&[
          result.variant.name().to_string()
        , format!("{:.2}%", m.accuracy * 100.0)
        , format!("{:.2}%", m.validity_rate * 100.0)
        , format!("{}/{}", m.valid, m.total)
        , format!("{:.3}", m.consistency)
        ]));
    }
    out
}

/// Every record of every variant, keyed by variant name
pub fn detailed_json(
  results: &[VariantResult]
) -> Result<String, crate::error::Error>
{   let mut map = serde_json::Map::new();
    for result in results
    {   let details: Vec<DetailedRecord> = result.records
          .iter()
          .map(PredictionRecord::to_detail)
          .collect();
        let value = serde_json::to_value(details)
          .map_err(|e| crate::error::Error::Other(e.to_string()))?;
        map.insert(result.variant.name().to_string(), value);
    }
    serde_json::to_string_pretty(&serde_json::Value::Object(map))
      .map_err(|e| crate::error::Error::Other(e.to_string()))
}

/// Write both reports into `out_dir`, returning their paths
pub fn write_reports(
  results: &[VariantResult]
, out_dir: impl AsRef<Path>
) -> Result<(PathBuf, PathBuf), crate::error::Error>
{   let out_dir = out_dir.as_ref();
    std::fs::create_dir_all(out_dir)?;

    let comparison_path = out_dir.join(COMPARISON_FILE);
    std::fs::write(&comparison_path, comparison_csv(results))?;
    info!("Results saved to {}", comparison_path.display());

    let detailed_path = out_dir.join(DETAILED_FILE);
    std::fs::write(&detailed_path, detailed_json(results)?)?;
    info!("Detailed predictions saved to {}", detailed_path.display());

    Ok((comparison_path, detailed_path))
}
