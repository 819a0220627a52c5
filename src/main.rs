use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use clap::{Parser, Subcommand};
use log::{info, warn};

/// Rating-prediction evaluation and review analysis over hosted LLMs
#[derive(Debug, Parser)]
#[command(name = "revlm", version, about)]
struct Cli
{   /// JSON client configuration (defaults to REVLM_* environment)
    #[arg(long, global = true)]
    config: Option<PathBuf>
  , #[command(subcommand)]
    command: Command
}

#[derive(Debug, Subcommand)]
enum Command
{   /// Compare the prompt variants on a labeled dataset
    Evaluate
    {   /// JSON array or JSON-lines file of {text, stars}
        #[arg(long)]
        dataset: PathBuf
      , /// Evaluate only the first N reviews, in file order (not a random sample)
        #[arg(long)]
        sample: Option<usize>
      , /// Directory for the comparison CSV and detailed JSON
        #[arg(long, default_value = ".")]
        out_dir: PathBuf
      , /// Pause after each review, in milliseconds
        #[arg(long, default_value_t = revlm::evaluation::DEFAULT_PACING_MS)]
        pace_ms: u64
    }
  , /// Generate reply, summary and actions for one review
    Analyze
    {   #[arg(long)]
        rating: u8
      , #[arg(long)]
        text: String
      , #[arg(long)]
        name: Option<String>
    }
}

fn load_config(
  path: Option<&PathBuf>
, interactive: bool
) -> Result<revlm::ClientConfig, revlm::Error>
{   let preset = if interactive
    {   revlm::RetryConfig::interactive()
    } else
    {   revlm::RetryConfig::batch()
    };
    match path
    {   Some(path) => {
          revlm::ClientConfig::from_json_file_with_preset(path, preset)
        }
      , None => revlm::ClientConfig::from_lookup_with_preset(
          |key| std::env::var(key).ok(),
          preset
        )
    }
}

async fn evaluate(
  config: &revlm::ClientConfig
, dataset: PathBuf
, sample: Option<usize>
, out_dir: PathBuf
, pace_ms: u64
) -> Result<(), Box<dyn std::error::Error>>
{   let mut reviews = revlm::evaluation::load_reviews(&dataset)?;
    if let Some(n) = sample
    {   reviews.truncate(n);
    }
    info!("Evaluating {} reviews", reviews.len());

    let client = revlm::ResilientCompletionClient::new(config)?;
    if !client.is_configured()
    {   warn!("No credential configured; every prediction will be invalid");
    }
    let evaluator = revlm::evaluation::Evaluator::new(&client)
      .with_pacing(Duration::from_millis(pace_ms));
    let results = evaluator.run_all(&reviews).await;

    for result in &results
    {   let m = &result.metrics;
        println!("{}:", result.variant.name());
        println!("  Accuracy: {:.2}%", m.accuracy * 100.0);
        println!("  JSON Validity: {:.2}%", m.validity_rate * 100.0);
        println!("  Valid Predictions: {}/{}", m.valid, m.total);
        println!("  Consistency: {:.3}", m.consistency);
    }

    let (comparison, detailed)
      = revlm::evaluation::write_reports(&results, &out_dir)?;
    println!("Results saved to {}", comparison.display());
    println!("Detailed predictions saved to {}", detailed.display());
    Ok(())
}

async fn analyze(
  config: &revlm::ClientConfig
, submission: revlm::analysis::ReviewSubmission
) -> Result<(), Box<dyn std::error::Error>>
{   let submission = submission.validate()?;
    let client = Arc::new(revlm::ResilientCompletionClient::new(config)?);
    let analyzer = revlm::analysis::ReviewAnalyzer::new(client);
    let analysis = analyzer.process_review(&submission).await;
    println!("{}", serde_json::to_string_pretty(&analysis)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>>
{   dotenv::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    match cli.command
    {   Command::Evaluate { dataset, sample, out_dir, pace_ms } => {
          let config = load_config(cli.config.as_ref(), false)?;
          evaluate(&config, dataset, sample, out_dir, pace_ms).await
        }
      , Command::Analyze { rating, text, name } => {
          let config = load_config(cli.config.as_ref(), true)?;
          let submission
            = revlm::analysis::ReviewSubmission::new(name, rating, text);
          analyze(&config, submission).await
        }
    }
}
