use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use jobmatch::{Config, JobBackend, MatchResult, Pipeline};

#[derive(Parser)]
#[command(name = "jobmatch", version)]
#[command(about = "Match a résumé against live job postings")]
struct Cli {
    /// Résumé document (PDF)
    document: PathBuf,

    /// Job backend: scrape or api (overrides JOB_SOURCE)
    #[arg(long)]
    source: Option<JobBackend>,

    /// Base path for the postings CSV; one file is written per search query
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Print results as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Show at most this many matches
    #[arg(long, default_value_t = 20)]
    limit: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (fails on missing required env vars)
    let mut config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting jobmatch v{}", env!("CARGO_PKG_VERSION"));

    // Command-line flags override the environment
    if let Some(source) = cli.source {
        config.job_backend = source;
    }
    if let Some(csv) = cli.csv {
        config.scrape.csv_path = csv.clone();
        config.api.csv_path = Some(csv);
    }

    // Wire LLM client, job source and matcher
    let pipeline = Pipeline::from_config(&config)?;

    // Ctrl+C cancels the run in progress
    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Ctrl+C received, cancelling run");
            let _ = cancel_tx.send(true);
        }
    });

    let run = pipeline.run(&cli.document, cancel_rx).await;
    info!("Run {} finished in state {:?}", run.run_id, run.state);
    let mut results = match run.into_result() {
        Ok(results) => results,
        Err(e) => {
            error!("[{}] {}", e.error.code(), e);
            return Err(e.into());
        }
    };
    results.truncate(cli.limit);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print_table(&results);
    }
    Ok(())
}

fn print_table(results: &[MatchResult]) {
    if results.is_empty() {
        println!("No matching jobs found.");
        return;
    }
    println!(
        "{:>3}  {:>5}  {:<40}  {:<25}  {:<20}  {}",
        "#", "score", "title", "company", "location", "posted"
    );
    for (rank, result) in results.iter().enumerate() {
        let posting = &result.posting;
        println!(
            "{:>3}  {:>4.0}%  {:<40}  {:<25}  {:<20}  {}",
            rank + 1,
            result.score * 100.0,
            truncate(&posting.title, 40),
            truncate(&posting.company, 25),
            truncate(&posting.location, 20),
            posting.date_posted
        );
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
