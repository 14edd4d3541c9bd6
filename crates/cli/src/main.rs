//! `review-etl`: place ids -> reviews -> sentence sentiment -> entities.

mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use enrich::{CachedClient, EnrichmentClient, PortalClient};
use pipeline::{Pipeline, StageReport};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML config file; flags and environment override it
    #[arg(long, global = true, env = "REVIEW_ETL_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the cache artifacts
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Maximum concurrent remote calls per stage
    #[arg(long, global = true)]
    workers: Option<usize>,

    /// Skip failing inputs instead of aborting the stage
    #[arg(long, global = true)]
    partial: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[arg(long, global = true, env = "REVIEW_ETL_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[arg(long, global = true, env = "REVIEW_ETL_BASE_URL")]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run all three stages from the place id table
    Run(InputArgs),
    /// Place ids -> reviews
    Reviews(InputArgs),
    /// Reviews -> sentiment by sentence
    Sentiment(InputArgs),
    /// Sentences -> recognized entities
    Entities(InputArgs),
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Input table; defaults to the previous stage's artifact
    #[arg(long)]
    input: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let config = resolve_config(&cli)?;
    let client = build_client(&config)?;
    let mut pipeline = Pipeline::new(client, config.pipeline_config());

    let reports: Vec<StageReport> = match cli.command {
        Commands::Run(args) => {
            let input = args.input.unwrap_or_else(|| config.place_ids_path());
            let output = pipeline.run(input).await?;
            info!(run_id = %output.run_id, "Run finished");
            output.reports().into_iter().cloned().collect()
        }
        Commands::Reviews(args) => {
            let input = args.input.unwrap_or_else(|| config.place_ids_path());
            vec![pipeline.reviews_step(input).await?.report]
        }
        Commands::Sentiment(args) => {
            let input = args.input.unwrap_or_else(|| config.artifact_paths().reviews);
            vec![pipeline.sentiment_step(input).await?.report]
        }
        Commands::Entities(args) => {
            let input = args.input.unwrap_or_else(|| config.artifact_paths().sentiment);
            vec![pipeline.entity_extraction_step(input).await?.report]
        }
    };

    for report in &reports {
        print_summary(report);
    }
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.compact().init();
    }
}

fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = AppConfig::load(cli.config.as_deref())?;

    if let Some(dir) = &cli.cache_dir {
        config.artifacts.dir = dir.clone();
    }
    if let Some(workers) = cli.workers {
        config.concurrency.workers = workers;
    }
    if cli.partial {
        config.failure_policy = pipeline::FailurePolicy::Partial;
    }
    if let Some(key) = &cli.api_key {
        config.api.api_key = Some(key.clone());
    }
    if let Some(url) = &cli.base_url {
        config.api.base_url = url.clone();
    }
    Ok(config)
}

fn build_client(config: &AppConfig) -> Result<Arc<dyn EnrichmentClient>> {
    let portal = PortalClient::new(&config.api.base_url, config.api_key()?, config.timeout())
        .context("Failed to create enrichment client")?;

    if config.cache.enabled {
        info!(max_entries = config.cache.max_entries, "Response cache enabled");
        Ok(Arc::new(CachedClient::new(portal, config.cache.max_entries)))
    } else {
        Ok(Arc::new(portal))
    }
}

fn print_summary(report: &StageReport) {
    println!(
        "{:<10} {} in -> {} out ({} without children, {} failed, {} score warnings) {} sha256:{}",
        report.stage.as_str(),
        report.input_rows,
        report.output_rows,
        report.childless,
        report.failures.len(),
        report.score_warnings,
        report.artifact.path.display(),
        report.artifact.digest,
    );
    for failure in &report.failures {
        println!("  #{} {}: {}", failure.index, failure.input, failure.cause);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_flags_override_config() {
        let cli = Cli::try_parse_from([
            "review-etl",
            "--workers",
            "2",
            "--partial",
            "--cache-dir",
            "/tmp/etl",
            "--api-key",
            "k",
            "sentiment",
        ])
        .unwrap();

        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.concurrency.workers, 2);
        assert_eq!(config.failure_policy, pipeline::FailurePolicy::Partial);
        assert_eq!(
            config.artifact_paths().reviews,
            PathBuf::from("/tmp/etl").join(pipeline::REVIEWS_FILE)
        );
        assert_eq!(config.api_key().unwrap(), "k");
        assert!(matches!(cli.command, Commands::Sentiment(InputArgs { input: None })));
    }

    #[test]
    fn test_stage_input_flag() {
        let cli = Cli::try_parse_from(["review-etl", "entities", "--input", "s.csv"]).unwrap();
        match cli.command {
            Commands::Entities(args) => assert_eq!(args.input, Some(PathBuf::from("s.csv"))),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
