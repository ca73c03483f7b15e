use crate::cache::ResultCache;
use crate::config::{mask_api_key, resolve_api_key, ConfigStore, Settings, API_KEY_ENV};
use crate::endpoint::Endpoint;
use crate::extractor::EndpointExtractor;
use crate::formatter::{render_endpoints, render_stats, RunStats};
use crate::summarizer::{GeminiClient, PipelineConfig, Summarizer};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// API Digest - find REST API endpoints in a codebase and summarize what each one does
#[derive(Parser, Debug)]
#[command(name = "api-digest")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    /// Settings file to use instead of ~/.api-digest/config.yaml
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze REST API endpoints in a directory
    Sum(SumArgs),
    /// Manage configuration settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Manage the summary cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Args, Debug)]
pub struct SumArgs {
    /// Directory to scan (defaults to the current directory)
    #[arg(value_name = "DIRECTORY", default_value = ".")]
    pub directory: PathBuf,

    /// Disable cache and regenerate all summaries
    #[arg(long = "no-cache")]
    pub no_cache: bool,

    /// Give up on outstanding summaries after this many seconds
    #[arg(long = "timeout", value_name = "SECS", default_value_t = 300)]
    pub timeout: u64,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Set configuration values
    Set {
        #[command(subcommand)]
        key: SetKey,
    },
    /// Get configuration values
    Get {
        #[command(subcommand)]
        key: GetKey,
    },
}

#[derive(Subcommand, Debug)]
pub enum SetKey {
    /// Set the Gemini API key
    ApiKey { key: String },
    /// Set the Gemini model name
    Model { name: String },
}

#[derive(Subcommand, Debug)]
pub enum GetKey {
    /// Show the current API key (masked)
    ApiKey,
    /// Show the model in use
    Model,
}

#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// Remove every cached summary
    Clear,
}

/// Validates the scan target and returns its canonical path.
pub fn resolve_directory(directory: &Path) -> Result<PathBuf> {
    if !directory.exists() {
        anyhow::bail!("Directory does not exist: {}", directory.display());
    }
    if !directory.is_dir() {
        anyhow::bail!("Path is not a directory: {}", directory.display());
    }
    directory
        .canonicalize()
        .with_context(|| format!("Error resolving directory path: {}", directory.display()))
}

/// Returns the settings store named by `--config`, or the per-user default.
pub fn config_store(config: Option<PathBuf>) -> Result<ConfigStore> {
    match config {
        Some(path) => Ok(ConfigStore::new(path)),
        None => Ok(ConfigStore::default_location()?),
    }
}

/// Deadline `timeout_secs` from now, or none when that instant is not representable.
pub fn pipeline_deadline(timeout_secs: u64) -> Option<tokio::time::Instant> {
    let deadline = tokio::time::Instant::now().checked_add(Duration::from_secs(timeout_secs));
    if deadline.is_none() {
        warn!("Timeout of {}s is out of range, running without a deadline", timeout_secs);
    }
    deadline
}

/// Run the selected command
pub async fn run(args: CliArgs) -> Result<()> {
    debug!("Parsed arguments: {:?}", args);

    match args.command {
        Command::Sum(sum) => run_sum(sum, config_store(args.config)?).await,
        Command::Config { action } => run_config(action, config_store(args.config)?),
        Command::Cache { action } => run_cache(action),
    }
}

fn load_settings(store: &ConfigStore) -> Settings {
    match store.load() {
        Ok(settings) => settings,
        Err(e) => {
            warn!("Ignoring unreadable config file: {}", e);
            Settings::default()
        }
    }
}

async fn run_sum(args: SumArgs, store: ConfigStore) -> Result<()> {
    let started = Instant::now();
    let directory = resolve_directory(&args.directory)?;

    let settings = load_settings(&store);
    let Some(api_key) = resolve_api_key(std::env::var(API_KEY_ENV).ok(), &settings) else {
        anyhow::bail!(
            "Gemini API key not set.\n\
             Set it with one of:\n  \
             1. api-digest config set api-key YOUR_API_KEY\n  \
             2. export {}=YOUR_API_KEY",
            API_KEY_ENV
        );
    };

    let cache = if args.no_cache {
        info!("Cache disabled");
        None
    } else {
        match ResultCache::open_default() {
            Ok(cache) => Some(cache),
            Err(e) => {
                warn!("Could not initialize cache, continuing without it: {}", e);
                None
            }
        }
    };

    info!("Starting REST API analysis of {}", directory.display());
    let extraction = EndpointExtractor::new().extract_directory(&directory)?;
    let mut endpoints = extraction.endpoints;

    if endpoints.is_empty() {
        println!("No REST API endpoints found in {}", directory.display());
        println!("Make sure the directory contains source code with REST API definitions.");
        return Ok(());
    }

    let mut pending: Vec<usize> = Vec::new();
    let mut cached_count = 0;
    for (index, endpoint) in endpoints.iter_mut().enumerate() {
        match cache.as_ref().and_then(|c| c.lookup_endpoint(endpoint)) {
            Some(summary) => {
                endpoint.summary = summary;
                cached_count += 1;
            }
            None => pending.push(index),
        }
    }
    if cached_count > 0 {
        info!("Using {} cached summaries", cached_count);
    }

    if !pending.is_empty() {
        let mut batch: Vec<Endpoint> = pending.iter().map(|&i| endpoints[i].clone()).collect();
        summarize_pending(&mut batch, &api_key, settings.model(), args.timeout).await?;

        if let Some(cache) = &cache {
            store_summaries(cache, &batch);
        }
        for (index, endpoint) in pending.iter().zip(batch) {
            endpoints[*index] = endpoint;
        }
    }

    print!("{}", render_endpoints(&endpoints));
    print!(
        "{}",
        render_stats(&RunStats {
            total: endpoints.len(),
            cached: cached_count,
            generated: pending.len(),
            elapsed: started.elapsed(),
        })
    );

    Ok(())
}

async fn summarize_pending(
    endpoints: &mut [Endpoint],
    api_key: &str,
    model: &str,
    timeout_secs: u64,
) -> Result<()> {
    let client = GeminiClient::new(api_key, model).context("Error creating Gemini client")?;
    info!(
        "Generating summaries for {} endpoints with {}",
        endpoints.len(),
        client.model()
    );

    let summarizer = Summarizer::new(client, PipelineConfig::default());
    let report = summarizer
        .summarize(endpoints, pipeline_deadline(timeout_secs))
        .await;

    if report.failed > 0 {
        warn!("{} of {} batches failed", report.failed, report.batches);
    }
    if report.abandoned > 0 {
        warn!(
            "{} of {} batches did not finish within {}s",
            report.abandoned, report.batches, timeout_secs
        );
    }
    Ok(())
}

/// Writes every real summary back to the cache; failures are only logged.
pub fn store_summaries(cache: &ResultCache, endpoints: &[Endpoint]) -> usize {
    let mut stored = 0;
    for endpoint in endpoints.iter().filter(|e| e.has_summary()) {
        match cache.store_endpoint(endpoint) {
            Ok(()) => stored += 1,
            Err(e) => warn!(
                "Failed to cache summary for {} {}: {}",
                endpoint.method, endpoint.path, e
            ),
        }
    }
    debug!("Cached {} new summaries", stored);
    stored
}

fn run_config(action: ConfigAction, store: ConfigStore) -> Result<()> {

    match action {
        ConfigAction::Set { key } => match key {
            SetKey::ApiKey { key } => {
                store.set_api_key(&key).context("Error saving API key")?;
                println!("API key saved to {}", store.path().display());
                println!("You can now use 'api-digest sum' to analyze your APIs.");
            }
            SetKey::Model { name } => {
                store.set_model(&name).context("Error saving model")?;
                println!("Model set to {}", name);
            }
        },
        ConfigAction::Get { key } => {
            let settings = load_settings(&store);
            match key {
                GetKey::ApiKey => {
                    match resolve_api_key(std::env::var(API_KEY_ENV).ok(), &settings) {
                        Some(api_key) => {
                            println!("Current API key: {}", mask_api_key(&api_key))
                        }
                        None => {
                            println!("No API key configured.");
                            println!("Set one using: api-digest config set api-key YOUR_KEY");
                        }
                    }
                }
                GetKey::Model => println!("Current model: {}", settings.model()),
            }
        }
    }

    Ok(())
}

fn run_cache(action: CacheAction) -> Result<()> {
    match action {
        CacheAction::Clear => {
            let cache = ResultCache::open_default()?;
            cache.clear().context("Error clearing cache")?;
            println!("Cache cleared: {}", cache.dir().display());
        }
    }
    Ok(())
}
