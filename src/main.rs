//! API Digest - command-line tool for summarizing the REST API of a codebase.
//!
//! Scans a source tree for route declarations in Express, Flask, FastAPI, Spring, Gin, Echo,
//! Rails and ASP.NET code, then asks Gemini for a one-line summary of each endpoint.
//!
//! # Usage
//!
//! ```bash
//! api-digest [OPTIONS] <COMMAND>
//! ```
//!
//! # Examples
//!
//! Summarize the current directory:
//! ```bash
//! api-digest sum
//! ```
//!
//! Regenerate every summary for another project:
//! ```bash
//! api-digest sum ./my-api-project --no-cache
//! ```
//!
//! Store the API key:
//! ```bash
//! api-digest config set api-key YOUR_API_KEY
//! ```

use anyhow::Result;
use api_digest::cli;
use clap::Parser;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .parse_default_env()
        .init();

    info!("API Digest starting...");

    cli::run(args).await?;

    Ok(())
}
