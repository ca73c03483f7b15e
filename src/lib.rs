//! API Digest - REST endpoint discovery and summarization.
//!
//! This library finds REST API endpoint declarations in source trees written for a range of
//! web frameworks and produces a short natural-language summary of each one using a text
//! generation service. Discovery is purely lexical: every framework is described by a small
//! table of line-oriented regular expressions, so no language parsing is involved.
//!
//! # Supported Frameworks
//!
//! - **Express** (JavaScript/TypeScript): `app.get(...)`, `router.post(...)`, `app.route(...)`
//! - **Flask** and **FastAPI** (Python): route decorators
//! - **Spring** (Java): `@GetMapping`, `@RequestMapping`, ...
//! - **Gin** and **Echo** (Go): `router.GET(...)`, `e.POST(...)`
//! - **Rails** (Ruby): verb routes and `resources`
//! - **ASP.NET** (C#): `[HttpGet]`, `[Route]` attributes
//!
//! # Architecture
//!
//! 1. [`scanner`] - Walks the project tree and selects candidate source files
//! 2. [`patterns`] - Per-framework route patterns
//! 3. [`extractor`] - Applies the patterns line by line and builds [`endpoint::Endpoint`]s
//! 4. [`cache`] - Persistent, content-addressed summary cache with a TTL
//! 5. [`summarizer`] - Batched, rate-limited summary generation
//! 6. [`formatter`] - Plain-text report
//! 7. [`config`] - API key and model settings
//!
//! # Example Usage
//!
//! ```no_run
//! use api_digest::{
//!     extractor::EndpointExtractor,
//!     summarizer::{GeminiClient, PipelineConfig, Summarizer},
//!     formatter::render_endpoints,
//! };
//! use std::path::Path;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let result = EndpointExtractor::new().extract_directory(Path::new("./my-project"))?;
//! let mut endpoints = result.endpoints;
//!
//! let client = GeminiClient::new("API_KEY", "gemini-2.0-flash")?;
//! let summarizer = Summarizer::new(client, PipelineConfig::default());
//! summarizer.summarize(&mut endpoints, None).await;
//!
//! println!("{}", render_endpoints(&endpoints));
//! # Ok(())
//! # }
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod cache;
pub mod cli;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod extractor;
pub mod formatter;
pub mod patterns;
pub mod scanner;
pub mod summarizer;
