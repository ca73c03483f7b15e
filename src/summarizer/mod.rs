//! Batched, rate-limited endpoint summarization.
//!
//! A run splits the endpoints into contiguous batches of [`PipelineConfig::batch_size`] and
//! sends one prompt per batch to a [`TextGenerator`]. Two limits apply at once:
//!
//! - at most [`PipelineConfig::max_concurrency`] requests are in flight (a semaphore), and
//! - batch `i` waits `i * stagger` before it even asks for a permit, spreading requests out
//!   under the service's requests-per-minute ceiling.
//!
//! Every batch owns a disjoint `&mut` slice of the input, so summaries are written without
//! any locking. A failed batch is logged and its endpoints get
//! [`SUMMARY_UNAVAILABLE`](crate::endpoint::SUMMARY_UNAVAILABLE); batches still waiting or in
//! flight when the deadline passes are abandoned and their endpoints keep an empty summary.
//!
//! Caching is left to the caller.

pub mod gemini;
pub mod prompt;

use crate::endpoint::{Endpoint, SUMMARY_UNAVAILABLE};
use crate::error::GenerationError;
use async_trait::async_trait;
use futures::future::join_all;
use log::{debug, info, warn};
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::{timeout_at, Instant};

pub use gemini::GeminiClient;
pub use prompt::{assign_summaries, build_batch_prompt, parse_batch_response};

/// Sampling parameters sent with every request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            max_output_tokens: 100,
        }
    }
}

/// A stateless prompt-in, text-out generation service.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, GenerationError>;
}

/// Tunables for one summarization run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub batch_size: usize,
    pub max_concurrency: usize,
    /// Start delay added per batch index
    pub stagger: Duration,
    pub params: GenerationParams,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: 5,
            max_concurrency: 3,
            stagger: Duration::from_secs(2),
            params: GenerationParams::default(),
        }
    }
}

/// How each batch of a run ended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryReport {
    pub batches: usize,
    pub completed: usize,
    pub failed: usize,
    pub abandoned: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BatchOutcome {
    Completed,
    Failed,
    Abandoned,
}

/// Runs the batching pipeline against a text generator.
pub struct Summarizer<G> {
    generator: G,
    config: PipelineConfig,
}

impl<G: TextGenerator> Summarizer<G> {
    pub fn new(generator: G, config: PipelineConfig) -> Self {
        Self { generator, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Summarizes `endpoints` in place.
    ///
    /// Never fails as a whole: batch errors and deadline expiry only degrade the result,
    /// which the returned report describes.
    pub async fn summarize(
        &self,
        endpoints: &mut [Endpoint],
        deadline: Option<Instant>,
    ) -> SummaryReport {
        if endpoints.is_empty() {
            return SummaryReport::default();
        }

        let batch_size = self.config.batch_size.max(1);
        let gate = Semaphore::new(self.config.max_concurrency.max(1));

        let workers: Vec<_> = endpoints
            .chunks_mut(batch_size)
            .enumerate()
            .map(|(index, batch)| self.run_batch(index, batch, &gate, deadline))
            .collect();

        info!(
            "Dispatching {} batches ({} at a time)",
            workers.len(),
            self.config.max_concurrency.max(1)
        );

        let outcomes = join_all(workers).await;

        let mut report = SummaryReport {
            batches: outcomes.len(),
            ..Default::default()
        };
        for outcome in outcomes {
            match outcome {
                BatchOutcome::Completed => report.completed += 1,
                BatchOutcome::Failed => report.failed += 1,
                BatchOutcome::Abandoned => report.abandoned += 1,
            }
        }

        debug!("Summarization finished: {:?}", report);
        report
    }

    async fn run_batch(
        &self,
        index: usize,
        batch: &mut [Endpoint],
        gate: &Semaphore,
        deadline: Option<Instant>,
    ) -> BatchOutcome {
        let work = async {
            if index > 0 {
                let delay = self.config.stagger.saturating_mul(index as u32);
                tokio::time::sleep(delay).await;
            }

            let Ok(_permit) = gate.acquire().await else {
                return BatchOutcome::Abandoned;
            };
            self.summarize_batch(index, batch).await
        };

        match deadline {
            Some(deadline) => match timeout_at(deadline, work).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    warn!("Batch {} abandoned: deadline exceeded", index);
                    BatchOutcome::Abandoned
                }
            },
            None => work.await,
        }
    }

    async fn summarize_batch(&self, index: usize, batch: &mut [Endpoint]) -> BatchOutcome {
        let prompt = build_batch_prompt(batch);
        debug!("Sending batch {} with {} endpoints", index, batch.len());

        match self.generator.generate(&prompt, &self.config.params).await {
            Ok(text) => {
                let summaries = parse_batch_response(&text);
                if summaries.len() < batch.len() {
                    debug!(
                        "Batch {} returned {} of {} summaries",
                        index,
                        summaries.len(),
                        batch.len()
                    );
                }
                assign_summaries(batch, summaries);
                BatchOutcome::Completed
            }
            Err(e) => {
                warn!("Failed to summarize batch {}: {}", index, e);
                for endpoint in batch.iter_mut() {
                    endpoint.summary = SUMMARY_UNAVAILABLE.to_string();
                }
                BatchOutcome::Failed
            }
        }
    }
}
