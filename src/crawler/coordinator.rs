//! Crawler coordinator - batch orchestration logic
//!
//! This module drives one batch of links to completion:
//! - One task per link, all under a child of the caller's cancellation token
//! - Fetch, extract, convert and write run in order inside each task
//! - A failing stage ends that link only and becomes its outcome
//! - Outcomes flow back over a channel; the coordinator is the only writer
//!   of the outcome list

use crate::config::Config;
use crate::crawler::converter::{ContentConverter, ConversionError, MarkdownConverter};
use crate::crawler::fetcher::{build_http_client, fetch_page, FetchError};
use crate::crawler::metadata::parse_page;
use crate::links::LinkRecord;
use crate::output::{CrawlOutcome, DocumentWriter, FailureKind, WriteError};
use crate::state::LinkState;
use crate::ClipperError;
use reqwest::Client;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Everything a link task needs, shared by all tasks of a batch
struct Pipeline {
    client: Client,
    converter: Arc<dyn ContentConverter>,
    writer: DocumentWriter,
}

/// Why a single link did not produce a clipping
#[derive(Debug, Error)]
enum LinkFailure {
    #[error("Batch cancelled before {url} was fetched")]
    NotStarted { url: String },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error(transparent)]
    Write(#[from] WriteError),
}

impl LinkFailure {
    fn kind(&self) -> FailureKind {
        match self {
            Self::NotStarted { .. } => FailureKind::Timeout,
            Self::Fetch(e) if e.is_timeout() => FailureKind::Timeout,
            Self::Fetch(_) => FailureKind::Fetch,
            Self::Conversion(_) => FailureKind::Conversion,
            Self::Write(_) => FailureKind::Write,
        }
    }

    fn state(&self) -> LinkState {
        match self.kind() {
            FailureKind::Timeout => LinkState::TimedOut,
            _ => LinkState::Failed,
        }
    }
}

/// One link moving through the pipeline
struct LinkTask {
    link: LinkRecord,
    state: LinkState,
}

impl LinkTask {
    fn new(link: LinkRecord) -> Self {
        Self {
            link,
            state: LinkState::Pending,
        }
    }

    fn advance(&mut self, next: LinkState) {
        if !self.state.can_transition_to(next) {
            tracing::warn!("Unexpected transition {} -> {}", self.state, next);
        }
        tracing::trace!("{} -> {}", self.state, next);
        self.state = next;
    }

    async fn run(
        &mut self,
        pipeline: &Pipeline,
        limiter: Option<&Semaphore>,
        cancel: &CancellationToken,
    ) -> Result<PathBuf, LinkFailure> {
        let not_started = || LinkFailure::NotStarted {
            url: self.link.url().to_string(),
        };

        if cancel.is_cancelled() {
            return Err(not_started());
        }

        let _permit = match limiter {
            Some(semaphore) => tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(not_started()),
                permit = semaphore.acquire() => permit.ok(),
            },
            None => None,
        };

        self.advance(LinkState::Fetching);
        let page = fetch_page(&pipeline.client, self.link.url(), cancel).await?;
        tracing::debug!("Fetched {} (HTTP {})", page.final_url, page.status_code);

        let parsed = parse_page(&page.body, &self.link.title);
        self.link.apply_meta(parsed.meta);
        self.advance(LinkState::Extracted);

        self.advance(LinkState::Converting);
        let markdown = pipeline.converter.convert(&parsed.content)?;
        self.advance(LinkState::Converted);

        self.advance(LinkState::Writing);
        let path = pipeline.writer.write(&self.link, &markdown).await?;
        self.advance(LinkState::Written);

        Ok(path)
    }
}

/// Processes one link and always returns its outcome
async fn process_link(
    pipeline: &Pipeline,
    limiter: Option<&Semaphore>,
    link: LinkRecord,
    cancel: &CancellationToken,
) -> CrawlOutcome {
    let mut task = LinkTask::new(link);

    let outcome = match task.run(pipeline, limiter, cancel).await {
        Ok(path) => {
            tracing::debug!("Wrote {}", path.display());
            CrawlOutcome::succeeded(&task.link)
        }
        Err(failure) => {
            task.advance(failure.state());
            match failure.kind() {
                FailureKind::Timeout => {
                    tracing::warn!("Timeout while visiting {}: {}", task.link.url(), failure)
                }
                _ => tracing::error!("Error while visiting {}: {}", task.link.url(), failure),
            }
            CrawlOutcome::failed(&task.link, failure.kind(), &failure)
        }
    };

    task.advance(LinkState::Recorded);
    outcome
}

/// Batch crawler
///
/// Holds the HTTP client, converter and writer shared by every link task.
pub struct Crawler {
    pipeline: Arc<Pipeline>,
    limiter: Option<Arc<Semaphore>>,
}

impl Crawler {
    /// Creates a crawler converting pages with [`MarkdownConverter`]
    pub fn new(config: &Config) -> Result<Self, ClipperError> {
        Self::with_converter(config, Arc::new(MarkdownConverter::new()))
    }

    /// Creates a crawler with a custom content converter
    pub fn with_converter(
        config: &Config,
        converter: Arc<dyn ContentConverter>,
    ) -> Result<Self, ClipperError> {
        let client = build_http_client(&config.crawler)?;
        let writer = DocumentWriter::new(
            &config.output.base_dir,
            config.output.fixed_tags.clone(),
        );

        let limiter = match config.crawler.max_concurrent_fetches {
            0 => None,
            n => Some(Arc::new(Semaphore::new(n))),
        };

        Ok(Self {
            pipeline: Arc::new(Pipeline {
                client,
                converter,
                writer,
            }),
            limiter,
        })
    }

    /// Visits every link and returns one outcome per link, in completion order
    ///
    /// Per-link failures are recorded in the outcomes and never fail the
    /// batch. The only batch error is `cancel` firing before the batch
    /// finished; tasks still drain first so no fetch outlives the call.
    pub async fn run(
        &self,
        links: Vec<LinkRecord>,
        cancel: &CancellationToken,
    ) -> Result<Vec<CrawlOutcome>, ClipperError> {
        if links.is_empty() {
            tracing::warn!("No links to visit");
            return Ok(Vec::new());
        }

        let total = links.len();
        tracing::info!("Visiting {} links", total);

        let batch = cancel.child_token();
        let (tx, mut rx) = mpsc::unbounded_channel::<CrawlOutcome>();
        let mut handles = Vec::with_capacity(total);

        for link in links {
            let fallback = CrawlOutcome::failed(
                &link,
                FailureKind::Aborted,
                "Link task ended without an outcome",
            );
            let span = tracing::info_span!("link", url = %link.url());
            let pipeline = Arc::clone(&self.pipeline);
            let limiter = self.limiter.clone();
            let token = batch.clone();
            let tx = tx.clone();

            let handle = tokio::spawn(
                async move {
                    let outcome = process_link(&pipeline, limiter.as_deref(), link, &token).await;
                    if tx.send(outcome).is_err() {
                        tracing::debug!("Outcome collector closed");
                    }
                }
                .instrument(span),
            );
            handles.push((fallback, handle));
        }
        drop(tx);

        let mut outcomes = Vec::with_capacity(total);
        while let Some(outcome) = rx.recv().await {
            outcomes.push(outcome);
        }

        for (fallback, handle) in handles {
            if let Err(e) = handle.await {
                tracing::error!("Task for {} aborted: {}", fallback.url, e);
                outcomes.push(CrawlOutcome {
                    error: format!("{}: {}", fallback.error, e),
                    ..fallback
                });
            }
        }

        if cancel.is_cancelled() {
            let completed = outcomes.iter().filter(|o| o.success).count();
            tracing::warn!("Batch cancelled: {} of {} links clipped", completed, total);
            return Err(ClipperError::Cancelled { completed, total });
        }

        tracing::debug!("Finished visiting {} links", outcomes.len());
        Ok(outcomes)
    }
}
