//! Pipeline orchestrator: résumé file in, ranked job matches out.
//!
//! One run walks `Idle → Extracting → Scraping → Matching → Done`. Any stage
//! failure moves the run to `Failed(stage, error)` and stops it there; no
//! partial results are returned and nothing is retried.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use reqwest::Client;
use tokio::sync::watch;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use crate::config::Config;
use crate::document::DocumentTextExtractor;
use crate::errors::{AppError, PipelineError, Stage};
use crate::jobs::{build_job_source, JobSource};
use crate::llm_client::LlmClient;
use crate::matching::{KeywordMatcher, Matcher};
use crate::models::{CandidateProfile, JobPosting, MatchResult};
use crate::profile::ProfileExtractor;

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineState {
    Idle,
    Extracting,
    Scraping,
    Matching,
    Done,
    Failed { stage: Stage, error: AppError },
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed { .. })
    }

    pub fn can_transition_to(&self, next: &PipelineState) -> bool {
        use PipelineState::*;
        match (self, next) {
            (Idle, Extracting) | (Extracting, Scraping) | (Scraping, Matching) | (Matching, Done) => {
                true
            }
            (from, Failed { .. }) => !from.is_terminal(),
            _ => false,
        }
    }
}

/// Outcome of one run.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub run_id: Uuid,
    pub state: PipelineState,
    /// Every state the run visited, starting with `Idle`.
    pub history: Vec<PipelineState>,
    /// Ranked matches; empty unless the run reached `Done`.
    pub results: Vec<MatchResult>,
}

impl PipelineRun {
    fn start() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            state: PipelineState::Idle,
            history: vec![PipelineState::Idle],
            results: vec![],
        }
    }

    fn advance(&mut self, next: PipelineState) {
        let legal = self.state.can_transition_to(&next);
        debug_assert!(legal, "illegal pipeline transition {:?} -> {:?}", self.state, next);
        if !legal {
            error!("Illegal pipeline transition {:?} -> {:?}", self.state, next);
            return;
        }
        self.history.push(next.clone());
        self.state = next;
    }

    fn fail(mut self, stage: Stage, error: AppError) -> Self {
        error!("Pipeline failed during {}: {}", stage, error);
        self.results.clear();
        self.advance(PipelineState::Failed { stage, error });
        self
    }

    pub fn into_result(self) -> Result<Vec<MatchResult>, PipelineError> {
        match self.state {
            PipelineState::Done => Ok(self.results),
            PipelineState::Failed { stage, error } => Err(PipelineError::new(stage, error)),
            other => Err(PipelineError::new(
                Stage::Matching,
                AppError::Config(format!("run ended in non-terminal state {other:?}")),
            )),
        }
    }
}

pub struct Pipeline {
    extractor: DocumentTextExtractor,
    profiles: ProfileExtractor,
    source: Arc<dyn JobSource>,
    matcher: Arc<dyn Matcher>,
}

impl Pipeline {
    pub fn new(
        profiles: ProfileExtractor,
        source: Arc<dyn JobSource>,
        matcher: Arc<dyn Matcher>,
    ) -> Self {
        Self {
            extractor: DocumentTextExtractor::new(),
            profiles,
            source,
            matcher,
        }
    }

    /// Wires the production components from configuration.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        config.validate()?;
        let client = http_client(config.request_timeout)?;

        let llm = LlmClient::new(&config.llm, client.clone());
        info!("LLM client initialized (model: {})", config.llm.model);

        let source = build_job_source(config, client);
        info!("Job source initialized ({})", source.name());

        Ok(Self::new(
            ProfileExtractor::new(Arc::new(llm)),
            source,
            Arc::new(KeywordMatcher),
        ))
    }

    /// Runs to completion and returns the ranked matches or the failing stage.
    pub async fn extract_and_match(&self, path: &Path) -> Result<Vec<MatchResult>, PipelineError> {
        let (_cancel_tx, cancel_rx) = watch::channel(false);
        self.run(path, cancel_rx).await.into_result()
    }

    /// Runs the pipeline, stopping with `Cancelled` as soon as `cancel` turns
    /// `true`.
    pub async fn run(&self, path: &Path, cancel: watch::Receiver<bool>) -> PipelineRun {
        let run = PipelineRun::start();
        let span = info_span!("pipeline_run", run_id = %run.run_id);
        self.drive(run, path, cancel).instrument(span).await
    }

    async fn drive(
        &self,
        mut run: PipelineRun,
        path: &Path,
        mut cancel: watch::Receiver<bool>,
    ) -> PipelineRun {
        info!("Pipeline run started for {}", path.display());

        run.advance(PipelineState::Extracting);
        let text = match until_cancelled(&mut cancel, self.extractor.extract(path)).await {
            Ok(text) => text,
            Err(e) => return run.fail(Stage::DocumentExtraction, e),
        };
        info!("Extracted {} chars of document text", text.len());

        let profile = match until_cancelled(&mut cancel, self.profiles.extract(&text)).await {
            Ok(profile) => profile,
            Err(e) => return run.fail(Stage::ProfileExtraction, e),
        };

        run.advance(PipelineState::Scraping);
        let postings = match until_cancelled(&mut cancel, self.discover(&profile)).await {
            Ok(postings) => postings,
            Err(e) => return run.fail(Stage::JobDiscovery, e),
        };

        run.advance(PipelineState::Matching);
        if is_cancelled(&mut cancel) {
            return run.fail(Stage::Matching, AppError::Cancelled);
        }
        run.results = self.matcher.rank(&profile, postings);

        run.advance(PipelineState::Done);
        info!("Pipeline run finished with {} matches", run.results.len());
        run
    }

    async fn discover(&self, profile: &CandidateProfile) -> Result<Vec<JobPosting>, AppError> {
        let query = profile.search_query();
        let location = profile.search_location();
        info!(
            "Discovering jobs via {} (query='{}', location='{}')",
            self.source.name(),
            query,
            location
        );
        let postings: Vec<JobPosting> = self.source.search(query, location).await?.collect();
        info!("Discovered {} postings", postings.len());
        Ok(postings)
    }
}

fn http_client(timeout: Option<Duration>) -> anyhow::Result<Client> {
    let mut builder = Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().context("Failed to build HTTP client")
}

fn is_cancelled(cancel: &mut watch::Receiver<bool>) -> bool {
    let cancelled = *cancel.borrow_and_update();
    cancelled
}

/// Resolves once the flag turns `true`. Never resolves if the sender is
/// dropped without cancelling.
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    loop {
        if is_cancelled(cancel) {
            return;
        }
        if cancel.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

async fn until_cancelled<T>(
    cancel: &mut watch::Receiver<bool>,
    stage: impl Future<Output = Result<T, AppError>>,
) -> Result<T, AppError> {
    if is_cancelled(cancel) {
        return Err(AppError::Cancelled);
    }
    tokio::select! {
        biased;
        _ = cancelled(cancel) => {
            info!("Cancellation requested; abandoning stage");
            Err(AppError::Cancelled)
        }
        result = stage => result,
    }
}
