//! Job discovery: one capability trait, several backends.
//!
//! The orchestrator only ever sees `Arc<dyn JobSource>`; which backend runs is
//! decided once, from configuration, by [`build_job_source`].

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;

use crate::config::{Config, JobBackend};
use crate::errors::AppError;
use crate::models::JobPosting;

pub mod hh;
pub mod scrape;
pub mod sink;

pub use hh::VacancyApiSource;
pub use scrape::ScrapingJobSource;

/// Finite, single-pass sequence of postings. Consumed by iteration; cannot be
/// restarted.
#[derive(Debug)]
pub struct Postings {
    inner: std::vec::IntoIter<JobPosting>,
}

impl Postings {
    pub fn new(postings: Vec<JobPosting>) -> Self {
        Self {
            inner: postings.into_iter(),
        }
    }
}

impl Iterator for Postings {
    type Item = JobPosting;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Postings {}

/// A job-discovery backend.
#[async_trait]
pub trait JobSource: Send + Sync {
    /// Returns the postings matching `query` near `location`. The whole result
    /// is fetched before this returns.
    async fn search(&self, query: &str, location: &str) -> Result<Postings, AppError>;

    /// Backend label for logs.
    fn name(&self) -> &'static str;
}

/// Selects the configured backend.
pub fn build_job_source(config: &Config, client: Client) -> Arc<dyn JobSource> {
    match config.job_backend {
        JobBackend::Scrape => Arc::new(ScrapingJobSource::new(&config.scrape, client)),
        JobBackend::Api => Arc::new(VacancyApiSource::new(&config.api, client)),
    }
}
