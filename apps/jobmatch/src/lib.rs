pub mod config;
pub mod document;
pub mod errors;
pub mod jobs;
pub mod llm_client;
pub mod matching;
pub mod models;
pub mod pipeline;
pub mod profile;

pub use config::{Config, JobBackend};
pub use errors::{AppError, PipelineError, Stage};
pub use jobs::{build_job_source, JobSource, Postings};
pub use matching::{KeywordMatcher, Matcher};
pub use models::{CandidateProfile, JobPosting, MatchResult, PostedDate, PostingSource};
pub use pipeline::{Pipeline, PipelineRun, PipelineState};
pub use profile::ProfileExtractor;
