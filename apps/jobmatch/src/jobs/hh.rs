//! Structured vacancy API (hh.ru-style `/vacancies` endpoint).
//!
//! Every field is read through a fallback chain, so a vacancy with a missing
//! nested object still normalizes instead of being dropped.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use reqwest::Client;
use scraper::Html;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::ApiSourceConfig;
use crate::errors::AppError;
use crate::jobs::{sink, JobSource, Postings};
use crate::models::job::{EXPERIENCE_NOT_SPECIFIED, UNKNOWN};
use crate::models::{JobPosting, PostedDate, PostingSource};

const USER_AGENT: &str = "JobParser/1.0";
const VACANCIES_PATH: &str = "/vacancies";

pub struct VacancyApiSource {
    client: Client,
    base_url: String,
    area_code: String,
    per_page: u32,
    page: u32,
    max_pages: u32,
    csv_path: Option<PathBuf>,
}

impl VacancyApiSource {
    pub fn new(config: &ApiSourceConfig, client: Client) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            area_code: config.area_code.clone(),
            per_page: config.per_page,
            page: config.page,
            max_pages: config.max_pages.max(1),
            csv_path: config.csv_path.clone(),
        }
    }

    async fn fetch_page(&self, query: &str, page: u32) -> Result<Value, AppError> {
        let url = format!("{}{}", self.base_url, VACANCIES_PATH);
        debug!("GET {} (text='{}', area={}, page={})", url, query, self.area_code, page);

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .query(&[
                ("text", query.to_string()),
                ("area", self.area_code.clone()),
                ("per_page", self.per_page.to_string()),
                ("page", page.to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Api {
                status: 0,
                body: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| AppError::Api {
            status: status.as_u16(),
            body: format!("failed to read body: {e}"),
        })?;

        if !status.is_success() {
            warn!("Vacancy API returned HTTP {}: {}", status, body);
            return Err(AppError::Api {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| AppError::Api {
            status: status.as_u16(),
            body: format!("invalid JSON response: {e}"),
        })
    }
}

#[async_trait]
impl JobSource for VacancyApiSource {
    /// `location` is not sent; the configured area code does the filtering.
    async fn search(&self, query: &str, location: &str) -> Result<Postings, AppError> {
        info!(
            "Searching vacancy API for '{}' (area {}, location hint '{}' ignored)",
            query, self.area_code, location
        );

        let mut postings = Vec::new();
        let last_page = self.page.saturating_add(self.max_pages);
        let mut page = self.page;

        while page < last_page {
            let body = self.fetch_page(query, page).await?;

            let items = body.get("items").and_then(Value::as_array);
            let batch: Vec<JobPosting> = items
                .map(|items| items.iter().filter_map(normalize_vacancy).collect())
                .unwrap_or_default();
            debug!("Page {} yielded {} vacancies", page, batch.len());
            postings.extend(batch);

            let total_pages = body
                .get("pages")
                .and_then(Value::as_u64)
                .unwrap_or(0);
            page += 1;
            if u64::from(page) >= total_pages {
                break;
            }
        }

        if let Some(base) = &self.csv_path {
            let path = sink::path_for_query(base, query);
            sink::write_postings_csv(&path, &postings).await?;
        }

        info!("Vacancy API returned {} postings for '{}'", postings.len(), query);
        Ok(Postings::new(postings))
    }

    fn name(&self) -> &'static str {
        "hh_api"
    }
}

/// Maps one API vacancy to a posting. Returns `None` only when the vacancy
/// has no usable title.
pub fn normalize_vacancy(vacancy: &Value) -> Option<JobPosting> {
    let title = str_at(vacancy, &["name"])?;
    let company = str_at(vacancy, &["employer", "name"]).unwrap_or(UNKNOWN);
    let location = str_at(vacancy, &["area", "name"]).unwrap_or(UNKNOWN);
    let experience = str_at(vacancy, &["experience", "name"]).unwrap_or(EXPERIENCE_NOT_SPECIFIED);
    let description = str_at(vacancy, &["snippet", "responsibility"])
        .map(strip_markup)
        .unwrap_or_default();
    let date_posted = str_at(vacancy, &["published_at"])
        .and_then(parse_published_at)
        .map_or(PostedDate::Unknown, PostedDate::On);

    let skills = vacancy
        .get("key_skills")
        .and_then(Value::as_array)
        .map(|skills| {
            skills
                .iter()
                .filter_map(|s| str_at(s, &["name"]))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let raw_id = match vacancy.get("id") {
        Some(Value::String(id)) => Some(id.clone()),
        Some(Value::Number(id)) => Some(id.to_string()),
        _ => None,
    };

    let posting = JobPosting::new(title, company, PostingSource::Api)?
        .with_location(location)
        .with_date(date_posted)
        .with_description(description)
        .with_experience(experience)
        .with_skills(skills)
        .with_raw_id(raw_id);
    Some(posting)
}

fn str_at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    path.iter()
        .try_fold(value, |current, key| current.get(key))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Accepts `2024-05-01T10:00:00+0300`, RFC 3339, or a bare date.
fn parse_published_at(text: &str) -> Option<NaiveDate> {
    DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%z")
        .or_else(|_| DateTime::parse_from_rfc3339(text))
        .map(|dt| dt.date_naive())
        .or_else(|_| NaiveDate::parse_from_str(text, "%Y-%m-%d"))
        .ok()
}

/// Snippets carry inline highlight tags; keep only their text.
fn strip_markup(text: &str) -> String {
    let fragment = Html::parse_fragment(text);
    let joined: String = fragment.root_element().text().collect();
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}
