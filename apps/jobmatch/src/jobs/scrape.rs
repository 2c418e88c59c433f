//! Search-results scraper.
//!
//! Each result card is parsed on its own and is best-effort: a missing field
//! becomes "N/A" instead of dropping the card. Dates are the exception: any
//! date text that cannot be read resolves to the scrape date, because
//! downstream freshness filtering needs a real date.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{Days, Local, NaiveDate};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};

use crate::config::ScrapeConfig;
use crate::errors::AppError;
use crate::jobs::{sink, JobSource, Postings};
use crate::models::job::PLACEHOLDER;
use crate::models::{JobPosting, PostedDate, PostingSource};

const SEARCH_PATH: &str = "/jobs";
/// `fromage` filter: postings from the last 7 days.
const MAX_AGE_DAYS: &str = "7";

const CARD_SELECTOR: &str = "div.job_seen_beacon";
const TITLE_SELECTORS: &[&str] = &["h2.jobTitle"];
const COMPANY_SELECTORS: &[&str] = &["span.companyName", "[data-testid='company-name']"];
const LOCATION_SELECTORS: &[&str] = &["div.companyLocation", "[data-testid='text-location']"];
const DATE_SELECTORS: &[&str] = &["span.date"];
const SNIPPET_SELECTORS: &[&str] = &["div.job-snippet"];
const JOB_KEY_SELECTOR: &str = "a[data-jk]";

pub struct ScrapingJobSource {
    client: Client,
    base_url: String,
    csv_path: PathBuf,
}

impl ScrapingJobSource {
    pub fn new(config: &ScrapeConfig, client: Client) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            csv_path: config.csv_path.clone(),
        }
    }

    async fn fetch_results_page(&self, query: &str, location: &str) -> Result<String, AppError> {
        let url = format!("{}{}", self.base_url, SEARCH_PATH);
        info!("Fetching job search results: {} (q='{}', l='{}')", url, query, location);

        let fetch_failed = |status: Option<u16>, reason: String| AppError::FetchFailed {
            url: url.clone(),
            status,
            reason,
        };

        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("l", location), ("fromage", MAX_AGE_DAYS)])
            .send()
            .await
            .map_err(|e| fetch_failed(None, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Job search returned HTTP {}", status);
            return Err(fetch_failed(
                Some(status.as_u16()),
                format!("HTTP status {status}"),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| fetch_failed(Some(status.as_u16()), format!("failed to read body: {e}")))
    }
}

#[async_trait]
impl JobSource for ScrapingJobSource {
    async fn search(&self, query: &str, location: &str) -> Result<Postings, AppError> {
        let html = self.fetch_results_page(query, location).await?;
        let today = Local::now().date_naive();
        let postings = parse_search_results(&html, today);

        let csv_path = sink::path_for_query(&self.csv_path, query);
        sink::write_postings_csv(&csv_path, &postings).await?;

        info!("Scraped {} job cards for '{}'", postings.len(), query);
        Ok(Postings::new(postings))
    }

    fn name(&self) -> &'static str {
        "scrape"
    }
}

/// Parses every result card on a search page. `today` anchors relative dates.
pub fn parse_search_results(html: &str, today: NaiveDate) -> Vec<JobPosting> {
    let document = Html::parse_document(html);
    let Ok(card_selector) = Selector::parse(CARD_SELECTOR) else {
        warn!("Invalid card selector: {}", CARD_SELECTOR);
        return vec![];
    };

    document
        .select(&card_selector)
        .filter_map(|card| parse_card(card, today))
        .collect()
}

fn parse_card(card: ElementRef<'_>, today: NaiveDate) -> Option<JobPosting> {
    let field = |selectors: &[&str]| {
        find_text_by_selectors(card, selectors).unwrap_or_else(|| PLACEHOLDER.to_string())
    };

    let title = field(TITLE_SELECTORS);
    let company = field(COMPANY_SELECTORS);
    let location = field(LOCATION_SELECTORS);
    let date_text = find_text_by_selectors(card, DATE_SELECTORS);
    let description = find_text_by_selectors(card, SNIPPET_SELECTORS).unwrap_or_default();

    let posting = JobPosting::new(&title, &company, PostingSource::Scraped)?
        .with_location(location)
        .with_date(PostedDate::On(resolve_posted_date(date_text.as_deref(), today)))
        .with_description(description)
        .with_raw_id(job_key(card));

    debug!("Parsed card: {} at {}", posting.title, posting.company);
    Some(posting)
}

fn find_text_by_selectors(card: ElementRef<'_>, selectors: &[&str]) -> Option<String> {
    for selector_str in selectors {
        if let Ok(selector) = Selector::parse(selector_str) {
            if let Some(element) = card.select(&selector).next() {
                let text = clean_text(&element.text().collect::<Vec<_>>().join(" "));
                if !text.is_empty() {
                    return Some(text);
                }
            }
        }
    }
    None
}

fn job_key(card: ElementRef<'_>) -> Option<String> {
    if let Some(key) = card.value().attr("data-jk") {
        return Some(key.to_string());
    }
    let selector = Selector::parse(JOB_KEY_SELECTOR).ok()?;
    card.select(&selector)
        .next()
        .and_then(|a| a.value().attr("data-jk"))
        .map(str::to_string)
}

fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// "3 days ago" or "30+ days ago" → today minus N. Anything else, or no text
/// at all, → today.
pub fn resolve_posted_date(text: Option<&str>, today: NaiveDate) -> NaiveDate {
    text.and_then(days_ago)
        .and_then(|days| today.checked_sub_days(Days::new(days)))
        .unwrap_or(today)
}

/// The N of the first "N day(s)" in `text`; the number must be followed by a
/// `day`/`days` word, optionally with a `+` in between.
fn days_ago(text: &str) -> Option<u64> {
    let lower = text.to_lowercase();
    let mut rest = lower.as_str();

    while let Some(start) = rest.find(|c: char| c.is_ascii_digit()) {
        let number = &rest[start..];
        let end = number
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(number.len());
        let (digits, tail) = number.split_at(end);
        let tail = tail.strip_prefix('+').unwrap_or(tail).trim_start();

        if let Some(unit) = tail.strip_prefix("day") {
            let unit = unit.strip_prefix('s').unwrap_or(unit);
            if !unit.starts_with(char::is_alphanumeric) {
                return digits.parse().ok();
            }
        }
        rest = tail;
    }
    None
}
