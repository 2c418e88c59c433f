use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

pub const DEFAULT_MODEL: &str = "gpt-4";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_SCRAPE_BASE_URL: &str = "https://www.indeed.com";
pub const DEFAULT_HH_API_URL: &str = "https://api.hh.ru";
/// CIS region (Russia).
pub const DEFAULT_HH_AREA_CODE: &str = "113";

/// Which job-discovery backend a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobBackend {
    #[default]
    Scrape,
    Api,
}

impl FromStr for JobBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "scrape" | "scraper" | "web" => Ok(JobBackend::Scrape),
            "api" | "hh" => Ok(JobBackend::Api),
            other => Err(format!("unknown job source '{other}' (expected 'scrape' or 'api')")),
        }
    }
}

/// Settings for the language model behind the profile extractor.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

/// Settings for the HTML search-results scraper.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub base_url: String,
    pub csv_path: PathBuf,
}

/// Settings for the structured vacancy API.
#[derive(Debug, Clone)]
pub struct ApiSourceConfig {
    pub base_url: String,
    pub area_code: String,
    pub per_page: u32,
    pub page: u32,
    pub max_pages: u32,
    pub csv_path: Option<PathBuf>,
}

/// Run configuration. Built once at start-up and handed to component
/// constructors; nothing here is read from process state afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LlmConfig,
    pub job_backend: JobBackend,
    pub scrape: ScrapeConfig,
    pub api: ApiSourceConfig,
    /// Caller-imposed timeout for outbound HTTP. `None` leaves calls unbounded.
    pub request_timeout: Option<Duration>,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let job_backend = optional_env("JOB_SOURCE")
            .map(|v| v.parse::<JobBackend>())
            .transpose()
            .map_err(anyhow::Error::msg)?
            .unwrap_or_default();

        let request_timeout = optional_env("REQUEST_TIMEOUT_SECS")
            .map(|v| {
                v.parse::<u64>()
                    .context("REQUEST_TIMEOUT_SECS must be a whole number of seconds")
            })
            .transpose()?
            .map(Duration::from_secs);

        let config = Config {
            llm: LlmConfig {
                api_key: require_env("OPENAI_API_KEY")?,
                model: env_or("OPENAI_MODEL_NAME", DEFAULT_MODEL),
                base_url: env_or("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL),
            },
            job_backend,
            scrape: ScrapeConfig {
                base_url: env_or("SCRAPE_BASE_URL", DEFAULT_SCRAPE_BASE_URL),
                csv_path: PathBuf::from(env_or("JOBS_CSV_PATH", "jobs.csv")),
            },
            api: ApiSourceConfig {
                base_url: env_or("HH_API_URL", DEFAULT_HH_API_URL),
                area_code: env_or("HH_AREA_CODE", DEFAULT_HH_AREA_CODE),
                per_page: parse_env("HH_PER_PAGE", 10)?,
                page: parse_env("HH_PAGE", 0)?,
                max_pages: parse_env("HH_MAX_PAGES", 1)?,
                csv_path: optional_env("HH_CSV_PATH").map(PathBuf::from),
            },
            request_timeout,
            rust_log: env_or("RUST_LOG", "info"),
        };

        config.validate()?;
        Ok(config)
    }

    /// Opaque-value validation: everything must be present and non-empty.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("OPENAI_API_KEY", &self.llm.api_key),
            ("OPENAI_MODEL_NAME", &self.llm.model),
            ("OPENAI_BASE_URL", &self.llm.base_url),
            ("SCRAPE_BASE_URL", &self.scrape.base_url),
            ("HH_API_URL", &self.api.base_url),
            ("HH_AREA_CODE", &self.api.area_code),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                bail!("Configuration value '{key}' must not be empty");
            }
        }
        if self.scrape.csv_path.as_os_str().is_empty() {
            bail!("Configuration value 'JOBS_CSV_PATH' must not be empty");
        }
        if self.api.per_page == 0 {
            bail!("HH_PER_PAGE must be greater than zero");
        }
        if self.api.max_pages == 0 {
            bail!("HH_MAX_PAGES must be greater than zero");
        }
        Ok(())
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        llm: LlmConfig {
            api_key: "sk-test".to_string(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
        },
        job_backend: JobBackend::Scrape,
        scrape: ScrapeConfig {
            base_url: DEFAULT_SCRAPE_BASE_URL.to_string(),
            csv_path: PathBuf::from("jobs.csv"),
        },
        api: ApiSourceConfig {
            base_url: DEFAULT_HH_API_URL.to_string(),
            area_code: DEFAULT_HH_AREA_CODE.to_string(),
            per_page: 10,
            page: 0,
            max_pages: 1,
            csv_path: None,
        },
        request_timeout: None,
        rust_log: "info".to_string(),
    }
}
