mod common;

use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;
use tokio::sync::watch;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use jobmatch::{AppError, JobBackend, Pipeline, PipelineState, Stage};

const PROFILE_REPLY: &str = "```json\n{\"Name\": \"Jane Doe\", \"Desired Position\": \"Rust Engineer\", \
     \"preferred_location\": \"Berlin\", \"Skills\": [\"Tokio\", \"PostgreSQL\"]}\n```";

const RESULTS_HTML: &str = r#"<html><body>
  <div class="job_seen_beacon">
    <h2 class="jobTitle">Java Developer</h2>
    <span class="companyName">Beans Ltd</span>
    <div class="companyLocation">Berlin</div>
    <span class="date">2 days ago</span>
    <div class="job-snippet">Spring Boot</div>
  </div>
  <div class="job_seen_beacon">
    <h2 class="jobTitle">Rust Engineer</h2>
    <span class="companyName">Ferrous</span>
    <div class="companyLocation">Berlin</div>
    <div class="job-snippet">Tokio, PostgreSQL</div>
  </div>
</body></html>"#;

async fn llm_server(reply: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::chat_reply(reply)))
        .expect(1)
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn scrape_backend_end_to_end() {
    let dir = TempDir::new().unwrap();
    let resume = common::write_resume(dir.path(), "Jane Doe Rust Engineer Tokio");
    let llm = llm_server(PROFILE_REPLY).await;

    let jobs = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .and(query_param("q", "Rust Engineer"))
        .and(query_param("l", "Berlin"))
        .respond_with(ResponseTemplate::new(200).set_body_string(RESULTS_HTML))
        .expect(1)
        .mount(&jobs)
        .await;

    let config = common::config(&llm.uri(), &jobs.uri(), JobBackend::Scrape, dir.path());
    let pipeline = Pipeline::from_config(&config).unwrap();
    let results = pipeline.extract_and_match(&resume).await.unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].posting.title, "Rust Engineer");
    assert_eq!(results[0].score, 1.0);
    assert_eq!(results[1].posting.title, "Java Developer");

    let csv = std::fs::read_to_string(dir.path().join("jobs_Rust_Engineer.csv")).unwrap();
    assert!(csv.starts_with("title,company,location,date_posted\n"));
    assert_eq!(csv.lines().count(), 3);
}

#[tokio::test]
async fn concurrent_runs_keep_separate_sinks() {
    let dir = TempDir::new().unwrap();
    let alice = dir.path().join("alice.pdf");
    let bob = dir.path().join("bob.pdf");
    std::fs::write(&alice, common::resume_pdf("Alice Rust")).unwrap();
    std::fs::write(&bob, common::resume_pdf("Bob Go")).unwrap();

    let llm = MockServer::start().await;
    for (who, position) in [("Alice", "Rust Engineer"), ("Bob", "Go Developer")] {
        let reply = format!("{{\"name\": \"{who}\", \"desired_position\": \"{position}\"}}");
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_string_contains(who))
            .respond_with(ResponseTemplate::new(200).set_body_json(common::chat_reply(&reply)))
            .expect(1)
            .mount(&llm)
            .await;
    }

    let jobs = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_string(RESULTS_HTML))
        .expect(2)
        .mount(&jobs)
        .await;

    let config = common::config(&llm.uri(), &jobs.uri(), JobBackend::Scrape, dir.path());
    let pipeline = Arc::new(Pipeline::from_config(&config).unwrap());
    let (a, b) = tokio::join!(
        pipeline.extract_and_match(&alice),
        pipeline.extract_and_match(&bob)
    );
    assert_eq!(a.unwrap().len(), 2);
    assert_eq!(b.unwrap().len(), 2);

    assert!(dir.path().join("jobs_Rust_Engineer.csv").exists());
    assert!(dir.path().join("jobs_Go_Developer.csv").exists());
    assert_eq!(common::csv_files(dir.path()).len(), 2);
}

#[tokio::test]
async fn api_backend_end_to_end() {
    let dir = TempDir::new().unwrap();
    let resume = common::write_resume(dir.path(), "Jane Doe Rust Engineer");
    let llm = llm_server(PROFILE_REPLY).await;

    let jobs = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vacancies"))
        .and(query_param("text", "Rust Engineer"))
        .and(query_param("area", "113"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {"id": "1", "name": "Rust Engineer", "area": {"name": "Moscow"},
                 "key_skills": [{"name": "Tokio"}]},
                {"id": "2", "name": "Designer", "employer": {"name": "Studio"}}
            ],
            "pages": 1
        })))
        .expect(1)
        .mount(&jobs)
        .await;

    let config = common::config(&llm.uri(), &jobs.uri(), JobBackend::Api, dir.path());
    let pipeline = Pipeline::from_config(&config).unwrap();
    let results = pipeline.extract_and_match(&resume).await.unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].posting.title, "Rust Engineer");
    assert_eq!(results[0].posting.company, "Unknown");
    assert!(common::csv_files(dir.path()).is_empty());
}

#[tokio::test]
async fn scrape_failure_reports_discovery_stage() {
    let dir = TempDir::new().unwrap();
    let resume = common::write_resume(dir.path(), "Jane Doe");
    let llm = llm_server(PROFILE_REPLY).await;

    let jobs = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&jobs)
        .await;

    let config = common::config(&llm.uri(), &jobs.uri(), JobBackend::Scrape, dir.path());
    let pipeline = Pipeline::from_config(&config).unwrap();

    let (_tx, rx) = watch::channel(false);
    let run = pipeline.run(&resume, rx).await;

    match &run.state {
        PipelineState::Failed { stage, error } => {
            assert_eq!(*stage, Stage::JobDiscovery);
            assert!(matches!(error, AppError::FetchFailed { status: Some(500), .. }));
        }
        other => panic!("unexpected state {other:?}"),
    }
    assert!(run.results.is_empty());
    assert!(common::csv_files(dir.path()).is_empty());
}

#[tokio::test]
async fn model_outage_reports_profile_stage() {
    let dir = TempDir::new().unwrap();
    let resume = common::write_resume(dir.path(), "Jane Doe");

    let llm = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .expect(1)
        .mount(&llm)
        .await;
    let jobs = MockServer::start().await;

    let config = common::config(&llm.uri(), &jobs.uri(), JobBackend::Scrape, dir.path());
    let err = Pipeline::from_config(&config)
        .unwrap()
        .extract_and_match(&resume)
        .await
        .unwrap_err();

    assert_eq!(err.stage, Stage::ProfileExtraction);
    assert!(matches!(err.error, AppError::ModelUnavailable(_)));
}

#[test]
fn invalid_config_is_rejected_at_construction() {
    let dir = TempDir::new().unwrap();
    let mut config = common::config("http://llm", "http://jobs", JobBackend::Api, dir.path());
    config.api.area_code = " ".to_string();
    assert!(Pipeline::from_config(&config).is_err());
}
