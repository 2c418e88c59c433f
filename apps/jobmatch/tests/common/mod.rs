use std::path::{Path, PathBuf};

use jobmatch::config::{ApiSourceConfig, LlmConfig, ScrapeConfig};
use jobmatch::{Config, JobBackend};

/// Single-page PDF drawing `text` in Helvetica.
pub fn resume_pdf(text: &str) -> Vec<u8> {
    let stream = format!("BT /F1 12 Tf 72 712 Td ({text}) Tj ET");
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [4 0 R] /Count 1 >>".to_string(),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
         /Resources << /Font << /F1 3 0 R >> >> /Contents 5 0 R >>"
            .to_string(),
        format!("<< /Length {} >>\nstream\n{}\nendstream", stream.len(), stream),
    ];

    let mut out = String::from("%PDF-1.4\n");
    let mut offsets = vec![];
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.push_str(&format!("{} 0 obj\n{}\nendobj\n", i + 1, body));
    }
    let xref_at = out.len();
    out.push_str(&format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1));
    for offset in offsets {
        out.push_str(&format!("{offset:010} 00000 n \n"));
    }
    out.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_at
    ));
    out.into_bytes()
}

pub fn write_resume(dir: &Path, text: &str) -> PathBuf {
    let path = dir.join("resume.pdf");
    std::fs::write(&path, resume_pdf(text)).unwrap();
    path
}

pub fn config(llm_url: &str, jobs_url: &str, backend: JobBackend, dir: &Path) -> Config {
    Config {
        llm: LlmConfig {
            api_key: "sk-test".to_string(),
            model: "gpt-4".to_string(),
            base_url: format!("{llm_url}/v1"),
        },
        job_backend: backend,
        scrape: ScrapeConfig {
            base_url: jobs_url.to_string(),
            csv_path: dir.join("jobs.csv"),
        },
        api: ApiSourceConfig {
            base_url: jobs_url.to_string(),
            area_code: "113".to_string(),
            per_page: 10,
            page: 0,
            max_pages: 1,
            csv_path: None,
        },
        request_timeout: Some(std::time::Duration::from_secs(10)),
        rust_log: "info".to_string(),
    }
}

pub fn chat_reply(content: &str) -> serde_json::Value {
    serde_json::json!({
        "choices": [{"message": {"content": content}}],
        "usage": {"prompt_tokens": 100, "completion_tokens": 20}
    })
}

pub fn csv_files(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "csv"))
        .collect()
}
