//! Summarize every fixture under a directory and check that each encoded
//! summary decodes back to the same value.
//!
//! usage: dev-test-runner [DIR]   (default: fixtures)
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use json_digest::report::NoopReporter;
use json_digest::{summarize, Summary, SummarizeOptions};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct FixtureReport {
    fixture: PathBuf,
    documents: u64,
    nodes: usize,
    encoded_bytes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure: Option<String>,
}

fn check_fixture(path: &Path) -> Result<FixtureReport> {
    let data = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let mut report = FixtureReport {
        fixture: path.to_path_buf(),
        documents: 0,
        nodes: 0,
        encoded_bytes: 0,
        failure: None,
    };

    let summary = match summarize(&data, &SummarizeOptions::default(), &mut NoopReporter) {
        Ok(summary) => summary,
        Err(error) => {
            report.failure = Some(format!("summarize: {error}"));
            return Ok(report);
        }
    };
    report.documents = summary.root.freq;
    report.nodes = summary.node_count();

    let encoded = serde_json::to_vec(&summary)?;
    report.encoded_bytes = encoded.len();
    match Summary::from_json_slice(&encoded) {
        Ok(decoded) if decoded == summary => {}
        Ok(_) => report.failure = Some("decoded summary differs from the original".into()),
        Err(error) => report.failure = Some(format!("decode: {error}")),
    }
    Ok(report)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let dir = std::env::args().nth(1).unwrap_or_else(|| "fixtures".to_string());
    let pattern = format!("{dir}/**/*.json");
    let paths = match glob::glob(&pattern) {
        Ok(paths) => paths,
        Err(error) => {
            eprintln!("bad fixture directory {dir}: {error}");
            return ExitCode::FAILURE;
        }
    };

    let mut failed = 0;
    let mut total = 0;
    for entry in paths {
        total += 1;
        let report = entry
            .map_err(anyhow::Error::from)
            .and_then(|path| check_fixture(&path));
        match report {
            Ok(report) => {
                if report.failure.is_some() {
                    failed += 1;
                }
                match serde_json::to_string(&report) {
                    Ok(line) => println!("{line}"),
                    Err(error) => log::error!("failed to encode report: {error}"),
                }
            }
            Err(error) => {
                failed += 1;
                eprintln!("❌ {error:#}");
            }
        }
    }

    eprintln!("{} fixtures, {failed} failed", total);
    if failed == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}
