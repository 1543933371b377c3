use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use reqwest::blocking::Client as HttpClient;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::debug;

use crate::models::{Metric, MetricMap};

/// Failure classes for one fetch cycle. The app treats them all the same way:
/// log, keep the last-rendered state, stay interactive.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("request failed with HTTP {0}")]
    Status(StatusCode),
    #[error("decode json: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Completed background fetch, tagged with the token it was issued under.
#[derive(Debug)]
pub struct FetchOutcome {
    pub token: u64,
    pub year: i32,
    pub result: Result<MetricMap, FetchError>,
}

/// Synchronous client for the year-parameterized metric endpoints.
#[derive(Debug, Clone)]
pub struct MetricClient {
    base_url: String,
    http: HttpClient,
}

impl MetricClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("speech-atlas/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Fetch and decode one year of the given metric.
    pub fn fetch_metrics(&self, metric: Metric, year: i32) -> Result<MetricMap, FetchError> {
        let url = format!("{}{}?year={}", self.base_url, metric.endpoint(), year);
        debug!(%url, "fetching metrics");
        let response = self.http.get(&url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }
        let body = response.text()?;
        Ok(metric.decode(&body)?)
    }

    /// Run a fetch on a worker thread; the outcome lands on `tx`. The UI
    /// thread never blocks on the network.
    pub fn spawn_fetch(&self, metric: Metric, year: i32, token: u64, tx: Sender<FetchOutcome>) {
        let client = self.clone();
        thread::spawn(move || {
            let result = client.fetch_metrics(metric, year);
            // A closed receiver just means the app is shutting down.
            let _ = tx.send(FetchOutcome {
                token,
                year,
                result,
            });
        });
    }
}
