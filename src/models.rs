use std::collections::HashMap;

use clap::ValueEnum;
use serde::Deserialize;

use crate::scale::ColorScale;

/// Country code to metric value for the selected year. Replaced wholesale on
/// every successful fetch, never merged.
pub type MetricMap = HashMap<String, f64>;

/// Which per-country metric the map displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Metric {
    /// Sentiment score per country, diverging red-yellow-blue scale.
    Sentiment,
    /// Spoken word count per country, sequential viridis scale.
    WordCount,
}

impl Metric {
    /// Server path queried with `?year=<year>`.
    pub fn endpoint(self) -> &'static str {
        match self {
            Metric::Sentiment => "/data4",
            Metric::WordCount => "/data",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::Sentiment => "sentiment",
            Metric::WordCount => "word count",
        }
    }

    /// Fixed-domain scale for this metric. Domains are not data-driven.
    pub fn scale(self) -> ColorScale {
        match self {
            Metric::Sentiment => ColorScale::rd_yl_bu(0.65, 0.8),
            Metric::WordCount => ColorScale::viridis(0.0, 10_000.0),
        }
    }

    /// Decode this metric's response body into a `MetricMap`.
    pub fn decode(self, body: &str) -> Result<MetricMap, serde_json::Error> {
        match self {
            Metric::Sentiment => decode_sentiment(body),
            Metric::WordCount => decode_word_counts(body),
        }
    }
}

/// One record of the word-count payload array.
#[derive(Debug, Clone, Deserialize)]
pub struct WordCountRecord {
    pub country_code: String,
    pub word_count: f64,
}

/// Sentiment payload: a JSON object mapping country code to score. The server
/// emits `null` for countries whose source text failed processing; those are
/// dropped so they fall back to the grey fill.
pub fn decode_sentiment(body: &str) -> Result<MetricMap, serde_json::Error> {
    let raw: HashMap<String, Option<f64>> = serde_json::from_str(body)?;
    Ok(raw
        .into_iter()
        .filter_map(|(code, value)| value.map(|v| (code, v)))
        .collect())
}

/// Word-count payload: a JSON array of records, folded into a code-to-count map.
pub fn decode_word_counts(body: &str) -> Result<MetricMap, serde_json::Error> {
    let records: Vec<WordCountRecord> = serde_json::from_str(body)?;
    Ok(records
        .into_iter()
        .map(|r| (r.country_code, r.word_count))
        .collect())
}
