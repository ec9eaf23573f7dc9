// File: crates/stream-core/tests/common/mod.rs
// Purpose: Shared fixtures: a year of monthly benchmark scores for the five default series.

#![allow(dead_code)]

use stream_core::{Dataset, Normalizer, RawRow, StreamConfig};

pub const KEYS: [&str; 5] = ["GPT-4", "Gemini", "PaLM-2", "Claude", "LLaMA-3.1"];

/// Claude rises monotonically so its tooltip bars grow left to right.
const SCORES: [[f64; 5]; 12] = [
    [120.0, 90.0, 70.0, 40.0, 60.0],
    [125.0, 95.0, 72.0, 50.0, 62.0],
    [130.0, 92.0, 75.0, 60.0, 66.0],
    [128.0, 98.0, 71.0, 70.0, 70.0],
    [135.0, 105.0, 69.0, 80.0, 72.0],
    [140.0, 110.0, 74.0, 90.0, 75.0],
    [138.0, 115.0, 78.0, 100.0, 80.0],
    [145.0, 112.0, 76.0, 110.0, 84.0],
    [150.0, 120.0, 73.0, 120.0, 88.0],
    [148.0, 125.0, 70.0, 130.0, 92.0],
    [155.0, 130.0, 68.0, 140.0, 95.0],
    [160.0, 128.0, 66.0, 150.0, 99.0],
];

pub fn raw_rows(months: usize) -> Vec<RawRow> {
    SCORES
        .iter()
        .take(months)
        .enumerate()
        .map(|(m, scores)| {
            let mut row = RawRow::new().with("Date", format!("2024-{:02}-01", m + 1));
            for (key, v) in KEYS.iter().zip(scores.iter()) {
                row.insert(*key, v.to_string());
            }
            row
        })
        .collect()
}

pub fn dataset(months: usize) -> Dataset {
    Normalizer::new(&StreamConfig::default()).normalize(&raw_rows(months))
}

/// Rows for the given zero-based months only, e.g. `6..12` for July through December.
pub fn months(range: std::ops::Range<usize>) -> Dataset {
    let rows: Vec<RawRow> = raw_rows(12).into_iter().skip(range.start).take(range.len()).collect();
    Normalizer::new(&StreamConfig::default()).normalize(&rows)
}

pub fn year() -> Dataset {
    dataset(12)
}

pub fn keys() -> Vec<String> {
    KEYS.iter().map(|k| k.to_string()).collect()
}
