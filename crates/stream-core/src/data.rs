// File: crates/stream-core/src/data.rs
// Summary: Dataset model (rows of a timestamp plus one value per series) and the raw-row normalizer.
// Notes:
// - Times are milliseconds since the Unix epoch, UTC. An unparseable date becomes NaN and the
//   row is kept; every downstream stage tolerates NaN times.
// - Raw series values may be NaN. `Row::value` sanitizes them to 0.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::collections::BTreeMap;

use crate::config::StreamConfig;

/// One untyped input record: field name -> raw text, as a host or a CSV reader supplies it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawRow {
    fields: BTreeMap<String, String>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self { fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }
}

/// Replace non-finite values with 0 so they contribute nothing to a stack.
#[inline]
pub fn sanitize(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    /// Milliseconds since the Unix epoch; NaN when the source date was invalid.
    pub time: f64,
    /// One raw value per series key, in key order. May contain NaN.
    pub values: Vec<f64>,
}

impl Row {
    pub fn new(time: f64, values: Vec<f64>) -> Self {
        Self { time, values }
    }

    pub fn at(time: DateTime<Utc>, values: Vec<f64>) -> Self {
        Self { time: time.timestamp_millis() as f64, values }
    }

    /// Sanitized value for series `i`; missing or non-finite reads as 0.
    pub fn value(&self, i: usize) -> f64 {
        self.values.get(i).copied().map(sanitize).unwrap_or(0.0)
    }

    pub fn total(&self) -> f64 {
        self.values.iter().copied().map(sanitize).sum()
    }

    pub fn has_valid_time(&self) -> bool {
        self.time.is_finite()
    }

    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        if !self.has_valid_time() {
            return None;
        }
        DateTime::from_timestamp_millis(self.time as i64)
    }
}

/// Rows in caller order plus the series keys their values are aligned with.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dataset {
    keys: Vec<String>,
    rows: Vec<Row>,
}

impl Dataset {
    pub fn new(keys: Vec<String>, rows: Vec<Row>) -> Self {
        Self { keys, rows }
    }

    pub fn empty(keys: Vec<String>) -> Self {
        Self { keys, rows: Vec::new() }
    }

    pub fn keys(&self) -> &[String] { &self.keys }
    pub fn rows(&self) -> &[Row] { &self.rows }
    pub fn len(&self) -> usize { self.rows.len() }
    pub fn is_empty(&self) -> bool { self.rows.is_empty() }

    pub fn push(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub fn key_index(&self, key: &str) -> Option<usize> {
        self.keys.iter().position(|k| k == key)
    }

    /// Min/max over valid times; None when no row has a valid time.
    pub fn time_extent(&self) -> Option<(f64, f64)> {
        self.rows
            .iter()
            .map(|r| r.time)
            .filter(|t| t.is_finite())
            .fold(None, |acc, t| match acc {
                None => Some((t, t)),
                Some((lo, hi)) => Some((lo.min(t), hi.max(t))),
            })
    }

    /// Re-align values to `keys`. Keys absent from this dataset read as NaN.
    pub fn project(&self, keys: &[String]) -> Dataset {
        if self.keys == keys {
            return self.clone();
        }
        let index: Vec<Option<usize>> = keys.iter().map(|k| self.key_index(k)).collect();
        let rows = self
            .rows
            .iter()
            .map(|r| {
                let values = index
                    .iter()
                    .map(|ix| ix.and_then(|i| r.values.get(i).copied()).unwrap_or(f64::NAN))
                    .collect();
                Row::new(r.time, values)
            })
            .collect();
        Dataset::new(keys.to_vec(), rows)
    }
}

/// Converts raw rows into a `Dataset` keyed by the configured date field and series keys.
#[derive(Clone, Debug)]
pub struct Normalizer {
    date_field: String,
    keys: Vec<String>,
}

impl Normalizer {
    pub fn new(config: &StreamConfig) -> Self {
        Self::with_fields(config.date_field.clone(), config.keys())
    }

    pub fn with_fields(date_field: impl Into<String>, keys: Vec<String>) -> Self {
        Self { date_field: date_field.into(), keys }
    }

    pub fn normalize(&self, raw: &[RawRow]) -> Dataset {
        let mut invalid = 0usize;
        let rows = raw
            .iter()
            .enumerate()
            .map(|(i, r)| {
                let time = match r.get(&self.date_field).and_then(parse_time) {
                    Some(t) => t.timestamp_millis() as f64,
                    None => {
                        invalid += 1;
                        tracing::warn!(row = i, field = %self.date_field, value = ?r.get(&self.date_field), "unparseable date; row kept with an invalid time");
                        f64::NAN
                    }
                };
                let values = self.keys.iter().map(|k| parse_value(r.get(k))).collect();
                Row::new(time, values)
            })
            .collect::<Vec<_>>();
        tracing::debug!(rows = rows.len(), invalid, "normalized dataset");
        Dataset::new(self.keys.clone(), rows)
    }
}

/// Parse a date-like string into UTC. Zone-less inputs are taken as UTC.
pub fn parse_time(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    for fmt in ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return date.and_hms_opt(0, 0, 0).map(|n| n.and_utc());
        }
    }
    // Year-month only
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|n| n.and_utc());
    }
    if let Ok(n) = s.parse::<i64>() {
        // epoch seconds below 1e11, epoch milliseconds above
        return if n.abs() < 100_000_000_000 {
            DateTime::from_timestamp(n, 0)
        } else {
            DateTime::from_timestamp_millis(n)
        };
    }
    None
}

/// Parse a numeric field; missing, empty, or non-finite input becomes NaN.
pub fn parse_value(s: Option<&str>) -> f64 {
    s.map(str::trim)
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(f64::NAN)
}
