// File: crates/stream-core/tests/normalize.rs
// Purpose: Raw row normalization: date formats, invalid dates, and numeric coercion.

mod common;

use stream_core::data::{parse_time, parse_value};
use stream_core::{Normalizer, RawRow};

#[test]
fn normalizes_year_of_rows() {
    let ds = common::year();
    assert_eq!(ds.len(), 12);
    assert_eq!(ds.keys(), common::keys().as_slice());
    assert!(ds.rows().iter().all(|r| r.has_valid_time()));
    assert_eq!(ds.rows()[3].value(3), 70.0);
    let first = ds.rows()[0].datetime().expect("valid time");
    assert_eq!(first.format("%Y-%m-%d").to_string(), "2024-01-01");
}

#[test]
fn invalid_date_keeps_row_with_nan_time() {
    let raw = vec![
        RawRow::new().with("Date", "2024-01-01").with("a", "1"),
        RawRow::new().with("Date", "not a date").with("a", "2"),
    ];
    let ds = Normalizer::with_fields("Date", vec!["a".into()]).normalize(&raw);
    assert_eq!(ds.len(), 2);
    assert!(ds.rows()[1].time.is_nan());
    assert_eq!(ds.rows()[1].value(0), 2.0);
    assert_eq!(ds.time_extent(), Some((ds.rows()[0].time, ds.rows()[0].time)));
}

#[test]
fn non_numeric_values_read_as_zero() {
    let raw = vec![RawRow::new().with("Date", "2024-01-01").with("a", "n/a")];
    let ds = Normalizer::with_fields("Date", vec!["a".into(), "missing".into()]).normalize(&raw);
    let row = &ds.rows()[0];
    assert!(row.values[0].is_nan());
    assert_eq!(row.value(0), 0.0);
    assert_eq!(row.value(1), 0.0);
    assert_eq!(row.total(), 0.0);
}

#[test]
fn accepts_common_date_shapes() {
    let want = parse_time("2024-03-01").expect("iso date");
    for s in ["2024-03-01T00:00:00Z", "2024-03-01 00:00:00", "03/01/2024", "2024-03", "1709251200", "1709251200000"] {
        assert_eq!(parse_time(s), Some(want), "{s}");
    }
    assert_eq!(parse_time(""), None);
    assert_eq!(parse_time("March"), None);
}

#[test]
fn parse_value_rejects_non_finite() {
    assert_eq!(parse_value(Some(" 4.5 ")), 4.5);
    assert!(parse_value(Some("inf")).is_nan());
    assert!(parse_value(None).is_nan());
}

#[test]
fn project_realigns_columns() {
    let ds = common::year();
    let keys = vec!["Claude".to_string(), "Unknown".to_string()];
    let p = ds.project(&keys);
    assert_eq!(p.keys(), keys.as_slice());
    assert_eq!(p.rows()[0].value(0), 40.0);
    assert!(p.rows()[0].values[1].is_nan());
}
