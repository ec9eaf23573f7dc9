// File: crates/stream-core/tests/chart.rs
// Purpose: StreamChart render pipeline: paths, axis, legend, idempotent redraws, and degenerate data.

mod common;

use stream_core::{Dataset, Normalizer, RawRow, Row, Shape, StreamChart, StreamConfig};

fn chart() -> StreamChart {
    StreamChart::new(StreamConfig::default()).expect("default config is valid")
}

fn path_of(chart: &StreamChart, key: &str) -> stream_core::PathData {
    let id = chart.series_path(key).expect("path exists");
    match chart.scene().shape(id) {
        Some(Shape::Path(d)) => d.clone(),
        other => panic!("expected path, got {other:?}"),
    }
}

fn text_of(chart: &StreamChart, id: stream_core::NodeId) -> String {
    match chart.scene().shape(id) {
        Some(Shape::Text { content, .. }) => content.clone(),
        other => panic!("expected text, got {other:?}"),
    }
}

#[test]
fn renders_one_closed_path_per_series() {
    let mut c = chart();
    c.render(&common::year());
    assert_eq!(c.series_paths().len(), 5);
    for key in common::KEYS {
        let d = path_of(&c, key);
        assert!(d.is_finite(), "{key}");
        assert_eq!(d.subpaths(), 1, "{key}");
        let fill = c.scene().style(c.series_path(key).expect("path")).and_then(|s| s.fill);
        assert_eq!(fill, Some(c.config().color_map().get(key)));
    }
}

#[test]
fn paths_stay_inside_the_plot() {
    let mut c = chart();
    c.render(&common::year());
    let (w, h) = (c.config().inner_width(), c.config().inner_height());
    for key in common::KEYS {
        let b = path_of(&c, key).bounds().expect("non-empty");
        assert!(b.left >= -1e-6 && b.right <= w + 1e-6, "{key} x {b:?}");
        // control points may overshoot slightly; the data points are within the y range
        assert!(b.top > -h && b.bottom < 2.0 * h, "{key} y {b:?}");
    }
}

#[test]
fn legend_lists_keys_in_reverse() {
    let mut c = chart();
    c.render(&common::year());
    let rows = c.legend_rows();
    assert_eq!(rows.len(), 5);
    let labels: Vec<String> = rows
        .iter()
        .map(|r| text_of(&c, c.scene().children(*r)[1]))
        .collect();
    let mut want = common::keys();
    want.reverse();
    assert_eq!(labels, want);
    let offsets: Vec<f64> = rows.iter().filter_map(|r| c.scene().style(*r)).map(|s| s.translate.1).collect();
    assert_eq!(offsets, vec![0.0, 20.0, 40.0, 60.0, 80.0]);
}

#[test]
fn x_axis_has_month_ticks() {
    let mut c = chart();
    c.render(&common::year());
    let axis = c.x_axis().expect("axis built");
    let ticks = axis.tick_nodes(c.scene());
    assert_eq!(ticks.len(), 12);
    assert_eq!(text_of(&c, c.scene().children(ticks[0])[1]), "Jan");
    let translate = c.scene().style(axis.group()).map(|s| s.translate);
    assert_eq!(translate, Some((0.0, c.config().inner_height())));
}

#[test]
fn rerender_is_idempotent() {
    let mut c = chart();
    let ds = common::year();
    c.render(&ds);
    let count = c.scene().live_count();
    let paths: Vec<_> = common::KEYS.iter().map(|k| path_of(&c, k)).collect();
    c.render(&ds);
    assert_eq!(c.scene().live_count(), count);
    assert_eq!(c.legend_rows().len(), 5);
    let again: Vec<_> = common::KEYS.iter().map(|k| path_of(&c, k)).collect();
    assert_eq!(paths, again);
}

#[test]
fn empty_dataset_is_a_no_op() {
    let mut c = chart();
    let baseline = c.scene().live_count();
    c.render(&Dataset::empty(common::keys()));
    assert_eq!(c.scene().live_count(), baseline);
    assert!(c.series_paths().is_empty());

    c.render(&common::year());
    let drawn = c.scene().live_count();
    c.render(&Dataset::empty(common::keys()));
    assert_eq!(c.scene().live_count(), drawn);
    assert_eq!(c.series_paths().len(), 5);
}

#[test]
fn single_row_renders_finite_paths() {
    let mut c = chart();
    c.render(&common::dataset(1));
    for key in common::KEYS {
        assert!(path_of(&c, key).is_finite());
    }
    let (x, _) = c.scales().expect("frame");
    assert_eq!(x.to_px(c.dataset().expect("frame").rows()[0].time), c.config().inner_width() / 2.0);
}

#[test]
fn invalid_dates_do_not_poison_paths() {
    let mut raw = common::raw_rows(6);
    raw.insert(2, RawRow::new().with("Date", "someday").with("GPT-4", "500"));
    let ds = Normalizer::new(&StreamConfig::default()).normalize(&raw);
    assert_eq!(ds.len(), 7);
    let mut c = chart();
    c.render(&ds);
    for key in common::KEYS {
        let d = path_of(&c, key);
        assert!(d.is_finite(), "{key}");
        assert_eq!(d.subpaths(), 1);
    }
}

#[test]
fn dataset_keys_are_projected_onto_config_order() {
    let keys: Vec<String> = common::KEYS.iter().rev().map(|k| k.to_string()).collect();
    let rows = common::year()
        .rows()
        .iter()
        .map(|r| Row::new(r.time, r.values.iter().rev().copied().collect()))
        .collect();
    let mut reversed = chart();
    reversed.render(&Dataset::new(keys, rows));
    let mut straight = chart();
    straight.render(&common::year());
    assert_eq!(path_of(&reversed, "Claude"), path_of(&straight, "Claude"));
}

#[test]
fn rejects_invalid_config() {
    let mut cfg = StreamConfig::default();
    cfg.series.clear();
    assert!(StreamChart::new(cfg).is_err());
}
