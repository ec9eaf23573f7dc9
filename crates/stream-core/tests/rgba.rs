// File: crates/stream-core/tests/rgba.rs
// Purpose: Validate RGBA rendering buffer shape and a few pixels (background, stream fill, tooltip).

mod common;

use stream_core::{RenderOptions, StreamChart, StreamConfig};

fn pixel(px: &[u8], stride: usize, x: f64, y: f64) -> [u8; 4] {
    let i = y.floor() as usize * stride + x.floor() as usize * 4;
    [px[i], px[i + 1], px[i + 2], px[i + 3]]
}

fn opts() -> RenderOptions {
    RenderOptions { draw_labels: false, ..RenderOptions::default() }
}

#[test]
fn render_rgba8_buffer() {
    let mut chart = StreamChart::new(StreamConfig::default()).expect("valid config");
    chart.render(&common::year());

    let (px, w, h, stride) = chart.render_to_rgba8(&opts()).expect("rgba render");
    assert_eq!((w, h), (700, 800));
    assert_eq!(w as usize * h as usize * 4, px.len());
    assert_eq!(stride, (w as usize) * 4);

    // Top-left corner is plain background
    assert_eq!(pixel(&px, stride, 0.0, 0.0), [255, 255, 255, 255]);

    // Band midpoints are filled with the series color
    let p = chart.page_point_for("GPT-4", 6).expect("band midpoint");
    assert_eq!(pixel(&px, stride, p.x, p.y), [255, 165, 0, 255]);
    let p = chart.page_point_for("Claude", 6).expect("band midpoint");
    assert_eq!(pixel(&px, stride, p.x, p.y), [0, 128, 0, 255]);
}

#[test]
fn background_override() {
    let mut chart = StreamChart::new(StreamConfig::default()).expect("valid config");
    chart.render(&common::year());
    let opts = RenderOptions { background: Some(skia_safe::Color::from_rgb(10, 20, 30)), ..opts() };
    let (px, _, _, stride) = chart.render_to_rgba8(&opts).expect("rgba render");
    assert_eq!(pixel(&px, stride, 1.0, 1.0), [10, 20, 30, 255]);
}

#[test]
fn overlay_is_composited_on_request() {
    let mut chart = StreamChart::new(StreamConfig::default()).expect("valid config");
    chart.render(&common::year());
    let at = chart.page_point_for("Claude", 5).expect("band midpoint");
    chart.pointer_enter("Claude", at);
    chart.settle();
    let corner = chart.tooltip().expect("tooltip").position().offset(4.0, 4.0);

    let (px, _, _, stride) = chart.render_to_rgba8(&opts()).expect("rgba render");
    assert_eq!(pixel(&px, stride, corner.x, corner.y), [0xf5, 0xef, 0xe8, 255]);

    let without = RenderOptions { include_overlay: false, ..opts() };
    let (px, _, _, stride) = chart.render_to_rgba8(&without).expect("rgba render");
    assert_ne!(pixel(&px, stride, corner.x, corner.y), [0xf5, 0xef, 0xe8, 255]);

    chart.pointer_leave();
    let (px, _, _, stride) = chart.render_to_rgba8(&opts()).expect("rgba render");
    assert_ne!(pixel(&px, stride, corner.x, corner.y), [0xf5, 0xef, 0xe8, 255]);
}
