// File: crates/stream-core/src/paint.rs
// Summary: Scene-to-Skia painter shared by the raster (PNG/RGBA) and SVG outputs.

use skia_safe as skia;

use crate::curve::{PathCmd, PathData};
use crate::scene::{NodeId, Scene, Shape};
use crate::text::TextShaper;

#[inline]
fn pt(x: f64, y: f64) -> skia::Point {
    skia::Point::new(x as f32, y as f32)
}

pub(crate) fn to_skia_path(data: &PathData) -> skia::Path {
    let mut path = skia::Path::new();
    for cmd in data.cmds() {
        match *cmd {
            PathCmd::MoveTo(p) => {
                path.move_to(pt(p.x, p.y));
            }
            PathCmd::LineTo(p) => {
                path.line_to(pt(p.x, p.y));
            }
            PathCmd::CubicTo { c1, c2, to } => {
                path.cubic_to(pt(c1.x, c1.y), pt(c2.x, c2.y), pt(to.x, to.y));
            }
            PathCmd::Close => {
                path.close();
            }
        }
    }
    path
}

fn faded(color: skia::Color, opacity: f64) -> skia::Color {
    let a = (color.a() as f64 * opacity.clamp(0.0, 1.0)).round() as u8;
    color.with_a(a)
}

pub(crate) struct Painter<'a> {
    pub scene: &'a Scene,
    /// `None` skips text nodes (deterministic snapshots without fonts).
    pub shaper: Option<&'a TextShaper>,
}

impl Painter<'_> {
    /// Paint `id` and its subtree. Invisible nodes hide their whole subtree;
    /// opacity multiplies down the tree.
    pub fn paint(&self, canvas: &skia::Canvas, id: NodeId, parent_opacity: f64) {
        let Some(node) = self.scene.get(id) else { return };
        let style = node.style;
        if !style.visible {
            return;
        }
        let opacity = parent_opacity * style.opacity;
        if opacity <= 0.0 {
            return;
        }

        canvas.save();
        canvas.translate(pt(style.translate.0, style.translate.1));
        if style.rotate != 0.0 {
            canvas.rotate(style.rotate as f32, None);
        }

        match &node.shape {
            Shape::Group => {}
            Shape::Rect { x, y, width, height } => {
                let rect = skia::Rect::from_xywh(*x as f32, *y as f32, *width as f32, *height as f32);
                if let Some(fill) = style.fill {
                    canvas.draw_rect(rect, &fill_paint(faded(fill, opacity)));
                }
                if let Some(stroke) = style.stroke {
                    canvas.draw_rect(rect, &stroke_paint(faded(stroke, opacity), style.stroke_width));
                }
            }
            Shape::Line { x1, y1, x2, y2 } => {
                let color = style.stroke.or(style.fill).unwrap_or(skia::Color::BLACK);
                canvas.draw_line(pt(*x1, *y1), pt(*x2, *y2), &stroke_paint(faded(color, opacity), style.stroke_width));
            }
            Shape::Path(data) => {
                if !data.is_empty() {
                    let path = to_skia_path(data);
                    if let Some(fill) = style.fill {
                        canvas.draw_path(&path, &fill_paint(faded(fill, opacity)));
                    }
                    if let Some(stroke) = style.stroke {
                        canvas.draw_path(&path, &stroke_paint(faded(stroke, opacity), style.stroke_width));
                    }
                }
            }
            Shape::Text { content, x, y, size, anchor, bold } => {
                if let Some(shaper) = self.shaper {
                    if !content.is_empty() {
                        let color = faded(style.fill.unwrap_or(skia::Color::BLACK), opacity);
                        shaper.draw(canvas, content, *x as f32, *y as f32, *size as f32, color, *anchor, *bold);
                    }
                }
            }
        }

        for &child in node.children() {
            self.paint(canvas, child, opacity);
        }
        canvas.restore();
    }
}

fn fill_paint(color: skia::Color) -> skia::Paint {
    let mut paint = skia::Paint::default();
    paint.set_anti_alias(true);
    paint.set_style(skia::paint::Style::Fill);
    paint.set_color(color);
    paint
}

fn stroke_paint(color: skia::Color, width: f64) -> skia::Paint {
    let mut paint = skia::Paint::default();
    paint.set_anti_alias(true);
    paint.set_style(skia::paint::Style::Stroke);
    paint.set_stroke_width(width as f32);
    paint.set_color(color);
    paint
}
