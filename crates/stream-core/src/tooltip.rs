// File: crates/stream-core/src/tooltip.rs
// Summary: Hover tooltip: a single shared overlay subtree holding a per-period bar chart for one series.
// Notes:
// - States: Hidden (initial) and Visible(key). Only one tooltip exists per chart.
// - The subtree lives under the scene's overlay root, positioned in page coordinates.

use skia_safe as skia;

use crate::axis::{Axis, AxisStyle, Orient};
use crate::config::TooltipConfig;
use crate::data::Dataset;
use crate::geometry::Point;
use crate::scale::{BandScale, ValueScale};
use crate::scene::{Attr, AttrValue, NodeId, Scene, Shape, TextAnchor, Timing};
use crate::theme::{parse_color, Theme};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TooltipState {
    Hidden,
    Visible(String),
}

/// Raw (unstacked) value total for one display period.
#[derive(Clone, Debug, PartialEq)]
pub struct PeriodBucket {
    pub label: String,
    pub value: f64,
}

/// Group rows by their period label (strftime `format`, UTC) in first-appearance order and
/// sum the sanitized values of series `index`. Rows with an invalid time belong to no period.
pub fn bucket_by_period(dataset: &Dataset, index: usize, format: &str) -> Vec<PeriodBucket> {
    let mut buckets: Vec<PeriodBucket> = Vec::new();
    for row in dataset.rows() {
        let Some(dt) = row.datetime() else { continue };
        let label = dt.format(format).to_string();
        let value = row.value(index);
        match buckets.iter_mut().find(|b| b.label == label) {
            Some(b) => b.value += value,
            None => buckets.push(PeriodBucket { label, value }),
        }
    }
    buckets
}

pub struct Tooltip {
    state: TooltipState,
    position: Point,
    cfg: TooltipConfig,
    axis_style: AxisStyle,
    root: NodeId,
    background: NodeId,
    header: NodeId,
    x_axis: Axis,
    y_axis: Axis,
    bars: NodeId,
}

impl Tooltip {
    /// Build the hidden tooltip skeleton under the overlay root.
    pub fn create(scene: &mut Scene, cfg: &TooltipConfig, theme: &Theme) -> Self {
        let pad = cfg.padding;
        let root = scene.append(scene.overlay(), "tooltip", Shape::Group);
        scene.set_visible(root, false);

        let background = scene.append(
            root,
            "tooltip-background",
            Shape::rect(0.0, 0.0, cfg.width + pad * 2.0, cfg.header_height + cfg.height + pad * 2.0),
        );
        let bg = parse_color(&cfg.background).unwrap_or(skia::Color::WHITE);
        scene.set_fill(background, bg);

        let header = scene.append(
            root,
            "tooltip-header",
            Shape::Text { content: String::new(), x: pad, y: pad + cfg.font_size, size: cfg.font_size, anchor: TextAnchor::Start, bold: true },
        );
        scene.set_fill(header, theme.tooltip_text);

        let plot = scene.append(root, "tooltip-plot", Shape::Group);
        scene.set_translate(plot, pad + cfg.margin.left, pad + cfg.header_height + cfg.margin.top);

        let x_axis = Axis::create(scene, plot, "tooltip-x-axis", Orient::Bottom);
        scene.set_translate(x_axis.group(), 0.0, cfg.inner_height());
        let y_axis = Axis::create(scene, plot, "tooltip-y-axis", Orient::Left);
        let bars = scene.append(plot, "tooltip-bars", Shape::Group);

        let axis_style = AxisStyle {
            line: theme.tooltip_text,
            label: theme.tooltip_text,
            font_size: cfg.axis_font_size,
            label_rotate: cfg.label_rotate,
        };

        Self {
            state: TooltipState::Hidden,
            position: Point::default(),
            cfg: cfg.clone(),
            axis_style,
            root,
            background,
            header,
            x_axis,
            y_axis,
            bars,
        }
    }

    pub fn state(&self) -> &TooltipState { &self.state }
    pub fn is_visible(&self) -> bool { matches!(self.state, TooltipState::Visible(_)) }

    pub fn active_key(&self) -> Option<&str> {
        match &self.state {
            TooltipState::Visible(k) => Some(k),
            TooltipState::Hidden => None,
        }
    }

    /// Page position of the tooltip's top-left corner.
    pub fn position(&self) -> Point { self.position }
    pub fn root(&self) -> NodeId { self.root }
    pub fn background(&self) -> NodeId { self.background }
    pub fn header(&self) -> NodeId { self.header }
    pub fn x_axis(&self) -> &Axis { &self.x_axis }
    pub fn y_axis(&self) -> &Axis { &self.y_axis }

    /// Bars currently bound to data, in bucket order; fading bars are excluded.
    pub fn bars(&self, scene: &Scene) -> Vec<NodeId> {
        scene
            .children(self.bars)
            .iter()
            .copied()
            .filter(|b| scene.get(*b).is_some_and(|n| !n.is_exiting()))
            .collect()
    }

    /// Hidden/Visible(other) -> Visible(key): show near the pointer and redraw the bars.
    pub fn enter(&mut self, scene: &mut Scene, key: &str, color: skia::Color, buckets: &[PeriodBucket], at: Point) {
        self.state = TooltipState::Visible(key.to_string());
        self.place(scene, at.offset(self.cfg.enter_offset[0], self.cfg.enter_offset[1]));
        scene.set_visible(self.root, true);
        scene.set_text(self.header, key);
        self.redraw(scene, color, buckets);
    }

    /// Visible(k) -> Visible(k): follow the pointer. Ignored while hidden.
    pub fn move_to(&mut self, scene: &mut Scene, at: Point) {
        if self.is_visible() {
            self.place(scene, at.offset(self.cfg.move_offset[0], self.cfg.move_offset[1]));
        }
    }

    /// Visible -> Hidden, without animation.
    pub fn leave(&mut self, scene: &mut Scene) {
        self.state = TooltipState::Hidden;
        scene.set_visible(self.root, false);
    }

    /// Redraw the bars for the active series without moving the tooltip.
    pub fn refresh(&mut self, scene: &mut Scene, color: skia::Color, buckets: &[PeriodBucket]) {
        if self.is_visible() {
            self.redraw(scene, color, buckets);
        }
    }

    fn place(&mut self, scene: &mut Scene, at: Point) {
        self.position = at;
        scene.set_translate(self.root, at.x, at.y);
    }

    fn redraw(&self, scene: &mut Scene, color: skia::Color, buckets: &[PeriodBucket]) {
        let width = self.cfg.inner_width();
        let height = self.cfg.inner_height();
        let x = BandScale::new(buckets.iter().map(|b| b.label.clone()), (0.0, width))
            .with_padding(self.cfg.band_padding);
        let max = buckets.iter().map(|b| b.value).fold(f64::NEG_INFINITY, f64::max);
        let top = if max.is_finite() && max > 0.0 { max } else { 1.0 };
        let y = ValueScale::new((0.0, top), (height, 0.0)).nice(self.cfg.y_ticks);

        let axis_timing = Timing::new(self.cfg.axis_duration_ms);
        self.x_axis.update(scene, &x.axis_ticks(), (0.0, width), &self.axis_style, Some(axis_timing));
        self.y_axis.update(scene, &y.axis_ticks(self.cfg.y_ticks), (height, 0.0), &self.axis_style, Some(axis_timing));

        let keys: Vec<String> = x.domain().to_vec();
        let join = scene.join(self.bars, "bar", &keys, |_| Shape::rect(0.0, height, 0.0, 0.0));
        let merged: Vec<NodeId> = join.merged().into_iter().map(|(_, id)| id).collect();
        scene.order(self.bars, &merged);
        let bar_timing = Timing::new(self.cfg.bar_duration_ms);
        let fill_timing = Timing::new(self.cfg.fill_duration_ms).with_delay(self.cfg.fill_delay_ms);

        for &(i, id) in &join.enter {
            let label = &keys[i];
            let left = x.position(label).unwrap_or(0.0);
            let (bar_y, bar_h) = bar_extent(&y, height, value_of(buckets, label));
            scene.set_shape(id, Shape::rect(left, height, x.bandwidth(), 0.0));
            scene.set_fill(id, color);
            scene.transition(id, Attr::Y, AttrValue::Num(bar_y), bar_timing);
            scene.transition(id, Attr::Height, AttrValue::Num(bar_h), bar_timing);
        }
        for &(i, id) in &join.update {
            let label = &keys[i];
            let left = x.position(label).unwrap_or(0.0);
            let (bar_y, bar_h) = bar_extent(&y, height, value_of(buckets, label));
            scene.transition(id, Attr::X, AttrValue::Num(left), bar_timing);
            scene.transition(id, Attr::Width, AttrValue::Num(x.bandwidth()), bar_timing);
            scene.transition(id, Attr::Y, AttrValue::Num(bar_y), bar_timing);
            scene.transition(id, Attr::Height, AttrValue::Num(bar_h), bar_timing);
            scene.transition(id, Attr::Opacity, AttrValue::Num(1.0), bar_timing);
            scene.transition(id, Attr::Fill, AttrValue::Color(color), fill_timing);
        }
        for id in join.exit {
            scene.fade_out_and_remove(id, Timing::new(self.cfg.exit_duration_ms));
        }
    }
}

fn value_of(buckets: &[PeriodBucket], label: &str) -> f64 {
    buckets.iter().find(|b| b.label == label).map(|b| b.value).unwrap_or(0.0)
}

/// Top edge and height of a bar; negative values collapse to the baseline.
fn bar_extent(y: &ValueScale, height: f64, value: f64) -> (f64, f64) {
    let top = y.to_px(value.max(0.0));
    if top.is_finite() {
        (top, (height - top).max(0.0))
    } else {
        (height, 0.0)
    }
}
