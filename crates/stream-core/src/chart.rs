// File: crates/stream-core/src/chart.rs
// Summary: StreamChart: renders a dataset as a wiggle streamgraph with legend and hover tooltip,
//          and rasterizes the retained scene via Skia CPU surfaces (PNG/RGBA) or the SVG canvas.

use anyhow::Result;
use skia_safe as skia;
use tracing::{debug, trace, warn};

use crate::axis::{Axis, AxisStyle, Orient};
use crate::config::StreamConfig;
use crate::curve::{area_path, AreaPoint};
use crate::data::Dataset;
use crate::error::ConfigError;
use crate::geometry::Point;
use crate::legend::Legend;
use crate::paint::{to_skia_path, Painter};
use crate::scale::{TimeScale, ValueScale};
use crate::scene::{NodeId, Scene, Shape};
use crate::stack::{stack, stack_extent, StackedSeries};
use crate::text::TextShaper;
use crate::theme::{ColorMap, Theme};
use crate::tooltip::{bucket_by_period, Tooltip, TooltipState};

pub struct RenderOptions {
    /// Overrides the theme background.
    pub background: Option<skia::Color>,
    pub draw_labels: bool,
    /// Composite the document-level overlay (the tooltip) onto the surface.
    pub include_overlay: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { background: None, draw_labels: true, include_overlay: true }
    }
}

/// Everything derived from the last rendered dataset.
struct Frame {
    dataset: Dataset,
    stacked: Vec<StackedSeries>,
    x: TimeScale,
    y: ValueScale,
}

/// Subtrees created on the first non-empty render and updated in place afterwards.
struct Layers {
    x_axis: Axis,
    streams: NodeId,
    legend: Legend,
    tooltip: Tooltip,
}

pub struct StreamChart {
    config: StreamConfig,
    keys: Vec<String>,
    colors: ColorMap,
    theme: Theme,
    scene: Scene,
    chart_group: NodeId,
    layers: Option<Layers>,
    frame: Option<Frame>,
    shaper: TextShaper,
}

impl StreamChart {
    pub fn new(config: StreamConfig) -> Result<Self, ConfigError> {
        if let Err(e) = config.validate() {
            warn!(error = %e, "rejecting stream chart config");
            return Err(e);
        }
        let mut scene = Scene::new();
        let chart_group = scene.append(scene.surface(), "chart-group", Shape::Group);
        let margin = config.layout.margin;
        scene.set_translate(chart_group, margin.left, margin.top);
        Ok(Self {
            keys: config.keys(),
            colors: config.color_map(),
            theme: config.theme(),
            config,
            scene,
            chart_group,
            layers: None,
            frame: None,
            shaper: TextShaper::new(),
        })
    }

    pub fn config(&self) -> &StreamConfig { &self.config }
    pub fn scene(&self) -> &Scene { &self.scene }
    pub fn chart_group(&self) -> NodeId { self.chart_group }

    /// Draw or redraw the chart for `dataset`. Repeated calls with the same data
    /// leave the scene structurally unchanged. An empty dataset keeps the prior frame.
    pub fn render(&mut self, dataset: &Dataset) {
        if dataset.is_empty() {
            debug!("empty dataset; keeping previous frame");
            return;
        }
        let data = dataset.project(&self.keys);
        let stacked = stack(&data, self.config.offset);
        trace!(series = stacked.len(), "stacked layers");

        let inner_w = self.config.inner_width();
        let inner_h = self.config.inner_height();
        let (lo, hi) = stack_extent(&stacked).unwrap_or((0.0, 0.0));
        let x = TimeScale::from_extent(data.time_extent(), (0.0, inner_w));
        let y = ValueScale::new((lo - self.config.y_padding, hi), (inner_h, 0.0));
        debug!(rows = data.len(), y_min = lo, y_max = hi, "rendering streamgraph");

        self.ensure_layers();
        let Some(layers) = self.layers.as_mut() else { return };

        let axis_style = AxisStyle {
            line: self.theme.axis_line,
            label: self.theme.axis_label,
            font_size: 10.0,
            label_rotate: 0.0,
        };
        self.scene.set_translate(layers.x_axis.group(), 0.0, inner_h);
        layers.x_axis.update(
            &mut self.scene,
            &x.axis_ticks(&self.config.tick_format),
            (0.0, inner_w),
            &axis_style,
            None,
        );

        let keys: Vec<String> = stacked.iter().map(|s| s.key.clone()).collect();
        let join = self.scene.join(layers.streams, "stream-path", &keys, |_| Shape::Group);
        for (i, id) in join.merged() {
            let series = &stacked[i];
            let points: Vec<AreaPoint> = data
                .rows()
                .iter()
                .zip(series.bands.iter())
                .map(|(row, band)| AreaPoint { x: x.to_px(row.time), y0: y.to_px(band.lower), y1: y.to_px(band.upper) })
                .collect();
            self.scene.set_shape(id, Shape::Path(area_path(&points, self.config.tension)));
            self.scene.update_style(id, |s| {
                s.fill = Some(self.colors.get(&series.key));
                s.opacity = 1.0;
            });
        }
        for id in join.exit {
            self.scene.remove(id);
        }

        layers.legend.update(
            &mut self.scene,
            &self.keys,
            &self.colors,
            &self.config.legend,
            self.config.layout.width,
            &self.theme,
        );

        if let Some(key) = layers.tooltip.active_key().map(str::to_string) {
            if let Some(index) = data.key_index(&key) {
                let buckets = bucket_by_period(&data, index, &self.config.period_format);
                layers.tooltip.refresh(&mut self.scene, self.colors.get(&key), &buckets);
            }
        }

        self.frame = Some(Frame { dataset: data, stacked, x, y });
    }

    fn ensure_layers(&mut self) {
        if self.layers.is_some() {
            return;
        }
        let x_axis = Axis::create(&mut self.scene, self.chart_group, "xaxis", Orient::Bottom);
        let streams = self.scene.append(self.chart_group, "streams", Shape::Group);
        let legend = Legend::create(&mut self.scene, self.chart_group);
        let tooltip = Tooltip::create(&mut self.scene, &self.config.tooltip, &self.theme);
        self.layers = Some(Layers { x_axis, streams, legend, tooltip });
    }

    // ---- pointer ------------------------------------------------------------

    /// Pointer entered the region of series `key` at page position `at`.
    pub fn pointer_enter(&mut self, key: &str, at: Point) {
        let (Some(frame), Some(layers)) = (self.frame.as_ref(), self.layers.as_mut()) else {
            debug!(key, "pointer enter before first render");
            return;
        };
        let Some(index) = frame.dataset.key_index(key) else {
            warn!(key, "pointer enter on unknown series");
            return;
        };
        let buckets = bucket_by_period(&frame.dataset, index, &self.config.period_format);
        layers.tooltip.enter(&mut self.scene, key, self.colors.get(key), &buckets, at);
    }

    pub fn pointer_move(&mut self, at: Point) {
        if let Some(layers) = self.layers.as_mut() {
            layers.tooltip.move_to(&mut self.scene, at);
        }
    }

    pub fn pointer_leave(&mut self) {
        if let Some(layers) = self.layers.as_mut() {
            layers.tooltip.leave(&mut self.scene);
        }
    }

    /// Hit-test `at` and dispatch the matching enter/move/leave. Returns the series under the pointer.
    pub fn pointer_at(&mut self, at: Point) -> Option<String> {
        let hit = self.series_at(at);
        let active = self.tooltip_state().clone();
        match (&active, &hit) {
            (TooltipState::Visible(k), Some(h)) if k == h => self.pointer_move(at),
            (TooltipState::Visible(_), Some(h)) => {
                self.pointer_leave();
                self.pointer_enter(h, at);
            }
            (TooltipState::Hidden, Some(h)) => self.pointer_enter(h, at),
            (TooltipState::Visible(_), None) => self.pointer_leave(),
            (TooltipState::Hidden, None) => {}
        }
        hit
    }

    /// Topmost series whose area contains page point `at`.
    pub fn series_at(&self, at: Point) -> Option<String> {
        let layers = self.layers.as_ref()?;
        let local = self.page_to_chart(at);
        let probe = skia::Point::new(local.x as f32, local.y as f32);
        self.scene.children(layers.streams).iter().rev().find_map(|&id| {
            let node = self.scene.get(id)?;
            match &node.shape {
                Shape::Path(d) if !d.is_empty() && to_skia_path(d).contains(probe) => node.key.clone(),
                _ => None,
            }
        })
    }

    /// Page position of the middle of `key`'s band at row `row`.
    pub fn page_point_for(&self, key: &str, row: usize) -> Option<Point> {
        let frame = self.frame.as_ref()?;
        let series = frame.stacked.iter().find(|s| s.key == key)?;
        let band = series.bands.get(row)?;
        let time = frame.dataset.rows().get(row)?.time;
        let p = Point::new(frame.x.to_px(time), frame.y.to_px(band.mid()));
        p.is_finite().then(|| self.chart_to_page(p))
    }

    fn page_to_chart(&self, at: Point) -> Point {
        let [ox, oy] = self.config.layout.surface_origin;
        let m = self.config.layout.margin;
        at.offset(-(ox + m.left), -(oy + m.top))
    }

    fn chart_to_page(&self, p: Point) -> Point {
        let [ox, oy] = self.config.layout.surface_origin;
        let m = self.config.layout.margin;
        p.offset(ox + m.left, oy + m.top)
    }

    // ---- queries ------------------------------------------------------------

    pub fn tooltip_state(&self) -> &TooltipState {
        static HIDDEN: TooltipState = TooltipState::Hidden;
        self.layers.as_ref().map(|l| l.tooltip.state()).unwrap_or(&HIDDEN)
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.layers.as_ref().map(|l| &l.tooltip)
    }

    /// Live tooltip bars in bucket order (fading bars excluded).
    pub fn tooltip_bars(&self) -> Vec<NodeId> {
        self.layers.as_ref().map(|l| l.tooltip.bars(&self.scene)).unwrap_or_default()
    }

    pub fn series_path(&self, key: &str) -> Option<NodeId> {
        let layers = self.layers.as_ref()?;
        self.scene.find_keyed(layers.streams, "stream-path", key)
    }

    pub fn series_paths(&self) -> Vec<NodeId> {
        self.layers.as_ref().map(|l| self.scene.children(l.streams).to_vec()).unwrap_or_default()
    }

    pub fn legend_rows(&self) -> Vec<NodeId> {
        self.layers.as_ref().map(|l| l.legend.rows(&self.scene)).unwrap_or_default()
    }

    pub fn x_axis(&self) -> Option<&Axis> {
        self.layers.as_ref().map(|l| &l.x_axis)
    }

    pub fn stacked(&self) -> &[StackedSeries] {
        self.frame.as_ref().map(|f| f.stacked.as_slice()).unwrap_or(&[])
    }

    pub fn scales(&self) -> Option<(TimeScale, ValueScale)> {
        self.frame.as_ref().map(|f| (f.x, f.y))
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.frame.as_ref().map(|f| &f.dataset)
    }

    // ---- clock --------------------------------------------------------------

    pub fn advance(&mut self, dt_ms: f64) {
        self.scene.advance(dt_ms);
    }

    pub fn settle(&mut self) {
        self.scene.settle();
    }

    // ---- output -------------------------------------------------------------

    fn draw(&self, canvas: &skia::Canvas, opts: &RenderOptions) {
        canvas.clear(opts.background.unwrap_or(self.theme.background));
        let painter = Painter { scene: &self.scene, shaper: opts.draw_labels.then_some(&self.shaper) };
        painter.paint(canvas, self.scene.surface(), 1.0);
        if opts.include_overlay {
            // Overlay nodes are positioned in page coordinates.
            let [ox, oy] = self.config.layout.surface_origin;
            canvas.save();
            canvas.translate((-ox as f32, -oy as f32));
            painter.paint(canvas, self.scene.overlay(), 1.0);
            canvas.restore();
        }
    }

    fn raster(&self, opts: &RenderOptions) -> Result<skia::Surface> {
        let size = (self.config.layout.surface_width, self.config.layout.surface_height);
        let mut surface = skia::surfaces::raster_n32_premul(size)
            .ok_or_else(|| anyhow::anyhow!("failed to create raster surface {}x{}", size.0, size.1))?;
        self.draw(surface.canvas(), opts);
        Ok(surface)
    }

    pub fn render_to_png_bytes(&self, opts: &RenderOptions) -> Result<Vec<u8>> {
        let mut surface = self.raster(opts)?;
        let image = surface.image_snapshot();
        #[allow(deprecated)]
        let data = image
            .encode_to_data(skia::EncodedImageFormat::PNG)
            .ok_or_else(|| anyhow::anyhow!("encode PNG failed"))?;
        Ok(data.as_bytes().to_vec())
    }

    /// Render the chart to a PNG at `output_png_path` using a CPU raster surface.
    pub fn render_to_png(&self, opts: &RenderOptions, output_png_path: impl AsRef<std::path::Path>) -> Result<()> {
        let bytes = self.render_to_png_bytes(opts)?;
        if let Some(parent) = output_png_path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(output_png_path, bytes)?;
        Ok(())
    }

    /// Unpremultiplied RGBA pixels as `(pixels, width, height, row_bytes)`.
    pub fn render_to_rgba8(&self, opts: &RenderOptions) -> Result<(Vec<u8>, u32, u32, usize)> {
        let mut surface = self.raster(opts)?;
        let (w, h) = (self.config.layout.surface_width, self.config.layout.surface_height);
        let info = skia::ImageInfo::new((w, h), skia::ColorType::RGBA8888, skia::AlphaType::Unpremul, None);
        let row_bytes = w as usize * 4;
        let mut pixels = vec![0u8; row_bytes * h as usize];
        if !surface.read_pixels(&info, &mut pixels, row_bytes, (0, 0)) {
            anyhow::bail!("failed to read back {w}x{h} surface");
        }
        Ok((pixels, w as u32, h as u32, row_bytes))
    }

    pub fn render_to_svg(&self, opts: &RenderOptions) -> String {
        let bounds = skia::Rect::from_wh(
            self.config.layout.surface_width as f32,
            self.config.layout.surface_height as f32,
        );
        let canvas = skia::svg::Canvas::new(bounds, None);
        self.draw(&canvas, opts);
        let data = canvas.end();
        String::from_utf8_lossy(data.as_bytes()).into_owned()
    }
}
