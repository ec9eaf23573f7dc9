// File: crates/stream-core/src/config.rs
// Summary: Chart configuration (series keys and colors, layout, legend, tooltip) with TOML loading.
// Notes:
// - Every field defaults to the stock streamgraph layout, so an empty TOML document is valid.

use serde::Deserialize;
use std::path::Path;

use crate::error::ConfigError;
use crate::stack::StackOffset;
use crate::theme::{self, parse_color, ColorMap, Theme};
use crate::types::{Insets, HEIGHT, SURFACE_HEIGHT, SURFACE_WIDTH, WIDTH};

/// One configured series: its key (the dataset column name) and its CSS color.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SeriesSpec {
    pub key: String,
    pub color: String,
}

impl SeriesSpec {
    pub fn new(key: impl Into<String>, color: impl Into<String>) -> Self {
        Self { key: key.into(), color: color.into() }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Column holding the observation date.
    pub date_field: String,
    /// Ordered series; order is stack order, the legend shows it reversed.
    pub series: Vec<SeriesSpec>,
    pub offset: StackOffset,
    /// Extra room below the lowest band on the value axis.
    pub y_padding: f64,
    /// Cardinal spline tension; 0 gives Catmull-Rom-like curves, 1 gives straight segments.
    pub tension: f64,
    /// strftime pattern used to bucket rows for the tooltip bar chart.
    pub period_format: String,
    /// strftime pattern for the time axis tick labels.
    pub tick_format: String,
    pub theme: String,
    pub layout: LayoutConfig,
    pub legend: LegendConfig,
    pub tooltip: TooltipConfig,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub width: f64,
    pub height: f64,
    pub margin: Insets,
    pub surface_width: i32,
    pub surface_height: i32,
    /// Page position of the surface's top-left corner; pointer events arrive in page coordinates.
    pub surface_origin: [f64; 2],
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LegendConfig {
    /// Distance of the legend column from the right edge of the layout width.
    pub right: f64,
    pub top: f64,
    pub row_height: f64,
    pub swatch_size: f64,
    pub swatch_opacity: f64,
    pub label_offset: [f64; 2],
    pub font_size: f64,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct TooltipConfig {
    /// Size of the bar chart drawn inside the tooltip.
    pub width: f64,
    pub height: f64,
    pub margin: Insets,
    pub padding: f64,
    pub header_height: f64,
    pub font_size: f64,
    pub axis_font_size: f64,
    pub background: String,
    pub enter_offset: [f64; 2],
    pub move_offset: [f64; 2],
    pub y_ticks: usize,
    pub label_rotate: f64,
    pub band_padding: f64,
    pub axis_duration_ms: f64,
    pub bar_duration_ms: f64,
    pub fill_delay_ms: f64,
    pub fill_duration_ms: f64,
    pub exit_duration_ms: f64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            date_field: "Date".to_string(),
            series: vec![
                SeriesSpec::new("GPT-4", "orange"),
                SeriesSpec::new("Gemini", "blue"),
                SeriesSpec::new("PaLM-2", "red"),
                SeriesSpec::new("Claude", "green"),
                SeriesSpec::new("LLaMA-3.1", "purple"),
            ],
            offset: StackOffset::Wiggle,
            y_padding: 100.0,
            tension: 0.0,
            period_format: "%b".to_string(),
            tick_format: "%b".to_string(),
            theme: "light".to_string(),
            layout: LayoutConfig::default(),
            legend: LegendConfig::default(),
            tooltip: TooltipConfig::default(),
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width: WIDTH,
            height: HEIGHT,
            margin: Insets::default(),
            surface_width: SURFACE_WIDTH,
            surface_height: SURFACE_HEIGHT,
            surface_origin: [0.0, 0.0],
        }
    }
}

impl Default for LegendConfig {
    fn default() -> Self {
        Self {
            right: 50.0,
            top: 50.0,
            row_height: 20.0,
            swatch_size: 15.0,
            swatch_opacity: 0.7,
            label_offset: [20.0, 12.0],
            font_size: 12.0,
        }
    }
}

impl Default for TooltipConfig {
    fn default() -> Self {
        Self {
            width: 220.0,
            height: 160.0,
            margin: Insets::new(40.0, 20.0, 20.0, 30.0),
            padding: 18.0,
            header_height: 16.0,
            font_size: 12.0,
            axis_font_size: 10.0,
            background: "#f5efe8".to_string(),
            enter_offset: [0.0, -50.0],
            move_offset: [-50.0, 25.0],
            y_ticks: 4,
            label_rotate: -25.0,
            band_padding: 0.1,
            axis_duration_ms: 300.0,
            bar_duration_ms: 300.0,
            fill_delay_ms: 500.0,
            fill_duration_ms: 500.0,
            exit_duration_ms: 500.0,
        }
    }
}

impl StreamConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: StreamConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.series.is_empty() {
            return Err(ConfigError::NoSeries);
        }
        for (i, s) in self.series.iter().enumerate() {
            if self.series[..i].iter().any(|prev| prev.key == s.key) {
                return Err(ConfigError::DuplicateSeries(s.key.clone()));
            }
            if parse_color(&s.color).is_none() {
                return Err(ConfigError::InvalidColor { key: s.key.clone(), color: s.color.clone() });
            }
        }
        if parse_color(&self.tooltip.background).is_none() {
            return Err(ConfigError::InvalidColor {
                key: "tooltip.background".to_string(),
                color: self.tooltip.background.clone(),
            });
        }
        positive("layout.width", self.layout.width)?;
        positive("layout.height", self.layout.height)?;
        positive("layout.surface_width", self.layout.surface_width as f64)?;
        positive("layout.surface_height", self.layout.surface_height as f64)?;
        positive("inner width", self.inner_width())?;
        positive("inner height", self.inner_height())?;
        positive("tooltip.width", self.tooltip.width)?;
        positive("tooltip.height", self.tooltip.height)?;
        if !self.layout.margin.is_valid() || !self.tooltip.margin.is_valid() {
            return Err(ConfigError::InvalidMargins);
        }
        Ok(())
    }

    /// Series keys in stack order.
    pub fn keys(&self) -> Vec<String> {
        self.series.iter().map(|s| s.key.clone()).collect()
    }

    /// Resolve the configured colors. Unparseable colors fall back to gray; `validate` rejects them first.
    pub fn color_map(&self) -> ColorMap {
        ColorMap::new(
            self.series
                .iter()
                .map(|s| (s.key.clone(), parse_color(&s.color).unwrap_or(ColorMap::FALLBACK)))
                .collect(),
        )
    }

    pub fn theme(&self) -> Theme {
        theme::find(&self.theme)
    }

    pub fn inner_width(&self) -> f64 {
        self.layout.width - self.layout.margin.hsum()
    }

    pub fn inner_height(&self) -> f64 {
        self.layout.height - self.layout.margin.vsum()
    }
}

impl TooltipConfig {
    pub fn inner_width(&self) -> f64 {
        (self.width - self.margin.hsum()).max(0.0)
    }

    pub fn inner_height(&self) -> f64 {
        (self.height - self.margin.vsum()).max(0.0)
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidSize { field, value })
    }
}
