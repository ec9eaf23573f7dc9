// File: crates/stream-core/src/lib.rs
// Summary: Core library entry point; exports public API for streamgraph construction, interaction, and rendering.

pub mod chart;
pub mod axis;
pub mod config;
pub mod curve;
pub mod data;
pub mod error;
pub mod types;
pub mod geometry;
pub mod legend;
pub mod scale;
pub mod scene;
pub mod stack;
pub mod theme;
pub mod text;
pub mod tooltip;
mod paint;

pub use chart::{RenderOptions, StreamChart};
pub use axis::{Axis, AxisStyle, Orient};
pub use config::{LayoutConfig, LegendConfig, SeriesSpec, StreamConfig, TooltipConfig};
pub use curve::{area_path, AreaPoint, PathCmd, PathData};
pub use data::{Dataset, Normalizer, RawRow, Row};
pub use error::ConfigError;
pub use geometry::{Point, Rect};
pub use legend::Legend;
pub use scale::{BandScale, Tick, TimeScale, ValueScale};
pub use scene::{Attr, AttrValue, NodeId, Scene, Shape, Style, TextAnchor, Timing};
pub use stack::{stack, stack_extent, Band, StackOffset, StackedSeries};
pub use theme::{ColorMap, Theme};
pub use text::TextShaper;
pub use tooltip::{bucket_by_period, PeriodBucket, Tooltip, TooltipState};
