// File: crates/stream-demo/src/main.rs
// Summary: Demo loads a benchmark-score CSV and renders the streamgraph (plain and hovered) to PNG/SVG.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use stream_core::{Normalizer, Point, RawRow, RenderOptions, StreamChart, StreamConfig};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "stream-demo")]
#[command(about = "Render a CSV of per-series scores as an interactive streamgraph")]
struct Cli {
    /// Input CSV with a date column and one numeric column per series
    #[arg(default_value = "data/llm_benchmarks.csv")]
    csv: PathBuf,

    /// TOML chart configuration; defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory
    #[arg(short, long, default_value = "target/out")]
    out: PathBuf,

    /// Also render the tooltip as if the pointer rested on this series
    #[arg(long)]
    hover: Option<String>,

    /// Skip text (axis, legend, tooltip labels)
    #[arg(long)]
    no_labels: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "stream_core=info,stream_demo=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => StreamConfig::from_path(path).with_context(|| format!("loading config {}", path.display()))?,
        None => StreamConfig::default(),
    };

    let raw = load_csv(&cli.csv).with_context(|| format!("failed to load CSV '{}'", cli.csv.display()))?;
    info!(rows = raw.len(), path = %cli.csv.display(), "loaded csv");
    if raw.is_empty() {
        anyhow::bail!("no rows loaded; check headers/delimiter.");
    }

    let dataset = Normalizer::new(&config).normalize(&raw);
    let mut chart = StreamChart::new(config)?;
    chart.render(&dataset);

    let opts = RenderOptions { draw_labels: !cli.no_labels, ..RenderOptions::default() };
    let stem = cli.csv.file_stem().and_then(|s| s.to_str()).unwrap_or("chart");

    let out_png = cli.out.join(format!("{stem}.png"));
    chart.render_to_png(&opts, &out_png)?;
    info!("wrote {}", out_png.display());

    let out_svg = cli.out.join(format!("{stem}.svg"));
    std::fs::write(&out_svg, chart.render_to_svg(&opts)).with_context(|| format!("writing {}", out_svg.display()))?;
    info!("wrote {}", out_svg.display());

    if let Some(key) = &cli.hover {
        let Some(at) = hover_point(&chart, key) else {
            warn!(key = %key, "no hover position for series; skipping tooltip render");
            return Ok(());
        };
        chart.pointer_enter(key, at);
        chart.settle();
        let out_hover = cli.out.join(format!("{stem}_hover.png"));
        chart.render_to_png(&opts, &out_hover)?;
        info!(key = %key, "wrote {}", out_hover.display());
    }
    Ok(())
}

/// Middle of the series band at the middle row.
fn hover_point(chart: &StreamChart, key: &str) -> Option<Point> {
    let rows = chart.dataset()?.len();
    chart.page_point_for(key, rows / 2)
}

fn load_csv(path: &Path) -> Result<Vec<RawRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let headers = rdr.headers()?.clone();
    info!(?headers, "csv headers");

    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        out.push(headers.iter().zip(rec.iter()).collect::<RawRow>());
    }
    Ok(out)
}
