// File: crates/stream-core/src/stack.rs
// Summary: Stack builder: cumulative per-row bands with a zero, silhouette, or wiggle baseline.

use serde::Deserialize;

use crate::data::Dataset;

/// Baseline policy applied per row before the layers are stacked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StackOffset {
    /// Baseline at zero.
    None,
    /// Centered around zero.
    Silhouette,
    /// Minimizes the weighted change in slope of the layers between consecutive rows.
    #[default]
    Wiggle,
}

/// Vertical extent of one series at one row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Band {
    pub lower: f64,
    pub upper: f64,
}

impl Band {
    pub fn thickness(&self) -> f64 { self.upper - self.lower }
    pub fn mid(&self) -> f64 { (self.lower + self.upper) * 0.5 }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StackedSeries {
    pub key: String,
    /// Position in the key order.
    pub index: usize,
    /// One band per dataset row, aligned by index.
    pub bands: Vec<Band>,
}

/// Stack the dataset's series in key order.
/// Invariant: at each row the bands are contiguous and `upper - lower` is the sanitized value.
pub fn stack(dataset: &Dataset, offset: StackOffset) -> Vec<StackedSeries> {
    let rows = dataset.rows();
    let values: Vec<Vec<f64>> = (0..dataset.keys().len())
        .map(|i| rows.iter().map(|r| r.value(i)).collect())
        .collect();

    let mut floor = match offset {
        StackOffset::None => vec![0.0; rows.len()],
        StackOffset::Silhouette => silhouette_baseline(&values, rows.len()),
        StackOffset::Wiggle => wiggle_baseline(&values, rows.len()),
    };

    dataset
        .keys()
        .iter()
        .zip(values.iter())
        .enumerate()
        .map(|(index, (key, series))| {
            let bands = series
                .iter()
                .zip(floor.iter_mut())
                .map(|(&v, f)| {
                    let band = Band { lower: *f, upper: *f + v };
                    *f = band.upper;
                    band
                })
                .collect();
            StackedSeries { key: key.clone(), index, bands }
        })
        .collect()
}

/// Min/max across every band endpoint; None when nothing was stacked.
pub fn stack_extent(stacked: &[StackedSeries]) -> Option<(f64, f64)> {
    stacked
        .iter()
        .flat_map(|s| s.bands.iter())
        .flat_map(|b| [b.lower, b.upper])
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

fn silhouette_baseline(values: &[Vec<f64>], rows: usize) -> Vec<f64> {
    (0..rows)
        .map(|j| -values.iter().map(|s| s[j]).sum::<f64>() * 0.5)
        .collect()
}

/// Running baseline: y_j = y_{j-1} - Σ v_ij·s_ij / Σ v_ij, where s_ij is the half change of
/// layer i plus the full change of every layer below it. A zero row total carries y over.
fn wiggle_baseline(values: &[Vec<f64>], rows: usize) -> Vec<f64> {
    let mut baseline = Vec::with_capacity(rows);
    if rows == 0 {
        return baseline;
    }
    let mut y = 0.0;
    baseline.push(y);
    for j in 1..rows {
        let mut total = 0.0;
        let mut weighted = 0.0;
        let mut below = 0.0;
        for series in values {
            let delta = series[j] - series[j - 1];
            let slope = below + delta * 0.5;
            total += series[j];
            weighted += slope * series[j];
            below += delta;
        }
        if total != 0.0 {
            y -= weighted / total;
        }
        baseline.push(y);
    }
    baseline
}
