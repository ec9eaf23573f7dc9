// File: crates/stream-core/src/scale.rs
// Summary: Time (X), linear value (Y), and categorical band scales, plus axis tick generation.
// Notes:
// - A degenerate (zero-span) domain maps every input to the middle of the range.
// - Non-finite inputs map to NaN; the area generator drops such points.

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};

/// One axis tick: a stable join key, its position in range units, and its label.
#[derive(Clone, Debug, PartialEq)]
pub struct Tick {
    pub key: String,
    pub pos: f64,
    pub label: String,
}

/// Upper bound on generated month ticks so a corrupt domain cannot explode the axis.
const MAX_TIME_TICKS: usize = 600;

#[inline]
fn normalize(d0: f64, d1: f64, v: f64) -> f64 {
    let span = d1 - d0;
    if span == 0.0 || !span.is_finite() { 0.5 } else { (v - d0) / span }
}

#[inline]
fn interpolate(r0: f64, r1: f64, t: f64) -> f64 {
    r0 + (r1 - r0) * t
}

/// Horizontal time scale: epoch milliseconds -> range units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl TimeScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Build from a dataset time extent; an absent extent behaves as a degenerate domain.
    pub fn from_extent(extent: Option<(f64, f64)>, range: (f64, f64)) -> Self {
        Self::new(extent.unwrap_or((0.0, 0.0)), range)
    }

    #[inline]
    pub fn to_px(&self, t: f64) -> f64 {
        if !t.is_finite() {
            return f64::NAN;
        }
        interpolate(self.range.0, self.range.1, normalize(self.domain.0, self.domain.1, t))
    }

    /// First instant of every UTC month inside the domain, in epoch milliseconds.
    pub fn month_ticks(&self) -> Vec<f64> {
        let (lo, hi) = (self.domain.0.min(self.domain.1), self.domain.0.max(self.domain.1));
        if !lo.is_finite() || !hi.is_finite() {
            return Vec::new();
        }
        let Some(start) = DateTime::from_timestamp_millis(lo.ceil() as i64) else { return Vec::new() };
        let Some(mut month) = NaiveDate::from_ymd_opt(start.year(), start.month(), 1) else { return Vec::new() };
        let mut out = Vec::new();
        while out.len() < MAX_TIME_TICKS {
            let Some(ts) = month.and_hms_opt(0, 0, 0).map(|n| n.and_utc().timestamp_millis() as f64) else { break };
            if ts > hi {
                break;
            }
            if ts >= lo {
                out.push(ts);
            }
            match month.checked_add_months(Months::new(1)) {
                Some(next) => month = next,
                None => break,
            }
        }
        out
    }

    /// Month ticks labelled with a strftime pattern (e.g. `%b`).
    pub fn axis_ticks(&self, format: &str) -> Vec<Tick> {
        self.month_ticks()
            .into_iter()
            .filter_map(|t| {
                let dt = DateTime::<Utc>::from_timestamp_millis(t as i64)?;
                Some(Tick { key: (t as i64).to_string(), pos: self.to_px(t), label: dt.format(format).to_string() })
            })
            .collect()
    }
}

/// Linear value scale; invert the range (e.g. `(height, 0)`) for screen Y.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValueScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl ValueScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    #[inline]
    pub fn to_px(&self, v: f64) -> f64 {
        if !v.is_finite() {
            return f64::NAN;
        }
        interpolate(self.range.0, self.range.1, normalize(self.domain.0, self.domain.1, v))
    }

    /// Roughly `count` ticks on 1/2/5 × 10^k multiples inside the domain.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (lo, hi) = (self.domain.0.min(self.domain.1), self.domain.0.max(self.domain.1));
        let step = tick_step(lo, hi, count);
        if step == 0.0 {
            return if lo.is_finite() { vec![lo] } else { Vec::new() };
        }
        let first = (lo / step).ceil() as i64;
        let last = (hi / step).floor() as i64;
        (first..=last).map(|k| k as f64 * step).collect()
    }

    /// Extend the domain outward to multiples of the tick step.
    pub fn nice(mut self, count: usize) -> Self {
        let (mut lo, mut hi) = self.domain;
        let flipped = hi < lo;
        if flipped {
            std::mem::swap(&mut lo, &mut hi);
        }
        let mut prev = 0.0;
        for _ in 0..10 {
            let step = tick_step(lo, hi, count);
            if step == 0.0 || step == prev {
                break;
            }
            lo = (lo / step).floor() * step;
            hi = (hi / step).ceil() * step;
            prev = step;
        }
        self.domain = if flipped { (hi, lo) } else { (lo, hi) };
        self
    }

    pub fn axis_ticks(&self, count: usize) -> Vec<Tick> {
        let (lo, hi) = self.domain;
        let step = tick_step(lo.min(hi), lo.max(hi), count);
        self.ticks(count)
            .into_iter()
            .map(|v| {
                let label = format_tick(v, step);
                Tick { key: label.clone(), pos: self.to_px(v), label }
            })
            .collect()
    }
}

/// Tick spacing for about `count` ticks over `[start, stop]`; 0 when the span is empty or invalid.
pub fn tick_step(start: f64, stop: f64, count: usize) -> f64 {
    let raw = (stop - start).abs() / count.max(1) as f64;
    if !raw.is_finite() || raw <= 0.0 {
        return 0.0;
    }
    let base = 10f64.powf(raw.log10().floor());
    let error = raw / base;
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };
    factor * base
}

fn format_tick(v: f64, step: f64) -> String {
    let decimals = if step > 0.0 && step < 1.0 { (-step.log10().floor()) as usize } else { 0 };
    let s = format!("{:.*}", decimals, v);
    // avoid "-0"
    if s.trim_start_matches('-').chars().all(|c| c == '0' || c == '.') { s.trim_start_matches('-').to_string() } else { s }
}

/// Categorical scale: each distinct key gets an equal band with inner/outer padding.
#[derive(Clone, Debug, PartialEq)]
pub struct BandScale {
    domain: Vec<String>,
    range: (f64, f64),
    padding_inner: f64,
    padding_outer: f64,
    step: f64,
    bandwidth: f64,
    start: f64,
}

impl BandScale {
    /// Duplicate keys collapse onto their first occurrence.
    pub fn new<I, S>(domain: I, range: (f64, f64)) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut keys: Vec<String> = Vec::new();
        for k in domain {
            let k = k.into();
            if !keys.contains(&k) {
                keys.push(k);
            }
        }
        let mut s = Self { domain: keys, range, padding_inner: 0.0, padding_outer: 0.0, step: 0.0, bandwidth: 0.0, start: range.0 };
        s.rescale();
        s
    }

    pub fn with_padding(mut self, padding: f64) -> Self {
        let p = padding.clamp(0.0, 1.0);
        self.padding_inner = p;
        self.padding_outer = p;
        self.rescale();
        self
    }

    fn rescale(&mut self) {
        let n = self.domain.len() as f64;
        let (r0, r1) = self.range;
        let span = r1 - r0;
        self.step = span / (n - self.padding_inner + self.padding_outer * 2.0).max(1.0);
        self.start = r0 + (span - self.step * (n - self.padding_inner)) * 0.5;
        self.bandwidth = self.step * (1.0 - self.padding_inner);
    }

    pub fn domain(&self) -> &[String] { &self.domain }
    pub fn bandwidth(&self) -> f64 { self.bandwidth }
    pub fn step(&self) -> f64 { self.step }

    /// Left edge of the band for `key`.
    pub fn position(&self, key: &str) -> Option<f64> {
        self.domain.iter().position(|k| k == key).map(|i| self.start + self.step * i as f64)
    }

    /// Ticks at band centers.
    pub fn axis_ticks(&self) -> Vec<Tick> {
        self.domain
            .iter()
            .enumerate()
            .map(|(i, k)| Tick {
                key: k.clone(),
                pos: self.start + self.step * i as f64 + self.bandwidth * 0.5,
                label: k.clone(),
            })
            .collect()
    }
}
