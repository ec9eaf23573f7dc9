// File: crates/stream-core/src/curve.rs
// Summary: Backend-neutral path data and the cardinal-spline area generator for stream layers.

use std::fmt::Write as _;

use crate::geometry::{Point, Rect};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCmd {
    MoveTo(Point),
    LineTo(Point),
    CubicTo { c1: Point, c2: Point, to: Point },
    Close,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PathData {
    cmds: Vec<PathCmd>,
}

impl PathData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, p: Point) { self.cmds.push(PathCmd::MoveTo(p)); }
    pub fn line_to(&mut self, p: Point) { self.cmds.push(PathCmd::LineTo(p)); }
    pub fn cubic_to(&mut self, c1: Point, c2: Point, to: Point) { self.cmds.push(PathCmd::CubicTo { c1, c2, to }); }
    pub fn close(&mut self) { self.cmds.push(PathCmd::Close); }

    pub fn cmds(&self) -> &[PathCmd] { &self.cmds }
    pub fn is_empty(&self) -> bool { self.cmds.is_empty() }

    /// Every coordinate in the path, control points included.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.cmds.iter().flat_map(|c| match *c {
            PathCmd::MoveTo(p) | PathCmd::LineTo(p) => vec![p],
            PathCmd::CubicTo { c1, c2, to } => vec![c1, c2, to],
            PathCmd::Close => Vec::new(),
        })
    }

    pub fn is_finite(&self) -> bool {
        self.points().all(|p| p.is_finite())
    }

    /// Number of subpaths (MoveTo commands).
    pub fn subpaths(&self) -> usize {
        self.cmds.iter().filter(|c| matches!(c, PathCmd::MoveTo(_))).count()
    }

    pub fn bounds(&self) -> Option<Rect> {
        let mut it = self.points();
        let first = it.next()?;
        let mut r = Rect::from_ltrb(first.x, first.y, first.x, first.y);
        for p in it {
            r.include(p);
        }
        Some(r)
    }

    /// SVG path syntax, for debugging and text snapshots.
    pub fn to_svg_d(&self) -> String {
        let mut d = String::new();
        for c in &self.cmds {
            let _ = match *c {
                PathCmd::MoveTo(p) => write!(d, "M{:.2},{:.2}", p.x, p.y),
                PathCmd::LineTo(p) => write!(d, "L{:.2},{:.2}", p.x, p.y),
                PathCmd::CubicTo { c1, c2, to } => write!(
                    d,
                    "C{:.2},{:.2},{:.2},{:.2},{:.2},{:.2}",
                    c1.x, c1.y, c2.x, c2.y, to.x, to.y
                ),
                PathCmd::Close => write!(d, "Z"),
            };
        }
        d
    }
}

/// One column of an area: shared x, lower y0 and upper y1 (screen units).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AreaPoint {
    pub x: f64,
    pub y0: f64,
    pub y1: f64,
}

impl AreaPoint {
    fn is_defined(&self) -> bool {
        self.x.is_finite() && self.y0.is_finite() && self.y1.is_finite()
    }
}

/// Append a cardinal spline through `pts`. The first point is a MoveTo unless `connect`
/// is set, in which case it is joined with a LineTo. End tangents are zero, and every
/// input point is passed through exactly.
pub fn cardinal(path: &mut PathData, pts: &[Point], tension: f64, connect: bool) {
    let Some(&first) = pts.first() else { return };
    if connect { path.line_to(first) } else { path.move_to(first) }
    let n = pts.len();
    if n == 2 {
        path.line_to(pts[1]);
        return;
    }
    let k = (1.0 - tension) / 6.0;
    for i in 0..n.saturating_sub(1) {
        let (p1, p2) = (pts[i], pts[i + 1]);
        let c1 = if i == 0 {
            p1
        } else {
            let p0 = pts[i - 1];
            Point::new(p1.x + k * (p2.x - p0.x), p1.y + k * (p2.y - p0.y))
        };
        let c2 = if i + 2 >= n {
            p2
        } else {
            let p3 = pts[i + 2];
            Point::new(p2.x + k * (p1.x - p3.x), p2.y + k * (p1.y - p3.y))
        };
        path.cubic_to(c1, c2, p2);
    }
}

/// Closed area: the upper boundary left to right, then the lower boundary right to left.
/// Columns with any non-finite coordinate are skipped so the result stays one shape.
pub fn area_path(points: &[AreaPoint], tension: f64) -> PathData {
    let defined: Vec<AreaPoint> = points.iter().copied().filter(AreaPoint::is_defined).collect();
    let mut path = PathData::new();
    if defined.is_empty() {
        return path;
    }
    let upper: Vec<Point> = defined.iter().map(|p| Point::new(p.x, p.y1)).collect();
    let lower: Vec<Point> = defined.iter().rev().map(|p| Point::new(p.x, p.y0)).collect();
    cardinal(&mut path, &upper, tension, false);
    cardinal(&mut path, &lower, tension, true);
    path.close();
    path
}
