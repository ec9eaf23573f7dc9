// File: crates/stream-core/src/axis.rs
// Summary: Axis subtree (domain line plus keyed ticks) built and updated in place inside a scene.

use skia_safe as skia;

use crate::curve::PathData;
use crate::geometry::Point;
use crate::scale::Tick;
use crate::scene::{Attr, AttrValue, NodeId, Scene, Shape, TextAnchor, Timing};

const TICK_SIZE: f64 = 6.0;
const TICK_PADDING: f64 = 3.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orient {
    Bottom,
    Left,
}

#[derive(Clone, Copy, Debug)]
pub struct AxisStyle {
    pub line: skia::Color,
    pub label: skia::Color,
    pub font_size: f64,
    /// Label rotation in degrees; rotated bottom labels are end-anchored.
    pub label_rotate: f64,
}

/// Handles for one axis: the group it owns and its domain line.
#[derive(Clone, Copy, Debug)]
pub struct Axis {
    group: NodeId,
    domain: NodeId,
    orient: Orient,
}

impl Axis {
    pub fn create(scene: &mut Scene, parent: NodeId, class: &'static str, orient: Orient) -> Self {
        let group = scene.append(parent, class, Shape::Group);
        let domain = scene.append(group, "domain", Shape::Path(PathData::new()));
        Self { group, domain, orient }
    }

    pub fn group(&self) -> NodeId { self.group }
    pub fn orient(&self) -> Orient { self.orient }

    /// Tick groups currently attached (fading ones included).
    pub fn tick_nodes(&self, scene: &Scene) -> Vec<NodeId> {
        scene
            .children(self.group)
            .iter()
            .copied()
            .filter(|c| scene.get(*c).is_some_and(|n| n.class == "tick"))
            .collect()
    }

    /// Rebuild the domain line and join `ticks` by key. With `timing`, moves and
    /// fades are animated; otherwise every attribute is set immediately.
    pub fn update(&self, scene: &mut Scene, ticks: &[Tick], range: (f64, f64), style: &AxisStyle, timing: Option<Timing>) {
        scene.set_shape(self.domain, Shape::Path(self.domain_path(range)));
        scene.update_style(self.domain, |s| {
            s.stroke = Some(style.line);
            s.fill = None;
        });

        let keys: Vec<String> = ticks.iter().map(|t| t.key.clone()).collect();
        let join = scene.join(self.group, "tick", &keys, |_| Shape::Group);

        for &(i, id) in &join.enter {
            self.build_tick(scene, id, style);
            let (tx, ty) = self.offset(ticks[i].pos);
            scene.set_translate(id, tx, ty);
            if let Some(t) = timing {
                scene.update_style(id, |s| s.opacity = 0.0);
                scene.transition(id, Attr::Opacity, AttrValue::Num(1.0), t);
            }
        }
        for &(i, id) in &join.update {
            let (tx, ty) = self.offset(ticks[i].pos);
            match timing {
                Some(t) => {
                    scene.transition(id, Attr::TranslateX, AttrValue::Num(tx), t);
                    scene.transition(id, Attr::TranslateY, AttrValue::Num(ty), t);
                    scene.transition(id, Attr::Opacity, AttrValue::Num(1.0), t);
                }
                None => {
                    scene.set_translate(id, tx, ty);
                    scene.update_style(id, |s| s.opacity = 1.0);
                }
            }
        }
        for (i, id) in join.merged() {
            if let Some(&label) = scene.children(id).get(1) {
                scene.set_text(label, &ticks[i].label);
            }
        }
        for id in join.exit {
            match timing {
                Some(t) => scene.fade_out_and_remove(id, t),
                None => scene.remove(id),
            }
        }
    }

    fn offset(&self, pos: f64) -> (f64, f64) {
        match self.orient {
            Orient::Bottom => (pos, 0.0),
            Orient::Left => (0.0, pos),
        }
    }

    fn domain_path(&self, (r0, r1): (f64, f64)) -> PathData {
        let mut d = PathData::new();
        match self.orient {
            Orient::Bottom => {
                d.move_to(Point::new(r0, TICK_SIZE));
                d.line_to(Point::new(r0, 0.0));
                d.line_to(Point::new(r1, 0.0));
                d.line_to(Point::new(r1, TICK_SIZE));
            }
            Orient::Left => {
                d.move_to(Point::new(-TICK_SIZE, r0));
                d.line_to(Point::new(0.0, r0));
                d.line_to(Point::new(0.0, r1));
                d.line_to(Point::new(-TICK_SIZE, r1));
            }
        }
        d
    }

    fn build_tick(&self, scene: &mut Scene, tick: NodeId, style: &AxisStyle) {
        let size = style.font_size;
        let (line, label) = match self.orient {
            Orient::Bottom => {
                let anchor = if style.label_rotate != 0.0 { TextAnchor::End } else { TextAnchor::Middle };
                (
                    Shape::Line { x1: 0.0, y1: 0.0, x2: 0.0, y2: TICK_SIZE },
                    Shape::Text {
                        content: String::new(),
                        x: 0.0,
                        y: TICK_SIZE + TICK_PADDING + size * 0.71,
                        size,
                        anchor,
                        bold: false,
                    },
                )
            }
            Orient::Left => (
                Shape::Line { x1: -TICK_SIZE, y1: 0.0, x2: 0.0, y2: 0.0 },
                Shape::Text {
                    content: String::new(),
                    x: -(TICK_SIZE + TICK_PADDING),
                    y: size * 0.32,
                    size,
                    anchor: TextAnchor::End,
                    bold: false,
                },
            ),
        };
        let line = scene.append(tick, "tick-line", line);
        scene.update_style(line, |s| s.stroke = Some(style.line));
        let label = scene.append(tick, "tick-label", label);
        scene.update_style(label, |s| {
            s.fill = Some(style.label);
            if self.orient == Orient::Bottom {
                s.rotate = style.label_rotate;
            }
        });
    }
}
