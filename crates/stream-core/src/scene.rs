// File: crates/stream-core/src/scene.rs
// Summary: Retained scene graph with owned node handles, keyed joins, and timed attribute transitions.
// Notes:
// - Two roots: `surface` (the chart's drawing surface) and `overlay` (document-level layer the
//   tooltip lives in, positioned in page coordinates).
// - Removed slots are recycled. Handles carry the slot generation, so a stale `NodeId` can only
//   miss, not alias.
// - Transitions run on a logical millisecond clock advanced by the host (`advance`/`settle`).
//   Scheduling a transition on a node attribute replaces any pending one on the same attribute.

use skia_safe as skia;

use crate::curve::PathData;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Group,
    Rect { x: f64, y: f64, width: f64, height: f64 },
    Line { x1: f64, y1: f64, x2: f64, y2: f64 },
    Path(PathData),
    /// `y` is the baseline.
    Text { content: String, x: f64, y: f64, size: f64, anchor: TextAnchor, bold: bool },
}

impl Shape {
    pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Shape::Rect { x, y, width, height }
    }

    pub fn text(content: impl Into<String>, x: f64, y: f64, size: f64) -> Self {
        Shape::Text { content: content.into(), x, y, size, anchor: TextAnchor::Start, bold: false }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Style {
    pub translate: (f64, f64),
    /// Degrees, applied after the translation.
    pub rotate: f64,
    pub fill: Option<skia::Color>,
    pub stroke: Option<skia::Color>,
    pub stroke_width: f64,
    pub opacity: f64,
    pub visible: bool,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            translate: (0.0, 0.0),
            rotate: 0.0,
            fill: None,
            stroke: None,
            stroke_width: 1.0,
            opacity: 1.0,
            visible: true,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    pub class: &'static str,
    pub key: Option<String>,
    pub shape: Shape,
    pub style: Style,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    exiting: bool,
}

impl Node {
    pub fn parent(&self) -> Option<NodeId> { self.parent }
    pub fn children(&self) -> &[NodeId] { &self.children }
    /// True while the node is fading out before removal.
    pub fn is_exiting(&self) -> bool { self.exiting }
}

/// Animatable attributes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Attr {
    X,
    Y,
    Width,
    Height,
    TranslateX,
    TranslateY,
    Opacity,
    Fill,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AttrValue {
    Num(f64),
    Color(skia::Color),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Timing {
    pub delay_ms: f64,
    pub duration_ms: f64,
}

impl Timing {
    pub const fn new(duration_ms: f64) -> Self {
        Self { delay_ms: 0.0, duration_ms }
    }

    pub const fn with_delay(mut self, delay_ms: f64) -> Self {
        self.delay_ms = delay_ms;
        self
    }
}

#[derive(Clone, Debug)]
struct Transition {
    node: NodeId,
    attr: Attr,
    from: Option<AttrValue>,
    to: AttrValue,
    start_at: f64,
    duration: f64,
    remove_on_end: bool,
}

/// Result of a keyed join. Indices refer to the key slice passed to `Scene::join`.
#[derive(Clone, Debug, Default)]
pub struct Join {
    pub enter: Vec<(usize, NodeId)>,
    pub update: Vec<(usize, NodeId)>,
    pub exit: Vec<NodeId>,
}

impl Join {
    /// Entered and updated nodes in key order.
    pub fn merged(&self) -> Vec<(usize, NodeId)> {
        let mut all: Vec<(usize, NodeId)> = self.enter.iter().chain(self.update.iter()).copied().collect();
        all.sort_by_key(|(i, _)| *i);
        all
    }
}

struct Slot {
    generation: u32,
    node: Option<Node>,
}

pub struct Scene {
    slots: Vec<Slot>,
    free: Vec<usize>,
    surface: NodeId,
    overlay: NodeId,
    transitions: Vec<Transition>,
    clock_ms: f64,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        let mut scene = Self {
            slots: Vec::new(),
            free: Vec::new(),
            surface: NodeId { index: 0, generation: 0 },
            overlay: NodeId { index: 1, generation: 0 },
            transitions: Vec::new(),
            clock_ms: 0.0,
        };
        scene.surface = scene.insert(None, "surface", None, Shape::Group);
        scene.overlay = scene.insert(None, "overlay", None, Shape::Group);
        scene
    }

    pub fn surface(&self) -> NodeId { self.surface }
    pub fn overlay(&self) -> NodeId { self.overlay }
    pub fn now(&self) -> f64 { self.clock_ms }

    fn insert(&mut self, parent: Option<NodeId>, class: &'static str, key: Option<String>, shape: Shape) -> NodeId {
        let node = Node {
            class,
            key,
            shape,
            style: Style::default(),
            parent,
            children: Vec::new(),
            exiting: false,
        };
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.node = Some(node);
                NodeId { index, generation: slot.generation }
            }
            None => {
                self.slots.push(Slot { generation: 0, node: Some(node) });
                NodeId { index: self.slots.len() - 1, generation: 0 }
            }
        };
        if let Some(p) = parent.and_then(|p| self.get_mut(p)) {
            p.children.push(id);
        }
        id
    }

    pub fn append(&mut self, parent: NodeId, class: &'static str, shape: Shape) -> NodeId {
        self.insert(Some(parent), class, None, shape)
    }

    pub fn append_keyed(&mut self, parent: NodeId, class: &'static str, key: impl Into<String>, shape: Shape) -> NodeId {
        self.insert(Some(parent), class, Some(key.into()), shape)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.node.as_ref())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.node.as_mut())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn shape(&self, id: NodeId) -> Option<&Shape> {
        self.get(id).map(|n| &n.shape)
    }

    pub fn style(&self, id: NodeId) -> Option<&Style> {
        self.get(id).map(|n| &n.style)
    }

    pub fn set_shape(&mut self, id: NodeId, shape: Shape) {
        if let Some(n) = self.get_mut(id) {
            n.shape = shape;
        }
    }

    pub fn update_style(&mut self, id: NodeId, f: impl FnOnce(&mut Style)) {
        if let Some(n) = self.get_mut(id) {
            f(&mut n.style);
        }
    }

    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        self.update_style(id, |s| s.visible = visible);
    }

    pub fn set_translate(&mut self, id: NodeId, x: f64, y: f64) {
        self.update_style(id, |s| s.translate = (x, y));
    }

    pub fn set_fill(&mut self, id: NodeId, color: skia::Color) {
        self.update_style(id, |s| s.fill = Some(color));
    }

    /// Replace the text of a Text node, keeping its layout.
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        if let Some(Node { shape: Shape::Text { content, .. }, .. }) = self.get_mut(id) {
            if content.as_str() != text {
                *content = text.to_string();
            }
        }
    }

    /// Remove a node and its subtree, detaching it from its parent. Roots cannot be removed.
    pub fn remove(&mut self, id: NodeId) {
        if id == self.surface || id == self.overlay {
            return;
        }
        let Some(parent) = self.get(id).map(|n| n.parent) else { return };
        if let Some(p) = parent.and_then(|p| self.get_mut(p)) {
            p.children.retain(|c| *c != id);
        }
        let mut doomed = vec![id];
        doomed.extend(self.descendants(id));
        for d in &doomed {
            if let Some(slot) = self.slots.get_mut(d.index) {
                slot.node = None;
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(d.index);
            }
        }
        self.transitions.retain(|t| !doomed.contains(&t.node));
    }

    /// Subtree of `id` in pre-order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.children(n).iter().rev().copied());
        }
        out
    }

    /// Descendants of `root` with the given class.
    pub fn find_all(&self, root: NodeId, class: &str) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|id| self.get(*id).is_some_and(|n| n.class == class))
            .collect()
    }

    /// Direct keyed child of `parent` with the given class and key.
    pub fn find_keyed(&self, parent: NodeId, class: &str, key: &str) -> Option<NodeId> {
        self.children(parent).iter().copied().find(|c| {
            self.get(*c).is_some_and(|n| n.class == class && n.key.as_deref() == Some(key))
        })
    }

    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|s| s.node.is_some()).count()
    }

    /// Allocated slots, live or free.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// True when the node and all its ancestors are visible.
    pub fn is_rendered(&self, id: NodeId) -> bool {
        let mut cur = Some(id);
        while let Some(c) = cur {
            match self.get(c) {
                Some(n) if n.style.visible => cur = n.parent,
                _ => return false,
            }
        }
        true
    }

    /// Match `keys` against the keyed children of `parent` with `class`.
    /// Existing children become updates (a fading child is revived and its transitions dropped),
    /// new keys are appended with `make(index)`, and unmatched children are returned as exits
    /// for the caller to remove or fade. Repeated keys after the first are ignored.
    pub fn join(
        &mut self,
        parent: NodeId,
        class: &'static str,
        keys: &[String],
        mut make: impl FnMut(usize) -> Shape,
    ) -> Join {
        let mut join = Join::default();
        let mut seen: Vec<&str> = Vec::with_capacity(keys.len());
        for (i, key) in keys.iter().enumerate() {
            if seen.contains(&key.as_str()) {
                continue;
            }
            seen.push(key);
            match self.find_keyed(parent, class, key) {
                Some(id) => {
                    if self.get(id).is_some_and(|n| n.exiting) {
                        if let Some(n) = self.get_mut(id) {
                            n.exiting = false;
                        }
                        self.transitions.retain(|t| t.node != id);
                    }
                    join.update.push((i, id));
                }
                None => {
                    let id = self.append_keyed(parent, class, key.clone(), make(i));
                    join.enter.push((i, id));
                }
            }
        }
        join.exit = self
            .children(parent)
            .iter()
            .copied()
            .filter(|c| {
                self.get(*c).is_some_and(|n| {
                    n.class == class && !n.exiting && n.key.as_deref().is_some_and(|k| !seen.contains(&k))
                })
            })
            .collect();
        join
    }

    /// Move the listed children of `parent` to the front in the given order. Other children
    /// keep their relative order after them; ids that are not children are ignored.
    pub fn order(&mut self, parent: NodeId, ids: &[NodeId]) {
        let Some(p) = self.get_mut(parent) else { return };
        let mut ordered: Vec<NodeId> = Vec::with_capacity(p.children.len());
        for id in ids {
            if p.children.contains(id) && !ordered.contains(id) {
                ordered.push(*id);
            }
        }
        let rest = p.children.iter().copied().filter(|c| !ordered.contains(c));
        let children: Vec<NodeId> = ordered.iter().copied().chain(rest).collect();
        p.children = children;
    }

    pub fn attr(&self, id: NodeId, attr: Attr) -> Option<AttrValue> {
        let n = self.get(id)?;
        let num = |v: f64| Some(AttrValue::Num(v));
        match (attr, &n.shape) {
            (Attr::X, Shape::Rect { x, .. } | Shape::Text { x, .. }) => num(*x),
            (Attr::Y, Shape::Rect { y, .. } | Shape::Text { y, .. }) => num(*y),
            (Attr::Width, Shape::Rect { width, .. }) => num(*width),
            (Attr::Height, Shape::Rect { height, .. }) => num(*height),
            (Attr::TranslateX, _) => num(n.style.translate.0),
            (Attr::TranslateY, _) => num(n.style.translate.1),
            (Attr::Opacity, _) => num(n.style.opacity),
            (Attr::Fill, _) => n.style.fill.map(AttrValue::Color),
            _ => None,
        }
    }

    pub fn set_attr(&mut self, id: NodeId, attr: Attr, value: AttrValue) {
        let Some(n) = self.get_mut(id) else { return };
        match (attr, value) {
            (Attr::Fill, AttrValue::Color(c)) => n.style.fill = Some(c),
            (Attr::TranslateX, AttrValue::Num(v)) => n.style.translate.0 = v,
            (Attr::TranslateY, AttrValue::Num(v)) => n.style.translate.1 = v,
            (Attr::Opacity, AttrValue::Num(v)) => n.style.opacity = v.clamp(0.0, 1.0),
            (attr, AttrValue::Num(v)) => match (&mut n.shape, attr) {
                (Shape::Rect { x, .. } | Shape::Text { x, .. }, Attr::X) => *x = v,
                (Shape::Rect { y, .. } | Shape::Text { y, .. }, Attr::Y) => *y = v,
                (Shape::Rect { width, .. }, Attr::Width) => *width = v,
                (Shape::Rect { height, .. }, Attr::Height) => *height = v,
                _ => {}
            },
            _ => {}
        }
    }

    /// Schedule `attr` to move to `to`. The start value is captured when the delay elapses.
    pub fn transition(&mut self, id: NodeId, attr: Attr, to: AttrValue, timing: Timing) {
        self.schedule(id, attr, to, timing, false);
    }

    /// Fade to transparent, then remove the node. A later join on its key revives it instead.
    pub fn fade_out_and_remove(&mut self, id: NodeId, timing: Timing) {
        if let Some(n) = self.get_mut(id) {
            n.exiting = true;
        } else {
            return;
        }
        self.schedule(id, Attr::Opacity, AttrValue::Num(0.0), timing, true);
    }

    fn schedule(&mut self, id: NodeId, attr: Attr, to: AttrValue, timing: Timing, remove_on_end: bool) {
        if !self.contains(id) {
            return;
        }
        self.transitions.retain(|t| !(t.node == id && t.attr == attr));
        self.transitions.push(Transition {
            node: id,
            attr,
            from: None,
            to,
            start_at: self.clock_ms + finite_ms(timing.delay_ms),
            duration: finite_ms(timing.duration_ms),
            remove_on_end,
        });
    }

    pub fn pending_transitions(&self) -> usize {
        self.transitions.len()
    }

    /// Advance the clock and apply every transition that has started.
    pub fn advance(&mut self, dt_ms: f64) {
        self.step_to(self.clock_ms + dt_ms.max(0.0));
    }

    fn step_to(&mut self, now: f64) {
        self.clock_ms = now;
        let mut finished_removals = Vec::new();
        let mut transitions = std::mem::take(&mut self.transitions);
        transitions.retain_mut(|t| {
            if now < t.start_at {
                return true;
            }
            let from = *t.from.get_or_insert_with(|| self.attr(t.node, t.attr).unwrap_or(t.to));
            // Compare against the end time directly; the ratio can round to just under 1.
            let progress = if t.duration <= 0.0 || now >= t.start_at + t.duration {
                1.0
            } else {
                ((now - t.start_at) / t.duration).clamp(0.0, 1.0)
            };
            self.set_attr(t.node, t.attr, interpolate(from, t.to, ease_cubic_in_out(progress)));
            if progress >= 1.0 {
                if t.remove_on_end {
                    finished_removals.push(t.node);
                }
                return false;
            }
            true
        });
        self.transitions = transitions;
        for id in finished_removals {
            if self.get(id).is_some_and(|n| n.exiting) {
                self.remove(id);
            }
        }
    }

    /// Run every pending transition to completion.
    pub fn settle(&mut self) {
        // Lands exactly on the latest end time, so every pending transition finishes in one pass.
        while let Some(end) = self
            .transitions
            .iter()
            .map(|t| t.start_at + t.duration)
            .reduce(f64::max)
        {
            self.step_to(end.max(self.clock_ms));
        }
    }
}

/// Non-negative milliseconds; NaN and infinities become 0.
fn finite_ms(ms: f64) -> f64 {
    if ms.is_finite() { ms.max(0.0) } else { 0.0 }
}

fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t * 2.0;
    if t <= 1.0 {
        t * t * t / 2.0
    } else {
        let t = t - 2.0;
        (t * t * t + 2.0) / 2.0
    }
}

fn interpolate(from: AttrValue, to: AttrValue, t: f64) -> AttrValue {
    if t >= 1.0 {
        return to;
    }
    match (from, to) {
        (AttrValue::Num(a), AttrValue::Num(b)) => AttrValue::Num(a + (b - a) * t),
        (AttrValue::Color(a), AttrValue::Color(b)) => {
            let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * t).round().clamp(0.0, 255.0) as u8;
            AttrValue::Color(skia::Color::from_argb(mix(a.a(), b.a()), mix(a.r(), b.r()), mix(a.g(), b.g()), mix(a.b(), b.b())))
        }
        (from, _) => from,
    }
}
