// File: crates/stream-core/src/legend.rs
// Summary: Color key: one swatch + label row per series, listed in reverse stack order.

use crate::config::LegendConfig;
use crate::scene::{NodeId, Scene, Shape};
use crate::theme::{ColorMap, Theme};

#[derive(Clone, Copy, Debug)]
pub struct Legend {
    group: NodeId,
}

impl Legend {
    pub fn create(scene: &mut Scene, parent: NodeId) -> Self {
        Self { group: scene.append(parent, "legend", Shape::Group) }
    }

    pub fn group(&self) -> NodeId { self.group }

    /// Row groups in display order (top to bottom).
    pub fn rows(&self, scene: &Scene) -> Vec<NodeId> {
        scene.children(self.group).to_vec()
    }

    /// Idempotent: rows are joined by series key and rewritten in place.
    pub fn update(&self, scene: &mut Scene, keys: &[String], colors: &ColorMap, cfg: &LegendConfig, layout_width: f64, theme: &Theme) {
        scene.set_translate(self.group, layout_width - cfg.right, cfg.top);

        let reversed: Vec<String> = keys.iter().rev().cloned().collect();
        let join = scene.join(self.group, "legend-row", &reversed, |_| Shape::Group);
        for &(_, row) in &join.enter {
            let swatch = scene.append(row, "legend-swatch", Shape::rect(0.0, 0.0, cfg.swatch_size, cfg.swatch_size));
            scene.update_style(swatch, |s| s.opacity = cfg.swatch_opacity);
            scene.append(row, "legend-label", Shape::text("", cfg.label_offset[0], cfg.label_offset[1], cfg.font_size));
        }
        for (i, row) in join.merged() {
            let key = &reversed[i];
            scene.set_translate(row, 0.0, i as f64 * cfg.row_height);
            let children = scene.children(row).to_vec();
            if let [swatch, label, ..] = children[..] {
                scene.set_fill(swatch, colors.get(key));
                scene.set_text(label, key);
                scene.set_fill(label, theme.legend_label);
            }
        }
        for id in join.exit {
            scene.remove(id);
        }
    }
}
