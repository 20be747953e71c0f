// Input model for the layout engine: combo specifications plus the two
// capability traits the engine consumes instead of concrete host types.

use crate::geometry::Rect;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// One combo as supplied by the host: the trigger keys (as indices into the
/// key slice handed to `compute_layout`), the text the combo produces, and a
/// short display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboSpec {
    pub trigger_keys: Vec<usize>,
    #[serde(default)]
    pub output_label: Option<String>,
    pub combo_label: String,
}

impl ComboSpec {
    /// Distinct in-range trigger indices, order preserved. Combos that
    /// resolve to fewer than two keys are skipped by the engine.
    pub(crate) fn resolved_keys(&self, key_count: usize) -> Vec<usize> {
        let mut seen = vec![false; key_count];
        let mut out = Vec::with_capacity(self.trigger_keys.len());
        for &idx in &self.trigger_keys {
            if idx < key_count && !seen[idx] {
                seen[idx] = true;
                out.push(idx);
            }
        }
        out
    }
}

/// Narrow view of a key widget: everything the engine needs to know about a
/// key. Hosts implement this for their widget type; plain rectangles work
/// out of the box.
pub trait HasFootprint {
    fn bounding_rect(&self) -> Rect;

    /// Nominal key size used for spacing heuristics; the larger side of the
    /// footprint by default.
    fn nominal_size(&self) -> f64 {
        let rect = self.bounding_rect();
        rect.width.max(rect.height)
    }
}

impl HasFootprint for Rect {
    fn bounding_rect(&self) -> Rect {
        *self
    }
}

/// The font a piece of combo text is measured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FontRole {
    /// The combo's short display name.
    ComboName,
    /// The combo's output text (may span several lines).
    OutputLabel,
}

/// Text measurement seam over whatever text system the host uses. Must be
/// deterministic for a given font and scale; the `signature` feeds the
/// layout cache key.
pub trait TextMeasure {
    /// Width and height of a single line of text.
    fn measure(&self, text: &str, role: FontRole) -> (f64, f64);

    fn line_height(&self, role: FontRole) -> f64;

    /// Stable fingerprint of the underlying font metrics.
    fn signature(&self) -> u64;
}

/// Deterministic character-cell metrics, for tests and headless use.
#[derive(Debug, Clone, Copy)]
pub struct FixedMetrics {
    pub char_width: f64,
    pub line_height: f64,
}

impl Default for FixedMetrics {
    fn default() -> Self {
        Self {
            char_width: 6.0,
            line_height: 11.0,
        }
    }
}

impl TextMeasure for FixedMetrics {
    fn measure(&self, text: &str, _role: FontRole) -> (f64, f64) {
        (text.chars().count() as f64 * self.char_width, self.line_height)
    }

    fn line_height(&self, _role: FontRole) -> f64 {
        self.line_height
    }

    fn signature(&self) -> u64 {
        let mut hasher = std::hash::DefaultHasher::new();
        self.char_width.to_bits().hash(&mut hasher);
        self.line_height.to_bits().hash(&mut hasher);
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolved_keys_dedupes_and_bounds_checks() {
        let spec = ComboSpec {
            trigger_keys: vec![2, 2, 9, 0, 2],
            output_label: None,
            combo_label: "C1".to_string(),
        };
        assert_eq!(spec.resolved_keys(5), vec![2, 0]);
        assert_eq!(spec.resolved_keys(1), vec![0]);
    }

    #[test]
    fn fixed_metrics_measures_by_char_count() {
        let metrics = FixedMetrics::default();
        let (w, h) = metrics.measure("abcd", FontRole::OutputLabel);
        assert_eq!(w, 24.0);
        assert_eq!(h, 11.0);
    }

    #[test]
    fn rect_footprint_uses_larger_side() {
        let rect = Rect::new(0.0, 0.0, 40.0, 30.0);
        assert_eq!(rect.nominal_size(), 40.0);
        assert_eq!(rect.bounding_rect(), rect);
    }
}
