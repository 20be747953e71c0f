// Per-combo derived geometry: centroid anchor, label box dimensions from
// text metrics, and the adjacency classification. Computed once per layout
// pass and immutable afterwards.

use crate::config::LayoutConfig;
use crate::geometry::{Point, Rect};
use crate::ir::{ComboSpec, FontRole, TextMeasure};

use super::adjacency::keys_connected;

#[derive(Debug, Clone)]
pub(crate) struct ComboInfo {
    pub(crate) index: usize,
    pub(crate) key_indices: Vec<usize>,
    pub(crate) label_width: f64,
    pub(crate) label_height: f64,
    /// Average nominal size of this combo's own keys; scales the per-combo
    /// cost terms in assignment.
    pub(crate) avg_key_size: f64,
    pub(crate) anchor: Point,
    pub(crate) adjacent: bool,
}

impl ComboInfo {
    pub(crate) fn label_area(&self) -> f64 {
        self.label_width * self.label_height
    }
}

/// Build `ComboInfo` for every resolvable combo, in combo order. Combos with
/// fewer than two distinct in-range trigger keys are dropped here.
pub(crate) fn build_combo_infos<M: TextMeasure>(
    key_rects: &[Rect],
    key_sizes: &[f64],
    combos: &[ComboSpec],
    measurer: &M,
    config: &LayoutConfig,
) -> Vec<ComboInfo> {
    combos
        .iter()
        .enumerate()
        .filter_map(|(index, spec)| build_one(index, spec, key_rects, key_sizes, measurer, config))
        .collect()
}

fn build_one<M: TextMeasure>(
    index: usize,
    spec: &ComboSpec,
    key_rects: &[Rect],
    key_sizes: &[f64],
    measurer: &M,
    config: &LayoutConfig,
) -> Option<ComboInfo> {
    let key_indices = spec.resolved_keys(key_rects.len());
    if key_indices.len() < 2 {
        return None;
    }

    let rects: Vec<Rect> = key_indices.iter().map(|&i| key_rects[i]).collect();
    let centers: Vec<Point> = rects.iter().map(Rect::center).collect();
    let avg_key_size =
        key_indices.iter().map(|&i| key_sizes[i]).sum::<f64>() / key_indices.len() as f64;
    let anchor = centroid(&centers);

    let (label_width, label_height) = label_box_size(spec, avg_key_size, measurer, config);
    let threshold = avg_key_size * config.assign.adjacency_threshold_ratio;
    let adjacent = keys_connected(&centers, threshold);

    Some(ComboInfo {
        index,
        key_indices,
        label_width,
        label_height,
        avg_key_size,
        anchor,
        adjacent,
    })
}

fn centroid(points: &[Point]) -> Point {
    let mut total = Point::default();
    for &p in points {
        total = total + p;
    }
    total / points.len() as f64
}

/// Label box sizing: width is a fixed ratio of the combo's average key size;
/// height starts at a fixed ratio and grows to fit the text block (name line
/// plus output lines plus gap and padding).
fn label_box_size<M: TextMeasure>(
    spec: &ComboSpec,
    avg_key_size: f64,
    measurer: &M,
    config: &LayoutConfig,
) -> (f64, f64) {
    let label = &config.label;
    let width = (avg_key_size * label.width_ratio).max(avg_key_size * label.min_width_ratio);
    let base_height =
        (avg_key_size * label.height_ratio).max(avg_key_size * label.min_height_ratio);

    let name_height = if spec.combo_label.is_empty() {
        0.0
    } else {
        measurer.line_height(FontRole::ComboName)
    };
    let output_lines = spec
        .output_label
        .as_deref()
        .map(|text| text.lines().count())
        .unwrap_or(0);
    let output_height = output_lines as f64 * measurer.line_height(FontRole::OutputLabel);
    let text_gap = if spec.output_label.is_some() {
        (measurer.line_height(FontRole::ComboName) * label.text_gap_ratio).max(label.min_text_gap)
    } else {
        0.0
    };
    let pad = (avg_key_size * label.pad_ratio).max(label.min_pad);
    let needed = name_height + output_height + text_gap + pad * 2.0;

    (width, base_height.max(needed))
}
