// Candidate slot generation. Slots have no identity beyond one layout pass;
// the generator is stateless and the slot set is rebuilt whenever the key
// layout changes.

use crate::config::SlotConfig;
use crate::geometry::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Where a candidate slot sits relative to the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegionType {
    /// Gap between two adjacent keys.
    InterKey,
    /// Inside the keyboard footprint but clear of keys.
    Interior,
    /// Around the keyboard perimeter.
    Exterior,
    /// Between the halves of a split keyboard.
    SplitMiddle,
}

/// A candidate position for a combo label box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub position: Point,
    pub region: RegionType,
    /// Distance to the nearest key edge; used as a tie-break bonus.
    pub clearance: f64,
}

impl Slot {
    pub(crate) fn new(position: Point, region: RegionType, clearance: f64) -> Self {
        Self {
            position,
            region,
            clearance,
        }
    }
}

/// Enumerate every candidate slot for one layout pass.
pub(crate) fn generate_slots(
    key_rects: &[Rect],
    keyboard_bounds: Rect,
    canvas_bounds: Rect,
    split_gap: Option<Rect>,
    avg_key_size: f64,
    padding: f64,
    config: &SlotConfig,
) -> Vec<Slot> {
    if key_rects.is_empty() {
        return Vec::new();
    }
    let grid_spacing = avg_key_size * config.grid_spacing_ratio;

    let mut slots = Vec::new();
    inter_key_slots(key_rects, avg_key_size, config, &mut slots);
    interior_slots(key_rects, keyboard_bounds, grid_spacing, config, &mut slots);
    exterior_slots(
        keyboard_bounds,
        canvas_bounds,
        padding,
        grid_spacing,
        config,
        &mut slots,
    );
    if let Some(gap) = split_gap {
        split_middle_slots(key_rects, gap, grid_spacing, &mut slots);
    }
    slots
}

/// Midpoints of the facing edges of every key pair within the adjacency
/// threshold, discarding points that land inside another key.
fn inter_key_slots(key_rects: &[Rect], avg_key_size: f64, config: &SlotConfig, out: &mut Vec<Slot>) {
    let threshold = avg_key_size * config.inter_key_threshold_ratio;
    for (i, a) in key_rects.iter().enumerate() {
        for b in &key_rects[i + 1..] {
            let Some(gap_point) = facing_edge_midpoint(a, b, threshold) else {
                continue;
            };
            if point_inside_any_key(gap_point, key_rects) {
                continue;
            }
            let clearance = min_distance_to_keys(gap_point, key_rects);
            out.push(Slot::new(gap_point, RegionType::InterKey, clearance));
        }
    }
}

fn facing_edge_midpoint(a: &Rect, b: &Rect, threshold: f64) -> Option<Point> {
    let ca = a.center();
    let cb = b.center();
    if ca.distance_to(cb) > threshold {
        return None;
    }
    let dx = (ca.x - cb.x).abs();
    let dy = (ca.y - cb.y).abs();
    if dx > dy {
        // Horizontally separated pair: midpoint of the facing vertical edges.
        let (edge_a, edge_b) = if ca.x < cb.x {
            (a.right(), b.left)
        } else {
            (a.left, b.right())
        };
        Some(Point::new((edge_a + edge_b) / 2.0, (ca.y + cb.y) / 2.0))
    } else {
        let (edge_a, edge_b) = if ca.y < cb.y {
            (a.bottom(), b.top)
        } else {
            (a.top, b.bottom())
        };
        Some(Point::new((ca.x + cb.x) / 2.0, (edge_a + edge_b) / 2.0))
    }
}

/// Regular grid inside the keyboard bounding box, keeping points with enough
/// clearance from every key edge.
fn interior_slots(
    key_rects: &[Rect],
    keyboard_bounds: Rect,
    grid_spacing: f64,
    config: &SlotConfig,
    out: &mut Vec<Slot>,
) {
    let margin = config.slot_size;
    let min_clearance = config.slot_size * config.interior_clearance_ratio;
    let mut x = keyboard_bounds.left + margin;
    while x < keyboard_bounds.right() - margin {
        let mut y = keyboard_bounds.top + margin;
        while y < keyboard_bounds.bottom() - margin {
            let point = Point::new(x, y);
            if !point_inside_any_key(point, key_rects) {
                let clearance = min_distance_to_keys(point, key_rects);
                if clearance > min_clearance {
                    out.push(Slot::new(point, RegionType::Interior, clearance));
                }
            }
            y += grid_spacing;
        }
        x += grid_spacing;
    }
}

/// Regular grid over the canvas outside the keyboard bounding box, kept a
/// slot's worth of margin off the keyboard edge.
fn exterior_slots(
    keyboard_bounds: Rect,
    canvas_bounds: Rect,
    padding: f64,
    grid_spacing: f64,
    config: &SlotConfig,
    out: &mut Vec<Slot>,
) {
    let exclusion = keyboard_bounds.expanded(config.slot_size);
    let mut x = canvas_bounds.left + padding;
    while x < canvas_bounds.right() - padding {
        let mut y = canvas_bounds.top + padding;
        while y < canvas_bounds.bottom() - padding {
            let point = Point::new(x, y);
            if !exclusion.contains(point) {
                let clearance = keyboard_bounds.distance_to_point(point);
                out.push(Slot::new(point, RegionType::Exterior, clearance));
            }
            y += grid_spacing;
        }
        x += grid_spacing;
    }
}

/// A column of slots down the detected split gap.
fn split_middle_slots(key_rects: &[Rect], gap: Rect, grid_spacing: f64, out: &mut Vec<Slot>) {
    let x = gap.center().x;
    let mut y = gap.top + grid_spacing / 2.0;
    while y < gap.bottom() {
        let point = Point::new(x, y);
        let clearance = min_distance_to_keys(point, key_rects);
        out.push(Slot::new(point, RegionType::SplitMiddle, clearance));
        y += grid_spacing;
    }
}

fn point_inside_any_key(point: Point, key_rects: &[Rect]) -> bool {
    key_rects.iter().any(|rect| rect.contains(point))
}

fn min_distance_to_keys(point: Point, key_rects: &[Rect]) -> f64 {
    key_rects
        .iter()
        .map(|rect| rect.distance_to_point(point))
        .fold(f64::INFINITY, f64::min)
}
