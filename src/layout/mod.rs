//! Combo overlay layout pipeline: candidate slot generation, greedy slot
//! assignment, and grid-based route planning from each label to its
//! non-adjacent trigger keys.

pub(crate) mod adjacency;
mod assign;
mod combo_info;
pub(crate) mod routing;
mod simplify;
pub mod slots;

use crate::config::LayoutConfig;
use crate::geometry::{Point, Rect};
use crate::ir::{ComboSpec, HasFootprint, TextMeasure};

use assign::{assign_slots, AssignContext};
use combo_info::build_combo_infos;
use routing::{GridAstarRouter, Router, RoutingGrid};
use slots::{generate_slots, Slot};

/// One combo's chosen label rectangle and the slot it was placed in.
#[derive(Debug, Clone)]
pub struct ComboPlacement {
    pub combo_index: usize,
    pub label_rect: Rect,
    pub slot: Slot,
}

/// One routed connector from a combo label to a trigger key. `raster_path`
/// is the full cell sequence; `simplified_path` is the corner-only polyline
/// in canvas coordinates with snapped endpoints. An infinite cost marks the
/// straight-line fallback for unroutable pairs.
#[derive(Debug, Clone)]
pub struct Route {
    pub combo_index: usize,
    pub trigger_key_index: usize,
    pub raster_path: Vec<(i32, i32)>,
    pub simplified_path: Vec<Point>,
    pub cost: f64,
}

/// Full layout result. Placements are sorted by combo index, routes by
/// `(combo_index, trigger_key_index)`.
#[derive(Debug, Clone, Default)]
pub struct ComboLayout {
    pub placements: Vec<ComboPlacement>,
    pub routes: Vec<Route>,
}

/// Lay out every combo label and route the connectors for non-adjacent
/// combos. Deterministic: the same inputs always yield the same layout.
pub fn compute_layout<K: HasFootprint, M: TextMeasure>(
    keys: &[K],
    combos: &[ComboSpec],
    canvas_bounds: Rect,
    measurer: &M,
    config: &LayoutConfig,
) -> ComboLayout {
    if keys.is_empty() || combos.is_empty() {
        return ComboLayout::default();
    }

    let key_rects: Vec<Rect> = keys.iter().map(HasFootprint::bounding_rect).collect();
    let key_sizes: Vec<f64> = keys.iter().map(HasFootprint::nominal_size).collect();
    let avg_key_size = key_sizes.iter().sum::<f64>() / key_sizes.len() as f64;

    let mut keyboard_bounds = key_rects[0];
    for rect in &key_rects[1..] {
        keyboard_bounds = keyboard_bounds.united(rect);
    }

    let split_gap = adjacency::detect_split_gap(&key_rects, config.slot.split_gap_ratio);
    let slots = generate_slots(
        &key_rects,
        keyboard_bounds,
        canvas_bounds,
        split_gap,
        avg_key_size,
        config.padding.0,
        &config.slot,
    );

    let infos = build_combo_infos(&key_rects, &key_sizes, combos, measurer, config);
    if infos.is_empty() {
        return ComboLayout::default();
    }

    let ctx = AssignContext {
        slots: &slots,
        key_rects: &key_rects,
        canvas_bounds,
        avg_key_size,
        padding: config.padding.0,
        config: &config.assign,
    };
    let placements = assign_slots(&ctx, &infos);

    let routes = route_connectors(
        &key_rects,
        keyboard_bounds,
        canvas_bounds,
        avg_key_size,
        &infos,
        &placements,
        config,
    );

    ComboLayout { placements, routes }
}

/// Route a connector from every non-adjacent combo's label to each of its
/// trigger keys. Longer connectors are committed first so short ones detour
/// around them, then the results are re-sorted into a stable order.
fn route_connectors(
    key_rects: &[Rect],
    keyboard_bounds: Rect,
    canvas_bounds: Rect,
    avg_key_size: f64,
    infos: &[combo_info::ComboInfo],
    placements: &[ComboPlacement],
    config: &LayoutConfig,
) -> Vec<Route> {
    struct Request {
        combo_index: usize,
        trigger_key_index: usize,
        label_center: Point,
        key_rect: Rect,
        estimate: f64,
    }

    let mut requests = Vec::new();
    let mut grid_extent = keyboard_bounds;
    for (info, placement) in infos.iter().zip(placements) {
        debug_assert_eq!(info.index, placement.combo_index);
        if info.adjacent {
            continue;
        }
        grid_extent = grid_extent.united(&placement.label_rect);
        let label_center = placement.label_rect.center();
        for &key in &info.key_indices {
            requests.push(Request {
                combo_index: info.index,
                trigger_key_index: key,
                label_center,
                key_rect: key_rects[key],
                estimate: label_center.distance_to(key_rects[key].center()),
            });
        }
    }
    if requests.is_empty() {
        return Vec::new();
    }

    requests.sort_by(|a, b| {
        b.estimate
            .total_cmp(&a.estimate)
            .then_with(|| a.combo_index.cmp(&b.combo_index))
            .then_with(|| a.trigger_key_index.cmp(&b.trigger_key_index))
    });

    let routing = &config.routing;
    let margin = (avg_key_size * routing.margin_ratio).max(routing.min_margin);
    let boundary = grid_extent
        .expanded(margin)
        .intersection(&canvas_bounds)
        .unwrap_or(canvas_bounds);
    let cell_size = (avg_key_size * routing.cell_ratio).max(routing.min_cell);
    let mut grid = RoutingGrid::new(boundary, cell_size, routing);
    grid.mark_obstacles(key_rects, cell_size);

    let router = GridAstarRouter::new(routing);
    let mut routes = Vec::with_capacity(requests.len());
    for request in &requests {
        let start = grid.world_to_grid(request.label_center);
        let goal = grid.world_to_grid(request.key_rect.center());
        let raster = router.find_path(&grid, start, goal);
        grid.mark_used(&raster.cells);

        let simplified = simplify::simplify_cells(&raster.cells);
        let mut points = simplify::cells_to_world(&grid, &simplified);
        if let Some(first) = points.first_mut() {
            *first = request.label_center;
        }
        if let Some(last) = points.last_mut() {
            *last = request.key_rect.nearest_boundary_point(*last);
        }
        routes.push(Route {
            combo_index: request.combo_index,
            trigger_key_index: request.trigger_key_index,
            raster_path: raster.cells,
            simplified_path: points,
            cost: raster.cost,
        });
    }

    routes.sort_by_key(|r| (r.combo_index, r.trigger_key_index));
    routes
}

/// Single-entry memoization of the last computed layout, keyed by a hash of
/// the inputs. Interactive callers recompute only when keys, combos, canvas,
/// or the text measurer actually change.
#[derive(Debug, Default)]
pub struct LayoutCache {
    entry: Option<(u64, ComboLayout)>,
}

impl LayoutCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compute<K: HasFootprint, M: TextMeasure>(
        &mut self,
        keys: &[K],
        combos: &[ComboSpec],
        canvas_bounds: Rect,
        measurer: &M,
        config: &LayoutConfig,
    ) -> &ComboLayout {
        let key = input_hash(keys, combos, canvas_bounds, measurer);
        let stale = self.entry.as_ref().map(|(k, _)| *k != key).unwrap_or(true);
        if stale {
            let layout = compute_layout(keys, combos, canvas_bounds, measurer, config);
            self.entry = Some((key, layout));
        }
        &self.entry.as_ref().unwrap().1
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}

fn input_hash<K: HasFootprint, M: TextMeasure>(
    keys: &[K],
    combos: &[ComboSpec],
    canvas_bounds: Rect,
    measurer: &M,
) -> u64 {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    for key in keys {
        let rect = key.bounding_rect();
        for v in [rect.left, rect.top, rect.width, rect.height, key.nominal_size()] {
            v.to_bits().hash(&mut hasher);
        }
    }
    for combo in combos {
        combo.trigger_keys.hash(&mut hasher);
        combo.combo_label.hash(&mut hasher);
        combo.output_label.hash(&mut hasher);
    }
    for v in [
        canvas_bounds.left,
        canvas_bounds.top,
        canvas_bounds.width,
        canvas_bounds.height,
    ] {
        v.to_bits().hash(&mut hasher);
    }
    measurer.signature().hash(&mut hasher);
    hasher.finish()
}
