// Greedy, order-sensitive assignment of combos to slots. Larger and more
// constrained combos claim slots first; every placed label becomes part of
// the history that later combos are scored against, so assignment order is
// part of the observable behavior.

use crate::config::AssignConfig;
use crate::geometry::{Point, Rect};

use super::combo_info::ComboInfo;
use super::slots::{RegionType, Slot};
use super::ComboPlacement;

pub(crate) struct AssignContext<'a> {
    pub(crate) slots: &'a [Slot],
    pub(crate) key_rects: &'a [Rect],
    pub(crate) canvas_bounds: Rect,
    pub(crate) avg_key_size: f64,
    pub(crate) padding: f64,
    pub(crate) config: &'a AssignConfig,
}

struct Candidate {
    cost: f64,
    slot: Slot,
    /// Index into the shared slot arena; fallback and spiral slots are
    /// ephemeral and carry no index.
    slot_index: Option<usize>,
    rect: Rect,
}

/// Assign every combo a label rectangle. The returned placements are sorted
/// by combo index; internally combos are processed largest-label first so
/// constrained combos get first pick. The placed-rectangle history is
/// threaded through as an explicit accumulator.
pub(crate) fn assign_slots(ctx: &AssignContext<'_>, infos: &[ComboInfo]) -> Vec<ComboPlacement> {
    let mut order: Vec<usize> = (0..infos.len()).collect();
    order.sort_by(|&a, &b| {
        let ia = &infos[a];
        let ib = &infos[b];
        ib.label_area()
            .total_cmp(&ia.label_area())
            .then_with(|| ib.key_indices.len().cmp(&ia.key_indices.len()))
            .then_with(|| ia.index.cmp(&ib.index))
    });

    let mut used_slots = vec![false; ctx.slots.len()];
    let mut placed: Vec<Rect> = Vec::with_capacity(infos.len());
    let mut placements = Vec::with_capacity(infos.len());

    for &idx in &order {
        let info = &infos[idx];
        let choice = choose_slot(ctx, info, &used_slots, &placed);
        if let Some(slot_index) = choice.slot_index {
            used_slots[slot_index] = true;
        }
        placed.push(choice.rect);
        placements.push(ComboPlacement {
            combo_index: info.index,
            label_rect: choice.rect,
            slot: choice.slot,
        });
    }

    placements.sort_by_key(|p| p.combo_index);
    placements
}

/// The fallback ladder: narrowed candidates, then perimeter slots, then a
/// spiral around the anchor, then the least-bad narrowed candidate with the
/// overlap constraint lifted. Never fails to produce a placement.
fn choose_slot(
    ctx: &AssignContext<'_>,
    info: &ComboInfo,
    used_slots: &[bool],
    placed: &[Rect],
) -> Candidate {
    let candidates = candidate_indices(ctx, info);

    if let Some(best) = best_from_indices(ctx, info, &candidates, used_slots, placed, true) {
        return best;
    }
    if let Some(best) = best_from_ephemeral(ctx, info, &perimeter_slots(ctx), placed) {
        return best;
    }
    if let Some(first) = first_from_spiral(ctx, info, placed) {
        return first;
    }
    if let Some(least_bad) = best_from_indices(ctx, info, &candidates, used_slots, placed, false) {
        return least_bad;
    }
    // No slots at all: clamp an anchor-centered rect.
    let rect = rect_for_position(ctx, info, info.anchor);
    Candidate {
        cost: f64::INFINITY,
        slot: Slot::new(info.anchor, RegionType::Interior, 0.0),
        slot_index: None,
        rect,
    }
}

/// Slot indices sorted by distance to the combo anchor, inter-key slots
/// first for adjacent combos: top 20 preferred plus the next-best 30 others,
/// or the full sorted list when that narrows below 10.
fn candidate_indices(ctx: &AssignContext<'_>, info: &ComboInfo) -> Vec<usize> {
    let mut preferred: Vec<(f64, usize)> = Vec::new();
    let mut other: Vec<(f64, usize)> = Vec::new();
    for (idx, slot) in ctx.slots.iter().enumerate() {
        let dist = slot.position.distance_to(info.anchor);
        if info.adjacent && slot.region == RegionType::InterKey {
            preferred.push((dist, idx));
        } else {
            other.push((dist, idx));
        }
    }
    let by_distance = |a: &(f64, usize), b: &(f64, usize)| {
        a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1))
    };
    preferred.sort_by(by_distance);
    other.sort_by(by_distance);

    let mut out: Vec<usize> = preferred
        .iter()
        .take(ctx.config.preferred_candidates)
        .map(|&(_, idx)| idx)
        .collect();
    out.extend(
        other
            .iter()
            .take(ctx.config.fallback_candidates)
            .map(|&(_, idx)| idx),
    );
    if out.len() < ctx.config.min_candidates {
        out = preferred
            .iter()
            .chain(other.iter())
            .map(|&(_, idx)| idx)
            .collect();
    }
    out
}

fn best_from_indices(
    ctx: &AssignContext<'_>,
    info: &ComboInfo,
    candidates: &[usize],
    used_slots: &[bool],
    placed: &[Rect],
    reject_overlap: bool,
) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;
    for &idx in candidates {
        if used_slots[idx] {
            continue;
        }
        let Some(candidate) =
            evaluate_slot(ctx, info, ctx.slots[idx], Some(idx), placed, reject_overlap)
        else {
            continue;
        };
        best = Some(match best {
            Some(current) if current.cost <= candidate.cost => current,
            _ => candidate,
        });
    }
    best
}

fn best_from_ephemeral(
    ctx: &AssignContext<'_>,
    info: &ComboInfo,
    slots: &[Slot],
    placed: &[Rect],
) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;
    for &slot in slots {
        let Some(candidate) = evaluate_slot(ctx, info, slot, None, placed, true) else {
            continue;
        };
        best = Some(match best {
            Some(current) if current.cost <= candidate.cost => current,
            _ => candidate,
        });
    }
    best
}

fn evaluate_slot(
    ctx: &AssignContext<'_>,
    info: &ComboInfo,
    slot: Slot,
    slot_index: Option<usize>,
    placed: &[Rect],
    reject_overlap: bool,
) -> Option<Candidate> {
    let rect = rect_for_position(ctx, info, slot.position);
    if reject_overlap && placed.iter().any(|p| rect.intersects(p)) {
        return None;
    }
    let cost = slot_cost(ctx, info, &slot, &rect, placed);
    Some(Candidate {
        cost,
        slot,
        slot_index,
        rect,
    })
}

/// Label rect centered on a position, clamped inside the canvas padding.
fn rect_for_position(ctx: &AssignContext<'_>, info: &ComboInfo, position: Point) -> Rect {
    let rect = Rect::from_center(position, info.label_width, info.label_height);
    clamp_rect(&rect, ctx.padding, ctx.canvas_bounds)
}

fn clamp_rect(rect: &Rect, padding: f64, canvas: Rect) -> Rect {
    let max_left = canvas.right() - rect.width - padding;
    let max_top = canvas.bottom() - rect.height - padding;
    Rect::new(
        rect.left.clamp(canvas.left + padding, (canvas.left + padding).max(max_left)),
        rect.top.clamp(canvas.top + padding, (canvas.top + padding).max(max_top)),
        rect.width,
        rect.height,
    )
}

fn slot_cost(
    ctx: &AssignContext<'_>,
    info: &ComboInfo,
    slot: &Slot,
    rect: &Rect,
    placed: &[Rect],
) -> f64 {
    let avg = ctx.avg_key_size;
    let config = ctx.config;
    let distance = slot.position.distance_to(info.anchor);
    let overlap = key_overlap_fraction(rect, ctx.key_rects) * avg * config.key_overlap_weight;
    let spacing = spacing_penalty(rect, placed, avg) * avg * config.spacing_weight;
    let clearance_bonus = slot.clearance * config.clearance_weight;
    let region_bonus = region_bonus(slot, info, config);
    let multi_key = multi_key_penalty(slot, info, config);
    distance + overlap + spacing + multi_key - clearance_bonus - region_bonus
}

/// Fraction of the label rect covered by key rectangles.
fn key_overlap_fraction(rect: &Rect, key_rects: &[Rect]) -> f64 {
    let rect_area = rect.area();
    if rect_area <= 0.0 {
        return 0.0;
    }
    let covered: f64 = key_rects
        .iter()
        .filter_map(|key| rect.intersection(key))
        .map(|i| i.area())
        .sum();
    if covered > 0.0 { covered / rect_area } else { 0.0 }
}

/// Crowding pressure from already-placed labels closer than one key size.
fn spacing_penalty(rect: &Rect, placed: &[Rect], avg_key_size: f64) -> f64 {
    let center = rect.center();
    placed
        .iter()
        .map(|other| {
            let dist = center.distance_to(other.center());
            if dist < avg_key_size {
                (avg_key_size - dist) / avg_key_size
            } else {
                0.0
            }
        })
        .sum()
}

/// Adjacent combos are pulled toward inter-key gaps and pushed off the
/// exterior; scattered combos are region-neutral here (the multi-key
/// penalty handles their need for connector room). Scaled by the combo's
/// own average key size so oddly sized keys get proportional shaping.
fn region_bonus(slot: &Slot, info: &ComboInfo, config: &AssignConfig) -> f64 {
    if !info.adjacent {
        return 0.0;
    }
    let avg = info.avg_key_size;
    match slot.region {
        RegionType::Exterior => -avg * config.region_bonus_ratio,
        RegionType::InterKey => avg * config.region_bonus_ratio,
        RegionType::Interior | RegionType::SplitMiddle => avg * config.interior_bonus_ratio,
    }
}

/// Scattered combos with more than two keys need room for several
/// connectors; charge them for slots without it. The split gap has vertical
/// room, so it is exempt along with the exterior.
fn multi_key_penalty(slot: &Slot, info: &ComboInfo, config: &AssignConfig) -> f64 {
    if info.adjacent || info.key_indices.len() <= 2 {
        return 0.0;
    }
    match slot.region {
        RegionType::Exterior | RegionType::SplitMiddle => 0.0,
        RegionType::InterKey | RegionType::Interior => {
            info.avg_key_size * config.multi_key_penalty_ratio
        }
    }
}

/// Regular grid of slots along the canvas border, used when no generated
/// candidate is admissible.
fn perimeter_slots(ctx: &AssignContext<'_>) -> Vec<Slot> {
    let step = (ctx.avg_key_size * ctx.config.perimeter_step_ratio).max(ctx.config.min_perimeter_step);
    let canvas = ctx.canvas_bounds;
    let pad = ctx.padding;
    let mut slots = Vec::new();
    let mut x = canvas.left + pad;
    while x <= canvas.right() - pad {
        slots.push(Slot::new(Point::new(x, canvas.top + pad), RegionType::Exterior, 0.0));
        slots.push(Slot::new(
            Point::new(x, canvas.bottom() - pad),
            RegionType::Exterior,
            0.0,
        ));
        x += step;
    }
    let mut y = canvas.top + pad;
    while y <= canvas.bottom() - pad {
        slots.push(Slot::new(Point::new(canvas.left + pad, y), RegionType::Exterior, 0.0));
        slots.push(Slot::new(
            Point::new(canvas.right() - pad, y),
            RegionType::Exterior,
            0.0,
        ));
        y += step;
    }
    slots
}

/// Spiral outward from the anchor in the 8 compass directions at growing
/// radius; the first admissible position wins.
fn first_from_spiral(
    ctx: &AssignContext<'_>,
    info: &ComboInfo,
    placed: &[Rect],
) -> Option<Candidate> {
    let step = (ctx.avg_key_size * ctx.config.spiral_step_ratio).max(ctx.config.min_spiral_step);
    for ring in 1..=ctx.config.spiral_rings {
        let offset = step * ring as f64;
        let deltas = [
            (-offset, 0.0),
            (offset, 0.0),
            (0.0, -offset),
            (0.0, offset),
            (-offset, -offset),
            (offset, -offset),
            (-offset, offset),
            (offset, offset),
        ];
        for (dx, dy) in deltas {
            let position = Point::new(info.anchor.x + dx, info.anchor.y + dy);
            let slot = Slot::new(position, RegionType::Interior, 0.0);
            if let Some(candidate) = evaluate_slot(ctx, info, slot, None, placed, true) {
                return Some(candidate);
            }
        }
    }
    None
}
