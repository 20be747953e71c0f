use combo_overlay::layout_dump::layout_dump_string;
use combo_overlay::layout::slots::RegionType;
use combo_overlay::{
    compute_layout, ComboSpec, FixedMetrics, LayoutCache, LayoutConfig, Point, Rect,
};

fn key_grid(cols: usize, rows: usize, size: f64, gap: f64) -> Vec<Rect> {
    let mut keys = Vec::new();
    for row in 0..rows {
        for col in 0..cols {
            keys.push(Rect::new(
                20.0 + col as f64 * (size + gap),
                20.0 + row as f64 * (size + gap),
                size,
                size,
            ));
        }
    }
    keys
}

fn combo(keys: Vec<usize>, name: &str) -> ComboSpec {
    ComboSpec {
        trigger_keys: keys,
        output_label: None,
        combo_label: name.to_string(),
    }
}

fn combo_with_output(keys: Vec<usize>, name: &str, output: &str) -> ComboSpec {
    ComboSpec {
        trigger_keys: keys,
        output_label: Some(output.to_string()),
        combo_label: name.to_string(),
    }
}

#[test]
fn adjacent_pair_sits_between_its_keys_without_routes() {
    let keys = key_grid(2, 1, 50.0, 4.0);
    let canvas = Rect::new(0.0, 0.0, 400.0, 300.0);
    let layout = compute_layout(
        &keys,
        &[combo(vec![0, 1], "ESC")],
        canvas,
        &FixedMetrics::default(),
        &LayoutConfig::default(),
    );

    assert_eq!(layout.placements.len(), 1);
    assert!(layout.routes.is_empty());

    let placement = &layout.placements[0];
    assert!(matches!(
        placement.slot.region,
        RegionType::InterKey | RegionType::Interior
    ));
    // The shared edge midpoint is at (72, 45); the label should land nearby.
    let center = placement.label_rect.center();
    assert!(center.distance_to(Point::new(72.0, 45.0)) < 50.0);
}

#[test]
fn distant_combo_routes_avoid_other_keys() {
    let keys = key_grid(4, 4, 50.0, 6.0);
    let canvas = Rect::new(0.0, 0.0, 600.0, 500.0);
    let layout = compute_layout(
        &keys,
        &[combo(vec![0, 15], "FAR")],
        canvas,
        &FixedMetrics::default(),
        &LayoutConfig::default(),
    );

    assert_eq!(layout.placements.len(), 1);
    assert_eq!(layout.routes.len(), 2);
    for route in &layout.routes {
        assert!(route.cost.is_finite(), "route should be realizable");
        assert!(route.simplified_path.len() >= 2);

        // Last point lands on the target key boundary.
        let last = *route.simplified_path.last().unwrap();
        let target = keys[route.trigger_key_index];
        assert!(target.expanded(1e-6).contains(last));

        // First point is the label center.
        let first = route.simplified_path[0];
        assert_eq!(first, layout.placements[0].label_rect.center());

        // Interior waypoints stay out of non-target keys.
        for point in &route.simplified_path[1..route.simplified_path.len() - 1] {
            for (idx, key) in keys.iter().enumerate() {
                if idx == route.trigger_key_index {
                    continue;
                }
                assert!(
                    !key.expanded(-1e-6).contains(*point),
                    "waypoint {point:?} inside key {idx}"
                );
            }
        }
    }
}

#[test]
fn oversubscribed_keyboard_places_every_combo() {
    // Far more combos than comfortable slots on a 2x2 board.
    let keys = key_grid(2, 2, 40.0, 4.0);
    let canvas = Rect::new(0.0, 0.0, 300.0, 200.0);
    let combos: Vec<ComboSpec> = (0..20)
        .map(|i| combo(vec![i % 4, (i + 1) % 4], &format!("C{i}")))
        .collect();
    let config = LayoutConfig::default();
    let layout = compute_layout(&keys, &combos, canvas, &FixedMetrics::default(), &config);

    assert_eq!(layout.placements.len(), 20);
    let pad = config.padding.0;
    for placement in &layout.placements {
        let rect = placement.label_rect;
        assert!(rect.left >= canvas.left + pad - 1e-9);
        assert!(rect.top >= canvas.top + pad - 1e-9);
        assert!(rect.right() <= canvas.right() - pad + 1e-9);
        assert!(rect.bottom() <= canvas.bottom() - pad + 1e-9);
    }
}

/// Whether an axis-aligned segment from `a` to `b` passes through the
/// interior of `key`. Simplified paths between their snapped endpoints are
/// strictly orthogonal, so the two axis cases cover every segment.
fn segment_enters_key(a: Point, b: Point, key: &Rect) -> bool {
    let r = key.expanded(-1e-6);
    if (a.y - b.y).abs() < 1e-9 {
        let (lo, hi) = if a.x <= b.x { (a.x, b.x) } else { (b.x, a.x) };
        a.y > r.top && a.y < r.bottom() && hi > r.left && lo < r.right()
    } else if (a.x - b.x).abs() < 1e-9 {
        let (lo, hi) = if a.y <= b.y { (a.y, b.y) } else { (b.y, a.y) };
        a.x > r.left && a.x < r.right() && hi > r.top && lo < r.bottom()
    } else {
        false
    }
}

#[test]
fn connector_segments_stay_clear_of_unrelated_keys() {
    let keys = key_grid(5, 4, 50.0, 6.0);
    let canvas = Rect::new(0.0, 0.0, 800.0, 600.0);
    let combos = vec![
        combo(vec![0, 18], "A"),
        combo(vec![4, 15], "B"),
        combo(vec![2, 16], "C"),
    ];
    let layout = compute_layout(
        &keys,
        &combos,
        canvas,
        &FixedMetrics::default(),
        &LayoutConfig::default(),
    );

    assert_eq!(layout.routes.len(), 6);
    for route in &layout.routes {
        assert!(route.cost.is_finite());
        let path = &route.simplified_path;
        assert!(path.len() >= 2);
        // The first and last segments carry the snapped endpoints; every
        // segment in between runs along unblocked cell centers and must not
        // cut through any key the route does not terminate on.
        for window in path[1..path.len() - 1].windows(2) {
            for (idx, key) in keys.iter().enumerate() {
                if idx == route.trigger_key_index {
                    continue;
                }
                assert!(
                    !segment_enters_key(window[0], window[1], key),
                    "combo {} segment {:?}->{:?} crosses key {idx}",
                    route.combo_index,
                    window[0],
                    window[1]
                );
            }
        }
    }
}

#[test]
fn tight_canvas_clamps_every_label_inside_padding() {
    // Canvas barely larger than the keyboard: most labels cannot sit where
    // their slots want them and must be clamped instead.
    let keys = key_grid(4, 3, 50.0, 6.0);
    let canvas = Rect::new(0.0, 0.0, 260.0, 200.0);
    let combos: Vec<ComboSpec> = (0..12)
        .map(|i| combo(vec![i % 12, (i + 5) % 12], &format!("T{i}")))
        .collect();
    let config = LayoutConfig::default();
    let layout = compute_layout(&keys, &combos, canvas, &FixedMetrics::default(), &config);

    assert_eq!(layout.placements.len(), 12);
    let pad = config.padding.0;
    for placement in &layout.placements {
        let rect = placement.label_rect;
        assert!(rect.left >= canvas.left + pad - 1e-9);
        assert!(rect.top >= canvas.top + pad - 1e-9);
        assert!(rect.right() <= canvas.right() - pad + 1e-9);
        assert!(rect.bottom() <= canvas.bottom() - pad + 1e-9);
    }
}

#[test]
fn enclosed_key_still_yields_a_route() {
    // Center key of a 5x5 grid with 2px gaps: its grid cell neighborhood is
    // essentially solid. Routing must either relocate the endpoint within
    // the bounded search or fall back to the direct path; it never spins.
    let keys = key_grid(5, 5, 50.0, 2.0);
    let canvas = Rect::new(0.0, 0.0, 600.0, 600.0);
    let layout = compute_layout(
        &keys,
        &[combo(vec![0, 12], "MID")],
        canvas,
        &FixedMetrics::default(),
        &LayoutConfig::default(),
    );
    assert_eq!(layout.placements.len(), 1);
    assert_eq!(layout.routes.len(), 2);
    for route in &layout.routes {
        assert!(route.simplified_path.len() >= 2);
        assert!(!route.raster_path.is_empty());
    }
}

#[test]
fn empty_key_set_yields_empty_layout() {
    let keys: Vec<Rect> = Vec::new();
    let layout = compute_layout(
        &keys,
        &[combo(vec![0, 1], "X")],
        Rect::new(0.0, 0.0, 100.0, 100.0),
        &FixedMetrics::default(),
        &LayoutConfig::default(),
    );
    assert!(layout.placements.is_empty());
    assert!(layout.routes.is_empty());
}

#[test]
fn repeated_runs_dump_identically() {
    let keys = key_grid(5, 3, 48.0, 5.0);
    let canvas = Rect::new(0.0, 0.0, 700.0, 500.0);
    let combos = vec![
        combo(vec![0, 1], "A"),
        combo_with_output(vec![2, 7], "B", "hello"),
        combo(vec![0, 14], "C"),
        combo(vec![5, 6, 7], "D"),
        combo_with_output(vec![10, 4], "E", "world"),
    ];
    let metrics = FixedMetrics::default();
    let config = LayoutConfig::default();

    let first = compute_layout(&keys, &combos, canvas, &metrics, &config);
    let second = compute_layout(&keys, &combos, canvas, &metrics, &config);
    assert_eq!(
        layout_dump_string(&first).unwrap(),
        layout_dump_string(&second).unwrap()
    );
}

#[test]
fn placements_and_routes_come_back_sorted() {
    let keys = key_grid(4, 4, 50.0, 6.0);
    let canvas = Rect::new(0.0, 0.0, 600.0, 500.0);
    // Deliberately unsorted combo sizes so assignment order differs from
    // combo order.
    let combos = vec![
        combo(vec![0, 15], "TINY"),
        combo_with_output(vec![3, 12], "BIG", "a longer output string"),
        combo(vec![1, 14], "MID"),
    ];
    let layout = compute_layout(
        &keys,
        &combos,
        canvas,
        &FixedMetrics::default(),
        &LayoutConfig::default(),
    );

    let indices: Vec<usize> = layout.placements.iter().map(|p| p.combo_index).collect();
    assert_eq!(indices, vec![0, 1, 2]);
    let route_keys: Vec<(usize, usize)> = layout
        .routes
        .iter()
        .map(|r| (r.combo_index, r.trigger_key_index))
        .collect();
    let mut sorted = route_keys.clone();
    sorted.sort();
    assert_eq!(route_keys, sorted);
}

#[test]
fn out_of_range_and_duplicate_triggers_are_dropped() {
    let keys = key_grid(2, 1, 50.0, 4.0);
    let canvas = Rect::new(0.0, 0.0, 400.0, 300.0);
    let combos = vec![
        combo(vec![0, 0, 99], "BAD"),
        combo(vec![1, 1, 0], "OK"),
    ];
    let layout = compute_layout(
        &keys,
        &combos,
        canvas,
        &FixedMetrics::default(),
        &LayoutConfig::default(),
    );
    // BAD resolves to a single key and is skipped; OK survives.
    assert_eq!(layout.placements.len(), 1);
    assert_eq!(layout.placements[0].combo_index, 1);
}

#[test]
fn cache_returns_same_layout_until_inputs_change() {
    let keys = key_grid(3, 2, 50.0, 5.0);
    let canvas = Rect::new(0.0, 0.0, 500.0, 400.0);
    let combos = vec![combo(vec![0, 5], "Z")];
    let metrics = FixedMetrics::default();
    let config = LayoutConfig::default();

    let mut cache = LayoutCache::new();
    let first = layout_dump_string(cache.get_or_compute(&keys, &combos, canvas, &metrics, &config))
        .unwrap();
    let again = layout_dump_string(cache.get_or_compute(&keys, &combos, canvas, &metrics, &config))
        .unwrap();
    assert_eq!(first, again);

    let moved: Vec<Rect> = keys.iter().map(|k| Rect::new(k.left + 10.0, k.top, k.width, k.height)).collect();
    let changed =
        layout_dump_string(cache.get_or_compute(&moved, &combos, canvas, &metrics, &config))
            .unwrap();
    assert_ne!(first, changed);
}

// Small deterministic generator for the placement fuzz below.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn in_range(&mut self, lo: usize, hi: usize) -> usize {
        lo + (self.next() as usize) % (hi - lo)
    }
}

#[test]
fn random_combo_sets_never_overlap_on_primary_pass() {
    let keys = key_grid(6, 4, 50.0, 6.0);
    let canvas = Rect::new(0.0, 0.0, 900.0, 700.0);
    let metrics = FixedMetrics::default();
    let config = LayoutConfig::default();
    let mut rng = Lcg(0x5eed);

    for _ in 0..10 {
        let count = rng.in_range(2, 7);
        let combos: Vec<ComboSpec> = (0..count)
            .map(|i| {
                let a = rng.in_range(0, keys.len());
                let mut b = rng.in_range(0, keys.len());
                if b == a {
                    b = (b + 1) % keys.len();
                }
                combo(vec![a, b], &format!("R{i}"))
            })
            .collect();
        let layout = compute_layout(&keys, &combos, canvas, &metrics, &config);
        assert_eq!(layout.placements.len(), combos.len());
        // With this much free canvas, the primary pass should always find
        // non-overlapping rectangles.
        for (i, a) in layout.placements.iter().enumerate() {
            for b in &layout.placements[i + 1..] {
                assert!(
                    !a.label_rect.intersects(&b.label_rect),
                    "labels {} and {} overlap",
                    a.combo_index,
                    b.combo_index
                );
            }
        }
    }
}
