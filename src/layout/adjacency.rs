// Adjacency classification and split-gap detection. Both are pure functions
// over key geometry; quadratic in the key count, which is fine for keyboards.

use crate::geometry::{Point, Rect};

/// Whether the given key centers form a single connected cluster under the
/// distance threshold. Flood-fill from the first center; one key (or none)
/// is trivially connected. Invariant under permutation of `centers`.
pub(crate) fn keys_connected(centers: &[Point], threshold: f64) -> bool {
    if centers.len() <= 1 {
        return true;
    }
    let mut visited = vec![false; centers.len()];
    visited[0] = true;
    let mut stack = vec![0usize];
    let mut count = 1usize;
    while let Some(i) = stack.pop() {
        for j in 0..centers.len() {
            if !visited[j] && centers[i].distance_to(centers[j]) <= threshold {
                visited[j] = true;
                count += 1;
                stack.push(j);
            }
        }
    }
    count == centers.len()
}

/// Detect a split-keyboard gap: partition keys by x-center around the
/// keyboard midline and report the empty band between the halves when it is
/// wider than `gap_ratio` × average key width.
pub(crate) fn detect_split_gap(key_rects: &[Rect], gap_ratio: f64) -> Option<Rect> {
    if key_rects.is_empty() {
        return None;
    }
    let mut bbox = key_rects[0];
    for rect in &key_rects[1..] {
        bbox = bbox.united(rect);
    }
    let mid_x = bbox.center().x;

    let mut left_edge = f64::NEG_INFINITY;
    let mut right_edge = f64::INFINITY;
    let mut left_count = 0usize;
    let mut right_count = 0usize;
    for rect in key_rects {
        if rect.center().x < mid_x {
            left_edge = left_edge.max(rect.right());
            left_count += 1;
        } else {
            right_edge = right_edge.min(rect.left);
            right_count += 1;
        }
    }
    if left_count == 0 || right_count == 0 {
        return None;
    }

    let avg_width = key_rects.iter().map(|r| r.width).sum::<f64>() / key_rects.len() as f64;
    let gap_width = right_edge - left_edge;
    if gap_width > avg_width * gap_ratio {
        Some(Rect::new(left_edge, bbox.top, gap_width, bbox.height))
    } else {
        None
    }
}
