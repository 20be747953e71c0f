//! Collinear-point removal for raster routes.

use crate::geometry::Point;
use crate::layout::routing::{Cell, RoutingGrid};

/// Drop every interior cell that lies on the straight line through its
/// neighbors, keeping only endpoints and corners. Idempotent.
pub(crate) fn simplify_cells(cells: &[Cell]) -> Vec<Cell> {
    if cells.len() <= 2 {
        return cells.to_vec();
    }
    let mut out: Vec<Cell> = Vec::with_capacity(cells.len());
    out.push(cells[0]);
    for &cell in &cells[1..] {
        if cell == *out.last().unwrap() {
            continue;
        }
        while out.len() >= 2 && collinear(out[out.len() - 2], out[out.len() - 1], cell) {
            out.pop();
        }
        out.push(cell);
    }
    out
}

fn collinear(a: Cell, b: Cell, c: Cell) -> bool {
    (b.0 - a.0) as i64 * (c.1 - a.1) as i64 == (b.1 - a.1) as i64 * (c.0 - a.0) as i64
}

/// Map simplified grid cells to canvas-space cell centers.
pub(crate) fn cells_to_world(grid: &RoutingGrid, cells: &[Cell]) -> Vec<Point> {
    cells.iter().map(|&cell| grid.grid_to_world(cell)).collect()
}
