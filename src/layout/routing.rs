// Costed routing grid over the key layout and a direction-aware A* router.
// Costs are scaled to integers so the search can order `BinaryHeap` entries
// totally, with deterministic tie-breaks on position and direction.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use crate::config::RoutingConfig;
use crate::geometry::{Point, Rect};

/// Integer cost multiplier so A* can order fractional cell costs exactly.
const COST_SCALE: f64 = 1000.0;

pub(crate) type Cell = (i32, i32);

/// Rasterized view of the key layout. Cells inside keys are blocked, cells
/// within one cell of a key edge carry an elevated cost, and cells claimed
/// by committed routes pick up a congestion surcharge. The `used` set is the
/// only mutable state and is owned by the single in-flight computation.
#[derive(Debug, Clone)]
pub(crate) struct RoutingGrid {
    boundary: Rect,
    cell_size: f64,
    cols: i32,
    rows: i32,
    costs: Vec<f64>,
    used: HashSet<Cell>,
    near_key_cost: f64,
    blocked_cost: f64,
    used_surcharge: f64,
}

impl RoutingGrid {
    pub(crate) fn new(boundary: Rect, cell_size: f64, config: &RoutingConfig) -> Self {
        let cell_size = cell_size.max(config.min_cell);
        let cols = ((boundary.width / cell_size) as i32 + 1).max(1);
        let rows = ((boundary.height / cell_size) as i32 + 1).max(1);
        Self {
            boundary,
            cell_size,
            cols,
            rows,
            costs: vec![config.base_cost; (cols as usize) * (rows as usize)],
            used: HashSet::new(),
            near_key_cost: config.near_key_cost,
            blocked_cost: config.blocked_cost,
            used_surcharge: config.used_cell_surcharge,
        }
    }

    pub(crate) fn cols(&self) -> i32 {
        self.cols
    }

    pub(crate) fn rows(&self) -> i32 {
        self.rows
    }

    /// Block key interiors and raise the cost of the padding band around
    /// each key edge.
    pub(crate) fn mark_obstacles(&mut self, key_rects: &[Rect], padding: f64) {
        for rect in key_rects {
            self.raise_rect(&rect.expanded(padding), self.near_key_cost);
        }
        for rect in key_rects {
            self.fill_rect(rect, self.blocked_cost);
        }
    }

    fn fill_rect(&mut self, rect: &Rect, cost: f64) {
        let (min_col, min_row) = self.world_to_grid(Point::new(rect.left, rect.top));
        let (max_col, max_row) = self.world_to_grid(Point::new(rect.right(), rect.bottom()));
        for row in min_row.max(0)..=max_row.min(self.rows - 1) {
            for col in min_col.max(0)..=max_col.min(self.cols - 1) {
                let idx = self.index(col, row);
                self.costs[idx] = cost;
            }
        }
    }

    fn raise_rect(&mut self, rect: &Rect, cost: f64) {
        let (min_col, min_row) = self.world_to_grid(Point::new(rect.left, rect.top));
        let (max_col, max_row) = self.world_to_grid(Point::new(rect.right(), rect.bottom()));
        for row in min_row.max(0)..=max_row.min(self.rows - 1) {
            for col in min_col.max(0)..=max_col.min(self.cols - 1) {
                let idx = self.index(col, row);
                if self.costs[idx] < self.blocked_cost {
                    self.costs[idx] = self.costs[idx].max(cost);
                }
            }
        }
    }

    fn index(&self, col: i32, row: i32) -> usize {
        (row * self.cols + col) as usize
    }

    pub(crate) fn world_to_grid(&self, point: Point) -> Cell {
        (
            ((point.x - self.boundary.left) / self.cell_size).floor() as i32,
            ((point.y - self.boundary.top) / self.cell_size).floor() as i32,
        )
    }

    /// Cell center in canvas coordinates.
    pub(crate) fn grid_to_world(&self, cell: Cell) -> Point {
        Point::new(
            self.boundary.left + (cell.0 as f64 + 0.5) * self.cell_size,
            self.boundary.top + (cell.1 as f64 + 0.5) * self.cell_size,
        )
    }

    fn in_bounds(&self, cell: Cell) -> bool {
        cell.0 >= 0 && cell.0 < self.cols && cell.1 >= 0 && cell.1 < self.rows
    }

    /// Cell cost including congestion; out-of-bounds reads as blocked.
    pub(crate) fn cost(&self, cell: Cell) -> f64 {
        if !self.in_bounds(cell) {
            return self.blocked_cost;
        }
        let mut cost = self.costs[self.index(cell.0, cell.1)];
        if self.used.contains(&cell) {
            cost += self.used_surcharge;
        }
        cost
    }

    pub(crate) fn is_blocked(&self, cell: Cell) -> bool {
        self.cost(cell) >= self.blocked_cost
    }

    /// Commit a routed path's cells so later searches pay congestion there.
    pub(crate) fn mark_used(&mut self, path: &[Cell]) {
        self.used.extend(path.iter().copied());
    }

    /// Nearest unblocked cell, searching outward ring by ring with a hard
    /// bound so a fully enclosed cell cannot loop forever.
    pub(crate) fn nearest_unblocked(&self, cell: Cell, max_rings: usize) -> Option<Cell> {
        if !self.is_blocked(cell) {
            return Some(cell);
        }
        for ring in 1..=max_rings as i32 {
            for dr in -ring..=ring {
                for dc in -ring..=ring {
                    if dr.abs() != ring && dc.abs() != ring {
                        continue;
                    }
                    let candidate = (cell.0 + dc, cell.1 + dr);
                    if !self.is_blocked(candidate) {
                        return Some(candidate);
                    }
                }
            }
        }
        None
    }
}

/// One raster route: the grid cells traversed and the accumulated cost.
/// Infinite cost marks the unroutable direct-path fallback.
pub(crate) struct RasterRoute {
    pub(crate) cells: Vec<Cell>,
    pub(crate) cost: f64,
}

/// Routing strategy seam. Grid A* is the canonical implementation; a
/// waypoint-graph router could slot in behind the same trait.
pub(crate) trait Router {
    fn find_path(&self, grid: &RoutingGrid, start: Cell, goal: Cell) -> RasterRoute;
}

/// A* over the routing grid with the incoming direction as part of the node
/// state, so turning costs a fixed bend penalty and straight runs win.
pub(crate) struct GridAstarRouter {
    bend_penalty: f64,
    unblock_rings: usize,
}

impl GridAstarRouter {
    pub(crate) fn new(config: &RoutingConfig) -> Self {
        Self {
            bend_penalty: config.bend_penalty,
            unblock_rings: config.unblock_rings,
        }
    }
}

// Up, right, down, left.
const DIRECTIONS: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct SearchEntry {
    est: u64,
    cost: u64,
    cell: Cell,
    dir: u8,
}

impl Ord for SearchEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .est
            .cmp(&self.est)
            .then_with(|| other.cost.cmp(&self.cost))
            .then_with(|| self.cell.1.cmp(&other.cell.1))
            .then_with(|| self.cell.0.cmp(&other.cell.0))
            .then_with(|| self.dir.cmp(&other.dir))
    }
}

impl PartialOrd for SearchEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Router for GridAstarRouter {
    fn find_path(&self, grid: &RoutingGrid, start: Cell, goal: Cell) -> RasterRoute {
        let Some(start) = grid.nearest_unblocked(start, self.unblock_rings) else {
            return direct_fallback(start, goal);
        };
        let Some(goal) = grid.nearest_unblocked(goal, self.unblock_rings) else {
            return direct_fallback(start, goal);
        };
        if start == goal {
            return RasterRoute {
                cells: vec![start],
                cost: 0.0,
            };
        }

        let cols = grid.cols();
        let rows = grid.rows();
        let states = (cols as usize) * (rows as usize) * 4;
        let state_index =
            |cell: Cell, dir: u8| ((cell.1 * cols + cell.0) as usize) * 4 + dir as usize;
        let mut best_cost = vec![u64::MAX; states];
        let mut prev: Vec<Option<(Cell, u8)>> = vec![None; states];
        let mut heap = BinaryHeap::new();

        let bend = (self.bend_penalty * COST_SCALE).round() as u64;
        let heuristic = |cell: Cell| {
            ((cell.0 - goal.0).unsigned_abs() as u64 + (cell.1 - goal.1).unsigned_abs() as u64)
                * (COST_SCALE as u64)
        };

        for dir in 0..4u8 {
            best_cost[state_index(start, dir)] = 0;
            heap.push(SearchEntry {
                est: heuristic(start),
                cost: 0,
                cell: start,
                dir,
            });
        }

        let mut end_state: Option<(Cell, u8)> = None;
        while let Some(entry) = heap.pop() {
            let idx = state_index(entry.cell, entry.dir);
            if entry.cost != best_cost[idx] {
                continue;
            }
            if entry.cell == goal {
                end_state = Some((entry.cell, entry.dir));
                break;
            }
            for (dir, (dc, dr)) in DIRECTIONS.iter().enumerate() {
                let next = (entry.cell.0 + dc, entry.cell.1 + dr);
                if grid.is_blocked(next) {
                    continue;
                }
                let mut step = (grid.cost(next) * COST_SCALE).round() as u64;
                if dir as u8 != entry.dir {
                    step += bend;
                }
                let next_cost = entry.cost.saturating_add(step);
                let next_idx = state_index(next, dir as u8);
                if next_cost >= best_cost[next_idx] {
                    continue;
                }
                best_cost[next_idx] = next_cost;
                prev[next_idx] = Some((entry.cell, entry.dir));
                heap.push(SearchEntry {
                    est: next_cost.saturating_add(heuristic(next)),
                    cost: next_cost,
                    cell: next,
                    dir: dir as u8,
                });
            }
        }

        let Some((mut cell, mut dir)) = end_state else {
            return direct_fallback(start, goal);
        };
        let total = best_cost[state_index(cell, dir)] as f64 / COST_SCALE;
        let mut cells = vec![cell];
        while let Some((prev_cell, prev_dir)) = prev[state_index(cell, dir)] {
            cells.push(prev_cell);
            cell = prev_cell;
            dir = prev_dir;
            if cell == start && best_cost[state_index(cell, dir)] == 0 {
                break;
            }
        }
        cells.reverse();
        RasterRoute { cells, cost: total }
    }
}

/// Two-point path with infinite cost: the caller may still draw it, but the
/// cost marks the route as unroutable.
fn direct_fallback(start: Cell, goal: Cell) -> RasterRoute {
    RasterRoute {
        cells: vec![start, goal],
        cost: f64::INFINITY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_with_keys(keys: &[Rect]) -> RoutingGrid {
        let config = RoutingConfig::default();
        let boundary = Rect::new(0.0, 0.0, 200.0, 200.0);
        let mut grid = RoutingGrid::new(boundary, 4.0, &config);
        grid.mark_obstacles(keys, 4.0);
        grid
    }

    #[test]
    fn obstacle_cells_block_and_edges_cost_more() {
        let config = RoutingConfig::default();
        let grid = grid_with_keys(&[Rect::new(80.0, 80.0, 40.0, 40.0)]);
        let inside = grid.world_to_grid(Point::new(100.0, 100.0));
        assert!(grid.is_blocked(inside));
        let near = grid.world_to_grid(Point::new(78.0, 100.0));
        assert!(!grid.is_blocked(near));
        assert!(grid.cost(near) > config.base_cost);
        let far = grid.world_to_grid(Point::new(10.0, 10.0));
        assert_eq!(grid.cost(far), config.base_cost);
    }

    #[test]
    fn out_of_bounds_reads_as_blocked() {
        let grid = grid_with_keys(&[]);
        assert!(grid.is_blocked((-1, 0)));
        assert!(grid.is_blocked((0, grid.rows())));
    }

    #[test]
    fn straight_route_has_no_bends() {
        let grid = grid_with_keys(&[]);
        let router = GridAstarRouter::new(&RoutingConfig::default());
        let route = router.find_path(&grid, (5, 10), (30, 10));
        assert!(route.cost.is_finite());
        assert!(route.cells.iter().all(|&(_, row)| row == 10));
    }

    #[test]
    fn route_detours_around_blocked_key() {
        let key = Rect::new(60.0, 40.0, 40.0, 160.0);
        let grid = grid_with_keys(&[key]);
        let router = GridAstarRouter::new(&RoutingConfig::default());
        let start = grid.world_to_grid(Point::new(20.0, 100.0));
        let goal = grid.world_to_grid(Point::new(180.0, 100.0));
        let route = router.find_path(&grid, start, goal);
        assert!(route.cost.is_finite());
        for &cell in &route.cells {
            assert!(!grid.is_blocked(cell));
        }
    }

    #[test]
    fn congestion_pushes_second_route_apart() {
        let grid_base = grid_with_keys(&[]);
        let router = GridAstarRouter::new(&RoutingConfig::default());
        let first = router.find_path(&grid_base, (5, 10), (40, 10));
        let mut grid = grid_base.clone();
        grid.mark_used(&first.cells);
        let second = router.find_path(&grid, (5, 10), (40, 10));
        assert!(second.cost > first.cost);
    }

    #[test]
    fn blocked_goal_relocates_via_bounded_spiral() {
        let key = Rect::new(80.0, 80.0, 40.0, 40.0);
        let grid = grid_with_keys(&[key]);
        let router = GridAstarRouter::new(&RoutingConfig::default());
        let start = grid.world_to_grid(Point::new(10.0, 10.0));
        let goal = grid.world_to_grid(Point::new(100.0, 100.0));
        assert!(grid.is_blocked(goal));
        let route = router.find_path(&grid, start, goal);
        assert!(route.cost.is_finite());
        let last = *route.cells.last().unwrap();
        assert!(!grid.is_blocked(last));
    }

    #[test]
    fn fully_enclosed_goal_falls_back_to_direct_path() {
        // Block everything: the unblock spiral must terminate at its ring
        // bound and the router must return the infinite-cost direct path.
        let config = RoutingConfig::default();
        let boundary = Rect::new(0.0, 0.0, 100.0, 100.0);
        let mut grid = RoutingGrid::new(boundary, 4.0, &config);
        grid.mark_obstacles(&[boundary.expanded(10.0)], 0.0);
        let router = GridAstarRouter::new(&config);
        let route = router.find_path(&grid, (2, 2), (20, 20));
        assert!(route.cost.is_infinite());
        assert_eq!(route.cells.len(), 2);
    }

    #[test]
    fn bend_penalty_prefers_straight_runs() {
        let grid = grid_with_keys(&[]);
        let router = GridAstarRouter::new(&RoutingConfig::default());
        let route = router.find_path(&grid, (5, 5), (25, 15));
        // An L path has exactly one bend; the optimum under a bend penalty.
        let mut bends = 0;
        for window in route.cells.windows(3) {
            let d1 = (window[1].0 - window[0].0, window[1].1 - window[0].1);
            let d2 = (window[2].0 - window[1].0, window[2].1 - window[1].1);
            if d1 != d2 {
                bends += 1;
            }
        }
        assert_eq!(bends, 1);
    }
}
