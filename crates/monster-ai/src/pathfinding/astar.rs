//! A* search over the dungeon grid.
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::{Path, PathSearch, SearchStatus};
use crate::budget::Deadline;
use crate::config::Heuristic;
use crate::map::{Direction, MapOracle, Position};

/// Cost of an orthogonal step.
pub const ORTHOGONAL_COST: f64 = 1.0;
/// Cost of a diagonal step.
pub const DIAGONAL_COST: f64 = std::f64::consts::SQRT_2;

/// Expansions between deadline checks.
const DEADLINE_STRIDE: usize = 32;

impl Heuristic {
    /// Estimated remaining cost from `from` to `goal`.
    pub fn estimate(self, from: Position, goal: Position) -> f64 {
        match self {
            Heuristic::Manhattan => f64::from(from.manhattan(goal)),
            Heuristic::Euclidean => from.euclidean(goal),
            Heuristic::Chebyshev => f64::from(from.chebyshev(goal)),
        }
    }
}

pub const fn step_cost(direction: Direction) -> f64 {
    if direction.is_diagonal() {
        DIAGONAL_COST
    } else {
        ORTHOGONAL_COST
    }
}

/// Frontier entry ordered so the max-heap pops the lowest `f`, then the lowest
/// `h`, then the earliest insertion.
#[derive(Debug)]
struct OpenNode {
    f: f64,
    h: f64,
    seq: u64,
    index: usize,
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.h.total_cmp(&self.h))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenNode {}

/// Dense row-major search bookkeeping.
struct Grid {
    width: usize,
}

impl Grid {
    fn index(&self, position: Position) -> usize {
        position.row as usize * self.width + position.col as usize
    }

    fn position(&self, index: usize) -> Position {
        Position::new((index / self.width) as i32, (index % self.width) as i32)
    }
}

/// Runs A* between two validated, walkable endpoints.
pub(super) fn search<M: MapOracle + ?Sized>(
    map: &M,
    start: Position,
    goal: Position,
    heuristic: Heuristic,
    allow_diagonal: bool,
    deadline: Deadline,
) -> PathSearch {
    let dims = map.dimensions();
    let grid = Grid {
        width: dims.width as usize,
    };
    let size = dims.width as usize * dims.height as usize;

    let mut g = vec![f64::INFINITY; size];
    let mut parent: Vec<Option<usize>> = vec![None; size];
    let mut closed = vec![false; size];
    let mut open = BinaryHeap::new();
    let mut seq = 0u64;

    let start_index = grid.index(start);
    let goal_index = grid.index(goal);
    let start_h = heuristic.estimate(start, goal);
    g[start_index] = 0.0;
    open.push(OpenNode {
        f: start_h,
        h: start_h,
        seq,
        index: start_index,
    });

    // Closest explored node to the goal, used when the deadline hits.
    let mut best = (start_h, start_index);
    let mut expanded = 0usize;

    while let Some(node) = open.pop() {
        if closed[node.index] {
            continue;
        }

        if node.index == goal_index {
            return PathSearch {
                path: reconstruct(&grid, &parent, goal_index),
                status: SearchStatus::Complete,
                expanded,
                from_cache: false,
            };
        }

        if expanded % DEADLINE_STRIDE == 0 && expanded > 0 && deadline.is_expired() {
            tracing::debug!(
                "A* {} -> {} hit its deadline after {} expansions",
                start,
                goal,
                expanded
            );
            return PathSearch {
                path: reconstruct(&grid, &parent, best.1),
                status: SearchStatus::DeadlineExpired,
                expanded,
                from_cache: false,
            };
        }

        closed[node.index] = true;
        expanded += 1;
        if node.h < best.0 {
            best = (node.h, node.index);
        }

        let current = grid.position(node.index);
        for &direction in Direction::available(allow_diagonal) {
            let next = current.step(direction);
            if !map.is_walkable(next) {
                continue;
            }
            if direction.is_diagonal() && cuts_corner(map, current, direction) {
                continue;
            }

            let next_index = grid.index(next);
            if closed[next_index] {
                continue;
            }

            let tentative = g[node.index] + step_cost(direction);
            if tentative < g[next_index] {
                g[next_index] = tentative;
                parent[next_index] = Some(node.index);
                let h = heuristic.estimate(next, goal);
                seq += 1;
                open.push(OpenNode {
                    f: tentative + h,
                    h,
                    seq,
                    index: next_index,
                });
            }
        }
    }

    PathSearch {
        path: Path::empty(),
        status: SearchStatus::Complete,
        expanded,
        from_cache: false,
    }
}

/// Diagonal steps need both orthogonal neighbours to be open.
fn cuts_corner<M: MapOracle + ?Sized>(map: &M, from: Position, direction: Direction) -> bool {
    let (dr, dc) = direction.delta();
    !map.is_walkable(Position::new(from.row + dr, from.col))
        || !map.is_walkable(Position::new(from.row, from.col + dc))
}

fn reconstruct(grid: &Grid, parent: &[Option<usize>], end: usize) -> Path {
    let mut cells = vec![grid.position(end)];
    let mut cursor = end;
    while let Some(previous) = parent[cursor] {
        cells.push(grid.position(previous));
        cursor = previous;
    }
    cells.reverse();
    Path::from_cells(cells)
}
