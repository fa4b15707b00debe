//! Grid pathfinding with a bounded, version-aware result cache.
//!
//! [`Pathfinder`] answers shortest-path queries over any [`MapOracle`]. Invalid
//! queries (endpoints outside the map, a blocked start) are errors; a blocked
//! or unreachable goal yields an empty [`Path`].
mod astar;
mod cache;

pub use astar::{DIAGONAL_COST, ORTHOGONAL_COST, step_cost};
pub use cache::{CacheKey, PathCache};

use crate::budget::Deadline;
use crate::config::{Heuristic, PathfindingConfig};
use crate::error::{Endpoint, PathError};
use crate::map::{Direction, MapOracle, Position};

/// Ordered cells from start to goal, both inclusive.
///
/// An empty path means no route exists. A single cell means start == goal.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Path {
    cells: Vec<Position>,
}

impl Path {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_cells(cells: Vec<Position>) -> Self {
        Self { cells }
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of cells, including start and goal.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Number of moves along the path.
    pub fn steps(&self) -> usize {
        self.cells.len().saturating_sub(1)
    }

    pub fn cells(&self) -> &[Position] {
        &self.cells
    }

    pub fn start(&self) -> Option<Position> {
        self.cells.first().copied()
    }

    pub fn goal(&self) -> Option<Position> {
        self.cells.last().copied()
    }

    /// Cell reached by the first move, if the path has one.
    pub fn first_step(&self) -> Option<Position> {
        self.cells.get(1).copied()
    }

    /// Direction of the first move, if the path has one.
    pub fn first_direction(&self) -> Option<Direction> {
        match self.cells.as_slice() {
            [from, to, ..] => Direction::between(*from, *to),
            _ => None,
        }
    }

    /// Total movement cost under the orthogonal/diagonal step costs.
    pub fn cost(&self) -> f64 {
        self.cells
            .windows(2)
            .filter_map(|pair| Direction::between(pair[0], pair[1]))
            .map(step_cost)
            .sum()
    }
}

/// Whether a search ran to completion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum SearchStatus {
    Complete,
    /// Best-so-far path toward the explored node closest to the goal.
    DeadlineExpired,
}

/// Result of [`Pathfinder::search`].
#[derive(Clone, Debug, PartialEq)]
pub struct PathSearch {
    pub path: Path,
    pub status: SearchStatus,
    /// Nodes closed by A*; zero for cache hits.
    pub expanded: usize,
    pub from_cache: bool,
}

impl PathSearch {
    pub fn is_complete(&self) -> bool {
        self.status == SearchStatus::Complete
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathfinderStats {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub searches: u64,
    pub deadline_expirations: u64,
    pub cache_size: usize,
}

impl PathfinderStats {
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.cache_hits + self.cache_misses;
        if lookups == 0 {
            0.0
        } else {
            self.cache_hits as f64 / lookups as f64
        }
    }
}

/// A* pathfinder owning its result cache.
#[derive(Debug)]
pub struct Pathfinder {
    heuristic: Heuristic,
    allow_diagonal: bool,
    cache: PathCache,
    stats: PathfinderStats,
}

impl Pathfinder {
    pub fn new(config: &PathfindingConfig) -> Self {
        Self {
            heuristic: config.heuristic,
            allow_diagonal: config.allow_diagonal,
            cache: PathCache::new(config.cache_capacity),
            stats: PathfinderStats::default(),
        }
    }

    pub fn heuristic(&self) -> Heuristic {
        self.heuristic
    }

    pub fn allows_diagonal(&self) -> bool {
        self.allow_diagonal
    }

    /// Shortest path from `start` to `goal` without a deadline.
    pub fn find_path<M: MapOracle + ?Sized>(
        &mut self,
        start: Position,
        goal: Position,
        map: &M,
    ) -> Result<Path, PathError> {
        self.search(start, goal, map, Deadline::none())
            .map(|search| search.path)
    }

    /// Shortest path bounded by `deadline`.
    ///
    /// # Errors
    ///
    /// Returns [`PathError`] when either endpoint lies outside the map or the
    /// start cell is not walkable.
    pub fn search<M: MapOracle + ?Sized>(
        &mut self,
        start: Position,
        goal: Position,
        map: &M,
        deadline: Deadline,
    ) -> Result<PathSearch, PathError> {
        if !map.contains(start) {
            return Err(PathError::OutOfBounds {
                role: Endpoint::Start,
                position: start,
            });
        }
        if !map.contains(goal) {
            return Err(PathError::OutOfBounds {
                role: Endpoint::Goal,
                position: goal,
            });
        }
        if !map.is_walkable(start) {
            return Err(PathError::BlockedStart { position: start });
        }

        let version = map.version();
        if self.cache.observe_version(version) {
            tracing::debug!("map changed to {}, path cache invalidated", version);
        }

        let key = CacheKey {
            start,
            goal,
            version,
        };
        if let Some(path) = self.cache.get(&key) {
            self.stats.cache_hits += 1;
            return Ok(PathSearch {
                path,
                status: SearchStatus::Complete,
                expanded: 0,
                from_cache: true,
            });
        }
        self.stats.cache_misses += 1;

        let result = if start == goal {
            PathSearch {
                path: Path::from_cells(vec![start]),
                status: SearchStatus::Complete,
                expanded: 0,
                from_cache: false,
            }
        } else if !map.is_walkable(goal) {
            PathSearch {
                path: Path::empty(),
                status: SearchStatus::Complete,
                expanded: 0,
                from_cache: false,
            }
        } else {
            self.stats.searches += 1;
            astar::search(
                map,
                start,
                goal,
                self.heuristic,
                self.allow_diagonal,
                deadline,
            )
        };

        match result.status {
            SearchStatus::Complete => self.cache.insert(key, result.path.clone()),
            SearchStatus::DeadlineExpired => self.stats.deadline_expirations += 1,
        }
        self.stats.cache_size = self.cache.len();

        Ok(result)
    }

    /// Number of moves on the shortest path, or `None` if unreachable.
    pub fn distance<M: MapOracle + ?Sized>(
        &mut self,
        start: Position,
        goal: Position,
        map: &M,
        deadline: Deadline,
    ) -> Result<Option<u32>, PathError> {
        let search = self.search(start, goal, map, deadline)?;
        if !search.is_complete() || search.path.is_empty() {
            return Ok(None);
        }
        Ok(Some(search.path.steps() as u32))
    }

    pub fn stats(&self) -> PathfinderStats {
        PathfinderStats {
            cache_size: self.cache.len(),
            ..self.stats
        }
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
        self.stats.cache_size = 0;
    }
}
