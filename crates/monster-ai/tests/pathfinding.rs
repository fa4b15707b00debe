use std::collections::{BinaryHeap, VecDeque};

use monster_ai::{
    CellKind, Deadline, Direction, GridMap, Heuristic, MapOracle, Pathfinder, PathfindingConfig,
    Position, SearchStatus,
};
use proptest::prelude::*;

const SIZE: usize = 8;

fn grid_from(walls: &[bool]) -> GridMap {
    let rows: Vec<String> = walls
        .chunks(SIZE)
        .map(|row| row.iter().map(|w| if *w { '#' } else { '.' }).collect())
        .collect();
    GridMap::from_rows(&rows).unwrap()
}

fn at(index: usize) -> Position {
    Position::new((index / SIZE) as i32, (index % SIZE) as i32)
}

fn bfs(map: &GridMap, start: Position, goal: Position) -> Option<usize> {
    let mut seen = vec![false; SIZE * SIZE];
    let mut queue = VecDeque::from([(start, 0)]);
    seen[start.row as usize * SIZE + start.col as usize] = true;
    while let Some((cell, depth)) = queue.pop_front() {
        if cell == goal {
            return Some(depth);
        }
        for direction in Direction::CARDINAL {
            let next = cell.step(direction);
            if !map.is_walkable(next) {
                continue;
            }
            let index = next.row as usize * SIZE + next.col as usize;
            if !seen[index] {
                seen[index] = true;
                queue.push_back((next, depth + 1));
            }
        }
    }
    None
}

/// Reference Dijkstra over 8-connected moves without corner cutting.
fn dijkstra(map: &GridMap, start: Position, goal: Position) -> Option<f64> {
    #[derive(PartialEq)]
    struct Entry(f64, Position);
    impl Eq for Entry {}
    impl PartialOrd for Entry {
        fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
            Some(self.cmp(other))
        }
    }
    impl Ord for Entry {
        fn cmp(&self, other: &Self) -> std::cmp::Ordering {
            other.0.total_cmp(&self.0)
        }
    }

    let mut best = vec![f64::INFINITY; SIZE * SIZE];
    let index = |p: Position| p.row as usize * SIZE + p.col as usize;
    best[index(start)] = 0.0;
    let mut heap = BinaryHeap::from([Entry(0.0, start)]);

    while let Some(Entry(cost, cell)) = heap.pop() {
        if cell == goal {
            return Some(cost);
        }
        if cost > best[index(cell)] {
            continue;
        }
        for direction in Direction::ALL {
            let next = cell.step(direction);
            if !map.is_walkable(next) {
                continue;
            }
            let step = if direction.is_diagonal() {
                let (dr, dc) = direction.delta();
                if !map.is_walkable(Position::new(cell.row + dr, cell.col))
                    || !map.is_walkable(Position::new(cell.row, cell.col + dc))
                {
                    continue;
                }
                std::f64::consts::SQRT_2
            } else {
                1.0
            };
            let candidate = cost + step;
            if candidate < best[index(next)] {
                best[index(next)] = candidate;
                heap.push(Entry(candidate, next));
            }
        }
    }
    None
}

fn assert_well_formed(map: &GridMap, cells: &[Position]) {
    for pair in cells.windows(2) {
        assert!(Direction::between(pair[0], pair[1]).is_some());
        assert!(map.is_walkable(pair[1]));
    }
}

proptest! {
    #[test]
    fn orthogonal_paths_match_bfs(
        walls in prop::collection::vec(prop::bool::weighted(0.3), SIZE * SIZE),
        start in 0..SIZE * SIZE,
        goal in 0..SIZE * SIZE,
    ) {
        let mut walls = walls;
        walls[start] = false;
        let map = grid_from(&walls);
        let (start, goal) = (at(start), at(goal));

        let mut pathfinder = Pathfinder::new(&PathfindingConfig::default());
        let path = pathfinder.find_path(start, goal, &map).unwrap();

        match bfs(&map, start, goal) {
            Some(depth) => {
                prop_assert_eq!(path.steps(), depth);
                prop_assert_eq!(path.start(), Some(start));
                prop_assert_eq!(path.goal(), Some(goal));
                assert_well_formed(&map, path.cells());
            }
            None => prop_assert!(path.is_empty()),
        }
    }

    #[test]
    fn diagonal_paths_match_dijkstra(
        walls in prop::collection::vec(prop::bool::weighted(0.3), SIZE * SIZE),
        start in 0..SIZE * SIZE,
        goal in 0..SIZE * SIZE,
        heuristic in prop::sample::select(vec![Heuristic::Euclidean, Heuristic::Chebyshev]),
    ) {
        let mut walls = walls;
        walls[start] = false;
        let map = grid_from(&walls);
        let (start, goal) = (at(start), at(goal));

        let config = PathfindingConfig {
            heuristic,
            allow_diagonal: true,
            ..PathfindingConfig::default()
        };
        let mut pathfinder = Pathfinder::new(&config);
        let path = pathfinder.find_path(start, goal, &map).unwrap();

        match dijkstra(&map, start, goal) {
            Some(cost) => {
                prop_assert!((path.cost() - cost).abs() < 1e-9);
                assert_well_formed(&map, path.cells());
            }
            None => prop_assert!(path.is_empty()),
        }
    }
}

#[test]
fn corridor_path_has_ten_cells() {
    let mut rows = vec![".........."];
    rows.extend(std::iter::repeat_n("##########", 9));
    let map = GridMap::from_rows(&rows).unwrap();

    let mut pathfinder = Pathfinder::new(&PathfindingConfig::default());
    let path = pathfinder
        .find_path(Position::new(0, 0), Position::new(0, 9), &map)
        .unwrap();
    assert_eq!(path.len(), 10);
    assert_eq!(path.first_direction(), Some(Direction::East));

    let blocked = pathfinder
        .find_path(Position::new(0, 0), Position::new(5, 5), &map)
        .unwrap();
    assert!(blocked.is_empty());
}

#[test]
fn map_change_invalidates_cached_paths() {
    let mut map = GridMap::parse(".....").unwrap();
    let mut pathfinder = Pathfinder::new(&PathfindingConfig::default());
    let (start, goal) = (Position::new(0, 0), Position::new(0, 4));

    assert_eq!(pathfinder.find_path(start, goal, &map).unwrap().len(), 5);
    assert!(pathfinder.search(start, goal, &map, Deadline::none()).unwrap().from_cache);

    assert!(map.set_cell(Position::new(0, 2), CellKind::Wall));
    let rerouted = pathfinder.search(start, goal, &map, Deadline::none()).unwrap();
    assert!(!rerouted.from_cache);
    assert!(rerouted.path.is_empty());
    assert_eq!(pathfinder.stats().cache_hits, 1);
}

#[test]
fn expired_deadline_reports_partial_search() {
    let map = GridMap::filled(40, 40, CellKind::Floor);
    let mut pathfinder = Pathfinder::new(&PathfindingConfig::default());

    let search = pathfinder
        .search(Position::new(0, 0), Position::new(39, 39), &map, Deadline::expired())
        .unwrap();
    assert_eq!(search.status, SearchStatus::DeadlineExpired);
    assert_eq!(pathfinder.stats().deadline_expirations, 1);

    // Partial results are never cached.
    let full = pathfinder
        .search(Position::new(0, 0), Position::new(39, 39), &map, Deadline::none())
        .unwrap();
    assert!(full.is_complete());
    assert!(!full.from_cache);
    assert_eq!(full.path.steps(), 78);
}
