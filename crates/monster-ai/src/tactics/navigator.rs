//! Path queries issued by the tactical search.
use crate::budget::Deadline;
use crate::map::{Direction, MapOracle, Position};
use crate::pathfinding::Pathfinder;

/// Pathfinder bound to one map and one decision deadline.
///
/// Results of interrupted searches are treated as "no route" so a timed-out
/// query never produces a move.
pub struct Navigator<'a, M: MapOracle + ?Sized> {
    pathfinder: &'a mut Pathfinder,
    map: &'a M,
    deadline: Deadline,
}

impl<'a, M: MapOracle + ?Sized> Navigator<'a, M> {
    pub fn new(pathfinder: &'a mut Pathfinder, map: &'a M, deadline: Deadline) -> Self {
        Self {
            pathfinder,
            map,
            deadline,
        }
    }

    pub fn map(&self) -> &M {
        self.map
    }

    pub fn deadline(&self) -> Deadline {
        self.deadline
    }

    /// Moves along the shortest path from `from` to `to`.
    pub fn path_distance(&mut self, from: Position, to: Position) -> Option<u32> {
        self.pathfinder
            .distance(from, to, self.map, self.deadline)
            .ok()
            .flatten()
    }

    /// First step of the shortest path, unless it would enter `to` itself.
    pub fn step_toward(&mut self, from: Position, to: Position) -> Option<Direction> {
        let search = self
            .pathfinder
            .search(from, to, self.map, self.deadline)
            .ok()?;
        if !search.is_complete() {
            return None;
        }
        let next = search.path.first_step()?;
        if next == to {
            return None;
        }
        search.path.first_direction()
    }

    /// Neighbour that strictly increases the path distance to `threat`.
    ///
    /// Picks the farthest such neighbour; ties keep direction order.
    pub fn retreat_step(&mut self, from: Position, threat: Position) -> Option<Direction> {
        let current = self.path_distance(from, threat)?;
        let mut best: Option<(Direction, u32)> = None;

        for &direction in Direction::available(self.pathfinder.allows_diagonal()) {
            let next = from.step(direction);
            if next == threat || !self.can_step(from, direction) {
                continue;
            }
            let Some(distance) = self.path_distance(next, threat) else {
                continue;
            };
            if distance > current && best.is_none_or(|(_, d)| distance > d) {
                best = Some((direction, distance));
            }
        }

        best.map(|(direction, _)| direction)
    }

    /// Whether a single step in `direction` is legal from `from`.
    pub fn can_step(&self, from: Position, direction: Direction) -> bool {
        let next = from.step(direction);
        if !self.map.is_walkable(next) {
            return false;
        }
        if direction.is_diagonal() {
            let (dr, dc) = direction.delta();
            return self.map.is_walkable(Position::new(from.row + dr, from.col))
                && self.map.is_walkable(Position::new(from.row, from.col + dc));
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PathfindingConfig;
    use crate::map::GridMap;

    #[test]
    fn step_toward_stops_next_to_target() {
        let map = GridMap::from_rows(&["....."]).unwrap();
        let mut pathfinder = Pathfinder::new(&PathfindingConfig::default());
        let mut nav = Navigator::new(&mut pathfinder, &map, Deadline::none());

        assert_eq!(
            nav.step_toward(Position::new(0, 0), Position::new(0, 4)),
            Some(Direction::East)
        );
        assert_eq!(nav.step_toward(Position::new(0, 3), Position::new(0, 4)), None);
        assert_eq!(nav.path_distance(Position::new(0, 0), Position::new(0, 4)), Some(4));
    }

    #[test]
    fn retreat_requires_a_farther_neighbour() {
        let map = GridMap::from_rows(&["....."]).unwrap();
        let mut pathfinder = Pathfinder::new(&PathfindingConfig::default());
        let mut nav = Navigator::new(&mut pathfinder, &map, Deadline::none());

        assert_eq!(
            nav.retreat_step(Position::new(0, 2), Position::new(0, 3)),
            Some(Direction::West)
        );
        // Backed into the dead end of the corridor.
        assert_eq!(nav.retreat_step(Position::new(0, 0), Position::new(0, 2)), None);
    }
}
