//! Read-only dungeon view consumed by the decision stack.
//!
//! The dungeon itself is owned by the world collaborator. The core only sees
//! it through [`MapOracle`]: dimensions, per-cell kinds and a version counter
//! that is bumped whenever the dungeon is regenerated.
use std::fmt;

/// Discrete grid position expressed as `(row, col)`.
///
/// Coordinates are signed so that direction deltas can be applied before
/// bounds checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub const ORIGIN: Self = Self { row: 0, col: 0 };

    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Position one step away in `direction`.
    pub fn step(self, direction: Direction) -> Self {
        let (dr, dc) = direction.delta();
        Self::new(self.row + dr, self.col + dc)
    }

    pub fn manhattan(self, other: Self) -> u32 {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    pub fn chebyshev(self, other: Self) -> u32 {
        self.row.abs_diff(other.row).max(self.col.abs_diff(other.col))
    }

    pub fn euclidean(self, other: Self) -> f64 {
        let dr = f64::from(self.row - other.row);
        let dc = f64::from(self.col - other.col);
        (dr * dr + dc * dc).sqrt()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Grid movement direction. `North` decreases the row index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl Direction {
    pub const CARDINAL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
        Direction::NorthEast,
        Direction::NorthWest,
        Direction::SouthEast,
        Direction::SouthWest,
    ];

    /// Directions available under the given movement model.
    pub fn available(allow_diagonal: bool) -> &'static [Direction] {
        if allow_diagonal {
            &Self::ALL
        } else {
            &Self::CARDINAL
        }
    }

    /// `(drow, dcol)` offset of a single step.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (-1, 0),
            Direction::South => (1, 0),
            Direction::East => (0, 1),
            Direction::West => (0, -1),
            Direction::NorthEast => (-1, 1),
            Direction::NorthWest => (-1, -1),
            Direction::SouthEast => (1, 1),
            Direction::SouthWest => (1, -1),
        }
    }

    pub const fn is_diagonal(self) -> bool {
        let (dr, dc) = self.delta();
        dr != 0 && dc != 0
    }

    /// Direction of a single-step offset, if `from` and `to` are adjacent.
    pub fn between(from: Position, to: Position) -> Option<Direction> {
        let delta = (to.row - from.row, to.col - from.col);
        Self::ALL.into_iter().find(|d| d.delta() == delta)
    }
}

/// Monotonically increasing dungeon revision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapVersion(pub u64);

impl MapVersion {
    pub const INITIAL: Self = Self(0);

    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for MapVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapDimensions {
    pub width: u32,
    pub height: u32,
}

impl MapDimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, position: Position) -> bool {
        position.row >= 0
            && position.col >= 0
            && position.row < self.height as i32
            && position.col < self.width as i32
    }
}

/// Environmental hazard annotation on a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HazardKind {
    Water,
    Spikes,
    Lava,
    Chasm,
}

impl HazardKind {
    /// Impassable hazards are never expanded by the pathfinder.
    pub const fn is_impassable(self) -> bool {
        matches!(self, HazardKind::Lava | HazardKind::Chasm)
    }
}

/// Canonical cell classes of the dungeon grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellKind {
    Wall,
    Floor,
    Door,
    Hazard(HazardKind),
    Chest,
    Trap,
}

impl CellKind {
    pub const fn is_walkable(self) -> bool {
        match self {
            CellKind::Floor | CellKind::Door | CellKind::Trap => true,
            CellKind::Hazard(kind) => !kind.is_impassable(),
            CellKind::Wall | CellKind::Chest => false,
        }
    }

    /// Walkable cells an agent would rather not stand on.
    pub const fn is_dangerous(self) -> bool {
        matches!(self, CellKind::Hazard(_) | CellKind::Trap)
    }

    pub fn from_glyph(glyph: char) -> Option<Self> {
        let kind = match glyph {
            '#' => CellKind::Wall,
            '.' => CellKind::Floor,
            '+' => CellKind::Door,
            '~' => CellKind::Hazard(HazardKind::Water),
            '^' => CellKind::Hazard(HazardKind::Spikes),
            'L' => CellKind::Hazard(HazardKind::Lava),
            '_' => CellKind::Hazard(HazardKind::Chasm),
            '$' => CellKind::Chest,
            'T' => CellKind::Trap,
            _ => return None,
        };
        Some(kind)
    }

    pub const fn glyph(self) -> char {
        match self {
            CellKind::Wall => '#',
            CellKind::Floor => '.',
            CellKind::Door => '+',
            CellKind::Hazard(HazardKind::Water) => '~',
            CellKind::Hazard(HazardKind::Spikes) => '^',
            CellKind::Hazard(HazardKind::Lava) => 'L',
            CellKind::Hazard(HazardKind::Chasm) => '_',
            CellKind::Chest => '$',
            CellKind::Trap => 'T',
        }
    }
}

/// Read-only map provider exposing layout and revision.
pub trait MapOracle: Send + Sync {
    fn dimensions(&self) -> MapDimensions;

    fn cell(&self, position: Position) -> Option<CellKind>;

    /// Bumped whenever the dungeon is regenerated.
    fn version(&self) -> MapVersion;

    fn contains(&self, position: Position) -> bool {
        self.dimensions().contains(position)
    }

    fn is_walkable(&self, position: Position) -> bool {
        self.cell(position).is_some_and(CellKind::is_walkable)
    }
}

/// Errors raised while parsing an ASCII map.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MapParseError {
    #[error("map has no rows")]
    Empty,

    #[error("row {row} has width {width}, expected {expected}")]
    Ragged {
        row: usize,
        width: usize,
        expected: usize,
    },

    #[error("unknown glyph `{glyph}` at {position}")]
    UnknownGlyph { glyph: char, position: Position },
}

/// Dense row-major grid; the default [`MapOracle`] implementation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridMap {
    dimensions: MapDimensions,
    cells: Vec<CellKind>,
    version: MapVersion,
}

impl GridMap {
    /// Creates a map filled with `fill`.
    pub fn filled(width: u32, height: u32, fill: CellKind) -> Self {
        Self {
            dimensions: MapDimensions::new(width, height),
            cells: vec![fill; (width as usize) * (height as usize)],
            version: MapVersion::INITIAL,
        }
    }

    /// Parses an ASCII layout, one string per row.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, MapParseError> {
        let first = rows.first().ok_or(MapParseError::Empty)?;
        let width = first.as_ref().chars().count();
        let mut cells = Vec::with_capacity(width * rows.len());

        for (row, line) in rows.iter().enumerate() {
            let line = line.as_ref();
            let line_width = line.chars().count();
            if line_width != width {
                return Err(MapParseError::Ragged {
                    row,
                    width: line_width,
                    expected: width,
                });
            }
            for (col, glyph) in line.chars().enumerate() {
                let kind = CellKind::from_glyph(glyph).ok_or(MapParseError::UnknownGlyph {
                    glyph,
                    position: Position::new(row as i32, col as i32),
                })?;
                cells.push(kind);
            }
        }

        Ok(Self {
            dimensions: MapDimensions::new(width as u32, rows.len() as u32),
            cells,
            version: MapVersion::INITIAL,
        })
    }

    /// Parses a newline-separated ASCII layout, ignoring blank lines.
    pub fn parse(text: &str) -> Result<Self, MapParseError> {
        let rows: Vec<&str> = text
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .collect();
        Self::from_rows(&rows)
    }

    pub fn with_version(mut self, version: MapVersion) -> Self {
        self.version = version;
        self
    }

    /// Overwrites one cell, bumping the version so cached paths are dropped.
    pub fn set_cell(&mut self, position: Position, kind: CellKind) -> bool {
        match self.index(position) {
            Some(index) => {
                self.cells[index] = kind;
                self.version = self.version.next();
                true
            }
            None => false,
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = String> + '_ {
        self.cells
            .chunks(self.dimensions.width.max(1) as usize)
            .map(|row| row.iter().map(|cell| cell.glyph()).collect())
    }

    fn index(&self, position: Position) -> Option<usize> {
        self.dimensions.contains(position).then(|| {
            position.row as usize * self.dimensions.width as usize + position.col as usize
        })
    }
}

impl MapOracle for GridMap {
    fn dimensions(&self) -> MapDimensions {
        self.dimensions
    }

    fn cell(&self, position: Position) -> Option<CellKind> {
        self.index(position).map(|index| self.cells[index])
    }

    fn version(&self) -> MapVersion {
        self.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_glyphs_and_walkability() {
        let map = GridMap::from_rows(&["#.+", "~L$", "^_T"]).unwrap();
        assert_eq!(map.dimensions(), MapDimensions::new(3, 3));
        assert!(!map.is_walkable(Position::new(0, 0)));
        assert!(map.is_walkable(Position::new(0, 2)));
        assert!(map.is_walkable(Position::new(1, 0)));
        assert!(!map.is_walkable(Position::new(1, 1)));
        assert!(!map.is_walkable(Position::new(1, 2)));
        assert!(map.is_walkable(Position::new(2, 0)));
        assert!(!map.is_walkable(Position::new(2, 1)));
        assert!(map.is_walkable(Position::new(2, 2)));
        assert!(!map.is_walkable(Position::new(3, 0)));
        assert_eq!(map.rows().collect::<Vec<_>>(), vec!["#.+", "~L$", "^_T"]);
    }

    #[test]
    fn rejects_ragged_rows() {
        let err = GridMap::from_rows(&["...", ".."]).unwrap_err();
        assert_eq!(
            err,
            MapParseError::Ragged {
                row: 1,
                width: 2,
                expected: 3
            }
        );
    }

    #[test]
    fn set_cell_bumps_version() {
        let mut map = GridMap::filled(2, 2, CellKind::Floor);
        assert_eq!(map.version(), MapVersion::INITIAL);
        assert!(map.set_cell(Position::new(1, 1), CellKind::Wall));
        assert_eq!(map.version(), MapVersion(1));
        assert!(!map.set_cell(Position::new(5, 5), CellKind::Wall));
        assert_eq!(map.version(), MapVersion(1));
    }

    #[test]
    fn direction_between_adjacent_cells() {
        let origin = Position::new(2, 2);
        for direction in Direction::ALL {
            assert_eq!(Direction::between(origin, origin.step(direction)), Some(direction));
        }
        assert_eq!(Direction::between(origin, Position::new(4, 2)), None);
    }
}
