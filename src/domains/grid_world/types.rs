use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPosition {
    pub x: i32,
    pub y: i32,
}

impl GridPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn manhattan_distance(&self, other: GridPosition) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    pub fn offset(&self, direction: Direction) -> GridPosition {
        let (dx, dy) = direction.delta();
        GridPosition {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    pub fn is_adjacent_to(&self, other: GridPosition) -> bool {
        self.manhattan_distance(other) == 1
    }
}

impl std::fmt::Display for GridPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    Stay,
}

impl Direction {
    /// The four movement directions, in the fixed expansion order the
    /// planners rely on for reproducible tie-breaking.
    pub const CARDINAL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Stay => (0, 0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub terrain_cost: u32,
    pub blocked: bool,
}

impl Cell {
    pub fn open(terrain_cost: u32) -> Self {
        Self {
            terrain_cost,
            blocked: false,
        }
    }

    pub fn wall() -> Self {
        Self {
            terrain_cost: 1,
            blocked: true,
        }
    }
}
