use std::fmt;

/// Direction of movement on a board.
///
/// Not every tessellation allows every direction; see
/// [`Tessellation::legal_directions`](crate::Tessellation::legal_directions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    Up,
    NorthEast,
    Right,
    SouthEast,
    Down,
    SouthWest,
    Left,
    NorthWest,
}

pub const ALL_DIRECTIONS: [Direction; 8] = [
    Direction::Up,
    Direction::NorthEast,
    Direction::Right,
    Direction::SouthEast,
    Direction::Down,
    Direction::SouthWest,
    Direction::Left,
    Direction::NorthWest,
];

impl Direction {
    pub fn index(&self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::NorthEast => 1,
            Direction::Right => 2,
            Direction::SouthEast => 3,
            Direction::Down => 4,
            Direction::SouthWest => 5,
            Direction::Left => 6,
            Direction::NorthWest => 7,
        }
    }

    pub fn from_index(idx: usize) -> Direction {
        ALL_DIRECTIONS[idx % ALL_DIRECTIONS.len()]
    }

    /// Direction pointing the other way.
    pub fn opposite(&self) -> Direction {
        Direction::from_index(self.index() + 4)
    }

    pub fn is_diagonal(&self) -> bool {
        self.index() % 2 == 1
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "Up"),
            Direction::NorthEast => write!(f, "NorthEast"),
            Direction::Right => write!(f, "Right"),
            Direction::SouthEast => write!(f, "SouthEast"),
            Direction::Down => write!(f, "Down"),
            Direction::SouthWest => write!(f, "SouthWest"),
            Direction::Left => write!(f, "Left"),
            Direction::NorthWest => write!(f, "NorthWest"),
        }
    }
}
