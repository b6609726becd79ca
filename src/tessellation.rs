use std::fmt;

use crate::config::{Position, index_1d, index_x, index_y, is_on_board_2d};
use crate::direction::Direction;
use crate::error::{Error, Result};

/// Board variant: how cells are shaped and which cells are adjacent.
///
/// Chosen once per board; every geometric question about the board goes
/// through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tessellation {
    /// Squares.
    #[default]
    Sokoban,
    /// Alternating triangles, origin triangle pointing down.
    Trioban,
    /// Hexagons, odd rows shifted right by half a cell.
    Hexoban,
    /// Alternating octagons and squares, origin cell is an octagon.
    Octoban,
}

/// Shape of a single cell, derived from its row and column parity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellOrientation {
    Default,
    TriangleDown,
    Octagon,
}

use Direction::*;

const SOKOBAN_DIRECTIONS: &[Direction] = &[Left, Right, Up, Down];
const TRIOBAN_DIRECTIONS: &[Direction] = &[Left, Right, NorthEast, NorthWest, SouthEast, SouthWest];
const HEXOBAN_DIRECTIONS: &[Direction] = &[Left, Right, NorthEast, NorthWest, SouthEast, SouthWest];
const OCTOBAN_DIRECTIONS: &[Direction] = &[
    Left, Right, Up, Down, NorthEast, NorthWest, SouthEast, SouthWest,
];

// Lowercase characters; the uppercase form of each marks a push or pull.
const SOKOBAN_CHARS: &[(char, Direction)] = &[('l', Left), ('r', Right), ('u', Up), ('d', Down)];
const TRIOBAN_CHARS: &[(char, Direction)] = &[
    ('l', Left),
    ('r', Right),
    ('n', NorthEast),
    ('u', NorthWest),
    ('d', SouthEast),
    ('s', SouthWest),
];
const HEXOBAN_CHARS: &[(char, Direction)] = &[
    ('l', Left),
    ('r', Right),
    ('u', NorthWest),
    ('d', SouthEast),
    ('n', NorthEast),
    ('s', SouthWest),
];
const OCTOBAN_CHARS: &[(char, Direction)] = &[
    ('l', Left),
    ('r', Right),
    ('u', Up),
    ('d', Down),
    ('w', NorthWest),
    ('e', SouthEast),
    ('n', NorthEast),
    ('s', SouthWest),
];

impl Tessellation {
    pub const ALL: [Tessellation; 4] = [
        Tessellation::Sokoban,
        Tessellation::Trioban,
        Tessellation::Hexoban,
        Tessellation::Octoban,
    ];

    /// Directions pusher may move in, in the order board edges are enumerated.
    pub fn legal_directions(&self) -> &'static [Direction] {
        match self {
            Tessellation::Sokoban => SOKOBAN_DIRECTIONS,
            Tessellation::Trioban => TRIOBAN_DIRECTIONS,
            Tessellation::Hexoban => HEXOBAN_DIRECTIONS,
            Tessellation::Octoban => OCTOBAN_DIRECTIONS,
        }
    }

    pub fn is_legal(&self, direction: Direction) -> bool {
        self.legal_directions().contains(&direction)
    }

    fn char_map(&self) -> &'static [(char, Direction)] {
        match self {
            Tessellation::Sokoban => SOKOBAN_CHARS,
            Tessellation::Trioban => TRIOBAN_CHARS,
            Tessellation::Hexoban => HEXOBAN_CHARS,
            Tessellation::Octoban => OCTOBAN_CHARS,
        }
    }

    /// Shape of the cell at `position`.
    pub fn cell_orientation(&self, position: Position, width: usize, _height: usize) -> CellOrientation {
        let row = index_y(position, width);
        let column = index_x(position, width);
        let parity_even = (column + row % 2) % 2 == 0;
        match self {
            Tessellation::Sokoban | Tessellation::Hexoban => CellOrientation::Default,
            Tessellation::Trioban if parity_even => CellOrientation::TriangleDown,
            Tessellation::Octoban if parity_even => CellOrientation::Octagon,
            _ => CellOrientation::Default,
        }
    }

    /// Position next to `position` in `direction`.
    ///
    /// Returns `Ok(None)` when the neighbor would be off board, or when an
    /// octoban diagonal is attempted from a square cell.
    pub fn neighbor_position(
        &self,
        position: Position,
        direction: Direction,
        width: usize,
        height: usize,
    ) -> Result<Option<Position>> {
        if !self.is_legal(direction) {
            return Err(Error::IllegalDirection { direction });
        }
        if position >= width * height {
            return Err(Error::OutOfRange { position });
        }

        let row = index_y(position, width) as isize;
        let column = index_x(position, width) as isize;

        let (dx, dy) = match self {
            Tessellation::Sokoban => square_delta(direction),
            Tessellation::Trioban => {
                let points_down =
                    self.cell_orientation(position, width, height) == CellOrientation::TriangleDown;
                triangle_delta(direction, points_down)
            }
            Tessellation::Hexoban => hexagon_delta(direction, row),
            Tessellation::Octoban => {
                if direction.is_diagonal()
                    && self.cell_orientation(position, width, height) != CellOrientation::Octagon
                {
                    return Ok(None);
                }
                square_delta(direction)
            }
        };

        let (x, y) = (column + dx, row + dy);
        if is_on_board_2d(x, y, width, height) {
            Ok(Some(index_1d(x as usize, y as usize, width)))
        } else {
            Ok(None)
        }
    }

    /// Converts a movement character into its direction and push/pull flag.
    pub fn char_to_step(&self, character: char) -> Result<(Direction, bool)> {
        let lower = character.to_ascii_lowercase();
        self.char_map()
            .iter()
            .find(|(c, _)| *c == lower)
            .map(|(_, direction)| (*direction, character.is_ascii_uppercase()))
            .ok_or(Error::IllegalCharacter { character })
    }

    /// Converts a direction and push/pull flag into a movement character.
    pub fn step_to_char(&self, direction: Direction, is_push_or_pull: bool) -> Result<char> {
        self.char_map()
            .iter()
            .find(|(_, d)| *d == direction)
            .map(|(c, _)| if is_push_or_pull { c.to_ascii_uppercase() } else { *c })
            .ok_or(Error::IllegalDirection { direction })
    }
}

fn square_delta(direction: Direction) -> (isize, isize) {
    match direction {
        Up => (0, -1),
        NorthEast => (1, -1),
        Right => (1, 0),
        SouthEast => (1, 1),
        Down => (0, 1),
        SouthWest => (-1, 1),
        Left => (-1, 0),
        NorthWest => (-1, -1),
    }
}

fn triangle_delta(direction: Direction, points_down: bool) -> (isize, isize) {
    match (direction, points_down) {
        (Left, _) => (-1, 0),
        (Right, _) => (1, 0),
        (NorthEast | NorthWest, true) => (0, -1),
        (NorthEast, false) => (1, 0),
        (NorthWest, false) => (-1, 0),
        (SouthEast, true) => (1, 0),
        (SouthWest, true) => (-1, 0),
        (SouthEast | SouthWest, false) => (0, 1),
        // Up/Down are rejected by the legality check before we get here
        (Up | Down, _) => (0, 0),
    }
}

fn hexagon_delta(direction: Direction, row: isize) -> (isize, isize) {
    let odd = row.rem_euclid(2);
    let even = (row + 1).rem_euclid(2);
    match direction {
        Left => (-1, 0),
        Right => (1, 0),
        NorthEast => (odd, -1),
        NorthWest => (-even, -1),
        SouthEast => (odd, 1),
        SouthWest => (-even, 1),
        Up | Down => (0, 0),
    }
}

impl fmt::Display for Tessellation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tessellation::Sokoban => write!(f, "Sokoban"),
            Tessellation::Trioban => write!(f, "Trioban"),
            Tessellation::Hexoban => write!(f, "Hexoban"),
            Tessellation::Octoban => write!(f, "Octoban"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::direction::ALL_DIRECTIONS;
    use proptest::prelude::*;

    #[test]
    fn test_legal_directions() {
        assert_eq!(Tessellation::Sokoban.legal_directions().len(), 4);
        assert_eq!(Tessellation::Trioban.legal_directions().len(), 6);
        assert_eq!(Tessellation::Hexoban.legal_directions().len(), 6);
        assert_eq!(Tessellation::Octoban.legal_directions().len(), 8);
        assert!(!Tessellation::Trioban.is_legal(Up));
        assert!(!Tessellation::Hexoban.is_legal(Down));
        assert!(!Tessellation::Sokoban.is_legal(NorthEast));
    }

    #[test]
    fn test_illegal_direction() {
        let result = Tessellation::Sokoban.neighbor_position(0, NorthWest, 5, 5);
        assert_eq!(result, Err(Error::IllegalDirection { direction: NorthWest }));
    }

    #[test]
    fn test_out_of_range_position() {
        let result = Tessellation::Sokoban.neighbor_position(25, Left, 5, 5);
        assert_eq!(result, Err(Error::OutOfRange { position: 25 }));
    }

    #[test]
    fn test_sokoban_neighbors() {
        let t = Tessellation::Sokoban;
        // 5x5 board, center is 12
        assert_eq!(t.neighbor_position(12, Up, 5, 5), Ok(Some(7)));
        assert_eq!(t.neighbor_position(12, Down, 5, 5), Ok(Some(17)));
        assert_eq!(t.neighbor_position(12, Left, 5, 5), Ok(Some(11)));
        assert_eq!(t.neighbor_position(12, Right, 5, 5), Ok(Some(13)));
        assert_eq!(t.neighbor_position(0, Up, 5, 5), Ok(None));
        assert_eq!(t.neighbor_position(4, Right, 5, 5), Ok(None));
        assert_eq!(t.cell_orientation(3, 5, 5), CellOrientation::Default);
    }

    #[test]
    fn test_trioban_orientation_and_neighbors() {
        let t = Tessellation::Trioban;
        // origin triangle points down
        assert_eq!(t.cell_orientation(0, 5, 5), CellOrientation::TriangleDown);
        assert_eq!(t.cell_orientation(1, 5, 5), CellOrientation::Default);
        assert_eq!(t.cell_orientation(5, 5, 5), CellOrientation::Default);
        assert_eq!(t.cell_orientation(6, 5, 5), CellOrientation::TriangleDown);

        // position 12 = (2, 2) points down
        assert_eq!(t.neighbor_position(12, NorthEast, 5, 5), Ok(Some(7)));
        assert_eq!(t.neighbor_position(12, NorthWest, 5, 5), Ok(Some(7)));
        assert_eq!(t.neighbor_position(12, SouthEast, 5, 5), Ok(Some(13)));
        assert_eq!(t.neighbor_position(12, SouthWest, 5, 5), Ok(Some(11)));

        // position 13 = (3, 2) points up
        assert_eq!(t.neighbor_position(13, NorthEast, 5, 5), Ok(Some(14)));
        assert_eq!(t.neighbor_position(13, NorthWest, 5, 5), Ok(Some(12)));
        assert_eq!(t.neighbor_position(13, SouthEast, 5, 5), Ok(Some(18)));
        assert_eq!(t.neighbor_position(13, SouthWest, 5, 5), Ok(Some(18)));
    }

    #[test]
    fn test_hexoban_neighbors() {
        let t = Tessellation::Hexoban;
        // even row: position 12 = (2, 2)
        assert_eq!(t.neighbor_position(12, NorthEast, 5, 5), Ok(Some(7)));
        assert_eq!(t.neighbor_position(12, NorthWest, 5, 5), Ok(Some(6)));
        assert_eq!(t.neighbor_position(12, SouthEast, 5, 5), Ok(Some(17)));
        assert_eq!(t.neighbor_position(12, SouthWest, 5, 5), Ok(Some(16)));
        // odd row: position 7 = (2, 1)
        assert_eq!(t.neighbor_position(7, NorthEast, 5, 5), Ok(Some(3)));
        assert_eq!(t.neighbor_position(7, NorthWest, 5, 5), Ok(Some(2)));
        assert_eq!(t.neighbor_position(7, SouthEast, 5, 5), Ok(Some(13)));
        assert_eq!(t.neighbor_position(7, SouthWest, 5, 5), Ok(Some(12)));
    }

    #[test]
    fn test_octoban_diagonals_only_from_octagons() {
        let t = Tessellation::Octoban;
        // 12 = (2, 2) is an octagon
        assert_eq!(t.cell_orientation(12, 5, 5), CellOrientation::Octagon);
        assert_eq!(t.neighbor_position(12, NorthEast, 5, 5), Ok(Some(8)));
        assert_eq!(t.neighbor_position(12, SouthWest, 5, 5), Ok(Some(16)));
        // 13 = (3, 2) is a square
        assert_eq!(t.cell_orientation(13, 5, 5), CellOrientation::Default);
        assert_eq!(t.neighbor_position(13, NorthEast, 5, 5), Ok(None));
        assert_eq!(t.neighbor_position(13, Up, 5, 5), Ok(Some(8)));
    }

    #[test]
    fn test_char_maps() {
        assert_eq!(Tessellation::Sokoban.char_to_step('l'), Ok((Left, false)));
        assert_eq!(Tessellation::Sokoban.char_to_step('R'), Ok((Right, true)));
        assert_eq!(
            Tessellation::Sokoban.char_to_step('n'),
            Err(Error::IllegalCharacter { character: 'n' })
        );
        assert_eq!(Tessellation::Trioban.char_to_step('u'), Ok((NorthWest, false)));
        assert_eq!(Tessellation::Octoban.char_to_step('E'), Ok((SouthEast, true)));
        assert_eq!(Tessellation::Hexoban.step_to_char(SouthWest, true), Ok('S'));
        assert_eq!(
            Tessellation::Hexoban.step_to_char(Up, false),
            Err(Error::IllegalDirection { direction: Up })
        );

        for t in Tessellation::ALL {
            for &dir in t.legal_directions() {
                for push in [false, true] {
                    let c = t.step_to_char(dir, push).unwrap();
                    assert_eq!(t.char_to_step(c), Ok((dir, push)));
                }
            }
        }
    }

    proptest! {
        #[test]
        fn prop_neighbor_round_trip(
            width in 1usize..12,
            height in 1usize..12,
            seed in 0usize..144,
            dir_idx in 0usize..8,
        ) {
            let position = seed % (width * height);
            let direction = ALL_DIRECTIONS[dir_idx];
            for t in Tessellation::ALL {
                if !t.is_legal(direction) {
                    continue;
                }
                if let Some(neighbor) = t.neighbor_position(position, direction, width, height).unwrap() {
                    let back = t.neighbor_position(neighbor, direction.opposite(), width, height).unwrap();
                    prop_assert_eq!(back, Some(position), "{} {} {}", t, position, direction);
                }
            }
        }
    }
}
