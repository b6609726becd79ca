//! Crate-wide limits and well-known ids.

/// Widest board a [`BoardGraph`](crate::BoardGraph) accepts.
pub const MAX_WIDTH: usize = 4096;

/// Tallest board a [`BoardGraph`](crate::BoardGraph) accepts.
pub const MAX_HEIGHT: usize = 4096;

/// Piece ids (pushers, boxes, goals) are numbered from here, one namespace per piece type.
pub const DEFAULT_PIECE_ID: PieceId = 1;

/// Cost of stepping onto a wall, deadlock, box or pusher when looking for a move path.
///
/// Larger than any number of unobstructed steps around a single obstacle.
pub const OBSTACLE_WEIGHT: usize = crate::direction::ALL_DIRECTIONS.len() + 1;

/// Board position: row-major index into a `width * height` grid.
pub type Position = usize;

/// Identifier of a pusher, box or goal.
pub type PieceId = usize;

/// Converts `(x, y)` into a board position.
pub fn index_1d(x: usize, y: usize, width: usize) -> Position {
    y * width + x
}

/// Column of `position`.
pub fn index_x(position: Position, width: usize) -> usize {
    if width == 0 { 0 } else { position % width }
}

/// Row of `position`.
pub fn index_y(position: Position, width: usize) -> usize {
    if width == 0 { 0 } else { position / width }
}

pub(crate) fn is_on_board_2d(x: isize, y: isize, width: usize, height: usize) -> bool {
    x >= 0 && y >= 0 && (x as usize) < width && (y as usize) < height
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_conversions() {
        assert_eq!(index_1d(3, 2, 5), 13);
        assert_eq!(index_x(13, 5), 3);
        assert_eq!(index_y(13, 5), 2);
        assert_eq!(index_x(7, 0), 0);
        assert_eq!(index_y(7, 0), 0);
    }

    #[test]
    fn test_is_on_board_2d() {
        assert!(is_on_board_2d(0, 0, 3, 3));
        assert!(is_on_board_2d(2, 2, 3, 3));
        assert!(!is_on_board_2d(-1, 0, 3, 3));
        assert!(!is_on_board_2d(3, 0, 3, 3));
        assert!(!is_on_board_2d(0, 3, 3, 3));
    }
}
