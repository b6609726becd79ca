//! Error type shared by the board graph, managers and mover.

use derive_more::{Display, Error};

use crate::config::Position;
use crate::direction::Direction;

/// Everything that can go wrong while building or playing a board.
///
/// Any `Err` returned by this crate means no state change occurred.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum Error {
    /// Direction is not legal in the active tessellation.
    #[display("Direction {direction} is not legal in this tessellation")]
    IllegalDirection { direction: Direction },

    /// No direction is mapped to this movement character.
    #[display("Character '{character}' is not a movement character in this tessellation")]
    IllegalCharacter { character: char },

    /// Position lies outside `[0, size)`.
    #[display("Board position {position} is out of range")]
    OutOfRange { position: Position },

    /// Requested board is larger than the supported maximum.
    #[display("Board dimensions {width}x{height} exceed the supported maximum")]
    InvalidDimensions { width: usize, height: usize },

    /// Destination cell already holds a wall, box or pusher.
    #[display("Board position {position} is already occupied")]
    OccupancyConflict { position: Position },

    /// Game rules forbid the requested action.
    #[display("Illegal move: {message}")]
    IllegalMove { message: String },

    /// No such piece id, or no piece of that type on a position.
    #[display("{message}")]
    PieceLookup { message: String },

    /// Sokoban+ boxorder/goalorder data is inconsistent.
    #[display("Invalid Sokoban+ data: {}", errors.join("; "))]
    SokobanPlusData { errors: Vec<String> },

    /// Boxes and goals can't be switched.
    #[display("Unable to switch boxes and goals: {message}")]
    BoxGoalSwitch { message: String },

    /// Board has no pusher, no boxes or box count differs from goal count.
    #[display("Board is not playable")]
    NonPlayableBoard,

    /// Board text contains something that isn't a board character.
    #[display("Invalid board: {message}")]
    BoardParse { message: String },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn illegal_move(message: impl Into<String>) -> Self {
        Error::IllegalMove {
            message: message.into(),
        }
    }

    pub(crate) fn piece_lookup(message: impl Into<String>) -> Self {
        Error::PieceLookup {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            Error::OutOfRange { position: 42 }.to_string(),
            "Board position 42 is out of range"
        );
        assert_eq!(
            Error::IllegalDirection {
                direction: Direction::Up
            }
            .to_string(),
            "Direction Up is not legal in this tessellation"
        );
        assert_eq!(
            Error::SokobanPlusData {
                errors: vec!["a".to_string(), "b".to_string()]
            }
            .to_string(),
            "Invalid Sokoban+ data: a; b"
        );
        assert_eq!(
            Error::illegal_move("Can't push box off board").to_string(),
            "Illegal move: Can't push box off board"
        );
    }
}
