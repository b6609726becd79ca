//! Boards and movement rules for Sokoban and its variants.
//!
//! A [`BoardGraph`] holds the cells of a board together with the adjacency of
//! its [`Tessellation`]. [`BoardManager`] tracks which pusher, box and goal is
//! where, [`HashedBoardManager`] adds Zobrist hashing on top, and [`Mover`]
//! plays moves by the game rules with single step undo.

mod atomic_move;
mod bits;
mod board_cell;
mod board_graph;
mod board_manager;
pub mod config;
mod direction;
mod error;
mod hashed_board_manager;
mod levels;
mod mover;
mod pqueue;
mod snapshot;
mod sokoban_plus;
mod tessellation;
mod zobrist;

pub use atomic_move::{AtomicMove, MoveKind};
pub use bits::{Bitset, BitsetIter};
pub use board_cell::BoardCell;
pub use board_graph::{BoardGraph, Edge, SearchFrame};
pub use board_manager::{BoardManager, BoardState, PieceMove};
pub use config::{DEFAULT_PIECE_ID, PieceId, Position};
pub use direction::{ALL_DIRECTIONS, Direction};
pub use error::{Error, Result};
pub use hashed_board_manager::HashedBoardManager;
pub use levels::{Level, LevelError, Levels};
pub use mover::{Mover, SolvingMode};
pub use snapshot::Snapshot;
pub use sokoban_plus::{DEFAULT_PLUS_ID, LEGACY_DEFAULT_PLUS_ID, PlusId, SokobanPlus};
pub use tessellation::{CellOrientation, Tessellation};
pub use zobrist::Zobrist;
