use std::cell::OnceCell;
use std::collections::HashSet;
use std::ops::Deref;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument, trace};

use crate::board_graph::BoardGraph;
use crate::board_manager::{BoardManager, BoardState, PieceMove};
use crate::config::{PieceId, Position};
use crate::error::Result;
use crate::zobrist::Zobrist;

/// [`BoardManager`] that keeps a Zobrist hash of the board up to date.
///
/// Moving a piece updates the hash incrementally, so moving it back restores
/// the previous value. Pushers are interchangeable, as are boxes with equal
/// Sokoban+ tags. Hash factors are redrawn whenever Sokoban+ is switched on
/// or off, which changes every hash value.
///
/// Read-only [`BoardManager`] methods are available through `Deref`.
#[derive(Debug, Clone)]
pub struct HashedBoardManager {
    manager: BoardManager,
    rng: ChaCha8Rng,
    zobrist: Zobrist,
    state_hash: u64,
    boxes_hash: u64,
    solutions_hashes: OnceCell<HashSet<u64>>,
}

impl HashedBoardManager {
    /// Creates a manager with randomly seeded hash factors.
    pub fn new(board: BoardGraph) -> Self {
        Self::with_seed(board, rand::random())
    }

    /// Creates a manager whose hash values are reproducible for `seed`.
    pub fn with_seed(board: BoardGraph, seed: u64) -> Self {
        let manager = BoardManager::new(board);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let zobrist = Zobrist::new(&mut rng, &manager);
        let mut hashed = HashedBoardManager {
            manager,
            rng,
            zobrist,
            state_hash: 0,
            boxes_hash: 0,
            solutions_hashes: OnceCell::new(),
        };
        hashed.recompute_hashes();
        hashed
    }

    pub fn into_board(self) -> BoardGraph {
        self.manager.into_board()
    }

    pub fn zobrist(&self) -> &Zobrist {
        &self.zobrist
    }

    /// Hash of the current pusher and box positions.
    pub fn state_hash(&self) -> u64 {
        self.state_hash
    }

    /// Hash of the current box positions alone.
    pub fn boxes_hash(&self) -> u64 {
        self.boxes_hash
    }

    /// Hash of a board without pieces; every other hash starts from it.
    pub fn initial_state_hash(&self) -> u64 {
        self.zobrist.seed()
    }

    /// What [`state_hash`](Self::state_hash) would be with pieces placed as
    /// in `state`.
    ///
    /// `None` if `state` has the wrong number of boxes or positions off board.
    pub fn external_state_hash(&self, state: &BoardState) -> Option<u64> {
        self.zobrist.state_hash(&self.manager, state)
    }

    /// Box hashes of every solved layout, computed on first use.
    ///
    /// Boxes with equal tags share factors, so all solutions of a board hash
    /// alike and the set holds at most one value.
    pub fn solutions_hashes(&self) -> &HashSet<u64> {
        self.solutions_hashes
            .get_or_init(|| self.solved_boxes_hash().into_iter().collect())
    }

    /// Boxes hash with a box of the goal's tag on every goal.
    fn solved_boxes_hash(&self) -> Option<u64> {
        let manager = &self.manager;
        if manager.boxes_count() != manager.goals_count() || manager.boxes_count() == 0 {
            return None;
        }
        manager
            .goals_ids()
            .into_iter()
            .try_fold(self.zobrist.seed(), |hash, goal_id| {
                let tag = manager.goal_plus_id(goal_id).ok()?;
                let position = manager.goal_position(goal_id).ok()?;
                Some(hash ^ self.zobrist.box_hash(tag, position)?)
            })
    }

    pub fn is_solved(&self) -> bool {
        self.solutions_hashes().contains(&self.boxes_hash)
    }

    pub fn state(&self) -> BoardState {
        BoardState {
            zobrist_hash: Some(self.state_hash),
            ..self.manager.state()
        }
    }

    pub fn move_pusher_from(&mut self, from: Position, to: Position) -> Result<()> {
        self.manager.move_pusher_from(from, to)?;
        self.pusher_moved(from, to);
        Ok(())
    }

    pub fn move_pusher(&mut self, pusher_id: PieceId, to: Position) -> Result<()> {
        self.move_pusher_from(self.manager.pusher_position(pusher_id)?, to)
    }

    pub fn move_box_from(&mut self, from: Position, to: Position) -> Result<()> {
        if from == to {
            return Ok(());
        }
        let box_id = self.manager.box_id_on(from)?;
        self.manager.move_box_from(from, to)?;
        self.box_moved(box_id, from, to);
        Ok(())
    }

    pub fn move_box(&mut self, box_id: PieceId, to: Position) -> Result<()> {
        self.move_box_from(self.manager.box_position(box_id)?, to)
    }

    /// See [`BoardManager::switch_boxes_and_goals`].
    pub fn switch_boxes_and_goals(&mut self) -> Result<Vec<PieceMove>> {
        let moves = self.manager.switch_boxes_and_goals()?;
        for piece_move in &moves {
            match *piece_move {
                PieceMove::Pusher { from, to, .. } => self.pusher_moved(from, to),
                PieceMove::Box { id, from, to } => self.box_moved(id, from, to),
            }
        }
        // Goals moved, so the solved layouts did too
        self.solutions_hashes.take();
        Ok(moves)
    }

    pub fn set_boxorder(&mut self, boxorder: &str) {
        let was_enabled = self.manager.is_sokoban_plus_enabled();
        self.manager.set_boxorder(boxorder);
        self.sokoban_plus_changed(was_enabled);
    }

    pub fn set_goalorder(&mut self, goalorder: &str) {
        let was_enabled = self.manager.is_sokoban_plus_enabled();
        self.manager.set_goalorder(goalorder);
        self.sokoban_plus_changed(was_enabled);
    }

    pub fn enable_sokoban_plus(&mut self) -> Result<()> {
        let was_enabled = self.manager.is_sokoban_plus_enabled();
        self.manager.enable_sokoban_plus()?;
        self.sokoban_plus_changed(was_enabled);
        Ok(())
    }

    pub fn disable_sokoban_plus(&mut self) {
        let was_enabled = self.manager.is_sokoban_plus_enabled();
        self.manager.disable_sokoban_plus();
        self.sokoban_plus_changed(was_enabled);
    }

    fn sokoban_plus_changed(&mut self, was_enabled: bool) {
        if self.manager.is_sokoban_plus_enabled() != was_enabled {
            self.rehash();
        }
    }

    /// Draws new hash factors and recomputes every hash from scratch.
    #[instrument(skip(self))]
    pub fn rehash(&mut self) {
        self.zobrist = Zobrist::new(&mut self.rng, &self.manager);
        self.solutions_hashes.take();
        self.recompute_hashes();
        debug!(
            sokoban_plus = self.manager.is_sokoban_plus_enabled(),
            "redrew Zobrist factors"
        );
    }

    fn recompute_hashes(&mut self) {
        let tags = self.manager.box_tags();
        let seed = self.zobrist.seed();
        let boxes = self
            .zobrist
            .boxes_hash(&tags, self.manager.boxes_positions())
            .unwrap_or_default();
        let pushers = self
            .zobrist
            .pushers_hash(self.manager.pushers_positions())
            .unwrap_or_default();
        self.boxes_hash = seed ^ boxes;
        self.state_hash = seed ^ boxes ^ pushers;
        trace!(state_hash = self.state_hash, "recomputed Zobrist hashes");
    }

    fn pusher_moved(&mut self, from: Position, to: Position) {
        if from == to {
            return;
        }
        let factors = self.zobrist.pusher_hash(from).unwrap_or_default()
            ^ self.zobrist.pusher_hash(to).unwrap_or_default();
        self.state_hash ^= factors;
    }

    fn box_moved(&mut self, box_id: PieceId, from: Position, to: Position) {
        if from == to {
            return;
        }
        let tag = self.manager.box_plus_id(box_id).unwrap_or_default();
        let factors = self.zobrist.box_hash(tag, from).unwrap_or_default()
            ^ self.zobrist.box_hash(tag, to).unwrap_or_default();
        self.state_hash ^= factors;
        self.boxes_hash ^= factors;
    }
}

impl Deref for HashedBoardManager {
    type Target = BoardManager;

    fn deref(&self) -> &BoardManager {
        &self.manager
    }
}
