//! Game rules for moving pushers around a board.
//!
//! In forward mode pushers push boxes toward goals. In reverse mode boxes and
//! goals are switched first and pushers pull boxes back to where they
//! started, optionally jumping around before the first pull.

use itertools::Itertools;
use tracing::{debug, instrument, trace};

use crate::atomic_move::{AtomicMove, MoveKind};
use crate::board_graph::BoardGraph;
use crate::config::{DEFAULT_PIECE_ID, PieceId, Position};
use crate::direction::Direction;
use crate::error::{Error, Result};
use crate::hashed_board_manager::HashedBoardManager;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolvingMode {
    #[default]
    Forward,
    Reverse,
}

/// Runs of the last move that are undone together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UndoGroup {
    Step,
    Jump,
    PusherSelection,
}

impl UndoGroup {
    fn of(atomic_move: &AtomicMove) -> Self {
        match atomic_move.kind {
            MoveKind::Jump => UndoGroup::Jump,
            MoveKind::PusherSelection => UndoGroup::PusherSelection,
            MoveKind::Move | MoveKind::PushOrPull { .. } => UndoGroup::Step,
        }
    }
}

/// Moves pushers on a board it owns, enforcing the rules of its
/// [`SolvingMode`].
///
/// Only the most recent action is remembered, and
/// [`undo_last_move`](Mover::undo_last_move) reverts exactly that. A failed
/// action changes nothing.
#[derive(Debug, Clone)]
pub struct Mover {
    initial_board: BoardGraph,
    manager: HashedBoardManager,
    solving_mode: SolvingMode,
    pulls_boxes: bool,
    selected_pusher: PieceId,
    pull_count: usize,
    last_move: Vec<AtomicMove>,
}

impl Mover {
    pub fn new(board: BoardGraph, solving_mode: SolvingMode) -> Result<Self> {
        Self::with_manager(HashedBoardManager::new(board), solving_mode)
    }

    /// Takes over `manager`. In reverse mode its boxes and goals are
    /// switched immediately.
    pub fn with_manager(
        mut manager: HashedBoardManager,
        solving_mode: SolvingMode,
    ) -> Result<Self> {
        if !manager.is_playable() {
            return Err(Error::NonPlayableBoard);
        }
        let initial_board = manager.board().clone();
        if solving_mode == SolvingMode::Reverse {
            manager.switch_boxes_and_goals()?;
        }
        Ok(Mover {
            initial_board,
            manager,
            solving_mode,
            pulls_boxes: true,
            selected_pusher: DEFAULT_PIECE_ID,
            pull_count: 0,
            last_move: Vec::new(),
        })
    }

    pub fn board(&self) -> &BoardGraph {
        self.manager.board()
    }

    /// Board as it was handed over, before any switch or move.
    pub fn initial_board(&self) -> &BoardGraph {
        &self.initial_board
    }

    pub fn board_manager(&self) -> &HashedBoardManager {
        &self.manager
    }

    pub fn solving_mode(&self) -> SolvingMode {
        self.solving_mode
    }

    pub fn selected_pusher(&self) -> PieceId {
        self.selected_pusher
    }

    /// Whether reverse mode moves pull the box behind the pusher.
    pub fn pulls_boxes(&self) -> bool {
        self.pulls_boxes
    }

    pub fn set_pulls_boxes(&mut self, value: bool) {
        self.pulls_boxes = value;
    }

    /// Number of pulls not yet undone.
    pub fn pull_count(&self) -> usize {
        self.pull_count
    }

    pub fn last_move(&self) -> &[AtomicMove] {
        &self.last_move
    }

    /// Replaces what [`undo_last_move`](Mover::undo_last_move) will revert.
    pub fn set_last_move(&mut self, moves: Vec<AtomicMove>) {
        self.last_move = moves;
    }

    /// Moves the selected pusher one step, pushing (forward) or pulling
    /// (reverse) a box when the rules call for it.
    #[instrument(skip(self), fields(pusher = self.selected_pusher))]
    pub fn move_pusher(&mut self, direction: Direction) -> Result<()> {
        self.check_direction(direction)?;
        let step = match self.solving_mode {
            SolvingMode::Forward => self.push_or_move(direction, false),
            SolvingMode::Reverse => self.pull_or_move(direction, self.pulls_boxes, true),
        }
        .inspect_err(|err| debug!(%err, "rejected move"))?;

        trace!(%step, "moved");
        self.last_move = vec![step];
        Ok(())
    }

    /// Puts the selected pusher on `position` directly.
    ///
    /// Only allowed in reverse mode before the first pull, and only to a
    /// position the board graph connects to the pusher. Jumping in place
    /// does nothing.
    #[instrument(skip(self), fields(pusher = self.selected_pusher))]
    pub fn jump(&mut self, position: Position) -> Result<()> {
        let jumped = self
            .jump_to(position)
            .inspect_err(|err| debug!(%err, "rejected jump"))?;
        if let Some(moves) = jumped {
            self.last_move = moves;
        }
        Ok(())
    }

    /// Makes `pusher_id` the pusher that moves. Pushers stay where they are.
    ///
    /// Fails if the board graph doesn't connect the two pushers.
    #[instrument(skip(self))]
    pub fn select_pusher(&mut self, pusher_id: PieceId) -> Result<()> {
        if let Some(moves) = self.select(pusher_id)? {
            self.last_move = moves;
        }
        Ok(())
    }

    /// Reverts the last action and records the reverting steps as the new
    /// last move.
    #[instrument(skip(self), fields(steps = self.last_move.len()))]
    pub fn undo_last_move(&mut self) -> Result<()> {
        let saved = (self.manager.clone(), self.selected_pusher, self.pull_count);
        let last_move = std::mem::take(&mut self.last_move);

        match self.undo_moves(&last_move) {
            Ok(undone) => {
                self.last_move = undone;
                Ok(())
            }
            Err(err) => {
                debug!(%err, "rejected undo");
                (self.manager, self.selected_pusher, self.pull_count) = saved;
                self.last_move = last_move;
                Err(err)
            }
        }
    }

    fn check_direction(&self, direction: Direction) -> Result<()> {
        if self.board().tessellation().is_legal(direction) {
            Ok(())
        } else {
            Err(Error::IllegalDirection { direction })
        }
    }

    fn selected_position(&self) -> Result<Position> {
        self.manager.pusher_position(self.selected_pusher)
    }

    fn pusher_target(&self, from: Position, direction: Direction) -> Result<Position> {
        self.board().neighbor(from, direction)?.ok_or_else(|| {
            Error::illegal_move(format!(
                "Can't move pusher off board! (ID: {}, direction: {})",
                self.selected_pusher, direction
            ))
        })
    }

    fn push_or_move(&mut self, direction: Direction, decrease_pull_count: bool) -> Result<AtomicMove> {
        let from = self.selected_position()?;
        let target = self.pusher_target(from, direction)?;

        let mut step = AtomicMove::step(direction).with_pusher(self.selected_pusher);
        if self.manager.has_box_on(target) {
            let box_id = self.manager.box_id_on(target)?;
            let beyond = self.board().neighbor(target, direction)?.ok_or_else(|| {
                Error::illegal_move(format!(
                    "Can't push box off board (ID: {}, direction: {})",
                    box_id, direction
                ))
            })?;
            self.manager
                .move_box_from(target, beyond)
                .map_err(rule_violation)?;
            step = AtomicMove::push_or_pull(direction)
                .with_pusher(self.selected_pusher)
                .with_moved_box(box_id);
        }
        self.manager
            .move_pusher_from(from, target)
            .map_err(rule_violation)?;

        if step.is_push_or_pull() && decrease_pull_count {
            self.pull_count = self.pull_count.saturating_sub(1);
        }
        Ok(step)
    }

    fn pull_or_move(
        &mut self,
        direction: Direction,
        force_pulls: bool,
        increase_pull_count: bool,
    ) -> Result<AtomicMove> {
        let from = self.selected_position()?;
        let target = self.pusher_target(from, direction)?;
        self.manager
            .move_pusher_from(from, target)
            .map_err(rule_violation)?;

        let mut step = AtomicMove::step(direction).with_pusher(self.selected_pusher);
        if !force_pulls {
            return Ok(step);
        }
        if let Some(behind) = self.board().neighbor(from, direction.opposite())? {
            if self.manager.has_box_on(behind) {
                let box_id = self.manager.box_id_on(behind)?;
                // `from` was just vacated
                self.manager
                    .move_box_from(behind, from)
                    .map_err(rule_violation)?;
                if increase_pull_count {
                    self.pull_count += 1;
                }
                step = AtomicMove::push_or_pull(direction)
                    .with_pusher(self.selected_pusher)
                    .with_moved_box(box_id);
            }
        }
        Ok(step)
    }

    /// Returns `None` for a jump in place.
    fn jump_to(&mut self, position: Position) -> Result<Option<Vec<AtomicMove>>> {
        if self.pull_count != 0 {
            return Err(Error::illegal_move("Jumps not allowed after first pull"));
        }
        if self.solving_mode != SolvingMode::Reverse {
            return Err(Error::illegal_move(
                "Jumps allowed only in reverse solving mode",
            ));
        }

        let from = self.selected_position()?;
        if from == position {
            return Ok(None);
        }
        let path = self.board().find_jump_path(from, position)?;
        if path.is_empty() {
            return Err(Error::illegal_move(format!(
                "Can't jump from {} to unconnected position {}",
                from, position
            )));
        }
        let (_, directions) = self.board().positions_path_to_directions_path(&path)?;
        self.manager
            .move_pusher_from(from, position)
            .map_err(rule_violation)?;

        let pusher_id = self.selected_pusher;
        Ok(Some(
            directions
                .into_iter()
                .map(|direction| AtomicMove::new(direction, MoveKind::Jump, pusher_id))
                .collect(),
        ))
    }

    /// Returns `None` if `pusher_id` is already selected.
    fn select(&mut self, pusher_id: PieceId) -> Result<Option<Vec<AtomicMove>>> {
        if pusher_id == self.selected_pusher {
            return Ok(None);
        }
        let from = self.selected_position()?;
        let to = self.manager.pusher_position(pusher_id)?;
        let path = self.board().find_jump_path(from, to)?;
        if path.is_empty() {
            return Err(Error::illegal_move(format!(
                "Can't select pusher on unconnected position (ID: {}, position: {})",
                pusher_id, to
            )));
        }
        let (_, directions) = self.board().positions_path_to_directions_path(&path)?;

        self.selected_pusher = pusher_id;
        Ok(Some(
            directions
                .into_iter()
                .map(|direction| {
                    AtomicMove::new(direction, MoveKind::PusherSelection, pusher_id)
                })
                .collect(),
        ))
    }

    fn undo_moves(&mut self, moves: &[AtomicMove]) -> Result<Vec<AtomicMove>> {
        let mut undone = Vec::with_capacity(moves.len());
        let groups = moves.iter().rev().chunk_by(|&atomic_move| UndoGroup::of(atomic_move));
        for (group, run) in &groups {
            let run: Vec<AtomicMove> = run.copied().collect();
            match group {
                UndoGroup::Step => {
                    for step in &run {
                        undone.push(self.undo_step(step)?);
                    }
                }
                UndoGroup::Jump => {
                    let target = self.retraced_position(&run)?;
                    undone.extend(self.jump_to(target)?.unwrap_or_default());
                }
                UndoGroup::PusherSelection => {
                    let target = self.retraced_position(&run)?;
                    let pusher_id = self.manager.pusher_id_on(target)?;
                    undone.extend(self.select(pusher_id)?.unwrap_or_default());
                }
            }
        }
        Ok(undone)
    }

    fn undo_step(&mut self, step: &AtomicMove) -> Result<AtomicMove> {
        self.check_direction(step.direction)?;
        match self.solving_mode {
            SolvingMode::Forward => {
                let was_push = step.is_push_or_pull();
                if was_push {
                    let pusher = self.selected_position()?;
                    let box_ahead = self
                        .board()
                        .neighbor(pusher, step.direction)?
                        .is_some_and(|position| self.manager.has_box_on(position));
                    if !box_ahead {
                        return Err(Error::illegal_move(
                            "Requested push undo, but no box behind pusher!",
                        ));
                    }
                }
                self.pull_or_move(step.direction.opposite(), was_push, false)
            }
            SolvingMode::Reverse => self.push_or_move(step.direction.opposite(), true),
        }
    }

    /// Where the selected pusher ends up walking `run` backwards. `run` is
    /// already in reverse order.
    fn retraced_position(&self, run: &[AtomicMove]) -> Result<Position> {
        let directions: Vec<Direction> = run.iter().map(|m| m.direction.opposite()).collect();
        self.board()
            .path_destination(self.selected_position()?, &directions)
    }
}

fn rule_violation(err: Error) -> Error {
    match err {
        Error::OccupancyConflict { .. } => Error::illegal_move(err.to_string()),
        other => other,
    }
}
