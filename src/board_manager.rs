use itertools::Itertools;
use tracing::{debug, instrument};

use crate::bits::Bitset;
use crate::board_graph::BoardGraph;
use crate::config::{DEFAULT_PIECE_ID, PieceId, Position};
use crate::error::{Error, Result};
use crate::sokoban_plus::{DEFAULT_PLUS_ID, PlusId, SokobanPlus};

/// Pusher and box positions, ordered by piece id.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct BoardState {
    pub pushers_positions: Vec<Position>,
    pub boxes_positions: Vec<Position>,
    pub zobrist_hash: Option<u64>,
}

impl BoardState {
    pub fn new(pushers_positions: Vec<Position>, boxes_positions: Vec<Position>) -> Self {
        BoardState {
            pushers_positions,
            boxes_positions,
            zobrist_hash: None,
        }
    }
}

/// A piece relocation performed by the manager on its own, such as when
/// boxes and goals are switched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceMove {
    Pusher {
        id: PieceId,
        from: Position,
        to: Position,
    },
    Box {
        id: PieceId,
        from: Position,
        to: Position,
    },
}

/// Id to position mapping for one kind of piece, in both directions.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Pieces {
    // Index is piece id - DEFAULT_PIECE_ID
    positions: Vec<Position>,
    // Maps board position to piece id
    index: Vec<Option<PieceId>>,
}

impl Pieces {
    fn new(board_size: usize) -> Self {
        Pieces {
            positions: Vec::new(),
            index: vec![None; board_size],
        }
    }

    fn add(&mut self, position: Position) {
        let id = self.positions.len() + DEFAULT_PIECE_ID;
        self.positions.push(position);
        self.index[position] = Some(id);
    }

    fn count(&self) -> usize {
        self.positions.len()
    }

    fn ids(&self) -> Vec<PieceId> {
        (DEFAULT_PIECE_ID..DEFAULT_PIECE_ID + self.count()).collect()
    }

    fn position(&self, id: PieceId) -> Option<Position> {
        id.checked_sub(DEFAULT_PIECE_ID)
            .and_then(|idx| self.positions.get(idx))
            .copied()
    }

    fn id_on(&self, position: Position) -> Option<PieceId> {
        self.index.get(position).copied().flatten()
    }

    /// Moves several pieces at once; targets may be cells other moved pieces
    /// are leaving.
    fn relocate_all(&mut self, moves: &[(PieceId, Position)]) {
        for &(id, _) in moves {
            if let Some(from) = self.position(id) {
                self.index[from] = None;
            }
        }
        for &(id, to) in moves {
            self.positions[id - DEFAULT_PIECE_ID] = to;
            self.index[to] = Some(id);
        }
    }
}

/// Tracks which pusher, box and goal is where.
///
/// Pieces get ids by scanning the board in position order when the manager
/// is created, starting at [`DEFAULT_PIECE_ID`] for each kind. Moving pieces
/// through the manager keeps their ids; editing cells directly doesn't and
/// isn't possible while the manager owns the board.
///
/// Movement here is pure bookkeeping. Game rules live in
/// [`Mover`](crate::Mover).
#[derive(Debug, Clone)]
pub struct BoardManager {
    board: BoardGraph,
    pushers: Pieces,
    boxes: Pieces,
    goals: Pieces,
    walls: Vec<Position>,
    sokoban_plus: SokobanPlus,
}

impl BoardManager {
    pub fn new(board: BoardGraph) -> Self {
        let size = board.size();
        let mut pushers = Pieces::new(size);
        let mut boxes = Pieces::new(size);
        let mut goals = Pieces::new(size);
        let mut walls = Vec::new();

        for position in 0..size {
            let Ok(cell) = board.get(position) else {
                continue;
            };
            if cell.has_pusher() {
                pushers.add(position);
            }
            if cell.has_box() {
                boxes.add(position);
            }
            if cell.has_goal() {
                goals.add(position);
            }
            if cell.is_wall() {
                walls.push(position);
            }
        }

        let sokoban_plus = SokobanPlus::new(boxes.count(), "", "");
        BoardManager {
            board,
            pushers,
            boxes,
            goals,
            walls,
            sokoban_plus,
        }
    }

    pub fn board(&self) -> &BoardGraph {
        &self.board
    }

    pub fn into_board(self) -> BoardGraph {
        self.board
    }

    pub fn walls_positions(&self) -> &[Position] {
        &self.walls
    }

    // Pushers

    pub fn pushers_count(&self) -> usize {
        self.pushers.count()
    }

    pub fn pushers_ids(&self) -> Vec<PieceId> {
        self.pushers.ids()
    }

    /// Pusher positions, ordered by pusher id.
    pub fn pushers_positions(&self) -> &[Position] {
        &self.pushers.positions
    }

    pub fn pusher_position(&self, pusher_id: PieceId) -> Result<Position> {
        self.pushers
            .position(pusher_id)
            .ok_or_else(|| Error::piece_lookup(format!("No pusher with ID: {}", pusher_id)))
    }

    pub fn pusher_id_on(&self, position: Position) -> Result<PieceId> {
        self.pushers
            .id_on(position)
            .ok_or_else(|| Error::piece_lookup(format!("No pusher on position: {}", position)))
    }

    pub fn has_pusher(&self, pusher_id: PieceId) -> bool {
        self.pushers.position(pusher_id).is_some()
    }

    pub fn has_pusher_on(&self, position: Position) -> bool {
        self.pushers.id_on(position).is_some()
    }

    /// Moves the pusher standing on `from` to `to`.
    ///
    /// Fails if there is no pusher on `from` or if `to` holds a wall, box or
    /// another pusher.
    pub fn move_pusher_from(&mut self, from: Position, to: Position) -> Result<()> {
        if from == to {
            return Ok(());
        }
        let id = self.pusher_id_on(from)?;
        self.check_destination(to)?;

        self.pushers.relocate_all(&[(id, to)]);
        self.board.get_mut(from)?.set_pusher(false);
        self.board.get_mut(to)?.set_pusher(true);
        Ok(())
    }

    pub fn move_pusher(&mut self, pusher_id: PieceId, to: Position) -> Result<()> {
        self.move_pusher_from(self.pusher_position(pusher_id)?, to)
    }

    // Boxes

    pub fn boxes_count(&self) -> usize {
        self.boxes.count()
    }

    pub fn boxes_ids(&self) -> Vec<PieceId> {
        self.boxes.ids()
    }

    /// Box positions, ordered by box id.
    pub fn boxes_positions(&self) -> &[Position] {
        &self.boxes.positions
    }

    pub fn box_position(&self, box_id: PieceId) -> Result<Position> {
        self.boxes
            .position(box_id)
            .ok_or_else(|| Error::piece_lookup(format!("No box with ID: {}", box_id)))
    }

    pub fn box_id_on(&self, position: Position) -> Result<PieceId> {
        self.boxes
            .id_on(position)
            .ok_or_else(|| Error::piece_lookup(format!("No box on position: {}", position)))
    }

    pub fn has_box(&self, box_id: PieceId) -> bool {
        self.boxes.position(box_id).is_some()
    }

    pub fn has_box_on(&self, position: Position) -> bool {
        self.boxes.id_on(position).is_some()
    }

    /// Moves the box standing on `from` to `to`.
    ///
    /// Fails if there is no box on `from` or if `to` holds a wall, box or
    /// pusher.
    pub fn move_box_from(&mut self, from: Position, to: Position) -> Result<()> {
        if from == to {
            return Ok(());
        }
        let id = self.box_id_on(from)?;
        self.check_destination(to)?;

        self.boxes.relocate_all(&[(id, to)]);
        self.board.get_mut(from)?.set_box(false);
        self.board.get_mut(to)?.set_box(true);
        Ok(())
    }

    pub fn move_box(&mut self, box_id: PieceId, to: Position) -> Result<()> {
        self.move_box_from(self.box_position(box_id)?, to)
    }

    fn check_destination(&self, to: Position) -> Result<()> {
        if self.board.get(to)?.can_put_pusher_or_box() {
            Ok(())
        } else {
            Err(Error::OccupancyConflict { position: to })
        }
    }

    // Goals

    pub fn goals_count(&self) -> usize {
        self.goals.count()
    }

    pub fn goals_ids(&self) -> Vec<PieceId> {
        self.goals.ids()
    }

    /// Goal positions, ordered by goal id.
    pub fn goals_positions(&self) -> &[Position] {
        &self.goals.positions
    }

    pub fn goal_position(&self, goal_id: PieceId) -> Result<Position> {
        self.goals
            .position(goal_id)
            .ok_or_else(|| Error::piece_lookup(format!("No goal with ID: {}", goal_id)))
    }

    pub fn goal_id_on(&self, position: Position) -> Result<PieceId> {
        self.goals
            .id_on(position)
            .ok_or_else(|| Error::piece_lookup(format!("No goal on position: {}", position)))
    }

    pub fn has_goal(&self, goal_id: PieceId) -> bool {
        self.goals.position(goal_id).is_some()
    }

    pub fn has_goal_on(&self, position: Position) -> bool {
        self.goals.id_on(position).is_some()
    }

    // Sokoban+

    pub fn sokoban_plus(&self) -> &SokobanPlus {
        &self.sokoban_plus
    }

    pub fn box_plus_id(&self, box_id: PieceId) -> Result<PlusId> {
        self.sokoban_plus.box_plus_id(box_id)
    }

    pub fn goal_plus_id(&self, goal_id: PieceId) -> Result<PlusId> {
        self.sokoban_plus.goal_plus_id(goal_id)
    }

    pub fn boxorder(&self) -> String {
        self.sokoban_plus.boxorder()
    }

    pub fn goalorder(&self) -> String {
        self.sokoban_plus.goalorder()
    }

    pub fn set_boxorder(&mut self, boxorder: &str) {
        self.sokoban_plus.set_boxorder(boxorder);
    }

    pub fn set_goalorder(&mut self, goalorder: &str) {
        self.sokoban_plus.set_goalorder(goalorder);
    }

    pub fn enable_sokoban_plus(&mut self) -> Result<()> {
        self.sokoban_plus.enable()
    }

    pub fn disable_sokoban_plus(&mut self) {
        self.sokoban_plus.disable();
    }

    pub fn is_sokoban_plus_enabled(&self) -> bool {
        self.sokoban_plus.is_enabled()
    }

    pub fn is_sokoban_plus_valid(&self) -> bool {
        self.sokoban_plus.is_valid()
    }

    /// Sokoban+ tag of each box, ordered by box id.
    pub fn box_tags(&self) -> Vec<PlusId> {
        self.boxes_ids()
            .into_iter()
            .map(|id| self.box_plus_id(id).unwrap_or(DEFAULT_PLUS_ID))
            .collect()
    }

    fn tags_match(&self, box_id: PieceId, goal_id: PieceId) -> bool {
        match (self.box_plus_id(box_id), self.goal_plus_id(goal_id)) {
            (Ok(box_tag), Ok(goal_tag)) => box_tag == goal_tag,
            _ => false,
        }
    }

    // Game state

    /// True when every box sits on a goal with the same Sokoban+ tag.
    pub fn is_solved(&self) -> bool {
        self.boxes_count() == self.goals_count()
            && self.boxes_count() > 0
            && self.is_solution(&self.boxes.positions)
    }

    /// Every box layout that solves the board, boxes ordered by id.
    ///
    /// Tries all permutations of goal positions, so only use this on boards
    /// with a handful of boxes.
    pub fn solutions(&self) -> impl Iterator<Item = BoardState> + '_ {
        let solvable = self.boxes_count() == self.goals_count() && self.boxes_count() > 0;
        self.goals
            .positions
            .iter()
            .copied()
            .permutations(self.goals_count())
            .filter(move |layout| solvable && self.is_solution(layout))
            .map(|layout| BoardState::new(Vec::new(), layout))
    }

    fn is_solution(&self, boxes_positions: &[Position]) -> bool {
        boxes_positions
            .iter()
            .enumerate()
            .all(|(idx, &position)| match self.goals.id_on(position) {
                Some(goal_id) => self.tags_match(idx + DEFAULT_PIECE_ID, goal_id),
                None => false,
            })
    }

    /// Pairs each goal, in goal id order, with the first unpaired box of the
    /// same tag (Sokoban+) or the same id.
    pub fn box_goal_pairs(&self) -> Result<Vec<(PieceId, PieceId)>> {
        if self.boxes_count() != self.goals_count() {
            return Err(Error::BoxGoalSwitch {
                message: format!(
                    "box count ({}) differs from goal count ({})",
                    self.boxes_count(),
                    self.goals_count()
                ),
            });
        }

        let plus_enabled = self.is_sokoban_plus_enabled();
        let mut boxes_todo = self.boxes_ids();
        let mut pairs = Vec::with_capacity(boxes_todo.len());
        for goal_id in self.goals_ids() {
            let idx = boxes_todo
                .iter()
                .position(|&box_id| {
                    if plus_enabled {
                        self.tags_match(box_id, goal_id)
                    } else {
                        box_id == goal_id
                    }
                })
                .ok_or_else(|| Error::BoxGoalSwitch {
                    message: format!("no box to pair with goal {}", goal_id),
                })?;
            pairs.push((boxes_todo.remove(idx), goal_id));
        }
        Ok(pairs)
    }

    /// Exchanges the positions of each box and its paired goal.
    ///
    /// Pushers standing on a goal that receives a box are moved to the cell
    /// the paired box left. If that cell gets another box, the pusher goes to
    /// the nearest free cell instead. Nothing changes unless every piece can
    /// be placed.
    #[instrument(skip(self))]
    pub fn switch_boxes_and_goals(&mut self) -> Result<Vec<PieceMove>> {
        let mut swaps = Vec::new();
        for (box_id, goal_id) in self.box_goal_pairs()? {
            let box_position = self.box_position(box_id)?;
            let goal_position = self.goal_position(goal_id)?;
            if box_position != goal_position {
                swaps.push((box_id, goal_id, box_position, goal_position));
            }
        }

        let size = self.board.size();
        let mut final_boxes = Bitset::with_capacity(size);
        for (idx, &position) in self.boxes.positions.iter().enumerate() {
            let id = idx + DEFAULT_PIECE_ID;
            let target = swaps
                .iter()
                .find(|swap| swap.0 == id)
                .map_or(position, |swap| swap.3);
            final_boxes.insert(target);
        }

        let mut displaced = Vec::new();
        for &(_, _, box_position, goal_position) in &swaps {
            if let Some(pusher_id) = self.pushers.id_on(goal_position) {
                displaced.push((pusher_id, goal_position, box_position));
            }
        }

        let mut taken = Bitset::with_capacity(size);
        for &position in &self.pushers.positions {
            if !displaced.iter().any(|d| d.1 == position) {
                taken.insert(position);
            }
        }

        let mut pusher_moves = Vec::with_capacity(displaced.len());
        for (pusher_id, from, preferred) in displaced {
            let is_free = |p: Position| !final_boxes.contains(p) && !taken.contains(p);
            let target = if is_free(preferred) {
                preferred
            } else {
                self.board
                    .reachables_with(preferred, &[], |p| self.is_wall(p), |_| {})?
                    .into_iter()
                    .find(|&p| is_free(p))
                    .ok_or_else(|| Error::BoxGoalSwitch {
                        message: format!("no free cell left for pusher {}", pusher_id),
                    })?
            };
            taken.insert(target);
            pusher_moves.push((pusher_id, from, target));
        }

        // Validated, now apply
        for &(_, from, _) in &pusher_moves {
            self.board.get_mut(from)?.set_pusher(false);
        }
        for &(_, _, box_position, goal_position) in &swaps {
            self.board.get_mut(box_position)?.set_box(false);
            self.board.get_mut(goal_position)?.set_goal(false);
        }
        for &(_, _, box_position, goal_position) in &swaps {
            self.board.get_mut(goal_position)?.set_box(true);
            self.board.get_mut(box_position)?.set_goal(true);
        }
        for &(_, _, to) in &pusher_moves {
            self.board.get_mut(to)?.set_pusher(true);
        }

        let box_targets: Vec<_> = swaps.iter().map(|s| (s.0, s.3)).collect();
        let goal_targets: Vec<_> = swaps.iter().map(|s| (s.1, s.2)).collect();
        let pusher_targets: Vec<_> = pusher_moves.iter().map(|m| (m.0, m.2)).collect();
        self.boxes.relocate_all(&box_targets);
        self.goals.relocate_all(&goal_targets);
        self.pushers.relocate_all(&pusher_targets);

        debug!(
            swapped = swaps.len(),
            displaced_pushers = pusher_moves.len(),
            "switched boxes and goals"
        );

        let moves = swaps
            .iter()
            .map(|&(id, _, from, to)| PieceMove::Box { id, from, to })
            .chain(
                pusher_moves
                    .iter()
                    .map(|&(id, from, to)| PieceMove::Pusher { id, from, to }),
            )
            .collect();
        Ok(moves)
    }

    fn is_wall(&self, position: Position) -> bool {
        self.board.get(position).is_ok_and(|cell| cell.is_wall())
    }

    /// At least one pusher and as many goals as there are boxes (and at least
    /// one box).
    pub fn is_playable(&self) -> bool {
        self.pushers_count() > 0
            && self.boxes_count() == self.goals_count()
            && self.boxes_count() > 0
    }

    pub fn state(&self) -> BoardState {
        BoardState::new(self.pushers.positions.clone(), self.boxes.positions.clone())
    }
}
