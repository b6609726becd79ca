use std::collections::VecDeque;
use std::fmt;

use arrayvec::ArrayVec;
use tracing::{debug, instrument};

use crate::bits::Bitset;
use crate::board_cell::BoardCell;
use crate::config::{MAX_HEIGHT, MAX_WIDTH, OBSTACLE_WEIGHT, Position, index_1d};
use crate::direction::Direction;
use crate::error::{Error, Result};
use crate::pqueue::PriorityQueue;
use crate::tessellation::Tessellation;

/// Directed edge leaving a board position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub target: Position,
    pub direction: Direction,
}

/// Search state handed to the [`BoardGraph::reachables_with`] observer after
/// each dequeued position.
#[derive(Debug)]
pub struct SearchFrame<'a> {
    pub position: Position,
    pub reachables: &'a [Position],
    pub to_inspect: &'a VecDeque<Position>,
    /// Every position seen so far, obstacles and excluded cells included.
    pub visited: &'a Bitset,
    pub excluded: &'a [Position],
}

/// Board cells plus the adjacency table of their tessellation.
///
/// Edges are computed once at construction and never change; cell contents
/// are freely mutable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardGraph {
    width: usize,
    height: usize,
    tessellation: Tessellation,
    cells: Vec<BoardCell>,
    // Out edges per position, in legal direction order
    edges: Vec<ArrayVec<Edge, 8>>,
}

impl BoardGraph {
    /// Creates a board of empty floor cells.
    pub fn new(width: usize, height: usize, tessellation: Tessellation) -> Result<Self> {
        if width > MAX_WIDTH || height > MAX_HEIGHT {
            return Err(Error::InvalidDimensions { width, height });
        }

        let size = width * height;
        let mut edges = Vec::with_capacity(size);
        for position in 0..size {
            let mut out = ArrayVec::new();
            for &direction in tessellation.legal_directions() {
                if let Some(target) =
                    tessellation.neighbor_position(position, direction, width, height)?
                {
                    out.push(Edge { target, direction });
                }
            }
            edges.push(out);
        }

        Ok(BoardGraph {
            width,
            height,
            tessellation,
            cells: vec![BoardCell::new(); size],
            edges,
        })
    }

    /// Parses a board with one character per cell (see [`BoardCell::from_char`]).
    ///
    /// Short rows are padded with floor; trailing blank rows are dropped.
    pub fn from_text(text: &str, tessellation: Tessellation) -> Result<Self> {
        let mut lines: Vec<&str> = text.lines().collect();
        while lines.last().is_some_and(|line| line.trim().is_empty()) {
            lines.pop();
        }

        let height = lines.len();
        let width = lines
            .iter()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);

        let mut board = BoardGraph::new(width, height, tessellation)?;
        for (y, line) in lines.iter().enumerate() {
            for (x, ch) in line.chars().enumerate() {
                board.cells[index_1d(x, y, width)] =
                    BoardCell::from_char(ch).map_err(|_| Error::BoardParse {
                        message: format!("invalid character '{}' at ({}, {})", ch, x, y),
                    })?;
            }
        }
        Ok(board)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn size(&self) -> usize {
        self.cells.len()
    }

    pub fn tessellation(&self) -> Tessellation {
        self.tessellation
    }

    pub fn contains(&self, position: Position) -> bool {
        position < self.cells.len()
    }

    fn check(&self, position: Position) -> Result<()> {
        if self.contains(position) {
            Ok(())
        } else {
            Err(Error::OutOfRange { position })
        }
    }

    pub fn get(&self, position: Position) -> Result<&BoardCell> {
        self.cells
            .get(position)
            .ok_or(Error::OutOfRange { position })
    }

    pub fn get_mut(&mut self, position: Position) -> Result<&mut BoardCell> {
        self.cells
            .get_mut(position)
            .ok_or(Error::OutOfRange { position })
    }

    pub fn set(&mut self, position: Position, cell: BoardCell) -> Result<()> {
        *self.get_mut(position)? = cell;
        Ok(())
    }

    pub fn out_edges(&self, position: Position) -> Result<&[Edge]> {
        self.edges
            .get(position)
            .map(|edges| edges.as_slice())
            .ok_or(Error::OutOfRange { position })
    }

    /// Neighbor of `position` in `direction`, `None` if there is no such edge.
    pub fn neighbor(&self, position: Position, direction: Direction) -> Result<Option<Position>> {
        Ok(self
            .out_edges(position)?
            .iter()
            .find(|edge| edge.direction == direction)
            .map(|edge| edge.target))
    }

    pub fn all_neighbors(&self, position: Position) -> Result<Vec<Position>> {
        Ok(self
            .out_edges(position)?
            .iter()
            .map(|edge| edge.target)
            .collect())
    }

    pub fn wall_neighbors(&self, position: Position) -> Result<Vec<Position>> {
        Ok(self
            .out_edges(position)?
            .iter()
            .map(|edge| edge.target)
            .filter(|&target| self.cells[target].is_wall())
            .collect())
    }

    /// Positions reachable from `root` without stepping on walls, boxes or pushers.
    ///
    /// See [`BoardGraph::reachables_with`].
    pub fn reachables(&self, root: Position, excluded: &[Position]) -> Result<Vec<Position>> {
        self.reachables_with(
            root,
            excluded,
            |position| !self.cells[position].can_put_pusher_or_box(),
            |_| {},
        )
    }

    /// Breadth-first search from `root`.
    ///
    /// The result always starts with `root`. Excluded positions are searched
    /// through but left out of the result. Out of range excluded positions are
    /// ignored. `observer` sees the search state after each dequeued position
    /// and has no effect on the result.
    pub fn reachables_with<F, O>(
        &self,
        root: Position,
        excluded: &[Position],
        is_obstacle: F,
        mut observer: O,
    ) -> Result<Vec<Position>>
    where
        F: Fn(Position) -> bool,
        O: FnMut(&SearchFrame<'_>),
    {
        self.check(root)?;

        let mut excluded_set = Bitset::with_capacity(self.size());
        for &position in excluded.iter().filter(|&&p| self.contains(p)) {
            excluded_set.insert(position);
        }

        let mut reachables = Vec::new();
        let mut visited = Bitset::with_capacity(self.size());
        let mut to_inspect = VecDeque::from([root]);
        visited.insert(root);

        while let Some(position) = to_inspect.pop_front() {
            if position == root || !excluded_set.contains(position) {
                reachables.push(position);
            }

            for edge in &self.edges[position] {
                if visited.insert(edge.target) && !is_obstacle(edge.target) {
                    to_inspect.push_back(edge.target);
                }
            }

            observer(&SearchFrame {
                position,
                reachables: &reachables,
                to_inspect: &to_inspect,
                visited: &visited,
                excluded,
            });
        }

        Ok(reachables)
    }

    /// Shortest path ignoring cell contents, including both endpoints.
    ///
    /// Empty if `end` can't be reached from `start`.
    pub fn find_jump_path(&self, start: Position, end: Position) -> Result<Vec<Position>> {
        self.check(start)?;
        self.check(end)?;

        let mut parents: Vec<Option<Position>> = vec![None; self.size()];
        let mut visited = Bitset::with_capacity(self.size());
        let mut queue = VecDeque::from([start]);
        visited.insert(start);

        while let Some(position) = queue.pop_front() {
            if position == end {
                return Ok(Self::backtrack(&parents, start, end));
            }
            for edge in &self.edges[position] {
                if visited.insert(edge.target) {
                    parents[edge.target] = Some(position);
                    queue.push_back(edge.target);
                }
            }
        }

        Ok(Vec::new())
    }

    /// Cheapest path where stepping onto a wall, deadlock, box or pusher costs
    /// [`OBSTACLE_WEIGHT`] instead of 1.
    ///
    /// Obstacles are discouraged, not forbidden. Ties go to the path found
    /// first in edge order. Empty if `end` can't be reached.
    pub fn find_move_path(&self, start: Position, end: Position) -> Result<Vec<Position>> {
        self.check(start)?;
        self.check(end)?;

        let mut distances = vec![usize::MAX; self.size()];
        let mut parents: Vec<Option<Position>> = vec![None; self.size()];
        let mut queue = PriorityQueue::new();
        distances[start] = 0;
        queue.push(0, start);

        while let Some((distance, position)) = queue.pop_min() {
            if distance > distances[position] {
                continue;
            }
            if position == end {
                return Ok(Self::backtrack(&parents, start, end));
            }
            for edge in &self.edges[position] {
                let next = distance + self.edge_weight(edge.target);
                if next < distances[edge.target] {
                    distances[edge.target] = next;
                    parents[edge.target] = Some(position);
                    queue.push(next, edge.target);
                }
            }
        }

        Ok(Vec::new())
    }

    fn edge_weight(&self, target: Position) -> usize {
        let cell = &self.cells[target];
        if cell.is_wall() || cell.is_deadlock() || cell.has_box() || cell.has_pusher() {
            OBSTACLE_WEIGHT
        } else {
            1
        }
    }

    fn backtrack(parents: &[Option<Position>], start: Position, end: Position) -> Vec<Position> {
        let mut path = vec![end];
        let mut current = end;
        while current != start {
            match parents[current] {
                Some(parent) => {
                    path.push(parent);
                    current = parent;
                }
                None => return Vec::new(),
            }
        }
        path.reverse();
        path
    }

    pub fn positions_reachable_by_pusher(
        &self,
        pusher_position: Position,
        excluded: &[Position],
    ) -> Result<Vec<Position>> {
        self.reachables(pusher_position, excluded)
    }

    /// Smallest position the pusher can walk to, used to compare pusher
    /// placements that are equivalent.
    pub fn normalized_pusher_position(
        &self,
        pusher_position: Position,
        excluded: &[Position],
    ) -> Result<Position> {
        Ok(self
            .positions_reachable_by_pusher(pusher_position, excluded)?
            .into_iter()
            .min()
            .unwrap_or(pusher_position))
    }

    /// Flags every cell a box or pusher could ever reach, treating only walls
    /// as obstacles.
    #[instrument(skip(self))]
    pub fn mark_play_area(&mut self) {
        let mut roots = Vec::new();
        for (position, cell) in self.cells.iter_mut().enumerate() {
            let is_root = cell.has_box() || cell.has_pusher();
            cell.set_in_playable_area(is_root);
            if is_root {
                roots.push(position);
            }
        }

        let mut marked = Bitset::with_capacity(self.size());
        for root in roots {
            if marked.contains(root) {
                continue;
            }
            let reachables = self
                .reachables_with(root, &[], |p| self.cells[p].is_wall(), |_| {})
                .unwrap_or_default();
            for position in reachables {
                marked.insert(position);
            }
        }

        for position in marked.iter() {
            self.cells[position].set_in_playable_area(true);
        }
        debug!(cells = marked.len(), "marked play area");
    }

    /// Follows `directions` from `start`, stopping at the last position before
    /// a step would leave the board.
    pub fn path_destination(&self, start: Position, directions: &[Direction]) -> Result<Position> {
        self.check(start)?;
        let mut position = start;
        for &direction in directions {
            match self.neighbor(position, direction)? {
                Some(next) => position = next,
                None => break,
            }
        }
        Ok(position)
    }

    /// Converts a path of positions into its first position and the directions
    /// of each step. Consecutive positions that aren't adjacent contribute no
    /// direction.
    pub fn positions_path_to_directions_path(
        &self,
        positions: &[Position],
    ) -> Result<(Option<Position>, Vec<Direction>)> {
        for &position in positions {
            self.check(position)?;
        }

        let directions = positions
            .windows(2)
            .filter_map(|step| {
                self.edges[step[0]]
                    .iter()
                    .find(|edge| edge.target == step[1])
                    .map(|edge| edge.direction)
            })
            .collect();

        Ok((positions.first().copied(), directions))
    }
}

impl fmt::Display for BoardGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.width == 0 {
            return Ok(());
        }
        for row in self.cells.chunks(self.width) {
            let line: String = row.iter().map(|cell| cell.to_char()).collect();
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Direction::*;
    use proptest::prelude::*;

    fn board(text: &str) -> BoardGraph {
        BoardGraph::from_text(text, Tessellation::Sokoban).unwrap()
    }

    #[test]
    fn test_from_text() {
        let input = "#####\n\
                     #@$.#\n\
                     #####";
        let board = board(input);
        assert_eq!(board.width(), 5);
        assert_eq!(board.height(), 3);
        assert_eq!(board.size(), 15);
        assert!(board.get(6).unwrap().has_pusher());
        assert!(board.get(7).unwrap().has_box());
        assert!(board.get(8).unwrap().has_goal());
        assert!(board.get(0).unwrap().is_wall());
        assert_eq!(board.get(15), Err(Error::OutOfRange { position: 15 }));
    }

    #[test]
    fn test_from_text_pads_short_rows() {
        let board = board("####\n#@\n####\n\n");
        assert_eq!(board.width(), 4);
        assert_eq!(board.height(), 3);
        assert!(board.get(7).unwrap().is_empty_floor());
    }

    #[test]
    fn test_from_text_invalid() {
        let result = BoardGraph::from_text("#x#", Tessellation::Sokoban);
        assert!(matches!(result, Err(Error::BoardParse { .. })));
    }

    #[test]
    fn test_too_large() {
        assert_eq!(
            BoardGraph::new(MAX_WIDTH + 1, 1, Tessellation::Sokoban),
            Err(Error::InvalidDimensions {
                width: MAX_WIDTH + 1,
                height: 1
            })
        );
    }

    #[test]
    fn test_display() {
        let input = "#####\n\
                     #+$ #\n\
                     # *.#\n\
                     #####\n";
        assert_eq!(board(input).to_string(), input);
    }

    #[test]
    fn test_neighbor_and_edges() {
        let board = BoardGraph::new(3, 3, Tessellation::Sokoban).unwrap();
        assert_eq!(board.neighbor(4, Up), Ok(Some(1)));
        assert_eq!(board.neighbor(0, Left), Ok(None));
        // illegal directions simply have no edge
        assert_eq!(board.neighbor(4, NorthEast), Ok(None));
        assert_eq!(board.out_edges(4).unwrap().len(), 4);
        assert_eq!(board.out_edges(0).unwrap().len(), 2);
        assert_eq!(board.all_neighbors(4).unwrap(), vec![3, 5, 1, 7]);
        assert_eq!(board.neighbor(9, Up), Err(Error::OutOfRange { position: 9 }));
    }

    #[test]
    fn test_wall_neighbors() {
        let board = board("###\n#@ \n###");
        assert_eq!(board.wall_neighbors(4).unwrap(), vec![3, 1, 7]);
    }

    #[test]
    fn test_reachables() {
        let input = "######\n\
                     #@ $ #\n\
                     # ## #\n\
                     ######";
        let board = board(input);
        let reachables = board.reachables(7, &[]).unwrap();
        assert_eq!(reachables, vec![7, 8, 13]);
    }

    #[test]
    fn test_reachables_excluded() {
        let input = "#####\n\
                     #@  #\n\
                     #####";
        let board = board(input);
        // excluded cells are still walked through
        assert_eq!(board.reachables(6, &[7]).unwrap(), vec![6, 8]);
        // root stays in the result even when excluded
        assert_eq!(board.reachables(6, &[6, 100]).unwrap(), vec![6, 7, 8]);
    }

    #[test]
    fn test_reachables_observer() {
        let board = board("#####\n#@  #\n#####");
        let mut frames = Vec::new();
        let result = board
            .reachables_with(
                6,
                &[],
                |p| board.get(p).unwrap().is_wall(),
                |frame| frames.push((frame.position, frame.reachables.len())),
            )
            .unwrap();
        assert_eq!(result, vec![6, 7, 8]);
        assert_eq!(frames, vec![(6, 1), (7, 2), (8, 3)]);
    }

    #[test]
    fn test_reachables_observer_sees_visited() {
        let board = board("######
#@$  #
######");
        let mut box_seen = Vec::new();
        let result = board
            .reachables_with(
                7,
                &[],
                |p| !board.get(p).unwrap().can_put_pusher_or_box(),
                |frame| {
                    assert!(frame.visited.contains(frame.position));
                    box_seen.push(frame.visited.contains(8));
                },
            )
            .unwrap();
        // the box blocks the search but is still marked
        assert_eq!(result, vec![7]);
        assert_eq!(box_seen, vec![true]);
    }

    #[test]
    fn test_find_jump_path() {
        let input = "#####\n\
                     #@$ #\n\
                     #####";
        let board = board(input);
        assert_eq!(board.find_jump_path(6, 8).unwrap(), vec![6, 7, 8]);
        assert_eq!(board.find_jump_path(6, 6).unwrap(), vec![6]);
        assert_eq!(
            board.find_jump_path(6, 99),
            Err(Error::OutOfRange { position: 99 })
        );
    }

    #[test]
    fn test_find_jump_path_unreachable() {
        let board = BoardGraph::new(0, 0, Tessellation::Sokoban).unwrap();
        assert!(board.find_jump_path(0, 0).is_err());

        // in a single trioban column the two triangles only touch at a corner
        let board = BoardGraph::new(1, 2, Tessellation::Trioban).unwrap();
        assert!(board.out_edges(0).unwrap().is_empty());
        assert_eq!(board.find_jump_path(0, 1).unwrap(), Vec::<Position>::new());
        assert_eq!(board.find_move_path(0, 1).unwrap(), Vec::<Position>::new());
    }

    #[test]
    fn test_find_move_path_avoids_obstacles() {
        let input = "#####\n\
                     #@$ #\n\
                     #   #\n\
                     #####";
        let board = board(input);
        // straight through the box costs 1 + 9, around it costs 4
        assert_eq!(board.find_move_path(6, 8).unwrap(), vec![6, 11, 12, 13, 8]);
        assert_eq!(board.find_jump_path(6, 8).unwrap(), vec![6, 7, 8]);
    }

    #[test]
    fn test_find_move_path_through_obstacle() {
        let input = "#####\n\
                     #@$ #\n\
                     #####";
        let board = board(input);
        // no way around, so the box is crossed
        assert_eq!(board.find_move_path(6, 8).unwrap(), vec![6, 7, 8]);
    }

    #[test]
    fn test_normalized_pusher_position() {
        let input = "######\n\
                     #  $@#\n\
                     ######";
        let board = board(input);
        assert_eq!(board.normalized_pusher_position(10, &[]).unwrap(), 10);

        let board = self::board("#####\n#  @#\n#####");
        assert_eq!(board.normalized_pusher_position(8, &[]).unwrap(), 6);
    }

    #[test]
    fn test_mark_play_area() {
        let input = "#######\n\
                     #@ #  #\n\
                     #$ #  #\n\
                     #######";
        let mut board = board(input);
        board.mark_play_area();
        let playable: Vec<Position> = (0..board.size())
            .filter(|&p| board.get(p).unwrap().is_in_playable_area())
            .collect();
        assert_eq!(playable, vec![8, 9, 15, 16]);
    }

    #[test]
    fn test_path_destination() {
        let board = BoardGraph::new(3, 3, Tessellation::Sokoban).unwrap();
        assert_eq!(board.path_destination(4, &[Up, Left]).unwrap(), 0);
        // stops at the edge of the board
        assert_eq!(board.path_destination(4, &[Up, Up, Left]).unwrap(), 1);
        assert_eq!(board.path_destination(4, &[]).unwrap(), 4);
        assert!(board.path_destination(9, &[]).is_err());
    }

    #[test]
    fn test_positions_path_to_directions_path() {
        let board = BoardGraph::new(3, 3, Tessellation::Sokoban).unwrap();
        assert_eq!(
            board.positions_path_to_directions_path(&[0, 1, 4, 3]).unwrap(),
            (Some(0), vec![Right, Down, Left])
        );
        assert_eq!(
            board.positions_path_to_directions_path(&[]).unwrap(),
            (None, vec![])
        );
        assert!(board.positions_path_to_directions_path(&[0, 42]).is_err());
    }

    #[test]
    fn test_hexoban_edges() {
        let board = BoardGraph::new(5, 5, Tessellation::Hexoban).unwrap();
        assert_eq!(board.out_edges(12).unwrap().len(), 6);
        assert_eq!(board.neighbor(12, NorthWest), Ok(Some(6)));
    }

    const ROOM: &str = "#######\n\
                        #     #\n\
                        #     #\n\
                        #     #\n\
                        #     #\n\
                        #     #\n\
                        #######";

    // Maps 0..25 onto the floor of ROOM
    fn room_position(index: usize) -> Position {
        (1 + index / 5) * 7 + 1 + index % 5
    }

    fn place_obstacle(board: &mut BoardGraph, index: usize, kind: usize) {
        let cell = board.get_mut(room_position(index)).unwrap();
        match kind {
            0 => cell.set_wall(true),
            1 => cell.set_box(true),
            _ => cell.set_deadlock(true),
        }
    }

    fn path_cost(board: &BoardGraph, path: &[Position]) -> usize {
        path.iter().skip(1).map(|&p| board.edge_weight(p)).sum()
    }

    proptest! {
        #[test]
        fn prop_move_path_cost_grows_with_obstacles(
            start in 0usize..25,
            end in 0usize..25,
            obstacles in prop::collection::vec((0usize..25, 0usize..3), 0..24),
            split in 0usize..24,
        ) {
            let (start, end) = (room_position(start), room_position(end));
            let split = split.min(obstacles.len());
            for tessellation in Tessellation::ALL {
                let mut board = BoardGraph::from_text(ROOM, tessellation).unwrap();
                for &(index, kind) in &obstacles[..split] {
                    place_obstacle(&mut board, index, kind);
                }
                let sparse_path = board.find_move_path(start, end).unwrap();
                let sparse_cost = path_cost(&board, &sparse_path);

                let jump_path = board.find_jump_path(start, end).unwrap();
                prop_assert_eq!(jump_path.is_empty(), sparse_path.is_empty());
                if !jump_path.is_empty() {
                    prop_assert!(jump_path.len() <= sparse_path.len());
                    prop_assert!(sparse_cost <= path_cost(&board, &jump_path));
                }

                for &(index, kind) in &obstacles[split..] {
                    place_obstacle(&mut board, index, kind);
                }
                let dense_path = board.find_move_path(start, end).unwrap();
                prop_assert_eq!(dense_path.is_empty(), sparse_path.is_empty());
                prop_assert!(path_cost(&board, &dense_path) >= sparse_cost);
            }
        }
    }
}
