use std::fmt;

use crate::config::{DEFAULT_PIECE_ID, PieceId};
use crate::direction::Direction;

/// What a single step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKind {
    /// Pusher walked without moving a box.
    Move,
    /// Pusher pushed (forward) or pulled (reverse) a box. Moves read from
    /// text don't know which box.
    PushOrPull { box_id: Option<PieceId> },
    /// Step along the path of a reverse mode jump.
    Jump,
    /// Step along the path between the previously and newly selected pusher.
    PusherSelection,
}

/// One step of pusher movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AtomicMove {
    pub direction: Direction,
    pub kind: MoveKind,
    pub pusher_id: PieceId,
}

impl AtomicMove {
    pub fn new(direction: Direction, kind: MoveKind, pusher_id: PieceId) -> Self {
        AtomicMove {
            direction,
            kind,
            pusher_id,
        }
    }

    /// Plain move of the default pusher.
    pub fn step(direction: Direction) -> Self {
        Self::new(direction, MoveKind::Move, DEFAULT_PIECE_ID)
    }

    pub fn push_or_pull(direction: Direction) -> Self {
        Self::new(
            direction,
            MoveKind::PushOrPull { box_id: None },
            DEFAULT_PIECE_ID,
        )
    }

    pub fn jump(direction: Direction) -> Self {
        Self::new(direction, MoveKind::Jump, DEFAULT_PIECE_ID)
    }

    pub fn pusher_selection(direction: Direction) -> Self {
        Self::new(direction, MoveKind::PusherSelection, DEFAULT_PIECE_ID)
    }

    pub fn with_pusher(self, pusher_id: PieceId) -> Self {
        AtomicMove { pusher_id, ..self }
    }

    /// Records which box a push or pull moved. Other kinds are returned
    /// unchanged.
    pub fn with_moved_box(self, box_id: PieceId) -> Self {
        match self.kind {
            MoveKind::PushOrPull { .. } => AtomicMove {
                kind: MoveKind::PushOrPull {
                    box_id: Some(box_id),
                },
                ..self
            },
            _ => self,
        }
    }

    pub fn is_move(&self) -> bool {
        self.kind == MoveKind::Move
    }

    pub fn is_push_or_pull(&self) -> bool {
        matches!(self.kind, MoveKind::PushOrPull { .. })
    }

    pub fn is_jump(&self) -> bool {
        self.kind == MoveKind::Jump
    }

    pub fn is_pusher_selection(&self) -> bool {
        self.kind == MoveKind::PusherSelection
    }

    /// Box moved by this step, if it was a push or pull.
    pub fn moved_box_id(&self) -> Option<PieceId> {
        match self.kind {
            MoveKind::PushOrPull { box_id } => box_id,
            _ => None,
        }
    }
}

impl fmt::Display for AtomicMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            MoveKind::Move => write!(f, "{}", self.direction),
            MoveKind::PushOrPull { box_id: Some(id) } => {
                write!(f, "{} (box #{})", self.direction, id)
            }
            MoveKind::PushOrPull { box_id: None } => write!(f, "{} (box)", self.direction),
            MoveKind::Jump => write!(f, "{} (jump)", self.direction),
            MoveKind::PusherSelection => write!(f, "{} (select)", self.direction),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_are_exclusive() {
        let moves = [
            AtomicMove::step(Direction::Up),
            AtomicMove::push_or_pull(Direction::Up).with_moved_box(3),
            AtomicMove::jump(Direction::Up),
            AtomicMove::pusher_selection(Direction::Up),
        ];
        for m in &moves {
            let flags = [
                m.is_move(),
                m.is_push_or_pull(),
                m.is_jump(),
                m.is_pusher_selection(),
            ];
            assert_eq!(flags.iter().filter(|&&f| f).count(), 1);
        }
        assert_eq!(moves[1].moved_box_id(), Some(3));
        assert_eq!(moves[0].moved_box_id(), None);
        assert_eq!(moves[2].moved_box_id(), None);
        assert_eq!(AtomicMove::push_or_pull(Direction::Up).moved_box_id(), None);
    }

    #[test]
    fn test_with_pusher() {
        let m = AtomicMove::step(Direction::Left).with_pusher(2);
        assert_eq!(m.pusher_id, 2);
        assert_eq!(m.direction, Direction::Left);
        assert!(m.is_move());
        assert_eq!(m.with_moved_box(4), m);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            AtomicMove::push_or_pull(Direction::Down)
                .with_moved_box(1)
                .to_string(),
            "Down (box #1)"
        );
        assert_eq!(AtomicMove::jump(Direction::Right).to_string(), "Right (jump)");
    }
}
