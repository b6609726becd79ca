use std::fmt;

use itertools::Itertools;

use crate::atomic_move::{AtomicMove, MoveKind};
use crate::error::{Error, Result};
use crate::mover::SolvingMode;
use crate::tessellation::Tessellation;

/// Ordered sequence of moves played on one board.
///
/// Text form is one character per step: lowercase for moves, uppercase for
/// pushes or pulls, letters as mapped by the tessellation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Snapshot {
    tessellation: Tessellation,
    solving_mode: SolvingMode,
    moves: Vec<AtomicMove>,
}

impl Snapshot {
    pub fn new(tessellation: Tessellation, solving_mode: SolvingMode) -> Self {
        Snapshot {
            tessellation,
            solving_mode,
            moves: Vec::new(),
        }
    }

    /// Parses a move string, ignoring whitespace.
    pub fn from_moves_str(
        tessellation: Tessellation,
        solving_mode: SolvingMode,
        moves: &str,
    ) -> Result<Self> {
        let mut snapshot = Snapshot::new(tessellation, solving_mode);
        for character in moves.chars().filter(|c| !c.is_whitespace()) {
            let (direction, is_push_or_pull) = tessellation.char_to_step(character)?;
            snapshot.push(if is_push_or_pull {
                AtomicMove::push_or_pull(direction)
            } else {
                AtomicMove::step(direction)
            });
        }
        Ok(snapshot)
    }

    pub fn tessellation(&self) -> Tessellation {
        self.tessellation
    }

    pub fn solving_mode(&self) -> SolvingMode {
        self.solving_mode
    }

    pub fn push(&mut self, atomic_move: AtomicMove) {
        self.moves.push(atomic_move);
    }

    pub fn extend<I: IntoIterator<Item = AtomicMove>>(&mut self, moves: I) {
        self.moves.extend(moves);
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AtomicMove> {
        self.moves.iter()
    }

    /// Steps that moved no box.
    pub fn moves_count(&self) -> usize {
        self.moves.iter().filter(|m| m.is_move()).count()
    }

    pub fn pushes_count(&self) -> usize {
        self.moves.iter().filter(|m| m.is_push_or_pull()).count()
    }

    /// Number of jumps. Consecutive jump steps form one jump.
    pub fn jumps_count(&self) -> usize {
        let mut count = 0;
        let mut in_jump = false;
        for m in &self.moves {
            if m.is_jump() && !in_jump {
                count += 1;
            }
            in_jump = m.is_jump();
        }
        count
    }

    /// Writes moves and pushes as characters. Jump and pusher selection steps
    /// have no character and fail with
    /// [`IllegalDirection`](crate::Error::IllegalDirection).
    pub fn to_moves_string(&self) -> Result<String> {
        self.moves
            .iter()
            .map(|m| match m.kind {
                MoveKind::Move => self.tessellation.step_to_char(m.direction, false),
                MoveKind::PushOrPull { .. } => self.tessellation.step_to_char(m.direction, true),
                MoveKind::Jump | MoveKind::PusherSelection => {
                    Err(Error::IllegalDirection {
                        direction: m.direction,
                    })
                }
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a AtomicMove;
    type IntoIter = std::slice::Iter<'a, AtomicMove>;

    fn into_iter(self) -> Self::IntoIter {
        self.moves.iter()
    }
}

/// Jumps are shown in `[]`, pusher selections in `{}`.
impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let runs = self.moves.iter().chunk_by(|m| match m.kind {
            MoveKind::Jump => Some(('[', ']')),
            MoveKind::PusherSelection => Some(('{', '}')),
            _ => None,
        });
        for (brackets, run) in &runs {
            let text: String = run
                .map(|m| {
                    self.tessellation
                        .step_to_char(m.direction, m.is_push_or_pull())
                        .unwrap_or('?')
                })
                .collect();
            match brackets {
                Some((open, close)) => write!(f, "{}{}{}", open, text, close)?,
                None => write!(f, "{}", text)?,
            }
        }
        Ok(())
    }
}
