use std::fmt;

use crate::error::{Error, Result};

/// Contents of a single board position.
///
/// Wall, box and pusher are mutually exclusive. A goal can share its cell
/// with a box or a pusher, never with a wall.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoardCell {
    is_wall: bool,
    has_box: bool,
    has_goal: bool,
    has_pusher: bool,
    is_in_playable_area: bool,
    is_deadlock: bool,
}

impl BoardCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses one board character.
    ///
    /// Characters:
    /// - `#` = Wall
    /// - ` `, `-`, `_` = Floor
    /// - `.` = Goal
    /// - `$` = Box
    /// - `*` = Box on goal
    /// - `@` = Pusher
    /// - `+` = Pusher on goal
    pub fn from_char(ch: char) -> Result<Self> {
        let mut cell = BoardCell::new();
        match ch {
            '#' => cell.set_wall(true),
            ' ' | '-' | '_' => {}
            '.' => cell.set_goal(true),
            '$' => cell.set_box(true),
            '*' => {
                cell.set_box(true);
                cell.set_goal(true);
            }
            '@' => cell.set_pusher(true),
            '+' => {
                cell.set_pusher(true);
                cell.set_goal(true);
            }
            _ => {
                return Err(Error::BoardParse {
                    message: format!("invalid character '{}'", ch),
                });
            }
        }
        Ok(cell)
    }

    pub fn to_char(&self) -> char {
        match (self.is_wall, self.has_box, self.has_pusher, self.has_goal) {
            (true, ..) => '#',
            (_, true, _, true) => '*',
            (_, true, _, false) => '$',
            (_, _, true, true) => '+',
            (_, _, true, false) => '@',
            (_, _, _, true) => '.',
            _ => ' ',
        }
    }

    pub fn is_wall(&self) -> bool {
        self.is_wall
    }

    pub fn has_box(&self) -> bool {
        self.has_box
    }

    pub fn has_goal(&self) -> bool {
        self.has_goal
    }

    pub fn has_pusher(&self) -> bool {
        self.has_pusher
    }

    pub fn is_in_playable_area(&self) -> bool {
        self.is_in_playable_area
    }

    pub fn is_deadlock(&self) -> bool {
        self.is_deadlock
    }

    pub fn is_empty_floor(&self) -> bool {
        !(self.is_wall || self.has_box || self.has_goal || self.has_pusher)
    }

    pub fn has_piece(&self) -> bool {
        self.has_box || self.has_goal || self.has_pusher
    }

    pub fn can_put_pusher_or_box(&self) -> bool {
        !(self.is_wall || self.has_box || self.has_pusher)
    }

    pub fn set_wall(&mut self, value: bool) {
        self.is_wall = value;
        if value {
            self.has_box = false;
            self.has_goal = false;
            self.has_pusher = false;
        }
    }

    pub fn set_box(&mut self, value: bool) {
        self.has_box = value;
        if value {
            self.is_wall = false;
            self.has_pusher = false;
        }
    }

    pub fn set_goal(&mut self, value: bool) {
        self.has_goal = value;
        if value {
            self.is_wall = false;
        }
    }

    pub fn set_pusher(&mut self, value: bool) {
        self.has_pusher = value;
        if value {
            self.is_wall = false;
            self.has_box = false;
        }
    }

    pub fn set_in_playable_area(&mut self, value: bool) {
        self.is_in_playable_area = value;
    }

    pub fn set_deadlock(&mut self, value: bool) {
        self.is_deadlock = value;
    }

    /// Removes all pieces and walls, keeping the analysis flags.
    pub fn clear(&mut self) {
        self.is_wall = false;
        self.has_box = false;
        self.has_goal = false;
        self.has_pusher = false;
    }
}

impl fmt::Display for BoardCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}
