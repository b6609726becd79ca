//! Sokoban+ tags for boxes and goals.
//!
//! Under Sokoban+ rules every box and goal carries a numeric tag and a board
//! is solved only when each goal holds a box with the same tag. Tags come
//! from two whitespace separated strings: `boxorder` assigns tags to boxes by
//! id, `goalorder` does the same for goals.

use itertools::Itertools;
use tracing::{debug, instrument};

use crate::config::{DEFAULT_PIECE_ID, PieceId};
use crate::error::{Error, Result};

/// Sokoban+ tag.
pub type PlusId = u32;

/// Tag of untagged pieces, and of every piece while Sokoban+ is disabled.
pub const DEFAULT_PLUS_ID: PlusId = 0;

/// Older puzzles use 99 for untagged pieces. Only honored on boards with
/// fewer than 99 boxes.
pub const LEGACY_DEFAULT_PLUS_ID: PlusId = 99;

#[derive(Debug, Clone, PartialEq, Eq)]
struct PlusTables {
    // Indexed by piece id - DEFAULT_PIECE_ID
    boxes: Vec<PlusId>,
    goals: Vec<PlusId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SokobanPlus {
    pieces_count: usize,
    boxorder: String,
    goalorder: String,
    // Present only while enabled
    tables: Option<PlusTables>,
}

impl SokobanPlus {
    pub fn new(pieces_count: usize, boxorder: &str, goalorder: &str) -> Self {
        SokobanPlus {
            pieces_count,
            boxorder: boxorder.to_string(),
            goalorder: goalorder.to_string(),
            tables: None,
        }
    }

    pub fn pieces_count(&self) -> usize {
        self.pieces_count
    }

    pub fn is_enabled(&self) -> bool {
        self.tables.is_some()
    }

    /// Box tags as given, or normalized (legacy tags converted, trailing
    /// defaults removed) while enabled.
    pub fn boxorder(&self) -> String {
        match &self.tables {
            Some(tables) => normalized_order(&tables.boxes),
            None => self.boxorder.clone(),
        }
    }

    pub fn goalorder(&self) -> String {
        match &self.tables {
            Some(tables) => normalized_order(&tables.goals),
            None => self.goalorder.clone(),
        }
    }

    /// Replaces box tags. Any change disables Sokoban+.
    pub fn set_boxorder(&mut self, boxorder: &str) {
        if boxorder != self.boxorder {
            self.tables = None;
            self.boxorder = boxorder.to_string();
        }
    }

    /// Replaces goal tags. Any change disables Sokoban+.
    pub fn set_goalorder(&mut self, goalorder: &str) {
        if goalorder != self.goalorder {
            self.tables = None;
            self.goalorder = goalorder.to_string();
        }
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Every problem found in the current tag strings.
    pub fn errors(&self) -> Vec<String> {
        match self.validate() {
            Ok(_) => Vec::new(),
            Err(errors) => errors,
        }
    }

    #[instrument(skip(self), fields(boxorder = %self.boxorder, goalorder = %self.goalorder))]
    pub fn enable(&mut self) -> Result<()> {
        if self.tables.is_some() {
            return Ok(());
        }
        match self.validate() {
            Ok(tables) => {
                self.tables = Some(tables);
                Ok(())
            }
            Err(errors) => {
                debug!(?errors, "rejected Sokoban+ data");
                Err(Error::SokobanPlusData { errors })
            }
        }
    }

    pub fn disable(&mut self) {
        self.tables = None;
    }

    /// Tag of box `box_id`; always [`DEFAULT_PLUS_ID`] while disabled.
    pub fn box_plus_id(&self, box_id: PieceId) -> Result<PlusId> {
        match &self.tables {
            None => Ok(DEFAULT_PLUS_ID),
            Some(tables) => lookup(&tables.boxes, box_id)
                .ok_or_else(|| Error::piece_lookup(format!("No box with ID: {}", box_id))),
        }
    }

    /// Tag of goal `goal_id`; always [`DEFAULT_PLUS_ID`] while disabled.
    pub fn goal_plus_id(&self, goal_id: PieceId) -> Result<PlusId> {
        match &self.tables {
            None => Ok(DEFAULT_PLUS_ID),
            Some(tables) => lookup(&tables.goals, goal_id)
                .ok_or_else(|| Error::piece_lookup(format!("No goal with ID: {}", goal_id))),
        }
    }

    fn validate(&self) -> std::result::Result<PlusTables, Vec<String>> {
        let mut errors = Vec::new();
        let boxes = self.parse_order(&self.boxorder, "boxorder", &mut errors);
        let goals = self.parse_order(&self.goalorder, "goalorder", &mut errors);

        let box_tags = non_default_tags(&boxes);
        let goal_tags = non_default_tags(&goals);
        if box_tags != goal_tags {
            errors.push(
                "Sokoban+ data doesn't define equal sets of IDs for boxes and goals".to_string(),
            );
        }

        if errors.is_empty() {
            Ok(PlusTables { boxes, goals })
        } else {
            Err(errors)
        }
    }

    fn uses_legacy_default(&self) -> bool {
        self.pieces_count < LEGACY_DEFAULT_PLUS_ID as usize
    }

    fn is_default(&self, plus_id: PlusId) -> bool {
        plus_id == DEFAULT_PLUS_ID
            || (plus_id == LEGACY_DEFAULT_PLUS_ID && self.uses_legacy_default())
    }

    /// Parses one tag string into exactly `pieces_count` tags.
    fn parse_order(&self, order: &str, name: &str, errors: &mut Vec<String>) -> Vec<PlusId> {
        let mut tags = Vec::new();
        for token in order.split_whitespace() {
            match token.parse::<i64>() {
                Ok(value) => match PlusId::try_from(value) {
                    Ok(tag) => tags.push(tag),
                    Err(_) => errors.push(format!("Invalid Sokoban+ ID: {}", value)),
                },
                Err(_) => {
                    errors.push(format!(
                        "Can't parse Sokoban+ {} '{}'! Only digits and spaces allowed.",
                        name, token
                    ));
                    return vec![DEFAULT_PLUS_ID; self.pieces_count];
                }
            }
        }

        while tags.last().is_some_and(|&tag| self.is_default(tag)) {
            tags.pop();
        }
        for tag in tags.iter_mut() {
            if self.is_default(*tag) {
                *tag = DEFAULT_PLUS_ID;
            }
        }

        if tags.len() > self.pieces_count {
            errors.push(format!(
                "Sokoban+ {} data doesn't contain same amount of IDs as there are pieces on board! (pieces_count: {})",
                name, self.pieces_count
            ));
        }
        tags.resize(self.pieces_count, DEFAULT_PLUS_ID);
        tags
    }
}

fn lookup(tags: &[PlusId], piece_id: PieceId) -> Option<PlusId> {
    piece_id
        .checked_sub(DEFAULT_PIECE_ID)
        .and_then(|index| tags.get(index))
        .copied()
}

fn non_default_tags(tags: &[PlusId]) -> Vec<PlusId> {
    tags.iter()
        .copied()
        .filter(|&tag| tag != DEFAULT_PLUS_ID)
        .sorted()
        .collect()
}

fn normalized_order(tags: &[PlusId]) -> String {
    let end = tags
        .iter()
        .rposition(|&tag| tag != DEFAULT_PLUS_ID)
        .map_or(0, |last| last + 1);
    tags[..end].iter().join(" ")
}
