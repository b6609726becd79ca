use std::fs;
use std::io;
use std::path::Path;

use derive_more::{Display, Error};
use tracing::debug;

use crate::board_graph::BoardGraph;
use crate::error;
use crate::tessellation::Tessellation;

/// Error type for level file parsing.
#[derive(Debug, Display, Error)]
pub enum LevelError {
    /// IO error when reading from file
    #[display("IO error: {_0}")]
    Io(io::Error),
    /// Board text of level `number` (1-indexed) is invalid
    #[display("Invalid level {number}: {source}")]
    InvalidLevel { number: usize, source: error::Error },
}

impl From<io::Error> for LevelError {
    fn from(err: io::Error) -> Self {
        LevelError::Io(err)
    }
}

/// One puzzle from a level file, with the notes found next to it.
#[derive(Debug, Clone)]
pub struct Level {
    title: Option<String>,
    boxorder: Option<String>,
    goalorder: Option<String>,
    board: BoardGraph,
}

impl Level {
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn boxorder(&self) -> Option<&str> {
        self.boxorder.as_deref()
    }

    pub fn goalorder(&self) -> Option<&str> {
        self.goalorder.as_deref()
    }

    pub fn board(&self) -> &BoardGraph {
        &self.board
    }

    pub fn into_board(self) -> BoardGraph {
        self.board
    }
}

#[derive(Default)]
struct PendingLevel {
    title: Option<String>,
    boxorder: Option<String>,
    goalorder: Option<String>,
    lines: Vec<String>,
    // A blank line followed the board
    closed: bool,
}

/// A collection of levels in XSB format.
#[derive(Debug, Clone)]
pub struct Levels {
    levels: Vec<Level>,
}

impl Levels {
    /// Parse XSB-formatted levels from a string.
    ///
    /// The XSB format uses:
    /// - Lines starting with `;` as level separators, the rest of the line
    ///   being the title of the next level
    /// - `Title:`, `boxorder:` and `goalorder:` note lines
    /// - Board lines of classic Sokoban characters
    /// - Empty lines between levels (optional)
    pub fn from_text(contents: &str, tessellation: Tessellation) -> Result<Self, LevelError> {
        let mut levels = Vec::new();
        let mut pending = PendingLevel::default();

        for line in contents.lines() {
            let trimmed = line.trim();

            if let Some(title) = trimmed.strip_prefix(';') {
                Self::finish(&mut levels, &mut pending, tessellation)?;
                let title = title.trim();
                if !title.is_empty() {
                    pending.title = Some(title.to_string());
                }
                continue;
            }

            if trimmed.is_empty() {
                if !pending.lines.is_empty() {
                    pending.closed = true;
                }
                continue;
            }

            if let Some((key, value)) = note(trimmed) {
                let value = Some(value.to_string());
                match key.as_str() {
                    "title" => pending.title = value,
                    "boxorder" => pending.boxorder = value,
                    _ => pending.goalorder = value,
                }
                continue;
            }

            // A second board in the same block starts a new level
            if pending.closed {
                Self::finish(&mut levels, &mut pending, tessellation)?;
            }
            pending.lines.push(line.trim_end().to_string());
        }
        Self::finish(&mut levels, &mut pending, tessellation)?;

        debug!(count = levels.len(), %tessellation, "parsed levels");
        Ok(Levels { levels })
    }

    fn finish(
        levels: &mut Vec<Level>,
        pending: &mut PendingLevel,
        tessellation: Tessellation,
    ) -> Result<(), LevelError> {
        let done = std::mem::take(pending);
        if done.lines.is_empty() {
            // Notes without a board carry over
            pending.title = done.title;
            pending.boxorder = done.boxorder;
            pending.goalorder = done.goalorder;
            return Ok(());
        }

        let board = BoardGraph::from_text(&done.lines.join("\n"), tessellation).map_err(
            |source| LevelError::InvalidLevel {
                number: levels.len() + 1,
                source,
            },
        )?;
        levels.push(Level {
            title: done.title,
            boxorder: done.boxorder,
            goalorder: done.goalorder,
            board,
        });
        Ok(())
    }

    /// Parse XSB-formatted levels from a text file.
    pub fn from_file<P: AsRef<Path>>(path: P, tessellation: Tessellation) -> Result<Self, LevelError> {
        let contents = fs::read_to_string(path)?;
        Self::from_text(&contents, tessellation)
    }

    /// Get the nth level (0-indexed).
    pub fn get(&self, index: usize) -> Option<&Level> {
        self.levels.get(index)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Level> {
        self.levels.iter()
    }
}

/// Splits a `key: value` note line. Only known keys count, so board lines
/// are never mistaken for notes.
fn note(line: &str) -> Option<(String, &str)> {
    let (key, value) = line.split_once(':')?;
    let key = key.trim().to_ascii_lowercase();
    matches!(key.as_str(), "title" | "boxorder" | "goalorder").then(|| (key, value.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text_basic() {
        let level1 = "####
# .#
#  ###
#*@  #
#  $ #
#  ###
####";

        let level2 = "######
#    #
# #@ #
# $* #
# .* #
#    #
######";

        let level3 = "  ####
###  ####
#     $ #
# #  #$ #
# . .#@ #
#########";

        let xsb_content = format!(
            "; 1\n\n{}\n\n; 2\n\n{}\n\n; 3\n\n{}\n",
            level1, level2, level3
        );

        let levels = Levels::from_text(&xsb_content, Tessellation::Sokoban).unwrap();
        assert_eq!(levels.len(), 3);
        assert_eq!(levels.get(0).unwrap().title(), Some("1"));
        assert_eq!(levels.get(2).unwrap().title(), Some("3"));
        assert_eq!(levels.get(1).unwrap().board().to_string(), format!("{}\n", level2));
        assert_eq!(levels.get(2).unwrap().board().width(), 9);
        assert!(levels.get(3).is_none());
    }

    #[test]
    fn test_blank_line_separated() {
        let levels = Levels::from_text("#####\n#@$.#\n#####\n\n####\n#@*#\n####\n", Tessellation::Sokoban)
            .unwrap();
        assert_eq!(levels.len(), 2);
        assert_eq!(levels.get(0).unwrap().title(), None);
        assert_eq!(levels.get(1).unwrap().board().width(), 4);
    }

    #[test]
    fn test_notes() {
        let contents = "Title: Twins\n\
                        #######\n\
                        #@$$..#\n\
                        #######\n\
                        \n\
                        boxorder: 1 2\n\
                        goalorder: 2 1\n\
                        \n\
                        ; Next\n\
                        #####\n\
                        #@$.#\n\
                        #####\n";
        let levels = Levels::from_text(contents, Tessellation::Sokoban).unwrap();
        assert_eq!(levels.len(), 2);

        let twins = levels.get(0).unwrap();
        assert_eq!(twins.title(), Some("Twins"));
        assert_eq!(twins.boxorder(), Some("1 2"));
        assert_eq!(twins.goalorder(), Some("2 1"));

        let next = levels.get(1).unwrap();
        assert_eq!(next.title(), Some("Next"));
        assert_eq!(next.boxorder(), None);
    }

    #[test]
    fn test_invalid_level() {
        let err = Levels::from_text("; 1\n#@$.#\n; 2\n#@x.#\n", Tessellation::Sokoban).unwrap_err();
        match err {
            LevelError::InvalidLevel { number, .. } => assert_eq!(number, 2),
            other => panic!("unexpected error {}", other),
        }
    }

    #[test]
    fn test_empty() {
        let levels = Levels::from_text("; nothing here\n\n", Tessellation::Sokoban).unwrap();
        assert!(levels.is_empty());
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            Levels::from_file("/nonexistent/levels.xsb", Tessellation::Sokoban),
            Err(LevelError::Io(_))
        ));
    }
}
