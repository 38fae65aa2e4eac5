//! Parsing of the plain-text level format.
//!
//! One line per row: `#` wall, `O` player start, `K` key, `D` door,
//! `M` move booster, space for an empty cell.

use crate::{
    Position,
    entity::{EMPTY_SYMBOL, EntityKind, PLAYER_SYMBOL},
    map::{Grid, GridError},
};

/// Represents errors found while parsing a level.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LevelError {
    #[error("Level is empty.")]
    Empty,
    #[error("Level is not rectangular: {0}")]
    NotRectangular(#[from] GridError),
    #[error("No player start ('O') found in level.")]
    MissingPlayer,
    #[error("Multiple player starts ('O') found: {first:?} and {second:?}.")]
    MultiplePlayers { first: Position, second: Position },
    #[error("No door ('D') found in level.")]
    MissingDoor,
    #[error("Multiple doors ('D') found: {first:?} and {second:?}.")]
    MultipleDoors { first: Position, second: Position },
}

/// A validated level layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    layout: Grid<char>,
    start: Position,
    door: Position,
}

impl Level {
    /// Parses a level from its text representation.
    ///
    /// Lines are taken verbatim apart from line endings, since spaces are
    /// empty cells. Leading and trailing blank lines are ignored. Unknown symbols are
    /// logged and read as empty cells.
    pub fn parse(text: &str) -> Result<Level, LevelError> {
        let mut rows: Vec<Vec<char>> = text
            .lines()
            .map(|line| line.trim_end_matches('\r').chars().collect())
            .collect();
        while rows.last().is_some_and(|row| row.is_empty()) {
            rows.pop();
        }
        let leading = rows.iter().take_while(|row| row.is_empty()).count();
        rows.drain(..leading);
        if rows.is_empty() {
            return Err(LevelError::Empty);
        }

        let layout = Grid::from_rows(rows)?;
        let mut start: Option<Position> = None;
        let mut door: Option<Position> = None;

        for (pos, &symbol) in layout.enumerate() {
            match symbol {
                PLAYER_SYMBOL => {
                    if let Some(first) = start {
                        return Err(LevelError::MultiplePlayers { first, second: pos });
                    }
                    start = Some(pos);
                }
                EMPTY_SYMBOL => {}
                other => match EntityKind::from_symbol(other) {
                    Some(EntityKind::Door) => {
                        if let Some(first) = door {
                            return Err(LevelError::MultipleDoors { first, second: pos });
                        }
                        door = Some(pos);
                    }
                    Some(_) => {}
                    None => log::warn!(
                        "Unknown level symbol {:?} at ({}, {}), treating as empty",
                        other,
                        pos.row,
                        pos.col
                    ),
                },
            }
        }

        Ok(Level {
            start: start.ok_or(LevelError::MissingPlayer)?,
            door: door.ok_or(LevelError::MissingDoor)?,
            layout,
        })
    }

    /// Raw symbols, including the player start.
    pub fn layout(&self) -> &Grid<char> {
        &self.layout
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn door(&self) -> Position {
        self.door
    }
}
