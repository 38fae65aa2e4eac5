use serde::{Deserialize, Serialize};

pub mod agent;
pub mod dungeon;
pub mod entity;
pub mod game;
pub mod level;
pub mod map;
pub mod player;
pub mod registry;

/// Represents a cell coordinate. Origin is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Position { row, col }
    }

    /// Returns the neighbouring position one step in `direction`.
    ///
    /// Returns `None` when the step would leave the non-negative quadrant.
    /// Grid bounds are checked by the caller.
    pub fn offset(self, direction: Direction) -> Option<Position> {
        let (dr, dc) = direction.delta();
        Some(Position {
            row: self.row.checked_add_signed(dr)?,
            col: self.col.checked_add_signed(dc)?,
        })
    }
}

/// One of the four movement directions a turn can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit vector as `(row, col)` deltas.
    #[inline]
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Right => (0, 1),
            Direction::Left => (0, -1),
        }
    }

    /// Resolves a W/A/S/D token, ignoring case.
    pub fn from_token(token: char) -> Option<Direction> {
        match token.to_ascii_uppercase() {
            'W' => Some(Direction::Up),
            'S' => Some(Direction::Down),
            'D' => Some(Direction::Right),
            'A' => Some(Direction::Left),
            _ => None,
        }
    }

    /// The keyboard token for this direction.
    pub fn token(self) -> char {
        match self {
            Direction::Up => 'W',
            Direction::Down => 'S',
            Direction::Right => 'D',
            Direction::Left => 'A',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_map_to_unit_vectors() {
        assert_eq!(Direction::from_token('w').map(Direction::delta), Some((-1, 0)));
        assert_eq!(Direction::from_token('S').map(Direction::delta), Some((1, 0)));
        assert_eq!(Direction::from_token('d').map(Direction::delta), Some((0, 1)));
        assert_eq!(Direction::from_token('A').map(Direction::delta), Some((0, -1)));
        assert_eq!(Direction::from_token('h'), None);
        assert_eq!(Direction::from_token(' '), None);
    }

    #[test]
    fn token_round_trips_for_every_direction() {
        for direction in Direction::ALL {
            assert_eq!(Direction::from_token(direction.token()), Some(direction));
        }
    }

    #[test]
    fn offset_refuses_negative_coordinates() {
        let origin = Position::new(0, 0);
        assert_eq!(origin.offset(Direction::Up), None);
        assert_eq!(origin.offset(Direction::Left), None);
        assert_eq!(origin.offset(Direction::Down), Some(Position::new(1, 0)));
        assert_eq!(origin.offset(Direction::Right), Some(Position::new(0, 1)));
    }
}
