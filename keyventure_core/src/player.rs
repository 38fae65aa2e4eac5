use serde::{Deserialize, Serialize};

use crate::{Position, entity::EntityKind};

/// Holds the state of the player within the dungeon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    position: Position,
    moves: i32,
    inventory: Vec<EntityKind>,
}

impl Player {
    /// Places a player at `start` with an empty inventory.
    pub fn new(start: Position, moves: i32) -> Self {
        Player {
            position: start,
            moves,
            inventory: Vec::new(),
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub fn moves_remaining(&self) -> i32 {
        self.moves
    }

    /// Adds `delta` to the move count. There is no floor; the count saturates
    /// at the `i32` limits.
    pub fn adjust_moves(&mut self, delta: i32) {
        self.moves = self.moves.saturating_add(delta);
    }

    /// Collected items, in pickup order.
    pub fn inventory(&self) -> &[EntityKind] {
        &self.inventory
    }

    pub fn add_item(&mut self, item: EntityKind) {
        self.inventory.push(item);
    }

    pub fn has_item(&self, item: EntityKind) -> bool {
        self.inventory.contains(&item)
    }
}
