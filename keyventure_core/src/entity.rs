use serde::{Deserialize, Serialize};

use crate::{Position, dungeon::Dungeon, player::Player};

/// Symbol of the player's start cell.
pub const PLAYER_SYMBOL: char = 'O';
/// Symbol of an empty cell.
pub const EMPTY_SYMBOL: char = ' ';
/// Moves granted by picking up a [`EntityKind::MoveBooster`].
pub const MOVE_BOOST: i32 = 5;

/// Every non-player occupant a dungeon cell can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Wall,
    Door,
    Key,
    MoveBooster,
}

/// What happened when the player stepped onto an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interaction {
    /// Nothing to react to.
    Nothing,
    /// Reached the door holding the key.
    Unlocked,
    /// Reached the door without the key.
    MissingKey,
    PickedUpKey,
    /// Picked up a booster worth this many moves.
    Boosted(i32),
}

impl Interaction {
    /// User-facing text for the interaction, if it has any.
    pub fn message(self) -> Option<&'static str> {
        match self {
            Interaction::Nothing => None,
            Interaction::Unlocked => Some("The door swings open."),
            Interaction::MissingKey => Some("You don't have the Key!"),
            Interaction::PickedUpKey => Some("You picked up the Key."),
            Interaction::Boosted(_) => Some("You found extra moves."),
        }
    }
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Wall,
        EntityKind::Door,
        EntityKind::Key,
        EntityKind::MoveBooster,
    ];

    /// Resolves a level symbol. Spaces and unknown symbols are not entities.
    pub fn from_symbol(symbol: char) -> Option<EntityKind> {
        match symbol {
            '#' => Some(EntityKind::Wall),
            'D' => Some(EntityKind::Door),
            'K' => Some(EntityKind::Key),
            'M' => Some(EntityKind::MoveBooster),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            EntityKind::Wall => '#',
            EntityKind::Door => 'D',
            EntityKind::Key => 'K',
            EntityKind::MoveBooster => 'M',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EntityKind::Wall => "Wall",
            EntityKind::Door => "Door",
            EntityKind::Key => "Key",
            EntityKind::MoveBooster => "MoveIncrease",
        }
    }

    /// Whether the entity occupies its cell and needs handling when stepped on.
    ///
    /// True for every kind. Use [`EntityKind::blocks_movement`] to decide
    /// whether the cell can be entered at all.
    pub fn collidable(self) -> bool {
        true
    }

    /// Only walls can never be entered.
    pub fn blocks_movement(self) -> bool {
        matches!(self, EntityKind::Wall)
    }

    /// Applies this entity's effect for a player entering `at`.
    pub fn interact(self, player: &mut Player, dungeon: &mut Dungeon, at: Position) -> Interaction {
        match self {
            EntityKind::Wall => Interaction::Nothing,
            EntityKind::Door => {
                if player.has_item(EntityKind::Key) {
                    Interaction::Unlocked
                } else {
                    Interaction::MissingKey
                }
            }
            EntityKind::Key => {
                player.add_item(EntityKind::Key);
                dungeon.remove_entity(at);
                Interaction::PickedUpKey
            }
            EntityKind::MoveBooster => {
                player.adjust_moves(MOVE_BOOST);
                dungeon.remove_entity(at);
                Interaction::Boosted(MOVE_BOOST)
            }
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}('{}')", self.name(), self.symbol())
    }
}

/// Applies the effect of whatever occupies `at`. Empty cells are a no-op.
pub fn interact_at(player: &mut Player, dungeon: &mut Dungeon, at: Position) -> Interaction {
    match dungeon.entity_at(at) {
        Some(kind) => kind.interact(player, dungeon, at),
        None => Interaction::Nothing,
    }
}
