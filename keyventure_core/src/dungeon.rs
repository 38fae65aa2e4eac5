use crate::{Direction, Position, entity::EntityKind, level::Level, map::Grid};

/// The dungeon of one level: a fixed-size grid and the entities on it.
///
/// The player is not stored here; see [`crate::player::Player`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dungeon {
    entities: Grid<Option<EntityKind>>,
    door: Position,
}

impl Dungeon {
    /// Builds the entity index from a parsed level.
    pub fn from_level(level: &Level) -> Self {
        Dungeon {
            entities: level.layout().map(|&symbol| EntityKind::from_symbol(symbol)),
            door: level.door(),
        }
    }

    pub fn height(&self) -> usize {
        self.entities.height()
    }

    pub fn width(&self) -> usize {
        self.entities.width()
    }

    /// Checks if `position` lies inside the dungeon.
    pub fn contains(&self, position: Position) -> bool {
        self.entities.contains(position)
    }

    /// Position of the level's single door.
    pub fn door(&self) -> Position {
        self.door
    }

    /// The neighbouring cell in `direction`, or `None` past the dungeon edge.
    pub fn step(&self, from: Position, direction: Direction) -> Option<Position> {
        from.offset(direction).filter(|&to| self.contains(to))
    }

    /// Returns what occupies `position`.
    ///
    /// Empty cells and positions outside the dungeon both yield `None`.
    pub fn entity_at(&self, position: Position) -> Option<EntityKind> {
        self.entities.get(position).copied().flatten()
    }

    /// Removes the entity at `position` and returns it.
    ///
    /// Walls are permanent and are left in place.
    pub fn remove_entity(&mut self, position: Position) -> Option<EntityKind> {
        let cell = self.entities.get_mut(position)?;
        match *cell {
            Some(EntityKind::Wall) => {
                log::warn!(
                    "Refusing to remove wall at ({}, {})",
                    position.row,
                    position.col
                );
                None
            }
            _ => cell.take(),
        }
    }

    /// All positions currently holding `kind`, in row-major order.
    pub fn positions_of(&self, kind: EntityKind) -> Vec<Position> {
        self.entities()
            .filter(|&(_, occupant)| occupant == kind)
            .map(|(position, _)| position)
            .collect()
    }

    /// Every occupied cell, in row-major order.
    pub fn entities(&self) -> impl Iterator<Item = (Position, EntityKind)> + '_ {
        self.entities
            .enumerate()
            .filter_map(|(position, cell)| cell.map(|kind| (position, kind)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dungeon(text: &str) -> Dungeon {
        Dungeon::from_level(&Level::parse(text).unwrap())
    }

    #[test]
    fn player_start_is_not_an_entity() {
        let dungeon = dungeon("#O#\n#D#");
        assert_eq!(dungeon.entity_at(Position::new(0, 1)), None);
        assert_eq!(dungeon.entity_at(Position::new(0, 0)), Some(EntityKind::Wall));
        assert_eq!(dungeon.entity_at(Position::new(1, 1)), Some(EntityKind::Door));
    }

    #[test]
    fn out_of_bounds_is_empty() {
        let dungeon = dungeon("OD");
        assert_eq!(dungeon.entity_at(Position::new(0, 2)), None);
        assert_eq!(dungeon.entity_at(Position::new(5, 0)), None);
        assert!(!dungeon.contains(Position::new(1, 0)));
    }

    #[test]
    fn lookups_are_stable() {
        let dungeon = dungeon("OKD");
        let at = Position::new(0, 1);
        assert_eq!(dungeon.entity_at(at), dungeon.entity_at(at));
    }

    #[test]
    fn remove_entity_skips_walls_and_empty_cells() {
        let mut dungeon = dungeon("#OKD");
        assert_eq!(dungeon.remove_entity(Position::new(0, 0)), None);
        assert_eq!(dungeon.entity_at(Position::new(0, 0)), Some(EntityKind::Wall));

        assert_eq!(dungeon.remove_entity(Position::new(0, 1)), None);
        assert_eq!(dungeon.remove_entity(Position::new(0, 9)), None);

        assert_eq!(dungeon.remove_entity(Position::new(0, 2)), Some(EntityKind::Key));
        assert_eq!(dungeon.entity_at(Position::new(0, 2)), None);
    }

    #[test]
    fn positions_of_scans_row_major() {
        let dungeon = dungeon("M O\nKMD\n  M");
        assert_eq!(
            dungeon.positions_of(EntityKind::MoveBooster),
            vec![
                Position::new(0, 0),
                Position::new(1, 1),
                Position::new(2, 2)
            ]
        );
        assert_eq!(dungeon.positions_of(EntityKind::Door), vec![dungeon.door()]);
        assert_eq!(dungeon.positions_of(EntityKind::Wall), vec![]);
    }

    #[test]
    fn step_is_guarded_by_the_edges() {
        let dungeon = dungeon("OD\n  ");
        let origin = Position::new(0, 0);
        assert_eq!(dungeon.step(origin, Direction::Up), None);
        assert_eq!(dungeon.step(origin, Direction::Left), None);
        assert_eq!(dungeon.step(origin, Direction::Down), Some(Position::new(1, 0)));
        assert_eq!(dungeon.step(Position::new(1, 1), Direction::Down), None);
        assert_eq!(dungeon.step(Position::new(0, 1), Direction::Right), None);
    }
}
