use serde::{Deserialize, Serialize};

use crate::{
    Direction, Position,
    dungeon::Dungeon,
    entity::{EntityKind, Interaction, interact_at},
    level::{Level, LevelError},
    player::Player,
};

/// State of a game session. `Won` and `Lost` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    InProgress,
    Won,
    Lost,
}

impl Outcome {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Outcome::InProgress)
    }
}

/// What stopped a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Blocker {
    Wall,
    /// The target lies outside the dungeon.
    Edge,
}

/// Represents the outcome of a single move attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveOutcome {
    /// The player entered `to` and the occupant's effect (if any) fired.
    Moved {
        from: Position,
        to: Position,
        interaction: Interaction,
    },
    /// The player stayed where they were.
    Blocked { by: Blocker },
    /// The game was already over.
    Ignored,
}

impl MoveOutcome {
    /// User-facing text for the move, if it has any.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            MoveOutcome::Moved { interaction, .. } => interaction.message(),
            MoveOutcome::Blocked { by: Blocker::Wall } => Some("You bumped into a wall."),
            MoveOutcome::Blocked { by: Blocker::Edge } => Some("There is nothing beyond the edge."),
            MoveOutcome::Ignored => Some("The game is over."),
        }
    }
}

/// Everything a caller needs to know after one turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnReport {
    pub direction: Direction,
    pub movement: MoveOutcome,
    pub moves_remaining: i32,
    pub outcome: Outcome,
}

/// Read-only view of a game handed to presentation and agents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub height: usize,
    pub width: usize,
    /// Occupied cells in row-major order.
    pub entities: Vec<(Position, EntityKind)>,
    pub door: Position,
    pub player: Position,
    pub moves_remaining: i32,
    pub inventory: Vec<EntityKind>,
    pub outcome: Outcome,
}

impl Snapshot {
    /// Linear lookup of the occupant of `position`.
    pub fn entity_at(&self, position: Position) -> Option<EntityKind> {
        self.entities
            .iter()
            .find(|(at, _)| *at == position)
            .map(|&(_, kind)| kind)
    }

    pub fn contains(&self, position: Position) -> bool {
        position.row < self.height && position.col < self.width
    }
}

/// Manages one game session: the dungeon, the player and the outcome.
#[derive(Debug, Clone)]
pub struct Game {
    dungeon: Dungeon,
    player: Player,
    outcome: Outcome,
}

impl Game {
    /// Starts a game on `level` with a budget of `moves`.
    pub fn new(level: &Level, moves: i32) -> Self {
        let mut game = Game {
            dungeon: Dungeon::from_level(level),
            player: Player::new(level.start(), moves),
            outcome: Outcome::InProgress,
        };
        // A zero budget loses before the first turn.
        game.evaluate();
        game
    }

    /// Parses `text` as a level and starts a game on it.
    pub fn from_text(text: &str, moves: i32) -> Result<Self, LevelError> {
        Ok(Game::new(&Level::parse(text)?, moves))
    }

    pub fn dungeon(&self) -> &Dungeon {
        &self.dungeon
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn is_terminal(&self) -> bool {
        self.outcome.is_terminal()
    }

    /// Holds the key while standing on the door.
    pub fn is_won(&self) -> bool {
        self.outcome == Outcome::Won
    }

    /// Out of moves without having won.
    pub fn is_game_over(&self) -> bool {
        self.player.moves_remaining() <= 0 && !self.is_won()
    }

    /// The cell one step from the player, if it lies inside the dungeon.
    pub fn target(&self, direction: Direction) -> Option<Position> {
        self.dungeon.step(self.player.position(), direction)
    }

    /// Peeks at the neighbouring cell without spending a move.
    pub fn look(&self, direction: Direction) -> Option<EntityKind> {
        self.target(direction)
            .and_then(|target| self.dungeon.entity_at(target))
    }

    /// Moves the player one step, without charging the move cost.
    ///
    /// Walls and the dungeon edge reject the move. Any other target is
    /// entered and its occupant's effect fires immediately.
    pub fn attempt_move(&mut self, direction: Direction) -> MoveOutcome {
        if self.is_terminal() {
            return MoveOutcome::Ignored;
        }

        let from = self.player.position();
        let Some(to) = self.target(direction) else {
            return MoveOutcome::Blocked { by: Blocker::Edge };
        };
        if self
            .dungeon
            .entity_at(to)
            .is_some_and(EntityKind::blocks_movement)
        {
            return MoveOutcome::Blocked { by: Blocker::Wall };
        }

        self.player.set_position(to);
        let interaction = interact_at(&mut self.player, &mut self.dungeon, to);
        match interaction {
            Interaction::PickedUpKey => log::info!("Key collected at ({}, {})", to.row, to.col),
            Interaction::Boosted(moves) => log::info!("Booster collected: +{} moves", moves),
            Interaction::MissingKey => log::debug!("Reached the door without the key"),
            Interaction::Unlocked | Interaction::Nothing => {}
        }

        if self.holds_key_at_door() {
            self.set_outcome(Outcome::Won);
        }

        MoveOutcome::Moved {
            from,
            to,
            interaction,
        }
    }

    /// Plays one turn: moves, charges one move, then re-evaluates the outcome.
    ///
    /// Blocked moves are charged too. The win check runs before the
    /// exhaustion check, so reaching the door on the last move wins.
    pub fn take_turn(&mut self, direction: Direction) -> TurnReport {
        let movement = self.attempt_move(direction);
        if movement != MoveOutcome::Ignored {
            self.player.adjust_moves(-1);
            self.evaluate();
        }
        log::debug!(
            "Turn {:?}: {:?}, {} moves left, {:?}",
            direction,
            movement,
            self.player.moves_remaining(),
            self.outcome
        );
        self.report(direction, movement)
    }

    /// Reports what lies one step away. Costs a move while the game is running.
    pub fn investigate(&mut self, direction: Direction) -> Option<EntityKind> {
        let seen = self.look(direction);
        if !self.is_terminal() {
            self.player.adjust_moves(-1);
            self.evaluate();
        }
        seen
    }

    /// Captures the current state for presentation.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            height: self.dungeon.height(),
            width: self.dungeon.width(),
            entities: self.dungeon.entities().collect(),
            door: self.dungeon.door(),
            player: self.player.position(),
            moves_remaining: self.player.moves_remaining(),
            inventory: self.player.inventory().to_vec(),
            outcome: self.outcome,
        }
    }

    fn holds_key_at_door(&self) -> bool {
        self.player.has_item(EntityKind::Key) && self.player.position() == self.dungeon.door()
    }

    /// Win first, then exhaustion.
    fn evaluate(&mut self) {
        if self.is_terminal() {
            return;
        }
        if self.holds_key_at_door() {
            self.set_outcome(Outcome::Won);
        } else if self.player.moves_remaining() <= 0 {
            self.set_outcome(Outcome::Lost);
        }
    }

    fn set_outcome(&mut self, outcome: Outcome) {
        if self.outcome != outcome {
            log::info!("Game {:?}", outcome);
            self.outcome = outcome;
        }
    }

    fn report(&self, direction: Direction, movement: MoveOutcome) -> TurnReport {
        TurnReport {
            direction,
            movement,
            moves_remaining: self.player.moves_remaining(),
            outcome: self.outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::registry::LevelRegistry;

    fn game(text: &str, moves: i32) -> Game {
        Game::from_text(text, moves).unwrap()
    }

    #[rstest]
    #[case(Direction::Up, Position::new(0, 1))]
    #[case(Direction::Down, Position::new(2, 1))]
    #[case(Direction::Left, Position::new(1, 0))]
    #[case(Direction::Right, Position::new(1, 2))]
    fn moves_one_cell_in_each_direction(#[case] direction: Direction, #[case] expected: Position) {
        let mut game = game("   \n O \n  D", 5);
        let report = game.take_turn(direction);
        assert_eq!(game.player().position(), expected);
        assert_eq!(report.moves_remaining, 4);
        assert!(matches!(report.movement, MoveOutcome::Moved { to, .. } if to == expected));
    }

    #[rstest]
    #[case(Direction::Up)]
    #[case(Direction::Left)]
    fn grid_edge_blocks_like_a_wall(#[case] direction: Direction) {
        let mut game = game("O D", 3);
        let report = game.take_turn(direction);
        assert_eq!(report.movement, MoveOutcome::Blocked { by: Blocker::Edge });
        assert_eq!(game.player().position(), Position::new(0, 0));
        assert_eq!(report.moves_remaining, 2);
    }

    #[test]
    fn attempt_move_does_not_charge() {
        let mut game = game("O D", 3);
        game.attempt_move(Direction::Right);
        assert_eq!(game.player().moves_remaining(), 3);
    }

    #[test]
    fn door_without_key_is_entered_but_does_not_win() {
        let mut game = game("ODK", 4);
        let report = game.take_turn(Direction::Right);
        assert_eq!(game.player().position(), Position::new(0, 1));
        assert_eq!(report.outcome, Outcome::InProgress);
        assert_eq!(report.movement.message(), Some("You don't have the Key!"));
        assert_eq!(game.dungeon().entity_at(Position::new(0, 1)), Some(EntityKind::Door));

        game.take_turn(Direction::Right);
        let report = game.take_turn(Direction::Left);
        assert_eq!(report.outcome, Outcome::Won);
        assert_eq!(
            report.movement,
            MoveOutcome::Moved {
                from: Position::new(0, 2),
                to: Position::new(0, 1),
                interaction: Interaction::Unlocked
            }
        );
    }

    #[test]
    fn terminal_games_ignore_turns() {
        let mut game = game("#O D", 1);
        assert_eq!(game.take_turn(Direction::Left).outcome, Outcome::Lost);
        let report = game.take_turn(Direction::Right);
        assert_eq!(report.movement, MoveOutcome::Ignored);
        assert_eq!(report.moves_remaining, 0);
        assert_eq!(game.player().position(), Position::new(0, 1));
    }

    #[test]
    fn booster_on_a_maximal_budget_keeps_the_game_running() {
        let registry = LevelRegistry::from_json(r#"{"endless.txt": 2147483647}"#).unwrap();
        let mut game = game("OMD", registry.budget("endless.txt").unwrap());
        let report = game.take_turn(Direction::Right);
        assert_eq!(report.moves_remaining, i32::MAX - 1);
        assert_eq!(report.outcome, Outcome::InProgress);
    }

    #[test]
    fn zero_budget_is_lost_from_the_start() {
        let game = game("OKD", 0);
        assert_eq!(game.outcome(), Outcome::Lost);
        assert!(game.is_game_over());
    }

    #[test]
    fn investigate_costs_a_move_and_reports_the_neighbour() {
        let mut game = game("OKD", 2);
        assert_eq!(game.look(Direction::Right), Some(EntityKind::Key));
        assert_eq!(game.player().moves_remaining(), 2);

        assert_eq!(game.investigate(Direction::Right), Some(EntityKind::Key));
        assert_eq!(game.player().moves_remaining(), 1);
        assert_eq!(game.investigate(Direction::Up), None);
        assert_eq!(game.outcome(), Outcome::Lost);

        assert_eq!(game.investigate(Direction::Right), Some(EntityKind::Key));
        assert_eq!(game.player().moves_remaining(), 0);
    }

    #[test]
    fn snapshot_reflects_pickups() {
        let mut game = game("OKMD", 5);
        game.take_turn(Direction::Right);
        let snapshot = game.snapshot();
        assert_eq!(snapshot.player, Position::new(0, 1));
        assert_eq!(snapshot.inventory, vec![EntityKind::Key]);
        assert_eq!(snapshot.entity_at(Position::new(0, 1)), None);
        assert_eq!(
            snapshot.entities,
            vec![
                (Position::new(0, 2), EntityKind::MoveBooster),
                (Position::new(0, 3), EntityKind::Door)
            ]
        );
        assert_eq!(snapshot.moves_remaining, 4);
        assert_eq!(snapshot.outcome, Outcome::InProgress);
    }

    #[test]
    fn snapshot_serializes_to_json() {
        let json = serde_json::to_string(&game("OD", 2).snapshot()).unwrap();
        assert!(json.contains("\"moves_remaining\":2"));
        assert!(json.contains("\"Door\""));
    }
}
