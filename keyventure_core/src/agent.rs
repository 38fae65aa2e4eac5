use std::{
    cmp::Ordering,
    collections::{BinaryHeap, HashMap, VecDeque},
};

use crate::{Direction, Position, entity::EntityKind, game::Snapshot};

/// Trait defining a controller that plays the game.
/// Controllers decide which direction to take based on a [`Snapshot`].
pub trait Agent {
    /// Returns the next direction to move in, or `None` when there is nothing useful to do.
    /// `&mut self` allows the agent to keep internal state between turns (e.g., a plan).
    fn next_move(&mut self, view: &Snapshot) -> Option<Direction>;
}

/// An agent that walks to the nearest key, then to the door.
#[derive(Debug, Default)]
pub struct PlanningAgent {
    current_plan: VecDeque<Position>, // Queue of positions to visit
}

impl PlanningAgent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns manhattan distance between two positions
    fn manhattan_distance(a: Position, b: Position) -> usize {
        a.row.abs_diff(b.row) + a.col.abs_diff(b.col)
    }

    /// Converts a step between two adjacent positions into a direction
    fn step_direction(src: Position, dst: Position) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|&direction| src.offset(direction) == Some(dst))
    }

    /// A* pathfinding over every cell that is not a wall.
    fn a_star_path(start: Position, goal: Position, view: &Snapshot) -> Option<Vec<Position>> {
        // For priority queue
        #[derive(Clone, Eq, PartialEq)]
        struct PrioritizedItem {
            priority: usize,
            position: Position,
        }

        impl Ord for PrioritizedItem {
            fn cmp(&self, other: &Self) -> Ordering {
                // Reverse ordering for min-heap behavior
                other
                    .priority
                    .cmp(&self.priority)
                    .then_with(|| other.position.cmp(&self.position))
            }
        }

        impl PartialOrd for PrioritizedItem {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        let mut frontier = BinaryHeap::new();
        let mut came_from: HashMap<Position, Position> = HashMap::new();
        let mut cost_so_far: HashMap<Position, usize> = HashMap::new();

        frontier.push(PrioritizedItem {
            priority: 0,
            position: start,
        });
        cost_so_far.insert(start, 0);

        let mut goal_reached = false;

        while let Some(PrioritizedItem {
            position: current, ..
        }) = frontier.pop()
        {
            if current == goal {
                goal_reached = true;
                break;
            }

            let current_cost = cost_so_far.get(&current).copied().unwrap_or(usize::MAX);
            for neighbor in Self::open_neighbors(current, view) {
                let new_cost = current_cost.saturating_add(1);
                if cost_so_far
                    .get(&neighbor)
                    .is_none_or(|&known| new_cost < known)
                {
                    cost_so_far.insert(neighbor, new_cost);
                    frontier.push(PrioritizedItem {
                        priority: new_cost + Self::manhattan_distance(neighbor, goal),
                        position: neighbor,
                    });
                    came_from.insert(neighbor, current);
                }
            }
        }

        if !goal_reached {
            return None;
        }

        // Reconstruct path
        let mut path = vec![goal];
        let mut current = goal;
        while current != start {
            current = *came_from.get(&current)?;
            path.push(current);
        }
        path.reverse();
        Some(path)
    }

    /// Neighbours inside the dungeon that are not walls
    fn open_neighbors(position: Position, view: &Snapshot) -> Vec<Position> {
        Direction::ALL
            .into_iter()
            .filter_map(|direction| position.offset(direction))
            .filter(|&next| view.contains(next))
            .filter(|&next| !view.entity_at(next).is_some_and(EntityKind::blocks_movement))
            .collect()
    }

    /// Plans to the nearest reachable target from a list of positions
    fn plan_to_nearest_target(
        start: Position,
        targets: &[Position],
        view: &Snapshot,
    ) -> Option<Vec<Position>> {
        targets
            .iter()
            .filter_map(|&target| Self::a_star_path(start, target, view))
            .min_by_key(Vec::len)
    }

    /// Plans the next leg: to a key while none is held, otherwise to the door.
    fn plan_leg(start: Position, view: &Snapshot) -> Option<Vec<Position>> {
        if view.inventory.contains(&EntityKind::Key) {
            Self::a_star_path(start, view.door, view)
        } else {
            let keys: Vec<Position> = view
                .entities
                .iter()
                .filter(|(_, kind)| *kind == EntityKind::Key)
                .map(|&(position, _)| position)
                .collect();
            Self::plan_to_nearest_target(start, &keys, view)
        }
    }

    /// Full route from the player to the door through the nearest key, as directions.
    ///
    /// Returns `None` when no key or the door is unreachable.
    pub fn plan_route(view: &Snapshot) -> Option<Vec<Direction>> {
        let mut cells = Self::plan_leg(view.player, view)?;
        if !view.inventory.contains(&EntityKind::Key) {
            let key = *cells.last()?;
            let to_door = Self::a_star_path(key, view.door, view)?;
            cells.extend(to_door.into_iter().skip(1));
        }
        cells
            .windows(2)
            .map(|pair| Self::step_direction(pair[0], pair[1]))
            .collect()
    }
}

impl Agent for PlanningAgent {
    fn next_move(&mut self, view: &Snapshot) -> Option<Direction> {
        if view.outcome.is_terminal() {
            self.current_plan.clear();
            return None;
        }
        let current_pos = view.player;

        // 1. Follow existing plan if it still starts next to us
        if let Some(direction) = self
            .current_plan
            .front()
            .and_then(|&next| Self::step_direction(current_pos, next))
        {
            self.current_plan.pop_front();
            return Some(direction);
        }

        // 2. Replan from scratch, skipping the current position
        self.current_plan.clear();
        let plan = Self::plan_leg(current_pos, view)?;
        self.current_plan.extend(plan.into_iter().skip(1));
        let next = self.current_plan.pop_front()?;
        Self::step_direction(current_pos, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Game, Outcome};

    #[test]
    fn routes_through_the_key_to_the_door() {
        let game = Game::from_text("#####\n#O#K#\n#   #\n#D  #\n#####", 20).unwrap();
        let route = PlanningAgent::plan_route(&game.snapshot()).unwrap();
        // Down, Right, Right, Up to the key, then back down to the door.
        assert_eq!(route.len(), 8);
        assert_eq!(route[0], Direction::Down);
    }

    #[test]
    fn agent_wins_an_open_level() {
        let mut game = Game::from_text("O   \n ## \nK  D", 20).unwrap();
        let mut agent = PlanningAgent::new();
        while let Some(direction) = agent.next_move(&game.snapshot()) {
            game.take_turn(direction);
        }
        assert_eq!(game.outcome(), Outcome::Won);
        assert_eq!(game.player().moves_remaining(), 20 - 5);
    }

    #[test]
    fn unreachable_key_yields_no_move() {
        let game = Game::from_text("O#K\n###\n  D", 5).unwrap();
        assert_eq!(PlanningAgent::plan_route(&game.snapshot()), None);
        assert_eq!(PlanningAgent::new().next_move(&game.snapshot()), None);
    }

    #[test]
    fn replans_when_moved_off_the_plan() {
        let mut game = Game::from_text("O  K\n    \n   D", 20).unwrap();
        let mut agent = PlanningAgent::new();
        let first = agent.next_move(&game.snapshot()).unwrap();
        game.take_turn(first);
        // A human detour the agent did not plan for.
        game.take_turn(Direction::Down);
        while let Some(direction) = agent.next_move(&game.snapshot()) {
            game.take_turn(direction);
        }
        assert!(game.is_won());
    }
}
