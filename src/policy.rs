use std::collections::{HashSet, VecDeque};

use tracing::debug;

use crate::agent::AgentState;
use crate::grid::{CellState, Grid};
use crate::pathfinding::{AStar, Path};
use crate::reachability::{has_legal_move, reachable_set};
use crate::types::{Direction, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveTo(Direction),
    ClearRock(Direction),
    Idle,
}

/// The decision capability the agent loop depends on. Variants: the
/// pathfinding policy below, the queued manual policy, and room for a
/// learned policy later.
pub trait DecisionPolicy {
    fn choose_action(&mut self, grid: &Grid, agent: &AgentState) -> Action;

    /// True when the last decision concluded that no stick can ever be
    /// reached from the current state. Policy outcome, not an error.
    fn is_unwinnable(&self) -> bool {
        false
    }
}

/// Targets the cheapest reachable stick, trading path length against the
/// sticks a route would spend, and refuses first steps that would trap the
/// agent while an alternative exists.
pub struct PathfindingPolicy {
    /// Score weight of one cleared rock relative to one move. Defaults to
    /// the larger grid dimension, making a cleared rock roughly as
    /// expensive as a full detour across the board.
    rock_cost: Option<u32>,
    unwinnable: bool,
}

impl PathfindingPolicy {
    pub fn new() -> Self {
        Self {
            rock_cost: None,
            unwinnable: false,
        }
    }

    pub fn with_rock_cost(rock_cost: u32) -> Self {
        Self {
            rock_cost: Some(rock_cost),
            unwinnable: false,
        }
    }

    fn score(path: &Path, rock_cost: u32) -> u64 {
        path.rocks_crossed as u64 * rock_cost as u64 + path.steps() as u64
    }

    /// Cheapest-scoring route to a target, also weighing variants that
    /// clear fewer rocks than the budget allows. A longer rock-free detour
    /// beats a short route that burns sticks.
    fn best_path_to(
        grid: &Grid,
        start: Position,
        target: Position,
        sticks: u32,
        rock_cost: u32,
    ) -> Option<(Path, u64)> {
        let full = AStar::find_path(grid, start, target, sticks)?;
        let mut best_score = Self::score(&full, rock_cost);
        let mut best = full;
        for allowed in (0..best.rocks_crossed).rev() {
            if let Some(path) = AStar::find_path(grid, start, target, allowed) {
                let score = Self::score(&path, rock_cost);
                if score < best_score {
                    best_score = score;
                    best = path;
                }
            }
        }
        Some((best, best_score))
    }

    /// Candidate paths ranked by score; candidate order is the tie-break
    /// (lowest row, then column) since the sort is stable.
    fn ranked_paths(
        grid: &Grid,
        agent: &AgentState,
        targets: &[Position],
        rock_cost: u32,
    ) -> Vec<(Path, u64)> {
        let mut ranked: Vec<(Path, u64)> = targets
            .iter()
            .filter_map(|&target| {
                Self::best_path_to(grid, agent.position, target, agent.sticks, rock_cost)
            })
            .collect();
        ranked.sort_by_key(|(_, score)| *score);
        ranked
    }

    /// One-rock lookahead for when no stick is reachable: rocks on the
    /// boundary of the reachable set whose clearing would expose at least
    /// one new stick. Needs a stick to spend on the clear itself.
    fn breach_targets(
        grid: &Grid,
        agent: &AgentState,
        reachable: &HashSet<Position>,
    ) -> Vec<Position> {
        if agent.sticks == 0 {
            return Vec::new();
        }
        let mut candidates = Vec::new();
        for rock in grid.rocks() {
            if !rock.neighbors().iter().any(|n| reachable.contains(n)) {
                continue;
            }
            let mut cleared = grid.clone();
            cleared.set(rock, CellState::Empty);
            let expanded = reachable_set(&cleared, agent.position, agent.sticks - 1);
            if cleared.sticks().iter().any(|s| expanded.contains(s)) {
                candidates.push(rock);
            }
        }
        candidates
    }

    /// Simulates the first step and checks the trap predicate afterwards.
    /// A stick pickup leaves at least one stick in inventory, which keeps
    /// any rock the respawn drops next to the agent clearable.
    fn first_step_is_safe(grid: &Grid, agent: &AgentState, path: &Path) -> bool {
        let Some(next) = path.first_step() else {
            return true;
        };
        let mut after = grid.clone();
        match grid.cell_at(&next) {
            Some(CellState::Rock) => {
                after.set(next, CellState::Empty);
                has_legal_move(&after, agent.position, agent.sticks.saturating_sub(1))
            }
            Some(CellState::Stick) => {
                after.set(agent.position, CellState::Empty);
                after.set(next, CellState::Player);
                has_legal_move(&after, next, agent.sticks + 1)
            }
            Some(CellState::Empty) => {
                after.set(agent.position, CellState::Empty);
                after.set(next, CellState::Player);
                has_legal_move(&after, next, agent.sticks)
            }
            _ => false,
        }
    }

    fn emit(grid: &Grid, agent: &AgentState, path: &Path) -> Action {
        let Some(next) = path.first_step() else {
            return Action::Idle;
        };
        let Some(direction) = agent.position.direction_to(&next) else {
            return Action::Idle;
        };
        match grid.cell_at(&next) {
            // Budget feasibility of the path guarantees sticks > 0 here.
            Some(CellState::Rock) => Action::ClearRock(direction),
            _ => Action::MoveTo(direction),
        }
    }
}

impl Default for PathfindingPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionPolicy for PathfindingPolicy {
    #[tracing::instrument(level = "debug", skip(self, grid, agent), fields(x = agent.position.x, y = agent.position.y, sticks = agent.sticks))]
    fn choose_action(&mut self, grid: &Grid, agent: &AgentState) -> Action {
        self.unwinnable = false;
        let rock_cost = self
            .rock_cost
            .unwrap_or_else(|| grid.width.max(grid.height) as u32);

        let reachable = reachable_set(grid, agent.position, agent.sticks);
        let sticks_in_reach: Vec<Position> = grid
            .sticks()
            .into_iter()
            .filter(|pos| reachable.contains(pos))
            .collect();

        let ranked = if sticks_in_reach.is_empty() {
            let breaches = Self::breach_targets(grid, agent, &reachable);
            if breaches.is_empty() {
                debug!("No reachable stick and no rock worth clearing");
                self.unwinnable = true;
                return Action::Idle;
            }
            debug!(candidates = breaches.len(), "Considering rock clearings");
            Self::ranked_paths(grid, agent, &breaches, rock_cost)
        } else {
            debug!(candidates = sticks_in_reach.len(), "Ranking reachable sticks");
            Self::ranked_paths(grid, agent, &sticks_in_reach, rock_cost)
        };

        if ranked.is_empty() {
            self.unwinnable = true;
            return Action::Idle;
        }

        // Safety over greed: take the cheapest candidate whose first step
        // does not trap the agent, falling back to the cheapest overall
        // when every first step is trapping.
        let (path, score) = ranked
            .iter()
            .find(|(path, _)| Self::first_step_is_safe(grid, agent, path))
            .unwrap_or(&ranked[0]);
        debug!(
            steps = path.steps(),
            rocks = path.rocks_crossed,
            score,
            "Target selected"
        );
        Self::emit(grid, agent, path)
    }

    fn is_unwinnable(&self) -> bool {
        self.unwinnable
    }
}

/// Feeds externally queued actions into the loop; Idle once drained.
/// Input-device handling lives outside the core.
#[derive(Default)]
pub struct ManualPolicy {
    queue: VecDeque<Action>,
}

impl ManualPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_actions(actions: impl IntoIterator<Item = Action>) -> Self {
        Self {
            queue: actions.into_iter().collect(),
        }
    }

    pub fn push(&mut self, action: Action) {
        self.queue.push_back(action);
    }
}

impl DecisionPolicy for ManualPolicy {
    fn choose_action(&mut self, _grid: &Grid, _agent: &AgentState) -> Action {
        self.queue.pop_front().unwrap_or(Action::Idle)
    }
}
