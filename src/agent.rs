use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::engine::{ActionOutcome, GameEngine};
use crate::observer::GameObserver;
use crate::policy::{Action, DecisionPolicy};
use crate::reachability::has_legal_move;
use crate::types::{Direction, Position};

/// Explicit per-agent state threaded through the loop; nothing about the
/// run lives in globals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentState {
    pub position: Position,
    pub facing: Direction,
    /// Stick inventory, spent one per cleared rock.
    pub sticks: u32,
    pub moves: u32,
    pub game_over: bool,
}

impl AgentState {
    pub fn new(spawn: Position) -> Self {
        Self {
            position: spawn,
            facing: Direction::South,
            sticks: 0,
            moves: 0,
            game_over: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentPhase {
    /// Deciding the next action from a fresh grid snapshot.
    Planning,
    /// Action emitted, waiting for the engine to confirm the mutation.
    AwaitingAction,
    /// No legal move remains. Terminal.
    Trapped,
    /// The policy concluded no stick can ever be reached; the caller
    /// decides between regeneration and game over.
    GoalExhausted,
}

impl AgentPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AgentPhase::Trapped | AgentPhase::GoalExhausted)
    }
}

/// Drives one decision per tick: observe, consult the policy, emit a
/// single action, await the mutated grid. Decisions are always recomputed
/// from the latest snapshot; nothing is cached across mutations.
pub struct Agent {
    policy: Box<dyn DecisionPolicy>,
    observer: Box<dyn GameObserver>,
    phase: AgentPhase,
    tick: u32,
}

impl Agent {
    pub fn new(policy: impl DecisionPolicy + 'static, observer: impl GameObserver + 'static) -> Self {
        Self {
            policy: Box::new(policy),
            observer: Box::new(observer),
            phase: AgentPhase::Planning,
            tick: 0,
        }
    }

    pub fn phase(&self) -> AgentPhase {
        self.phase
    }

    /// One observe/decide/apply round. Returns the phase after the round.
    pub fn tick(&mut self, engine: &mut dyn GameEngine) -> AgentPhase {
        if self.phase.is_terminal() {
            return self.phase;
        }

        self.tick += 1;
        let (grid, state) = engine.observe();
        self.observer.on_tick(self.tick, &grid, &state);

        if !has_legal_move(&grid, state.position, state.sticks) {
            info!(tick = self.tick, "No legal move remains, agent is trapped");
            self.phase = AgentPhase::Trapped;
            self.observer.on_finished(self.phase, &state);
            return self.phase;
        }

        let action = self.policy.choose_action(&grid, &state);
        if action == Action::Idle && self.policy.is_unwinnable() {
            info!(tick = self.tick, "Grid is unwinnable, goals exhausted");
            self.phase = AgentPhase::GoalExhausted;
            self.observer.on_finished(self.phase, &state);
            return self.phase;
        }

        self.phase = AgentPhase::AwaitingAction;
        self.observer.on_action(action, &state);

        match engine.apply(action) {
            ActionOutcome::Applied => {
                debug!(?action, "Action applied");
            }
            ActionOutcome::Rejected => {
                // The policy's preconditions should make this unreachable.
                warn!(?action, "Engine rejected action");
            }
        }
        self.phase = AgentPhase::Planning;

        // Trap check after every applied action.
        let (grid, state) = engine.observe();
        if !has_legal_move(&grid, state.position, state.sticks) {
            info!(tick = self.tick, "Trapped after action");
            self.phase = AgentPhase::Trapped;
            self.observer.on_finished(self.phase, &state);
        }
        self.phase
    }

    /// Runs until a terminal phase or the tick limit.
    pub fn run(&mut self, engine: &mut dyn GameEngine, max_ticks: u32) -> AgentPhase {
        let (grid, state) = engine.observe();
        self.observer.on_start(&grid, &state);
        for _ in 0..max_ticks {
            if self.tick(engine).is_terminal() {
                break;
            }
        }
        self.phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::engine::LocalEngine;
    use crate::grid::{CellState, Grid};
    use crate::observer::NullObserver;
    use crate::policy::{ManualPolicy, PathfindingPolicy};

    #[test]
    fn test_agent_transitions_to_trapped_when_walled_in() {
        let mut grid = Grid::new(3, 3);
        let center = Position::new(1, 1);
        grid.set(center, CellState::Player);
        for neighbor in center.neighbors() {
            grid.set(neighbor, CellState::Rock);
        }
        let mut engine = LocalEngine::restore(grid, AgentState::new(center), GameConfig::default());
        let mut agent = Agent::new(PathfindingPolicy::new(), NullObserver);
        assert_eq!(agent.tick(&mut engine), AgentPhase::Trapped);
        // Terminal, stays trapped.
        assert_eq!(agent.tick(&mut engine), AgentPhase::Trapped);
    }

    #[test]
    fn test_agent_reports_goal_exhausted_on_unwinnable_grid() {
        // A stick exists but sits behind a rock with no budget to clear.
        let mut grid = Grid::new(3, 1);
        grid.set(Position::new(0, 0), CellState::Player);
        grid.set(Position::new(1, 0), CellState::Rock);
        grid.set(Position::new(2, 0), CellState::Stick);
        let mut engine = LocalEngine::restore(
            grid,
            AgentState::new(Position::new(0, 0)),
            GameConfig::default(),
        );
        let mut agent = Agent::new(PathfindingPolicy::new(), NullObserver);
        // (0,0) has no walkable neighbor either; walled in by the rock.
        assert_eq!(agent.tick(&mut engine), AgentPhase::Trapped);

        // Same layout on a wider grid: free cells exist, but the stick
        // stays out of reach, so goals are exhausted rather than trapped.
        let mut grid = Grid::new(3, 2);
        grid.set(Position::new(0, 0), CellState::Player);
        grid.set(Position::new(1, 0), CellState::Rock);
        grid.set(Position::new(1, 1), CellState::Rock);
        grid.set(Position::new(2, 0), CellState::Stick);
        let mut engine = LocalEngine::restore(
            grid,
            AgentState::new(Position::new(0, 0)),
            GameConfig::default(),
        );
        let mut agent = Agent::new(PathfindingPolicy::new(), NullObserver);
        assert_eq!(agent.tick(&mut engine), AgentPhase::GoalExhausted);
    }

    #[test]
    fn test_manual_policy_drives_loop() {
        let mut grid = Grid::new(3, 1);
        grid.set(Position::new(0, 0), CellState::Player);
        grid.set(Position::new(2, 0), CellState::Stick);
        let mut engine = LocalEngine::restore(
            grid,
            AgentState::new(Position::new(0, 0)),
            GameConfig {
                stick_density: 0.0,
                rock_density: 0.0,
                ..GameConfig::default()
            },
        );
        let policy = ManualPolicy::from_actions([
            Action::MoveTo(Direction::East),
            Action::MoveTo(Direction::East),
        ]);
        let mut agent = Agent::new(policy, NullObserver);
        agent.tick(&mut engine);
        agent.tick(&mut engine);
        let (_, state) = engine.observe();
        assert_eq!(state.position, Position::new(2, 0));
        assert_eq!(state.sticks, 1);
    }
}
