use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace};

use crate::agent::AgentState;
use crate::config::{ConfigError, Difficulty, GameConfig};
use crate::grid::{CellState, Grid};
use crate::policy::Action;
use crate::reachability::has_legal_move;
use crate::types::{Direction, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Applied,
    /// Precondition failed; the grid was not mutated.
    Rejected,
}

/// What the agent loop needs from a game: a fresh snapshot per tick and
/// one mutation per action.
pub trait GameEngine {
    fn observe(&self) -> (Grid, AgentState);
    fn apply(&mut self, action: Action) -> ActionOutcome;
}

/// In-process game rules: movement, stick pickup with procedural respawn,
/// rock clearing. Holds the authoritative grid and agent state.
pub struct LocalEngine {
    grid: Grid,
    agent: AgentState,
    config: GameConfig,
    rng: ChaCha8Rng,
}

impl LocalEngine {
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        let grid = Grid::generate(&config)?;
        let spawn = Position::new(config.width / 2, config.height / 2);
        let seed = config.seed.unwrap_or_else(|| rand::rng().random());
        Ok(Self {
            grid,
            agent: AgentState::new(spawn),
            rng: ChaCha8Rng::seed_from_u64(seed),
            config,
        })
    }

    /// Rebuilds an engine around an explicit grid and agent state, e.g.
    /// from a snapshot or a hand-built test layout.
    pub fn restore(grid: Grid, agent: AgentState, config: GameConfig) -> Self {
        let seed = config.seed.unwrap_or(0);
        Self {
            grid,
            agent,
            rng: ChaCha8Rng::seed_from_u64(seed),
            config,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn agent_state(&self) -> &AgentState {
        &self.agent
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    fn move_to(&mut self, direction: Direction) -> ActionOutcome {
        // Facing updates even when the move itself is refused.
        self.agent.facing = direction;
        let target = self.agent.position.step(direction);
        let picked_stick = match self.grid.cell_at(&target) {
            Some(CellState::Empty) => false,
            Some(CellState::Stick) => true,
            _ => return ActionOutcome::Rejected,
        };

        self.grid.set(self.agent.position, CellState::Empty);
        self.grid.set(target, CellState::Player);
        self.agent.position = target;
        self.agent.moves += 1;

        if picked_stick {
            self.agent.sticks += 1;
            debug!(sticks = self.agent.sticks, "Stick collected");
            self.respawn_stick();
            self.respawn_rock();
        }
        ActionOutcome::Applied
    }

    fn clear_rock(&mut self, direction: Direction) -> ActionOutcome {
        self.agent.facing = direction;
        let target = self.agent.position.step(direction);
        if self.grid.cell_at(&target) != Some(CellState::Rock) || self.agent.sticks == 0 {
            return ActionOutcome::Rejected;
        }
        self.agent.sticks -= 1;
        self.grid.set(target, CellState::Empty);
        debug!(sticks = self.agent.sticks, "Rock cleared");
        ActionOutcome::Applied
    }

    /// Every pickup puts a fresh stick on a uniformly random empty cell,
    /// keeping the game endless.
    fn respawn_stick(&mut self) {
        let empties = self.grid.empty_cells();
        if empties.is_empty() {
            return;
        }
        let pos = empties[self.rng.random_range(0..empties.len())];
        self.grid.set(pos, CellState::Stick);
        trace!(x = pos.x, y = pos.y, "Stick respawned");
    }

    /// Every pickup also drops a rock. On Easy, only placements that keep
    /// all sticks inside the player's region qualify; candidates are tried
    /// in random order. Normal places anywhere empty. Skipped when no
    /// candidate qualifies.
    fn respawn_rock(&mut self) {
        let mut empties = self.grid.empty_cells();
        if empties.is_empty() {
            return;
        }
        match self.config.difficulty {
            Difficulty::Easy => {
                while !empties.is_empty() {
                    let index = self.rng.random_range(0..empties.len());
                    let pos = empties.swap_remove(index);
                    if self.grid.is_safe_rock_position(&pos) {
                        self.grid.set(pos, CellState::Rock);
                        trace!(x = pos.x, y = pos.y, "Rock respawned");
                        return;
                    }
                }
                trace!("No safe cell for a rock, skipping respawn");
            }
            Difficulty::Normal => {
                let pos = empties[self.rng.random_range(0..empties.len())];
                self.grid.set(pos, CellState::Rock);
                trace!(x = pos.x, y = pos.y, "Rock respawned");
            }
        }
    }
}

impl GameEngine for LocalEngine {
    fn observe(&self) -> (Grid, AgentState) {
        (self.grid.clone(), self.agent.clone())
    }

    fn apply(&mut self, action: Action) -> ActionOutcome {
        let outcome = match action {
            Action::MoveTo(direction) => self.move_to(direction),
            Action::ClearRock(direction) => self.clear_rock(direction),
            Action::Idle => ActionOutcome::Applied,
        };
        self.agent.game_over =
            !has_legal_move(&self.grid, self.agent.position, self.agent.sticks);
        outcome
    }
}
