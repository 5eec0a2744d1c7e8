use tracing::{debug, info};

use crate::agent::{AgentPhase, AgentState};
use crate::grid::Grid;
use crate::policy::Action;

/// Hooks into the agent loop for logging, visualization or recording.
/// Every method has an empty default so observers implement only what
/// they care about.
pub trait GameObserver {
    fn on_start(&mut self, _grid: &Grid, _agent: &AgentState) {}
    fn on_tick(&mut self, _tick: u32, _grid: &Grid, _agent: &AgentState) {}
    fn on_action(&mut self, _action: Action, _agent: &AgentState) {}
    fn on_finished(&mut self, _phase: AgentPhase, _agent: &AgentState) {}
}

/// Logs the run through tracing; the grid itself only at debug level.
pub struct DefaultObserver;

impl GameObserver for DefaultObserver {
    fn on_start(&mut self, grid: &Grid, agent: &AgentState) {
        info!(
            width = grid.width,
            height = grid.height,
            x = agent.position.x,
            y = agent.position.y,
            "Run started"
        );
        debug!("\n{}", grid.draw_ascii());
    }

    fn on_tick(&mut self, tick: u32, grid: &Grid, agent: &AgentState) {
        debug!(
            tick,
            x = agent.position.x,
            y = agent.position.y,
            sticks = agent.sticks,
            moves = agent.moves,
            "Tick"
        );
        debug!("\n{}", grid.draw_ascii());
    }

    fn on_action(&mut self, action: Action, _agent: &AgentState) {
        debug!(?action, "Action chosen");
    }

    fn on_finished(&mut self, phase: AgentPhase, agent: &AgentState) {
        info!(
            ?phase,
            moves = agent.moves,
            sticks = agent.sticks,
            "Run finished"
        );
    }
}

/// Silent observer for tests and headless benchmarks.
pub struct NullObserver;

impl GameObserver for NullObserver {}
