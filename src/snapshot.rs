use serde::{Deserialize, Serialize};

use crate::agent::AgentState;
use crate::config::GameConfig;
use crate::engine::LocalEngine;
use crate::grid::{CellState, Grid};
use crate::types::Position;

/// Serializable grid form. Cells are a sorted list because JSON maps need
/// string keys; only non-Empty cells are recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub width: i32,
    pub height: i32,
    pub cells: Vec<(Position, CellState)>,
}

impl From<&Grid> for GridSnapshot {
    fn from(grid: &Grid) -> Self {
        let mut cells: Vec<(Position, CellState)> =
            grid.iter().map(|(&pos, &cell)| (pos, cell)).collect();
        cells.sort_by_key(|(pos, _)| (pos.y, pos.x));
        Self {
            width: grid.width,
            height: grid.height,
            cells,
        }
    }
}

impl GridSnapshot {
    pub fn into_grid(self) -> Grid {
        let mut grid = Grid::new(self.width, self.height);
        for (pos, cell) in self.cells {
            grid.set(pos, cell);
        }
        grid
    }
}

/// Full game state at one instant, round-trippable through JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub config: GameConfig,
    pub grid: GridSnapshot,
    pub agent: AgentState,
}

impl Snapshot {
    pub fn capture(engine: &LocalEngine) -> Self {
        Self {
            config: engine.config().clone(),
            grid: GridSnapshot::from(engine.grid()),
            agent: engine.agent_state().clone(),
        }
    }

    pub fn restore(self) -> LocalEngine {
        LocalEngine::restore(self.grid.into_grid(), self.agent, self.config)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
