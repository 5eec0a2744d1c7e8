pub mod agent;
pub mod config;
pub mod engine;
pub mod grid;
pub mod observer;
pub mod pathfinding;
pub mod policy;
pub mod reachability;
pub mod snapshot;
pub mod types;

// Re-export commonly used types for convenience
pub use agent::{Agent, AgentPhase, AgentState};
pub use config::{Difficulty, GameConfig};
pub use engine::{ActionOutcome, GameEngine, LocalEngine};
pub use grid::{CellState, Grid};
pub use pathfinding::{AStar, Path};
pub use policy::{Action, DecisionPolicy, ManualPolicy, PathfindingPolicy};
pub use types::{Direction, Position};
