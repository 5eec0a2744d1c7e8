use std::collections::{HashMap, HashSet, VecDeque};

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, GameConfig};
use crate::reachability;
use crate::types::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellState {
    Empty,
    Rock,
    Stick,
    Player,
}

/// Authoritative cell state. Only non-Empty cells are stored; in-bounds
/// lookups of unset positions report Empty. The grid never recomputes
/// derived state (reachability, paths) on its own.
#[derive(Debug, Clone)]
pub struct Grid {
    pub width: i32,
    pub height: i32,
    cells: HashMap<Position, CellState>,
}

impl Grid {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            cells: HashMap::new(),
        }
    }

    pub fn in_bounds(&self, pos: &Position) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    /// Cell state at a position, None when out of bounds. Planners treat
    /// out-of-bounds as impassable.
    pub fn cell_at(&self, pos: &Position) -> Option<CellState> {
        if !self.in_bounds(pos) {
            return None;
        }
        Some(self.cells.get(pos).copied().unwrap_or(CellState::Empty))
    }

    pub fn set(&mut self, pos: Position, state: CellState) {
        if !self.in_bounds(&pos) {
            return;
        }
        if state == CellState::Empty {
            self.cells.remove(&pos);
        } else {
            self.cells.insert(pos, state);
        }
    }

    /// Cardinal neighbors, bounds-filtered.
    pub fn neighbors(&self, pos: &Position) -> Vec<Position> {
        pos.neighbors()
            .into_iter()
            .filter(|n| self.in_bounds(n))
            .collect()
    }

    pub fn is_walkable(&self, pos: &Position) -> bool {
        matches!(
            self.cell_at(pos),
            Some(CellState::Empty | CellState::Stick)
        )
    }

    fn positions_of(&self, state: CellState) -> Vec<Position> {
        let mut positions: Vec<Position> = self
            .cells
            .iter()
            .filter(|&(_, &cell)| cell == state)
            .map(|(&pos, _)| pos)
            .collect();
        positions.sort_by_key(|pos| (pos.y, pos.x));
        positions
    }

    pub fn sticks(&self) -> Vec<Position> {
        self.positions_of(CellState::Stick)
    }

    pub fn rocks(&self) -> Vec<Position> {
        self.positions_of(CellState::Rock)
    }

    /// Empty cells, sorted row-major for deterministic sampling.
    pub fn empty_cells(&self) -> Vec<Position> {
        let mut empties = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let pos = Position::new(x, y);
                if self.cell_at(&pos) == Some(CellState::Empty) {
                    empties.push(pos);
                }
            }
        }
        empties
    }

    pub fn player_position(&self) -> Option<Position> {
        self.cells
            .iter()
            .find(|&(_, &cell)| cell == CellState::Player)
            .map(|(&pos, _)| pos)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Position, &CellState)> {
        self.cells.iter()
    }

    /// Procedurally generates a grid: independent rock/stick sampling by
    /// density, player spawned at the center, and a construction-time
    /// guarantee that at least one stick is reachable from spawn without
    /// spending any stick. The same seed always yields the same layout.
    #[tracing::instrument(level = "debug", skip(config), fields(width = config.width, height = config.height))]
    pub fn generate(config: &GameConfig) -> Result<Grid, ConfigError> {
        config.validate()?;

        let seed = config.seed.unwrap_or_else(|| rand::rng().random());
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let spawn = Position::new(config.width / 2, config.height / 2);

        const MAX_ATTEMPTS: u32 = 64;
        for attempt in 0..MAX_ATTEMPTS {
            let grid = Self::sample(config, spawn, &mut rng);
            let reachable = reachability::reachable_set(&grid, spawn, 0);
            if grid.sticks().iter().any(|pos| reachable.contains(pos)) {
                tracing::debug!(seed, attempt, "Grid generated");
                return Ok(grid);
            }
        }
        Err(ConfigError::NoReachableStick {
            attempts: MAX_ATTEMPTS,
        })
    }

    fn sample(config: &GameConfig, spawn: Position, rng: &mut ChaCha8Rng) -> Grid {
        let mut grid = Grid::new(config.width, config.height);
        for y in 0..config.height {
            for x in 0..config.width {
                let pos = Position::new(x, y);
                if pos == spawn {
                    continue;
                }
                let roll: f64 = rng.random();
                if roll < config.rock_density {
                    grid.set(pos, CellState::Rock);
                } else if roll < config.rock_density + config.stick_density {
                    grid.set(pos, CellState::Stick);
                }
            }
        }
        // Never start without a stick on the board.
        if grid.sticks().is_empty() {
            let empties = grid.empty_cells();
            let candidates: Vec<Position> =
                empties.into_iter().filter(|pos| *pos != spawn).collect();
            if !candidates.is_empty() {
                let pos = candidates[rng.random_range(0..candidates.len())];
                grid.set(pos, CellState::Stick);
            }
        }
        grid.set(spawn, CellState::Player);
        grid
    }

    /// True when placing a rock here cannot strand a stick: every stick
    /// must stay inside the player's rock-free region afterwards. Cells
    /// already buried under 7+ rock neighbors (diagonals included) are
    /// accepted outright.
    pub fn is_safe_rock_position(&self, pos: &Position) -> bool {
        if self.rock_neighbor_count(pos) >= 7 {
            return true;
        }
        let Some(player) = self.player_position() else {
            return false;
        };

        let mut region: HashSet<Position> = HashSet::new();
        let mut queue = VecDeque::new();
        region.insert(player);
        queue.push_back(player);
        while let Some(current) = queue.pop_front() {
            for neighbor in self.neighbors(&current) {
                if region.contains(&neighbor) || neighbor == *pos {
                    continue;
                }
                if matches!(
                    self.cell_at(&neighbor),
                    Some(CellState::Empty | CellState::Stick)
                ) {
                    region.insert(neighbor);
                    queue.push_back(neighbor);
                }
            }
        }

        self.sticks().iter().all(|stick| region.contains(stick))
    }

    fn rock_neighbor_count(&self, pos: &Position) -> usize {
        let mut count = 0;
        for dx in -1..=1 {
            for dy in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let check = Position::new(pos.x + dx, pos.y + dy);
                if self.cell_at(&check) == Some(CellState::Rock) {
                    count += 1;
                }
            }
        }
        count
    }

    pub fn draw_ascii(&self) -> String {
        let mut output = String::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let ch = match self.cell_at(&Position::new(x, y)) {
                    Some(CellState::Player) => '@',
                    Some(CellState::Rock) => 'O',
                    Some(CellState::Stick) => '/',
                    Some(CellState::Empty) => '.',
                    None => '?',
                };
                output.push(ch);
            }
            output.push('\n');
        }
        output
    }
}
