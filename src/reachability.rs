use std::collections::{HashMap, HashSet, VecDeque};

use crate::grid::{CellState, Grid};
use crate::types::Position;

/// The trap predicate, evaluated after every action: true iff at least one
/// in-bounds neighbor is Empty/Stick, or Rock while a stick remains to
/// spend. A fully enclosed position has no legal move.
pub fn has_legal_move(grid: &Grid, pos: Position, sticks: u32) -> bool {
    grid.neighbors(&pos).iter().any(|n| match grid.cell_at(n) {
        Some(CellState::Empty | CellState::Stick) => true,
        Some(CellState::Rock) => sticks > 0,
        _ => false,
    })
}

/// Every cell the agent could occupy given its stick budget. Crossing a
/// Rock spends one unit of budget along that branch; a cell is re-expanded
/// whenever it is re-reached with more budget left than previously seen.
#[tracing::instrument(level = "trace", skip(grid), fields(x = start.x, y = start.y, sticks))]
pub fn reachable_set(grid: &Grid, start: Position, sticks: u32) -> HashSet<Position> {
    let mut best_budget: HashMap<Position, u32> = HashMap::new();
    let mut queue: VecDeque<(Position, u32)> = VecDeque::new();

    best_budget.insert(start, sticks);
    queue.push_back((start, sticks));

    while let Some((current, budget)) = queue.pop_front() {
        for neighbor in grid.neighbors(&current) {
            let remaining = match grid.cell_at(&neighbor) {
                Some(CellState::Empty | CellState::Stick) => budget,
                Some(CellState::Rock) if budget > 0 => budget - 1,
                _ => continue,
            };
            if best_budget
                .get(&neighbor)
                .is_none_or(|&seen| remaining > seen)
            {
                best_budget.insert(neighbor, remaining);
                queue.push_back((neighbor, remaining));
            }
        }
    }

    best_budget.into_keys().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_legal_move_when_walled_in() {
        let mut grid = Grid::new(3, 3);
        let center = Position::new(1, 1);
        grid.set(center, CellState::Player);
        for neighbor in center.neighbors() {
            grid.set(neighbor, CellState::Rock);
        }
        assert!(!has_legal_move(&grid, center, 0));
        assert!(has_legal_move(&grid, center, 1));
    }

    #[test]
    fn test_legal_move_with_empty_neighbor() {
        let mut grid = Grid::new(3, 3);
        let center = Position::new(1, 1);
        grid.set(center, CellState::Player);
        assert!(has_legal_move(&grid, center, 0));
    }

    #[test]
    fn test_one_by_one_grid_has_no_move() {
        let mut grid = Grid::new(1, 1);
        let pos = Position::new(0, 0);
        grid.set(pos, CellState::Player);
        assert!(!has_legal_move(&grid, pos, 5));
    }

    #[test]
    fn test_reachable_set_respects_budget() {
        // Corridor: player | rock | empty | rock | empty
        let mut grid = Grid::new(5, 1);
        grid.set(Position::new(0, 0), CellState::Player);
        grid.set(Position::new(1, 0), CellState::Rock);
        grid.set(Position::new(3, 0), CellState::Rock);

        let none = reachable_set(&grid, Position::new(0, 0), 0);
        assert_eq!(none.len(), 1);

        let one = reachable_set(&grid, Position::new(0, 0), 1);
        assert!(one.contains(&Position::new(2, 0)));
        assert!(!one.contains(&Position::new(4, 0)));

        let two = reachable_set(&grid, Position::new(0, 0), 2);
        assert!(two.contains(&Position::new(4, 0)));
    }

    #[test]
    fn test_reachable_set_budget_monotone_revisit() {
        // Two ways to (2,0): around (rock-free) and straight through a
        // rock. The free route must leave budget intact for the far rock.
        let mut grid = Grid::new(4, 2);
        grid.set(Position::new(0, 0), CellState::Player);
        grid.set(Position::new(1, 0), CellState::Rock);
        grid.set(Position::new(3, 0), CellState::Rock);

        let reachable = reachable_set(&grid, Position::new(0, 0), 1);
        // (3,0) needs a full budget unit on arrival at (2,0); reachable
        // only because the rock-free detour via row 1 preserves it.
        assert!(reachable.contains(&Position::new(3, 0)));
    }
}
