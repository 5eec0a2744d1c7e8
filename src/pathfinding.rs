use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::grid::{CellState, Grid};
use crate::types::Position;

/// Route from start to goal over cardinally adjacent cells. Rocks on the
/// route are crossed by clearing them, one stick each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    pub positions: Vec<Position>,
    pub rocks_crossed: u32,
}

impl Path {
    /// Number of moves (and clears) from start to goal.
    pub fn steps(&self) -> usize {
        self.positions.len().saturating_sub(1)
    }

    pub fn first_step(&self) -> Option<Position> {
        self.positions.get(1).copied()
    }
}

#[derive(Clone, Eq, PartialEq)]
struct Node {
    pos: Position,
    rocks: u32,
    f_score: i32,
    h_score: i32,
}

impl Ord for Node {
    // Min-heap on f, then the deterministic tie-break: smaller heuristic,
    // then lowest row, then lowest column, then fewer rocks crossed.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f_score
            .cmp(&self.f_score)
            .then_with(|| other.h_score.cmp(&self.h_score))
            .then_with(|| other.pos.y.cmp(&self.pos.y))
            .then_with(|| other.pos.x.cmp(&self.pos.x))
            .then_with(|| other.rocks.cmp(&self.rocks))
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

pub struct AStar;

impl AStar {
    /// Weighted shortest path with a stick budget: every edge costs 1, and
    /// an edge into a Rock is traversable only while budget remains along
    /// that particular route. Manhattan heuristic, so the result is
    /// optimal. None is the NotFound outcome, expected whenever no
    /// budget-feasible route exists; any grid mutation invalidates the
    /// returned path and requires a fresh search.
    #[tracing::instrument(level = "trace", skip(grid), fields(start_x = start.x, start_y = start.y, goal_x = goal.x, goal_y = goal.y, sticks))]
    pub fn find_path(grid: &Grid, start: Position, goal: Position, sticks: u32) -> Option<Path> {
        if !grid.in_bounds(&start) || !grid.in_bounds(&goal) {
            return None;
        }
        if start == goal {
            return Some(Path {
                positions: vec![start],
                rocks_crossed: 0,
            });
        }

        // Search states are (position, rocks crossed so far); the same cell
        // can be worth revisiting with fewer rocks spent.
        let mut open_set = BinaryHeap::new();
        let mut came_from: HashMap<(Position, u32), (Position, u32)> = HashMap::new();
        let mut g_score: HashMap<(Position, u32), i32> = HashMap::new();

        g_score.insert((start, 0), 0);
        open_set.push(Node {
            pos: start,
            rocks: 0,
            f_score: heuristic(start, goal),
            h_score: heuristic(start, goal),
        });

        // Bounded by the full state space as a guard against malformed grids.
        let max_expansions = (grid.width as usize)
            .saturating_mul(grid.height as usize)
            .saturating_mul(sticks as usize + 1);
        let mut expansions = 0;

        while let Some(Node { pos: current, rocks, f_score, h_score }) = open_set.pop() {
            if current == goal {
                tracing::trace!(expansions, rocks, "Path found");
                return Some(reconstruct_path(&came_from, (current, rocks)));
            }

            let current_g = g_score[&(current, rocks)];
            if f_score - h_score > current_g {
                // Stale heap entry, a cheaper route to this state was found.
                continue;
            }

            expansions += 1;
            if expansions > max_expansions {
                tracing::warn!(expansions, "Search state space exhausted");
                return None;
            }

            for neighbor in grid.neighbors(&current) {
                let next_rocks = match grid.cell_at(&neighbor) {
                    Some(CellState::Empty | CellState::Stick) => rocks,
                    Some(CellState::Rock) if rocks < sticks => rocks + 1,
                    _ => continue,
                };

                let tentative_g = current_g + 1;
                let key = (neighbor, next_rocks);
                if tentative_g < *g_score.get(&key).unwrap_or(&i32::MAX) {
                    came_from.insert(key, (current, rocks));
                    g_score.insert(key, tentative_g);
                    let h = heuristic(neighbor, goal);
                    open_set.push(Node {
                        pos: neighbor,
                        rocks: next_rocks,
                        f_score: tentative_g + h,
                        h_score: h,
                    });
                }
            }
        }

        tracing::trace!(expansions, "No path found");
        None
    }
}

fn heuristic(a: Position, b: Position) -> i32 {
    a.distance(&b)
}

fn reconstruct_path(
    came_from: &HashMap<(Position, u32), (Position, u32)>,
    mut current: (Position, u32),
) -> Path {
    let rocks_crossed = current.1;
    let mut positions = vec![current.0];
    while let Some(&prev) = came_from.get(&current) {
        positions.push(prev.0);
        current = prev;
    }
    positions.reverse();
    Path {
        positions,
        rocks_crossed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_from_rows(rows: &[&str]) -> Grid {
        let mut grid = Grid::new(rows[0].len() as i32, rows.len() as i32);
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                let pos = Position::new(x as i32, y as i32);
                match ch {
                    'O' => grid.set(pos, CellState::Rock),
                    '/' => grid.set(pos, CellState::Stick),
                    '@' => grid.set(pos, CellState::Player),
                    _ => {}
                }
            }
        }
        grid
    }

    /// Exhaustive shortest budget-feasible path length via breadth-first
    /// enumeration over (position, rocks) states.
    fn brute_force_steps(
        grid: &Grid,
        start: Position,
        goal: Position,
        sticks: u32,
    ) -> Option<usize> {
        use std::collections::VecDeque;
        let mut seen = std::collections::HashSet::new();
        let mut queue = VecDeque::new();
        seen.insert((start, 0u32));
        queue.push_back((start, 0u32, 0usize));
        while let Some((pos, rocks, steps)) = queue.pop_front() {
            if pos == goal {
                return Some(steps);
            }
            for neighbor in grid.neighbors(&pos) {
                let next_rocks = match grid.cell_at(&neighbor) {
                    Some(CellState::Empty | CellState::Stick) => rocks,
                    Some(CellState::Rock) if rocks < sticks => rocks + 1,
                    _ => continue,
                };
                if seen.insert((neighbor, next_rocks)) {
                    queue.push_back((neighbor, next_rocks, steps + 1));
                }
            }
        }
        None
    }

    #[test]
    fn test_straight_line_path() {
        let grid = grid_from_rows(&["@....", ".....", "....."]);
        let path =
            AStar::find_path(&grid, Position::new(0, 0), Position::new(4, 0), 0).unwrap();
        assert_eq!(path.steps(), 4);
        assert_eq!(path.rocks_crossed, 0);
    }

    #[test]
    fn test_detours_around_rocks_without_budget() {
        let grid = grid_from_rows(&["@O...", ".O.O.", "...O."]);
        let path =
            AStar::find_path(&grid, Position::new(0, 0), Position::new(4, 0), 0).unwrap();
        assert_eq!(path.rocks_crossed, 0);
        assert!(path.positions.iter().all(|p| grid.cell_at(p) != Some(CellState::Rock)));
    }

    #[test]
    fn test_crosses_rock_when_budget_allows() {
        let grid = grid_from_rows(&["@O/"]);
        assert!(AStar::find_path(&grid, Position::new(0, 0), Position::new(2, 0), 0).is_none());
        let path =
            AStar::find_path(&grid, Position::new(0, 0), Position::new(2, 0), 1).unwrap();
        assert_eq!(path.steps(), 2);
        assert_eq!(path.rocks_crossed, 1);
    }

    #[test]
    fn test_not_found_is_none() {
        let grid = grid_from_rows(&["@O.", "OO.", "..."]);
        assert!(AStar::find_path(&grid, Position::new(0, 0), Position::new(2, 2), 1).is_none());
    }

    #[test]
    fn test_optimal_against_brute_force_on_5x5() {
        // Every free cell as goal, budgets 0..=2, on a mixed 5x5 grid.
        let grid = grid_from_rows(&[
            "@.O..",
            ".OO/.",
            ".....",
            "O.O.O",
            "../..",
        ]);
        let start = Position::new(0, 0);
        for sticks in 0..=2u32 {
            for y in 0..5 {
                for x in 0..5 {
                    let goal = Position::new(x, y);
                    if grid.cell_at(&goal) == Some(CellState::Player) {
                        continue;
                    }
                    let expected = brute_force_steps(&grid, start, goal, sticks);
                    let actual = AStar::find_path(&grid, start, goal, sticks)
                        .map(|path| path.steps());
                    assert_eq!(actual, expected, "goal {goal:?} sticks {sticks}");
                }
            }
        }
    }

    #[test]
    fn test_deterministic_output() {
        let grid = grid_from_rows(&["@....", ".....", "....."]);
        let a = AStar::find_path(&grid, Position::new(0, 0), Position::new(4, 2), 0).unwrap();
        let b = AStar::find_path(&grid, Position::new(0, 0), Position::new(4, 2), 0).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_start_equals_goal() {
        let grid = grid_from_rows(&["@.."]);
        let path =
            AStar::find_path(&grid, Position::new(0, 0), Position::new(0, 0), 0).unwrap();
        assert_eq!(path.steps(), 0);
    }
}
