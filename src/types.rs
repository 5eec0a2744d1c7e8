use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance.
    pub fn distance(&self, other: &Position) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    pub fn neighbors(&self) -> [Position; 4] {
        [
            Position::new(self.x, self.y - 1), // North
            Position::new(self.x + 1, self.y), // East
            Position::new(self.x, self.y + 1), // South
            Position::new(self.x - 1, self.y), // West
        ]
    }

    pub fn is_adjacent(&self, other: &Position) -> bool {
        self.distance(other) == 1
    }

    pub fn step(&self, direction: Direction) -> Position {
        let (dx, dy) = direction.delta();
        Position::new(self.x + dx, self.y + dy)
    }

    /// Direction towards a cardinally adjacent position.
    pub fn direction_to(&self, other: &Position) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|dir| self.step(*dir) == *other)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_to_adjacent() {
        let center = Position::new(2, 2);
        assert_eq!(center.direction_to(&Position::new(2, 1)), Some(Direction::North));
        assert_eq!(center.direction_to(&Position::new(3, 2)), Some(Direction::East));
        assert_eq!(center.direction_to(&Position::new(2, 3)), Some(Direction::South));
        assert_eq!(center.direction_to(&Position::new(1, 2)), Some(Direction::West));
        assert_eq!(center.direction_to(&Position::new(3, 3)), None);
        assert_eq!(center.direction_to(&center), None);
    }

    #[test]
    fn test_step_round_trips_neighbors() {
        let pos = Position::new(5, 7);
        for (neighbor, dir) in pos.neighbors().into_iter().zip(Direction::ALL) {
            assert_eq!(pos.step(dir), neighbor);
            assert!(pos.is_adjacent(&neighbor));
        }
    }
}
