/// Entities on the board: the player token, its grid position and the
/// direction state that drives sprite animation.

/// Movement direction requested by one key press.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveDir {
    Up,
    Down,
    Left,
    Right,
}

impl MoveDir {
    /// Grid delta for one step. Y grows downward.
    pub fn delta(self) -> (i32, i32) {
        match self {
            MoveDir::Up    => (0, -1),
            MoveDir::Down  => (0, 1),
            MoveDir::Left  => (-1, 0),
            MoveDir::Right => (1, 0),
        }
    }
}

/// Facing / animation state of the player.
/// `Idle` whenever no movement key is held.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum Direction {
    #[default]
    Idle,
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 5] = [
        Direction::Idle,
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Key used for this direction in `[animation]` config and logs.
    pub fn name(self) -> &'static str {
        match self {
            Direction::Idle  => "idle",
            Direction::Up    => "up",
            Direction::Down  => "down",
            Direction::Left  => "left",
            Direction::Right => "right",
        }
    }
}

impl From<MoveDir> for Direction {
    fn from(dir: MoveDir) -> Self {
        match dir {
            MoveDir::Up    => Direction::Up,
            MoveDir::Down  => Direction::Down,
            MoveDir::Left  => Direction::Left,
            MoveDir::Right => Direction::Right,
        }
    }
}

/// Grid cell coordinate, each axis in `[0, grid_size - 1]`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0, y: 0 };

    pub const fn new(x: usize, y: usize) -> Self {
        Position { x, y }
    }

    /// Neighbouring cell in `dir`, or None if it falls outside the grid.
    pub fn step(self, dir: MoveDir, grid_size: usize) -> Option<Position> {
        let (dx, dy) = dir.delta();
        let nx = self.x as i64 + dx as i64;
        let ny = self.y as i64 + dy as i64;
        let limit = grid_size as i64;
        if nx < 0 || ny < 0 || nx >= limit || ny >= limit {
            return None;
        }
        Some(Position::new(nx as usize, ny as usize))
    }

    pub fn in_grid(self, grid_size: usize) -> bool {
        self.x < grid_size && self.y < grid_size
    }
}

#[derive(Clone, Debug)]
pub struct Player {
    pub pos: Position,
    pub direction: Direction,
}

impl Player {
    pub fn new(pos: Position) -> Self {
        Player { pos, direction: Direction::Idle }
    }

    /// Back to the origin facing nowhere (after a solved or failed puzzle).
    pub fn reset(&mut self) {
        self.pos = Position::ORIGIN;
        self.direction = Direction::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_inside_grid() {
        let p = Position::new(2, 2);
        assert_eq!(p.step(MoveDir::Up, 5), Some(Position::new(2, 1)));
        assert_eq!(p.step(MoveDir::Down, 5), Some(Position::new(2, 3)));
        assert_eq!(p.step(MoveDir::Left, 5), Some(Position::new(1, 2)));
        assert_eq!(p.step(MoveDir::Right, 5), Some(Position::new(3, 2)));
    }

    #[test]
    fn step_off_grid_is_none() {
        assert_eq!(Position::ORIGIN.step(MoveDir::Up, 5), None);
        assert_eq!(Position::ORIGIN.step(MoveDir::Left, 5), None);
        let corner = Position::new(4, 4);
        assert_eq!(corner.step(MoveDir::Right, 5), None);
        assert_eq!(corner.step(MoveDir::Down, 5), None);
    }

    #[test]
    fn move_dir_maps_to_direction() {
        assert_eq!(Direction::from(MoveDir::Left), Direction::Left);
        assert_eq!(Direction::from(MoveDir::Up), Direction::Up);
        assert_eq!(Direction::default(), Direction::Idle);
    }

    #[test]
    fn player_reset_returns_to_origin() {
        let mut p = Player::new(Position::new(3, 1));
        p.direction = Direction::Right;
        p.reset();
        assert_eq!(p.pos, Position::ORIGIN);
        assert_eq!(p.direction, Direction::Idle);
    }
}
