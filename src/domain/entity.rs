/// Entities: the player token and the direction it moves in.

use super::color::Rgb;

/// Movement direction, one grid cell per step.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveDir {
    Left,
    Right,
    Up,
    Down,
}

impl MoveDir {
    /// Grid delta `(dx, dy)`. Screen convention: y grows downward.
    pub fn delta(self) -> (i32, i32) {
        match self {
            MoveDir::Left => (-1, 0),
            MoveDir::Right => (1, 0),
            MoveDir::Up => (0, -1),
            MoveDir::Down => (0, 1),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub x: usize,
    pub y: usize,
    pub color: Rgb,
    /// Reserved for smooth (sub-tile) movement; movement is currently one cell per intent.
    #[allow(dead_code)]
    pub speed: u32,
}

impl Player {
    pub const DEFAULT_SPEED: u32 = 5;

    pub fn new(x: usize, y: usize) -> Self {
        Player {
            x, y,
            color: Rgb::BLUE,
            speed: Self::DEFAULT_SPEED,
        }
    }

    /// Player placed at the center cell of a `width × height` grid.
    pub fn centered(width: usize, height: usize) -> Self {
        Player::new(width / 2, height / 2)
    }

    pub fn position(&self) -> (usize, usize) {
        (self.x, self.y)
    }

    /// Shift one cell in `dir` if the destination stays inside `width × height`.
    /// Clamp-at-edge: an out-of-bounds move is dropped, never wrapped.
    /// Returns whether the position changed.
    pub fn try_move(&mut self, dir: MoveDir, width: usize, height: usize) -> bool {
        let (dx, dy) = dir.delta();
        let nx = self.x as i64 + dx as i64;
        let ny = self.y as i64 + dy as i64;
        if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
            return false;
        }
        self.x = nx as usize;
        self.y = ny as usize;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: usize = 20;
    const H: usize = 15;
    const ALL: [MoveDir; 4] = [MoveDir::Up, MoveDir::Down, MoveDir::Left, MoveDir::Right];

    #[test]
    fn starts_at_grid_center() {
        let p = Player::centered(W, H);
        assert_eq!(p.position(), (10, 7));
        assert_eq!(p.color, Rgb::BLUE);
        assert_eq!(p.speed, 5);
    }

    #[test]
    fn move_shifts_exactly_one_cell() {
        for dir in ALL {
            let mut p = Player::new(5, 5);
            assert!(p.try_move(dir, W, H));
            let (dx, dy) = dir.delta();
            assert_eq!(p.x as i32, 5 + dx);
            assert_eq!(p.y as i32, 5 + dy);
        }
    }

    #[test]
    fn every_cell_every_direction_stays_in_bounds() {
        for y in 0..H {
            for x in 0..W {
                for dir in ALL {
                    let mut p = Player::new(x, y);
                    let moved = p.try_move(dir, W, H);
                    assert!(p.x < W && p.y < H);
                    let dist = p.x.abs_diff(x) + p.y.abs_diff(y);
                    if moved {
                        assert_eq!(dist, 1);
                    } else {
                        assert_eq!(p.position(), (x, y));
                    }
                }
            }
        }
    }

    #[test]
    fn corners_clamp() {
        let mut p = Player::new(0, 0);
        assert!(!p.try_move(MoveDir::Up, W, H));
        assert!(!p.try_move(MoveDir::Left, W, H));
        assert_eq!(p.position(), (0, 0));

        let mut p = Player::new(W - 1, H - 1);
        assert!(!p.try_move(MoveDir::Down, W, H));
        assert!(!p.try_move(MoveDir::Right, W, H));
        assert_eq!(p.position(), (W - 1, H - 1));
    }

    #[test]
    fn single_cell_grid_never_moves() {
        let mut p = Player::centered(1, 1);
        for dir in ALL {
            assert!(!p.try_move(dir, 1, 1));
        }
        assert_eq!(p.position(), (0, 0));
    }
}
