/// GameState: the complete snapshot of a running game.
///
/// One owned aggregate (grid + player + run state), passed by `&mut` into the
/// simulation step and by `&` into the render step. Nothing else holds game data.

use crate::domain::entity::Player;
use crate::domain::grid::Grid;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RunState {
    Running,
    Terminated,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    pub grid: Grid,
    pub player: Player,
    pub run_state: RunState,
}

impl GameState {
    /// Fresh game: all-grass grid, player at the center cell, running.
    pub fn new(grid: Grid) -> Self {
        let player = Player::centered(grid.width(), grid.height());
        GameState {
            grid,
            player,
            run_state: RunState::Running,
        }
    }

    pub fn is_running(&self) -> bool {
        self.run_state == RunState::Running
    }

    pub fn terminate(&mut self) {
        self.run_state = RunState::Terminated;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tile::TileState;

    #[test]
    fn new_state_is_running_with_centered_player() {
        let s = GameState::new(Grid::new(20, 15));
        assert!(s.is_running());
        assert_eq!(s.player.position(), (10, 7));
        assert_eq!(s.grid.count(TileState::Grass), 20 * 15);
    }

    #[test]
    fn terminate_is_sticky() {
        let mut s = GameState::new(Grid::new(3, 3));
        s.terminate();
        s.terminate();
        assert_eq!(s.run_state, RunState::Terminated);
    }
}
