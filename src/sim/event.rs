/// Events emitted during a simulation step.
/// The presentation layer consumes these for diagnostics and sound.
/// They describe what happened; they never feed back into state.

use std::fmt;

use crate::domain::entity::MoveDir;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameEvent {
    PlayerMoved { x: usize, y: usize },
    MoveBlocked { x: usize, y: usize, direction: MoveDir },
    SoilTilled { x: usize, y: usize },
    AlreadyTilled { x: usize, y: usize },
    QuitRequested,
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameEvent::PlayerMoved { x, y } | GameEvent::MoveBlocked { x, y, .. } => {
                write!(f, "Player position: ({x}, {y})")
            }
            GameEvent::SoilTilled { x, y } => write!(f, "Tilled soil at position: ({x}, {y})"),
            GameEvent::AlreadyTilled { x, y } => write!(f, "Soil already tilled at position: ({x}, {y})"),
            GameEvent::QuitRequested => write!(f, "Quit requested"),
        }
    }
}
