/// Error taxonomy for the game.
///
/// Every variant is fatal: the loop stops, the terminal is restored,
/// and the process exits with a non-zero status.

use std::fmt;
use std::io;

#[derive(Debug)]
pub enum GameError {
    /// Grid access outside `width × height`. Means a movement invariant broke.
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
    /// The display surface could not be created.
    DisplayInit(io::Error),
    /// Input drain or frame presentation failed mid-loop.
    Io(io::Error),
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::OutOfBounds { x, y, width, height } => write!(
                f,
                "grid access out of bounds: ({x}, {y}) on a {width}x{height} grid"
            ),
            GameError::DisplayInit(e) => write!(f, "display init failed: {e}"),
            GameError::Io(e) => write!(f, "i/o error: {e}"),
        }
    }
}

impl std::error::Error for GameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GameError::OutOfBounds { .. } => None,
            GameError::DisplayInit(e) | GameError::Io(e) => Some(e),
        }
    }
}

impl From<io::Error> for GameError {
    fn from(e: io::Error) -> Self {
        GameError::Io(e)
    }
}
