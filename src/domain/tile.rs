/// Tile states and their properties.
/// Properties are queried via methods, not stored as flags,
/// so tile semantics are centralized here.

use super::color::Rgb;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum TileState {
    #[default]
    Grass,
    TilledSoil,
}

impl TileState {
    /// Can a till action turn this tile into soil?
    /// One-directional: tilled soil never goes back to grass.
    pub fn is_tillable(self) -> bool {
        matches!(self, TileState::Grass)
    }

    /// Fill color used by the render step.
    pub fn color(self) -> Rgb {
        match self {
            TileState::Grass => Rgb::GREEN,
            TileState::TilledSoil => Rgb::DARK_BROWN,
        }
    }
}
