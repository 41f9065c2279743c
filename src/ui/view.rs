/// Render step: projects the game state onto a display surface.
///
/// Frame order is fixed, the player has to land on top of the grid:
///   1. clear to background
///   2. every tile, row-major: filled rect in the tile's color, then a 1px outline
///   3. the player as a filled rect
///   4. present
///
/// Read-only over `GameState`; identical state yields an identical call sequence.

use std::io;

use crate::domain::color::Rgb;
use crate::sim::world::GameState;
use super::surface::{Rect, RectStyle, Surface};

#[derive(Clone, Debug)]
pub struct View {
    pub tile_size: u32,
    pub background: Rgb,
    pub grid_line: Rgb,
}

impl View {
    pub fn new(tile_size: u32) -> Self {
        View {
            tile_size,
            background: Rgb::BLACK,
            grid_line: Rgb::BLACK,
        }
    }

    /// Screen rect of grid cell `(x, y)`. Coordinates past `i32::MAX` saturate.
    pub fn tile_rect(&self, x: usize, y: usize) -> Rect {
        let t = self.tile_size;
        let origin = |i: usize| i32::try_from(i as u64 * t as u64).unwrap_or(i32::MAX);
        Rect::new(origin(x), origin(y), t, t)
    }
}

pub fn render<S: Surface + ?Sized>(state: &GameState, surface: &mut S, view: &View) -> io::Result<()> {
    surface.fill(view.background);

    for (x, y, tile) in state.grid.cells() {
        let rect = view.tile_rect(x, y);
        surface.draw_rect(rect, tile.color(), RectStyle::Filled);
        surface.draw_rect(rect, view.grid_line, RectStyle::Outline(1));
    }

    let (px, py) = state.player.position();
    surface.draw_rect(view.tile_rect(px, py), state.player.color, RectStyle::Filled);

    surface.present()
}
