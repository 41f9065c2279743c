/// Grid: fixed-size row-major matrix of tile states.
///
/// Dimensions are fixed at construction. Every cell starts as `Grass`.
/// Access outside the grid is a broken invariant and reported as
/// `GameError::OutOfBounds`, never clamped or wrapped.

use crate::error::GameError;
use super::tile::TileState;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    tiles: Vec<TileState>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Grid {
            width,
            height,
            tiles: vec![TileState::Grass; width * height],
        }
    }

    /// Grid sized to cover a screen: `screen / tile` on each axis (integer division).
    pub fn for_screen(screen_w: u32, screen_h: u32, tile_size: u32) -> Self {
        let tile = tile_size.max(1);
        Grid::new((screen_w / tile) as usize, (screen_h / tile) as usize)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    pub fn tile_at(&self, x: usize, y: usize) -> Result<TileState, GameError> {
        self.index(x, y).map(|i| self.tiles[i])
    }

    pub fn set_tile(&mut self, x: usize, y: usize, state: TileState) -> Result<(), GameError> {
        let i = self.index(x, y)?;
        self.tiles[i] = state;
        Ok(())
    }

    /// Row-major iteration: `(x, y, state)` for every cell, top row first.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, TileState)> + '_ {
        let w = self.width;
        self.tiles
            .iter()
            .enumerate()
            .map(move |(i, &t)| (i % w, i / w, t))
    }

    pub fn count(&self, state: TileState) -> usize {
        self.tiles.iter().filter(|&&t| t == state).count()
    }

    fn index(&self, x: usize, y: usize) -> Result<usize, GameError> {
        if self.contains(x, y) {
            Ok(y * self.width + x)
        } else {
            Err(GameError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            })
        }
    }
}
