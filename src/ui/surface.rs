/// Display surface abstraction.
///
/// Pixel coordinates, origin top-left. The render step only ever talks to this
/// trait, so any backend (terminal, window, test recorder) can stand behind it.

use std::io;

use crate::domain::color::Rgb;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Rect { x, y, w, h }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RectStyle {
    Filled,
    /// Border only, `n` pixels wide.
    Outline(u32),
}

pub trait Surface {
    /// Paint the whole surface with one color.
    fn fill(&mut self, color: Rgb);

    fn draw_rect(&mut self, rect: Rect, color: Rgb, style: RectStyle);

    /// Show the completed frame.
    fn present(&mut self) -> io::Result<()>;
}
