/// 24-bit RGB color shared by the domain (player color) and the display layer.

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const GREEN: Rgb = Rgb::new(0, 255, 0);
    pub const DARK_BROWN: Rgb = Rgb::new(90, 50, 10);
    pub const BLUE: Rgb = Rgb::new(0, 0, 255);
}
