pub mod color;
pub mod entity;
pub mod grid;
pub mod intent;
pub mod tile;
