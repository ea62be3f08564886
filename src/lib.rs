//! A braid maze that can be rewritten region by region while it is being
//! played, without ever growing a dead end or cutting the maze in two.

pub mod braid;
pub mod charge;
pub mod config;
pub mod error;
pub mod fog;
pub mod follow;
pub mod maze;
pub mod mutation;
pub mod select;

pub use error::MazeError;
pub use maze::{Cell, ColorTag, Dir, Grid, Pos, CELL_SIZE};
pub use select::{AlphaMask, PixelMaskSelector, Rect, RectSelector, RegionSelector};
