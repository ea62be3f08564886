use thiserror::Error;

use crate::maze::{Dir, Pos};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MazeError {
    #[error("maze must be at least 1x1, got {width}x{height}")]
    EmptyGrid { width: usize, height: usize },
    #[error("cell ({}, {}) is not reachable from (0, 0)", .0.x, .0.y)]
    Disconnected(Pos),
    #[error("cell ({}, {}) is a dead end with {} open edges", .pos.x, .pos.y, .open)]
    DeadEnd { pos: Pos, open: usize },
    #[error("edge {:?} of ({}, {}) is not mirrored by its neighbour", .dir, .pos.x, .pos.y)]
    Asymmetric { pos: Pos, dir: Dir },
    #[error("boundary edge {:?} of ({}, {}) is open", .dir, .pos.x, .pos.y)]
    OpenBoundary { pos: Pos, dir: Dir },
}
