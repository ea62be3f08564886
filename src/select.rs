// Region selection: which cells a mutation rewrites.
//
// Both selectors are pure predicates over a cell's pixel geometry and keep
// no state between calls.

use crate::maze::{Grid, Pos};

/// Axis-aligned pixel rectangle.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Overlap test. Rectangles that only share an edge do not collide.
    pub fn collides(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }

    pub fn contains_point(&self, px: i32, py: i32) -> bool {
        px >= self.x && px < self.x + self.w && py >= self.y && py < self.y + self.h
    }
}

/// Single-channel alpha bitmap, row-major.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct AlphaMask {
    width: usize,
    height: usize,
    alpha: Vec<u8>,
}

impl AlphaMask {
    /// Fully transparent mask.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            alpha: vec![0; width * height],
        }
    }

    pub fn from_alpha(width: usize, height: usize, alpha: Vec<u8>) -> Self {
        assert_eq!(alpha.len(), width * height, "alpha buffer size mismatch");
        Self {
            width,
            height,
            alpha,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn alpha_at(&self, x: usize, y: usize) -> u8 {
        assert!(x < self.width && y < self.height, "alpha sample out of bounds");
        self.alpha[y * self.width + x]
    }

    /// Paints `rect`, clipped to the mask.
    pub fn fill_rect(&mut self, rect: Rect, alpha: u8) {
        let x0 = rect.x.max(0) as usize;
        let y0 = rect.y.max(0) as usize;
        let x1 = (rect.x + rect.w).clamp(0, self.width as i32) as usize;
        let y1 = (rect.y + rect.h).clamp(0, self.height as i32) as usize;
        for y in y0..y1 {
            for x in x0..x1 {
                self.alpha[y * self.width + x] = alpha;
            }
        }
    }

    /// Paints a filled disc, clipped to the mask.
    pub fn fill_disc(&mut self, cx: i32, cy: i32, radius: i32, alpha: u8) {
        let r2 = radius * radius;
        for y in (cy - radius).max(0)..(cy + radius + 1).min(self.height as i32) {
            for x in (cx - radius).max(0)..(cx + radius + 1).min(self.width as i32) {
                let (dx, dy) = (x - cx, y - cy);
                if dx * dx + dy * dy <= r2 {
                    self.alpha[y as usize * self.width + x as usize] = alpha;
                }
            }
        }
    }

    /// Opaque where this mask is transparent and transparent elsewhere.
    pub fn inverse(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            alpha: self
                .alpha
                .iter()
                .map(|&a| if a == 0 { u8::MAX } else { 0 })
                .collect(),
        }
    }
}

/// Picks cells for regeneration.
pub trait RegionSelector {
    fn covers(&self, pos: Pos) -> bool;

    /// Every covered cell, in grid order.
    fn select(&self, grid: &Grid) -> Vec<Pos> {
        grid.positions().filter(|&pos| self.covers(pos)).collect()
    }
}

/// Selects cells whose center lands on a non-transparent pixel of a mask
/// drawn with its top-left corner at `offset`.
#[derive(Clone, Copy, Debug)]
pub struct PixelMaskSelector<'a> {
    pub mask: &'a AlphaMask,
    pub offset: (i32, i32),
}

impl<'a> PixelMaskSelector<'a> {
    pub fn new(mask: &'a AlphaMask, offset: (i32, i32)) -> Self {
        Self { mask, offset }
    }

    /// Whether the maze pixel `(px, py)` is under the mask.
    pub fn covers_point(&self, px: i32, py: i32) -> bool {
        let fx = px - self.offset.0;
        let fy = py - self.offset.1;
        if fx < 0 || fx >= self.mask.width() as i32 {
            return false;
        }
        if fy < 0 || fy >= self.mask.height() as i32 {
            return false;
        }
        self.mask.alpha_at(fx as usize, fy as usize) > 0
    }
}

impl RegionSelector for PixelMaskSelector<'_> {
    fn covers(&self, pos: Pos) -> bool {
        let (cx, cy) = pos.pixel_center();
        self.covers_point(cx, cy)
    }
}

/// Selects cells whose hitbox overlaps a rectangle.
#[derive(Clone, Copy, Debug)]
pub struct RectSelector {
    pub rect: Rect,
}

impl RectSelector {
    pub fn new(rect: Rect) -> Self {
        Self { rect }
    }
}

impl RegionSelector for RectSelector {
    fn covers(&self, pos: Pos) -> bool {
        self.rect.collides(&pos.hitbox())
    }
}
