use rand::Rng;

use crate::maze::Grid;
use crate::select::{AlphaMask, PixelMaskSelector};

/// Frames before the mutation during which the fog flashes.
pub const FLASH_WINDOW: i32 = 200;
const FLASH_STEP: i32 = 10;
const FOG_ALPHA: u8 = 0xA0;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FogLayer {
    Fog,
    Inverse,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FogEvent {
    Drift,
    Mutate,
}

/// A cloud drifting right to left across the maze. Somewhere along the way
/// it mutates every cell it covers, once, then shows its inverse until it has
/// left the maze.
#[derive(Clone, Debug)]
pub struct Fog {
    mask: AlphaMask,
    inverse: AlphaMask,
    x: i32,
    y: i32,
    vx: i32,
    span: i32,
    mutate_count: i32,
    flash_count: i32,
    layer: FogLayer,
    mutated: bool,
    passed: bool,
}

impl Fog {
    pub fn new(grid: &Grid, rng: &mut impl Rng) -> Self {
        let mask = cloud_mask(grid.px_width() as usize, grid.px_height() as usize, rng);
        Self::with_mask(mask, grid, rng)
    }

    /// Fog with a caller-provided mask, entering at the right edge of `grid`.
    pub fn with_mask(mask: AlphaMask, grid: &Grid, rng: &mut impl Rng) -> Self {
        let span = grid.px_width();
        let lo = span / 2;
        let hi = (span * 4 / 3).max(lo + 1);
        let inverse = mask.inverse();
        Self {
            mask,
            inverse,
            x: span,
            y: 0,
            vx: -1,
            span,
            mutate_count: rng.gen_range(lo..hi),
            flash_count: 0,
            layer: FogLayer::Fog,
            mutated: false,
            passed: false,
        }
    }

    /// Advances one frame. Returns `FogEvent::Mutate` on the single frame the
    /// countdown runs out.
    pub fn update(&mut self) -> FogEvent {
        self.x += self.vx;
        if self.x < -self.span {
            self.passed = true;
        }
        if self.mutated {
            return FogEvent::Drift;
        }

        self.mutate_count -= 1;
        if self.mutate_count < 0 {
            self.mutated = true;
            self.layer = FogLayer::Inverse;
            return FogEvent::Mutate;
        }
        if self.mutate_count < FLASH_WINDOW {
            self.flash_count += FLASH_STEP;
            if self.flash_count > self.mutate_count {
                self.flash_count = 0;
                self.layer = match self.layer {
                    FogLayer::Fog => FogLayer::Inverse,
                    FogLayer::Inverse => FogLayer::Fog,
                };
            }
        }
        FogEvent::Drift
    }

    /// Coverage test for the fog's current position. Always samples the fog
    /// mask, whichever layer is on screen.
    pub fn selector(&self) -> PixelMaskSelector<'_> {
        PixelMaskSelector::new(&self.mask, (self.x, self.y))
    }

    /// The mask currently on screen.
    pub fn shown(&self) -> &AlphaMask {
        match self.layer {
            FogLayer::Fog => &self.mask,
            FogLayer::Inverse => &self.inverse,
        }
    }

    pub fn layer(&self) -> FogLayer {
        self.layer
    }

    pub fn offset(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn frames_left(&self) -> i32 {
        self.mutate_count
    }

    pub fn mutated(&self) -> bool {
        self.mutated
    }

    /// True once the fog has fully left the maze on the left.
    pub fn passed(&self) -> bool {
        self.passed
    }
}

/// A lumpy cloud of overlapping discs.
pub fn cloud_mask(width: usize, height: usize, rng: &mut impl Rng) -> AlphaMask {
    let mut mask = AlphaMask::new(width, height);
    if width == 0 || height == 0 {
        return mask;
    }
    let (w, h) = (width as i32, height as i32);
    let min_r = (h / 6).max(4);
    let max_r = (h / 3).max(min_r + 1);
    let puffs = rng.gen_range(5..9);
    for _ in 0..puffs {
        let cx = rng.gen_range(0..w);
        let cy = rng.gen_range(0..h);
        let r = rng.gen_range(min_r..max_r);
        mask.fill_disc(cx, cy, r, FOG_ALPHA);
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::select::RegionSelector;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn fog_over(grid: &Grid, seed: u64) -> Fog {
        let mut rng = StdRng::seed_from_u64(seed);
        Fog::new(grid, &mut rng)
    }

    #[test]
    fn countdown_starts_within_range() {
        let grid = Grid::new(22, 18).unwrap();
        for seed in 0..20 {
            let fog = fog_over(&grid, seed);
            let px = grid.px_width();
            assert!(fog.frames_left() >= px / 2);
            assert!(fog.frames_left() < px * 4 / 3);
            assert_eq!(fog.offset(), (px, 0));
        }
    }

    #[test]
    fn mutates_once_then_passes() {
        let grid = Grid::new(6, 4).unwrap();
        let mut fog = fog_over(&grid, 4);
        let mut mutations = 0;
        let mut frames = 0;
        while !fog.passed() {
            if fog.update() == FogEvent::Mutate {
                mutations += 1;
                assert_eq!(fog.layer(), FogLayer::Inverse);
            }
            frames += 1;
            assert!(frames < 10_000);
        }
        assert_eq!(mutations, 1);
        assert!(fog.mutated());
        assert_eq!(fog.offset().0, -grid.px_width() - 1);
    }

    #[test]
    fn flashes_before_mutating() {
        let grid = Grid::new(22, 18).unwrap();
        let mut fog = fog_over(&grid, 8);
        let mut toggles = 0;
        let mut last = fog.layer();
        while fog.update() != FogEvent::Mutate {
            if fog.layer() != last {
                assert!(fog.frames_left() < FLASH_WINDOW);
                toggles += 1;
                last = fog.layer();
            }
        }
        assert!(toggles > 0);
    }

    #[test]
    fn selector_follows_fog_position() {
        let grid = Grid::new(4, 4).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let mut mask = AlphaMask::new(64, 64);
        mask.fill_disc(8, 8, 2, 255);
        let mut fog = Fog::with_mask(mask, &grid, &mut rng);
        assert!(fog.selector().select(&grid).is_empty());
        for _ in 0..64 {
            fog.update();
        }
        assert_eq!(fog.offset(), (0, 0));
        assert_eq!(fog.selector().select(&grid), vec![crate::maze::Pos::new(0, 0)]);
    }
}
