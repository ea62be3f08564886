// Mutation events: select a region, move whoever the fog caught, rebuild the
// walls. Each entry point runs to completion before returning, so callers
// never observe reopened walls without the regrown ones, or repainted cells
// before the entities have been moved.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::braid;
use crate::follow::{EntityId, FollowRegistry};
use crate::maze::{ColorTag, Grid, Pos, CELL_SIZE};
use crate::select::{PixelMaskSelector, Rect, RectSelector, RegionSelector};

/// Cycling sequence of mutation colors, shuffled once per level.
#[derive(Clone, Debug)]
pub struct Palette {
    colors: Vec<ColorTag>,
    next: usize,
}

impl Palette {
    /// Tags `1..=count` in random order. `ColorTag::BASE` is never handed out.
    pub fn shuffled(count: u8, rng: &mut impl Rng) -> Self {
        assert!(count > 0, "palette needs at least one color");
        let mut colors: Vec<ColorTag> = (1..=count).map(ColorTag).collect();
        colors.shuffle(rng);
        Self { colors, next: 0 }
    }

    pub fn next_color(&mut self) -> ColorTag {
        let color = self.colors[self.next];
        self.next = (self.next + 1) % self.colors.len();
        color
    }
}

/// A movable entity the maze may pick up and drop elsewhere.
pub trait Relocatable {
    fn id(&self) -> EntityId;

    /// Top-left pixel of the entity's sprite.
    fn pixel_pos(&self) -> (i32, i32);

    fn pixel_center(&self) -> (i32, i32) {
        let (x, y) = self.pixel_pos();
        (x + CELL_SIZE / 2, y + CELL_SIZE / 2)
    }

    fn is_alive(&self) -> bool {
        true
    }

    /// Move to `origin` and drop whatever the entity was doing.
    fn relocate(&mut self, origin: (i32, i32));

    /// Flip between the entity's two behavioural categories.
    fn toggle_kind(&mut self);
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MutationReport {
    pub cells: Vec<Pos>,
    pub relocated: Vec<EntityId>,
    pub color: Option<ColorTag>,
}

/// Regenerates every cell `selector` covers. Nothing happens, and no color is
/// consumed, when the selection is empty.
pub fn mutate_region(
    grid: &mut Grid,
    selector: &impl RegionSelector,
    palette: &mut Palette,
    rng: &mut impl Rng,
) -> MutationReport {
    let cells = selector.select(grid);
    if cells.is_empty() {
        return MutationReport::default();
    }
    let color = palette.next_color();
    braid::regenerate(grid, &cells, color, rng);
    MutationReport {
        cells,
        relocated: Vec::new(),
        color: Some(color),
    }
}

/// Manual mutation under the cursor footprint.
pub fn cursor_mutation(
    grid: &mut Grid,
    footprint: Rect,
    palette: &mut Palette,
    rng: &mut impl Rng,
) -> MutationReport {
    let report = mutate_region(grid, &RectSelector::new(footprint), palette, rng);
    log::info!("cursor mutation at {:?}: {} cells", footprint, report.cells.len());
    report
}

/// Fog mutation.
///
/// Living entities whose center is under the fog are spread round-robin over
/// a shuffled list of the covered cells, dropped from `follows`, and have
/// their kind toggled, all before the walls are rebuilt.
pub fn fog_mutation<E: Relocatable>(
    grid: &mut Grid,
    fog: &PixelMaskSelector<'_>,
    palette: &mut Palette,
    entities: &mut [E],
    follows: &mut FollowRegistry,
    rng: &mut impl Rng,
) -> MutationReport {
    let color = palette.next_color();
    let cells = fog.select(grid);

    let mut targets = cells.clone();
    targets.shuffle(rng);

    let mut relocated = Vec::new();
    if !targets.is_empty() {
        let caught = entities.iter_mut().filter(|e| {
            let (cx, cy) = e.pixel_center();
            e.is_alive() && fog.covers_point(cx, cy)
        });
        for (i, entity) in caught.enumerate() {
            let target = targets[i % targets.len()];
            follows.unfollow(entity.id());
            entity.relocate(target.pixel_origin());
            entity.toggle_kind();
            relocated.push(entity.id());
        }
    }

    braid::regenerate(grid, &cells, color, rng);
    log::info!(
        "fog mutation at {:?}: {} cells, {} entities moved",
        fog.offset,
        cells.len(),
        relocated.len()
    );
    MutationReport {
        cells,
        relocated,
        color: Some(color),
    }
}
