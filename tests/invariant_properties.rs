//! Property tests for the braid invariant.
//!
//! Random grid sizes, seeds and selections; after every generation or
//! regeneration the whole maze must stay connected, dead-end free, mirrored
//! and closed along its outer wall.

use mutated_maze::braid::regenerate;
use mutated_maze::{ColorTag, Dir, Grid, Pos};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn outer_wall_closed(grid: &Grid) -> bool {
    grid.positions().all(|pos| {
        Dir::ALL
            .into_iter()
            .all(|dir| grid.has_boundary_neighbor(pos, dir) || !grid.is_open(pos, dir))
    })
}

fn mirrored(grid: &Grid) -> bool {
    grid.positions().all(|pos| {
        Dir::ALL.into_iter().all(|dir| {
            grid.is_open(pos, dir) == grid.is_open(grid.neighbor(pos, dir), dir.opposite())
        })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_generated_maze_is_a_braid(w in 2usize..14, h in 2usize..14, seed: u64) {
        let grid = Grid::generated(w, h, &mut StdRng::seed_from_u64(seed)).unwrap();
        prop_assert!(grid.is_connected());
        prop_assert!(grid.min_open_edges() >= 2);
        prop_assert!(mirrored(&grid));
        prop_assert!(outer_wall_closed(&grid));
    }

    #[test]
    fn prop_regeneration_keeps_the_braid(
        w in 2usize..12,
        h in 2usize..12,
        seed: u64,
        picks in proptest::collection::vec(any::<bool>(), 144),
        rounds in 1usize..4,
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut grid = Grid::generated(w, h, &mut rng).unwrap();
        let selected: Vec<Pos> = grid
            .positions()
            .enumerate()
            .filter(|(i, _)| picks[*i])
            .map(|(_, p)| p)
            .collect();
        for round in 0..rounds {
            regenerate(&mut grid, &selected, ColorTag(round as u8 + 1), &mut rng);
            prop_assert_eq!(grid.check_invariant(), Ok(()));
            prop_assert!(outer_wall_closed(&grid));
        }
    }

    #[test]
    fn prop_empty_regeneration_is_identity(w in 1usize..10, h in 1usize..10, seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut grid = Grid::generated(w, h, &mut rng).unwrap();
        let before = grid.clone();
        regenerate(&mut grid, &[], ColorTag(1), &mut rng);
        prop_assert_eq!(grid, before);
    }
}
