use mutated_maze::braid::{generate, regenerate, would_disconnect};
use mutated_maze::mutation::Palette;
use mutated_maze::{ColorTag, Dir, Grid, Pos};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn all_cells(grid: &Grid) -> Vec<Pos> {
    grid.positions().collect()
}

fn assert_braid(grid: &Grid) {
    assert!(grid.is_connected(), "maze split in two");
    assert!(grid.min_open_edges() >= 2, "maze has a dead end");
    assert_eq!(grid.check_invariant(), Ok(()));
}

#[test]
fn generation_keeps_every_cell_reachable_without_dead_ends() {
    for (w, h) in [(2, 2), (2, 7), (3, 3), (5, 5), (22, 18), (9, 4)] {
        for seed in 0..5 {
            let mut rng = StdRng::seed_from_u64(seed);
            let grid = Grid::generated(w, h, &mut rng).unwrap();
            assert_braid(&grid);
        }
    }
}

#[test]
fn generation_adds_walls_on_larger_grids() {
    let mut rng = StdRng::seed_from_u64(21);
    let grid = Grid::generated(10, 10, &mut rng).unwrap();
    let open = Grid::new(10, 10).unwrap();
    let closed: usize = grid.positions().map(|p| grid.closed_count(p)).sum();
    let closed_before: usize = open.positions().map(|p| open.closed_count(p)).sum();
    assert!(closed > closed_before);
}

#[test]
fn generation_is_deterministic_for_a_seed() {
    let a = Grid::generated(8, 6, &mut StdRng::seed_from_u64(77)).unwrap();
    let b = Grid::generated(8, 6, &mut StdRng::seed_from_u64(77)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn corridor_edges_are_all_bridges() {
    // 2x2 loop with one wall: a U-shaped corridor (0,1)-(0,0)-(1,0)-(1,1).
    let mut grid = Grid::new(2, 2).unwrap();
    grid.close_edge(Pos::new(0, 1), Dir::Right);
    let chain = [Pos::new(0, 1), Pos::new(0, 0), Pos::new(1, 0), Pos::new(1, 1)];
    for pair in chain.windows(2) {
        assert!(would_disconnect(&grid, pair[0], pair[1]));
        assert!(would_disconnect(&grid, pair[1], pair[0]));
    }

    let line = Grid::new(5, 1).unwrap();
    for x in 0..4 {
        assert!(would_disconnect(&line, Pos::new(x, 0), Pos::new(x + 1, 0)));
    }
}

#[test]
fn square_loop_has_no_bridges() {
    let grid = Grid::new(2, 2).unwrap();
    assert!(!would_disconnect(&grid, Pos::new(0, 0), Pos::new(1, 0)));
    assert!(!would_disconnect(&grid, Pos::new(1, 0), Pos::new(1, 1)));
    assert!(!would_disconnect(&grid, Pos::new(1, 1), Pos::new(0, 1)));
    assert!(!would_disconnect(&grid, Pos::new(0, 1), Pos::new(0, 0)));
}

#[test]
fn oracle_sees_routes_through_the_whole_grid() {
    // Cut the 3x3 grid so (0,0)-(1,0) is only rejoined the long way round,
    // through the bottom row.
    let mut grid = Grid::new(3, 3).unwrap();
    grid.close_edge(Pos::new(0, 1), Dir::Right);
    assert!(!would_disconnect(&grid, Pos::new(0, 0), Pos::new(1, 0)));
    grid.close_edge(Pos::new(0, 2), Dir::Right);
    assert!(would_disconnect(&grid, Pos::new(0, 0), Pos::new(1, 0)));
    assert!(would_disconnect(&grid, Pos::new(1, 0), Pos::new(0, 0)));
}

#[test]
fn regenerating_a_subset_uses_whole_grid_connectivity() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut grid = Grid::generated(12, 9, &mut rng).unwrap();
    let selected: Vec<Pos> = grid.positions().filter(|p| p.x >= 4 && p.x < 8).collect();
    for round in 0..10 {
        regenerate(&mut grid, &selected, ColorTag(round % 3 + 1), &mut rng);
        assert_braid(&grid);
    }
}

#[test]
fn generate_scoped_to_subset_only_touches_nearby_edges() {
    let mut rng = StdRng::seed_from_u64(8);
    let mut grid = Grid::new(6, 6).unwrap();
    let subset = [Pos::new(2, 2), Pos::new(3, 2)];
    generate(&mut grid, &subset, &mut rng);
    let fresh = Grid::new(6, 6).unwrap();
    for pos in grid.positions() {
        let near = subset.iter().any(|s| s.x.abs_diff(pos.x) + s.y.abs_diff(pos.y) <= 1);
        if !near {
            assert_eq!(grid.cell(pos), fresh.cell(pos), "{:?} changed", pos);
        }
    }
    assert_braid(&grid);
}

#[test]
fn corner_block_survives_repeated_mutation() {
    let mut grid = Grid::generated(5, 5, &mut StdRng::seed_from_u64(0)).unwrap();
    let initial = grid.reachable_from(Pos::new(0, 0));
    assert!(initial.iter().all(|&r| r));

    let block = [Pos::new(0, 0), Pos::new(1, 0), Pos::new(0, 1), Pos::new(1, 1)];
    let mut palette = Palette::shuffled(6, &mut StdRng::seed_from_u64(99));
    for seed in 1..=20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let before = grid.color(block[0]);
        let color = palette.next_color();
        regenerate(&mut grid, &block, color, &mut rng);

        for start in grid.positions() {
            assert_eq!(grid.reachable_from(start), initial);
        }
        assert!(grid.min_open_edges() >= 2);
        for &pos in &block {
            assert_eq!(grid.color(pos), color);
            assert_ne!(grid.color(pos), before);
        }
    }
}

#[test]
fn empty_regeneration_leaves_grid_identical() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut grid = Grid::generated(7, 7, &mut rng).unwrap();
    let snapshot = grid.clone();
    regenerate(&mut grid, &[], ColorTag(5), &mut rng);
    assert_eq!(grid, snapshot);
}

#[test]
fn single_cell_grid_is_left_alone() {
    let mut rng = StdRng::seed_from_u64(2);
    let grid = Grid::generated(1, 1, &mut rng).unwrap();
    assert_eq!(grid.open_count(Pos::new(0, 0)), 0);
    assert!(grid.is_connected());
}
