// Braid maze: a maze with no dead ends.
//
// Start from an open grid and add wall segments in random order, keeping a
// wall only if it neither leaves a cell with fewer than two exits nor
// isolates part of the maze. See the "Braid" entry at
// http://www.astrolog.org/labyrnth/algrithm.htm.

use std::collections::{HashSet, VecDeque};

use rand::seq::SliceRandom;
use rand::Rng;

use crate::maze::{ColorTag, Dir, Grid, Pos};

/// Returns true when the open edge between adjacent cells `a` and `b` is a
/// bridge, i.e. closing it would split the maze in two.
///
/// The search starts from `a`'s other open neighbours with both endpoints
/// already marked seen, so it can only reach `b` along an alternate route.
pub fn would_disconnect(grid: &Grid, a: Pos, b: Pos) -> bool {
    let mut seen = vec![false; grid.len()];
    let mut q = VecDeque::new();
    seen[grid.index(a)] = true;
    seen[grid.index(b)] = true;

    for next in grid.open_neighbors(a) {
        let ni = grid.index(next);
        if !seen[ni] {
            seen[ni] = true;
            q.push_back(next);
        }
    }

    while let Some(pos) = q.pop_front() {
        for next in grid.open_neighbors(pos) {
            if next == b {
                return false;
            }
            let ni = grid.index(next);
            if !seen[ni] {
                seen[ni] = true;
                q.push_back(next);
            }
        }
    }
    true
}

/// Every open edge touching `cells`, each listed once from its upper or
/// left endpoint, in first-seen order.
fn candidate_walls(grid: &Grid, cells: &[Pos]) -> Vec<(Pos, Dir)> {
    let mut seen = HashSet::new();
    let mut walls = Vec::new();
    for &pos in cells {
        for dir in grid.open_dirs(pos) {
            let edge = match dir {
                Dir::Down | Dir::Right => (pos, dir),
                Dir::Up | Dir::Left => (grid.neighbor(pos, dir), dir.opposite()),
            };
            if seen.insert(edge) {
                walls.push(edge);
            }
        }
    }
    walls
}

/// One greedy pass adding walls on the open edges touching `cells`.
///
/// Candidates are shuffled once and tried in order. A wall is added only if
/// both endpoints keep at least two open edges and the edge is not a bridge
/// of the whole maze. Skipped candidates are not retried, so the result is
/// usually not a maximal braid. Returns the number of walls added.
pub fn generate(grid: &mut Grid, cells: &[Pos], rng: &mut impl Rng) -> usize {
    let mut walls = candidate_walls(grid, cells);
    walls.shuffle(rng);

    let candidates = walls.len();
    let mut added = 0;
    for (pos, dir) in walls {
        if !grid.is_open(pos, dir) {
            continue;
        }
        if grid.closed_count(pos) >= 2 {
            continue;
        }
        let other = grid.neighbor(pos, dir);
        if grid.closed_count(other) >= 2 {
            continue;
        }
        if would_disconnect(grid, pos, other) {
            log::trace!("keeping bridge {:?} {:?}", pos, dir);
            continue;
        }
        grid.close_edge(pos, dir);
        added += 1;
    }
    log::debug!(
        "braid pass over {} cells: {} candidates, {} walls added",
        cells.len(),
        candidates,
        added
    );
    added
}

/// Reopens every wall of the selected cells, including walls shared with
/// unselected neighbours, regrows walls over the selection, and paints the
/// selection with `color`. An empty selection leaves the grid untouched.
pub fn regenerate(grid: &mut Grid, selected: &[Pos], color: ColorTag, rng: &mut impl Rng) {
    if selected.is_empty() {
        return;
    }
    for &pos in selected {
        grid.open_all(pos);
    }
    generate(grid, selected, rng);
    for &pos in selected {
        grid.set_color(pos, color);
    }
}
