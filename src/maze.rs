use std::collections::VecDeque;

use rand::Rng;

use crate::braid;
use crate::error::MazeError;
use crate::select::Rect;

/// Side of one cell in pixels.
pub const CELL_SIZE: i32 = 16;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    pub const ALL: [Dir; 4] = [Dir::Up, Dir::Down, Dir::Left, Dir::Right];

    pub fn delta(self) -> (isize, isize) {
        match self {
            Dir::Up => (0, -1),
            Dir::Down => (0, 1),
            Dir::Left => (-1, 0),
            Dir::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Dir {
        match self {
            Dir::Up => Dir::Down,
            Dir::Down => Dir::Up,
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }

    fn idx(self) -> usize {
        match self {
            Dir::Up => 0,
            Dir::Down => 1,
            Dir::Left => 2,
            Dir::Right => 3,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Top-left pixel of the cell.
    pub fn pixel_origin(self) -> (i32, i32) {
        (self.x as i32 * CELL_SIZE, self.y as i32 * CELL_SIZE)
    }

    pub fn pixel_center(self) -> (i32, i32) {
        let (x, y) = self.pixel_origin();
        (x + CELL_SIZE / 2, y + CELL_SIZE / 2)
    }

    pub fn hitbox(self) -> Rect {
        let (x, y) = self.pixel_origin();
        Rect::new(x, y, CELL_SIZE, CELL_SIZE)
    }

    /// Euclidean distance measured in cells.
    pub fn distance_to(self, other: Pos) -> f64 {
        let dx = self.x as f64 - other.x as f64;
        let dy = self.y as f64 - other.y as f64;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Display color of a cell. Only the renderer gives it meaning.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct ColorTag(pub u8);

impl ColorTag {
    pub const BASE: ColorTag = ColorTag(0);
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Cell {
    open: [bool; 4],
    pub color: ColorTag,
}

impl Cell {
    pub fn is_open(&self, dir: Dir) -> bool {
        self.open[dir.idx()]
    }

    pub fn open_count(&self) -> usize {
        self.open.iter().filter(|&&o| o).count()
    }

    pub fn closed_count(&self) -> usize {
        4 - self.open_count()
    }
}

/// Rectangular arena of cells in row-major order.
///
/// Neighbour lookups wrap around the edges, but the outer boundary walls can
/// never be opened, so the maze always reads as a closed rectangle. Every
/// edge mutation writes both sides of the passage.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Fully open interior with a closed outer wall. No walls are generated.
    pub fn new(width: usize, height: usize) -> Result<Self, MazeError> {
        if width == 0 || height == 0 {
            return Err(MazeError::EmptyGrid { width, height });
        }
        let mut cells = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                cells.push(Cell {
                    open: [y != 0, y != height - 1, x != 0, x != width - 1],
                    color: ColorTag::BASE,
                });
            }
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// A fresh maze: open grid followed by one braid pass over every cell.
    pub fn generated(width: usize, height: usize, rng: &mut impl Rng) -> Result<Self, MazeError> {
        let mut grid = Self::new(width, height)?;
        let all: Vec<Pos> = grid.positions().collect();
        let added = braid::generate(&mut grid, &all, rng);
        log::info!("generated {}x{} maze with {} walls", width, height, added);
        Ok(grid)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn px_width(&self) -> i32 {
        self.width as i32 * CELL_SIZE
    }

    pub fn px_height(&self) -> i32 {
        self.height as i32 * CELL_SIZE
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, pos: Pos) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    pub(crate) fn index(&self, pos: Pos) -> usize {
        assert!(
            self.contains(pos),
            "cell ({}, {}) outside {}x{} maze",
            pos.x,
            pos.y,
            self.width,
            self.height
        );
        pos.y * self.width + pos.x
    }

    pub(crate) fn pos_of(&self, idx: usize) -> Pos {
        Pos::new(idx % self.width, idx / self.width)
    }

    /// Every cell position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Pos> + '_ {
        (0..self.cells.len()).map(|i| self.pos_of(i))
    }

    pub fn cell(&self, pos: Pos) -> &Cell {
        &self.cells[self.index(pos)]
    }

    pub fn color(&self, pos: Pos) -> ColorTag {
        self.cell(pos).color
    }

    pub fn set_color(&mut self, pos: Pos, color: ColorTag) {
        let idx = self.index(pos);
        self.cells[idx].color = color;
    }

    /// Adjacent cell, wrapping across the outer edge.
    pub fn neighbor(&self, pos: Pos, dir: Dir) -> Pos {
        let idx = self.index(pos);
        let (x, y) = (idx % self.width, idx / self.width);
        let (dx, dy) = dir.delta();
        let nx = (x as isize + dx).rem_euclid(self.width as isize) as usize;
        let ny = (y as isize + dy).rem_euclid(self.height as isize) as usize;
        Pos::new(nx, ny)
    }

    /// False when `dir` points out of the rectangle.
    pub fn has_boundary_neighbor(&self, pos: Pos, dir: Dir) -> bool {
        self.index(pos);
        match dir {
            Dir::Up => pos.y > 0,
            Dir::Down => pos.y < self.height - 1,
            Dir::Left => pos.x > 0,
            Dir::Right => pos.x < self.width - 1,
        }
    }

    pub fn nearby_dirs(&self, pos: Pos) -> Vec<Dir> {
        Dir::ALL
            .into_iter()
            .filter(|&dir| self.has_boundary_neighbor(pos, dir))
            .collect()
    }

    pub fn is_open(&self, pos: Pos, dir: Dir) -> bool {
        self.cell(pos).is_open(dir)
    }

    pub fn open_count(&self, pos: Pos) -> usize {
        self.cell(pos).open_count()
    }

    pub fn closed_count(&self, pos: Pos) -> usize {
        self.cell(pos).closed_count()
    }

    pub fn open_dirs(&self, pos: Pos) -> Vec<Dir> {
        let cell = self.cell(pos);
        Dir::ALL
            .into_iter()
            .filter(|&dir| cell.is_open(dir))
            .collect()
    }

    pub fn open_neighbors(&self, pos: Pos) -> Vec<Pos> {
        self.open_dirs(pos)
            .into_iter()
            .map(|dir| self.neighbor(pos, dir))
            .collect()
    }

    /// Adds a wall. No-op when the edge is already closed.
    pub fn close_edge(&mut self, pos: Pos, dir: Dir) {
        let idx = self.index(pos);
        if !self.cells[idx].open[dir.idx()] {
            return;
        }
        let other = self.index(self.neighbor(pos, dir));
        self.cells[idx].open[dir.idx()] = false;
        self.cells[other].open[dir.opposite().idx()] = false;
    }

    /// Removes a wall. No-op when already open or when `dir` faces the
    /// outer boundary.
    pub fn open_edge(&mut self, pos: Pos, dir: Dir) {
        let idx = self.index(pos);
        if self.cells[idx].open[dir.idx()] || !self.has_boundary_neighbor(pos, dir) {
            return;
        }
        let other = self.index(self.neighbor(pos, dir));
        self.cells[idx].open[dir.idx()] = true;
        self.cells[other].open[dir.opposite().idx()] = true;
    }

    pub fn open_all(&mut self, pos: Pos) {
        for dir in self.nearby_dirs(pos) {
            self.open_edge(pos, dir);
        }
    }

    /// Cell under a pixel coordinate, `None` outside the maze rectangle.
    pub fn cell_at(&self, px: i32, py: i32) -> Option<Pos> {
        if px < 0 || py < 0 || px >= self.px_width() || py >= self.px_height() {
            return None;
        }
        Some(Pos::new(
            (px / CELL_SIZE) as usize,
            (py / CELL_SIZE) as usize,
        ))
    }

    /// Flood over open edges starting at `start`.
    pub fn reachable_from(&self, start: Pos) -> Vec<bool> {
        let mut seen = vec![false; self.cells.len()];
        let mut q = VecDeque::new();
        seen[self.index(start)] = true;
        q.push_back(start);
        while let Some(pos) = q.pop_front() {
            for next in self.open_neighbors(pos) {
                let ni = self.index(next);
                if !seen[ni] {
                    seen[ni] = true;
                    q.push_back(next);
                }
            }
        }
        seen
    }

    pub fn is_connected(&self) -> bool {
        self.reachable_from(Pos::new(0, 0)).iter().all(|&r| r)
    }

    pub fn min_open_edges(&self) -> usize {
        self.cells.iter().map(Cell::open_count).min().unwrap_or(0)
    }

    /// Audits the braid invariant over the whole grid and reports the first
    /// violation found. Grids thinner than two cells cannot avoid dead ends,
    /// so the open-edge rule is only checked when both sides are at least 2.
    pub fn check_invariant(&self) -> Result<(), MazeError> {
        for pos in self.positions() {
            for dir in Dir::ALL {
                let open = self.is_open(pos, dir);
                if open && !self.has_boundary_neighbor(pos, dir) {
                    return Err(MazeError::OpenBoundary { pos, dir });
                }
                if open != self.is_open(self.neighbor(pos, dir), dir.opposite()) {
                    return Err(MazeError::Asymmetric { pos, dir });
                }
            }
        }

        let reach = self.reachable_from(Pos::new(0, 0));
        if let Some(i) = reach.iter().position(|&r| !r) {
            return Err(MazeError::Disconnected(self.pos_of(i)));
        }

        if self.width >= 2 && self.height >= 2 {
            for pos in self.positions() {
                let open = self.open_count(pos);
                if open < 2 {
                    return Err(MazeError::DeadEnd { pos, open });
                }
            }
        }
        Ok(())
    }
}
