//! Grid primitives: cells, rectangles, dense grids and cell kinds.
//!
//! Coordinates are logical: `(0, 0)` is the top-left cell, `x` grows to the
//! right and `y` grows downward. Rasters flip this (see [`crate::raster`]).

use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::constants::{cell_codes, palette};

/// A discrete grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
}

impl Cell {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in cell units. The origin may lie outside the
/// grid (interactive anchors can shift it negative); use [`Rect::within`]
/// before touching cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rect from unsigned cell dimensions. Sizes past `i32::MAX` saturate.
    pub fn sized(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self::new(x, y, saturating_i32(width), saturating_i32(height))
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    pub fn area(&self) -> i32 {
        self.width.max(0).saturating_mul(self.height.max(0))
    }

    /// Integer horizontal center (`x + width / 2`).
    pub fn center_x(&self) -> i32 {
        self.x + self.width / 2
    }

    /// True when the whole rectangle lies inside `[0, width) × [0, height)`.
    pub fn within(&self, width: usize, height: usize) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.width > 0
            && self.height > 0
            && self.right() as i64 <= width as i64
            && self.bottom() as i64 <= height as i64
    }

    /// Open-interval overlap test; touching edges do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// True when `other` lies entirely inside `self`.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    pub fn contains_cell(&self, cell: Cell) -> bool {
        let (x, y) = (cell.x as i64, cell.y as i64);
        x >= self.x as i64
            && x < self.right() as i64
            && y >= self.y as i64
            && y < self.bottom() as i64
    }

    /// Grow by `padding` cells on every side.
    pub fn inflate(&self, padding: u32) -> Rect {
        let padding = saturating_i32(padding);
        let grow = padding.saturating_mul(2);
        Rect::new(
            self.x.saturating_sub(padding),
            self.y.saturating_sub(padding),
            self.width.saturating_add(grow),
            self.height.saturating_add(grow),
        )
    }

    /// Cells covered, row-major. Negative coordinates are skipped.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        let (x0, x1) = (self.x.max(0), self.right().max(0));
        (self.y.max(0)..self.bottom().max(0))
            .flat_map(move |y| (x0..x1).map(move |x| Cell::new(x as usize, y as usize)))
    }
}

fn saturating_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Dense row-major grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

impl<T: Clone> Grid<T> {
    pub fn new(width: usize, height: usize, fill: T) -> Self {
        Self {
            width,
            height,
            cells: vec![fill; width * height],
        }
    }

    /// An `n × n` grid.
    pub fn square(n: usize, fill: T) -> Self {
        Self::new(n, n, fill)
    }
}

impl<T> Grid<T> {
    /// Build from a generator called in row-major order.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(Cell) -> T) -> Self {
        let mut cells = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                cells.push(f(Cell::new(x, y)));
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        if cell.x < self.width && cell.y < self.height {
            Some(cell.y * self.width + cell.x)
        } else {
            None
        }
    }

    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as u64) < self.width as u64 && (y as u64) < self.height as u64
    }

    pub fn get(&self, cell: Cell) -> Option<&T> {
        self.index(cell).map(|i| &self.cells[i])
    }

    pub fn get_mut(&mut self, cell: Cell) -> Option<&mut T> {
        self.index(cell).map(move |i| &mut self.cells[i])
    }

    /// Set a cell; out-of-bounds writes are ignored. Returns whether it landed.
    pub fn set(&mut self, cell: Cell, value: T) -> bool {
        match self.index(cell) {
            Some(i) => {
                self.cells[i] = value;
                true
            }
            None => false,
        }
    }

    /// Row `y` as a slice.
    pub fn row(&self, y: usize) -> &[T] {
        &self.cells[y * self.width..(y + 1) * self.width]
    }

    /// `(cell, value)` pairs, row-major.
    pub fn iter(&self) -> impl Iterator<Item = (Cell, &T)> {
        let w = self.width.max(1);
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, v)| (Cell::new(i % w, i / w), v))
    }

    pub fn map<U>(&self, mut f: impl FnMut(Cell, &T) -> U) -> Grid<U> {
        Grid::from_fn(self.width, self.height, |c| f(c, &self.cells[c.y * self.width + c.x]))
    }

    /// In-bounds 4-neighbours in the order up, down, left, right.
    pub fn neighbors4(&self, cell: Cell) -> impl Iterator<Item = Cell> + '_ {
        const DIRS: [(i64, i64); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];
        DIRS.iter().filter_map(move |&(dx, dy)| {
            let (nx, ny) = (cell.x as i64 + dx, cell.y as i64 + dy);
            self.in_bounds(nx, ny)
                .then(|| Cell::new(nx as usize, ny as usize))
        })
    }
}

/// Semantic kind of one plan cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CellKind {
    /// Unpainted background.
    #[default]
    Empty,
    /// Solid wall, or any reserved color that is not room-like.
    Wall,
    Door,
    Window,
    /// Room-like floor that has not been classified yet.
    Floor,
    /// Floor belonging to a region classified as a room.
    Room,
    /// Floor belonging to a region classified as a corridor.
    Corridor,
}

impl CellKind {
    /// Text grid code. Labelled floor collapses back to plain floor.
    pub fn code(self) -> u8 {
        match self {
            Self::Empty => cell_codes::EMPTY,
            Self::Wall => cell_codes::WALL,
            Self::Door => cell_codes::DOOR,
            Self::Window => cell_codes::WINDOW,
            Self::Floor | Self::Room | Self::Corridor => cell_codes::FLOOR,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            cell_codes::EMPTY => Some(Self::Empty),
            cell_codes::WALL => Some(Self::Wall),
            cell_codes::DOOR => Some(Self::Door),
            cell_codes::WINDOW => Some(Self::Window),
            cell_codes::FLOOR => Some(Self::Floor),
            _ => None,
        }
    }

    /// Room-like cells are the ones flood fill walks and items stand on.
    pub fn is_room_like(self) -> bool {
        matches!(self, Self::Floor | Self::Room | Self::Corridor)
    }

    /// Representative color used when writing a raster.
    pub fn color(self) -> Rgb {
        match self {
            Self::Empty => palette::EMPTY,
            Self::Wall => palette::WALL,
            Self::Door => palette::DOOR,
            Self::Window => palette::WINDOW,
            Self::Floor | Self::Room | Self::Corridor => palette::FLOOR,
        }
    }
}
