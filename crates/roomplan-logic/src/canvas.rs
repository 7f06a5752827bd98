//! Plan canvas: the editable N×N color grid the user paints on.
//!
//! Lines and strokes always leave the outer ring white, so a painted plan
//! is surrounded by empty space. Bucket fill stays inside that ring.

use std::collections::VecDeque;

use crate::codec::{decode, encode_colors, resample_colors, Palette};
use crate::color::Rgb;
use crate::constants::palette;
use crate::grid::{Cell, CellKind, Grid};
use crate::history::UndoLog;
use crate::raster::Raster;

/// Paint colors offered by the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Brush {
    Wall,
    Door,
    Window,
    Floor,
    Eraser,
}

impl Brush {
    pub fn color(self) -> Rgb {
        match self {
            Self::Wall => palette::WALL,
            Self::Door => palette::DOOR,
            Self::Window => palette::WINDOW,
            Self::Floor => palette::FLOOR,
            Self::Eraser => palette::EMPTY,
        }
    }
}

/// Cells of the Bresenham line from `a` to `b`, both ends included.
pub fn line_cells(a: Cell, b: Cell) -> Vec<Cell> {
    let (mut x0, mut y0) = (a.x as i64, a.y as i64);
    let (x1, y1) = (b.x as i64, b.y as i64);
    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx - dy;
    let mut cells = Vec::with_capacity((dx.max(dy) + 1) as usize);
    loop {
        cells.push(Cell::new(x0 as usize, y0 as usize));
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x0 += sx;
        }
        if e2 < dx {
            err += dx;
            y0 += sy;
        }
    }
    cells
}

#[derive(Debug, Clone)]
pub struct Canvas {
    colors: Grid<Rgb>,
    history: UndoLog<Grid<Rgb>>,
}

impl Canvas {
    /// Blank `size × size` canvas with unbounded undo.
    pub fn new(size: usize) -> Self {
        Self::with_undo_limit(size, 0)
    }

    pub fn with_undo_limit(size: usize, limit: usize) -> Self {
        Self {
            colors: Grid::square(size, palette::EMPTY),
            history: UndoLog::bounded(limit),
        }
    }

    /// Load a saved raster, resampled to `size × size`.
    pub fn from_raster(raster: &Raster, size: usize) -> Self {
        Self {
            colors: resample_colors(raster, size, palette::EMPTY),
            history: UndoLog::new(),
        }
    }

    pub fn size(&self) -> usize {
        self.colors.width()
    }

    pub fn color_at(&self, cell: Cell) -> Option<Rgb> {
        self.colors.get(cell).copied()
    }

    pub fn colors(&self) -> &Grid<Rgb> {
        &self.colors
    }

    pub fn undo_depth(&self) -> usize {
        self.history.len()
    }

    /// Line cells inside the canvas, for a live preview.
    pub fn preview_line(&self, a: Cell, b: Cell) -> Vec<Cell> {
        line_cells(a, b)
            .into_iter()
            .filter(|c| c.x < self.size() && c.y < self.size())
            .collect()
    }

    pub fn draw_line(&mut self, a: Cell, b: Cell, brush: Brush) -> bool {
        let cells = self.preview_line(a, b);
        self.apply_stroke(&cells, brush.color())
    }

    /// Paint `cells`, then force the outer ring white. Returns whether
    /// anything changed.
    pub fn apply_stroke(&mut self, cells: &[Cell], color: Rgb) -> bool {
        self.mutate(|colors| {
            for &c in cells {
                colors.set(c, color);
            }
            whiten_border(colors);
        })
    }

    pub fn erase(&mut self, cell: Cell) -> bool {
        self.mutate(|colors| {
            colors.set(cell, palette::EMPTY);
        })
    }

    /// 4-connected exact-color fill from `start`, confined to the interior.
    /// Returns the number of painted cells.
    pub fn fill(&mut self, start: Cell, color: Rgb) -> usize {
        let n = self.size();
        let interior = |c: Cell| c.x >= 1 && c.y >= 1 && c.x + 2 <= n && c.y + 2 <= n;
        if !interior(start) {
            return 0;
        }
        let Some(target) = self.color_at(start) else {
            return 0;
        };
        if target == color {
            return 0;
        }

        let mut painted = 0;
        self.mutate(|colors| {
            let mut queue = VecDeque::new();
            colors.set(start, color);
            queue.push_back(start);
            while let Some(cell) = queue.pop_front() {
                painted += 1;
                let next: Vec<Cell> = colors
                    .neighbors4(cell)
                    .filter(|&c| interior(c) && colors.get(c) == Some(&target))
                    .collect();
                for c in next {
                    colors.set(c, color);
                    queue.push_back(c);
                }
            }
        });
        log::debug!("Filled {} cells from ({}, {})", painted, start.x, start.y);
        painted
    }

    /// Restore the state before the last change.
    pub fn undo(&mut self) -> bool {
        match self.history.pop() {
            Some(previous) => {
                self.colors = previous;
                true
            }
            None => false,
        }
    }

    /// Replace the whole canvas, keeping the old one for undo.
    pub fn load(&mut self, colors: Grid<Rgb>) {
        let previous = std::mem::replace(&mut self.colors, colors);
        if previous != self.colors {
            self.history.push(previous);
        }
    }

    pub fn to_raster(&self) -> Raster {
        encode_colors(&self.colors)
    }

    /// Decode exactly as a saved and reloaded raster would be.
    pub fn to_kinds(&self, palette: &Palette) -> Grid<CellKind> {
        decode(&self.to_raster(), self.size(), palette)
    }

    fn mutate(&mut self, f: impl FnOnce(&mut Grid<Rgb>)) -> bool {
        let before = self.colors.clone();
        f(&mut self.colors);
        if self.colors != before {
            self.history.push(before);
            true
        } else {
            false
        }
    }
}

fn whiten_border(colors: &mut Grid<Rgb>) {
    let (w, h) = (colors.width(), colors.height());
    if w == 0 || h == 0 {
        return;
    }
    for x in 0..w {
        colors.set(Cell::new(x, 0), palette::EMPTY);
        colors.set(Cell::new(x, h - 1), palette::EMPTY);
    }
    for y in 0..h {
        colors.set(Cell::new(0, y), palette::EMPTY);
        colors.set(Cell::new(w - 1, y), palette::EMPTY);
    }
}
