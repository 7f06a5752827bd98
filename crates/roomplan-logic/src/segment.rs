//! Connected-region extraction over room-like cells.
//!
//! A region is a maximal 4-connected set of Floor/Room/Corridor cells. While
//! flooding, every (member, neighbour) pair whose neighbour is a door or a
//! window bumps the matching tally, so a door touching two cells of the same
//! region counts twice.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::grid::{Cell, CellKind, Grid, Rect};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// Discovery order among kept regions.
    pub id: usize,
    /// Member cells, sorted row-major.
    pub cells: Vec<Cell>,
    pub doors: u32,
    pub windows: u32,
}

impl Region {
    pub fn area(&self) -> usize {
        self.cells.len()
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.cells
            .binary_search_by(|c| (c.y, c.x).cmp(&(cell.y, cell.x)))
            .is_ok()
    }

    /// Bounding rectangle of the member cells.
    pub fn bounds(&self) -> Option<Rect> {
        let first = self.cells.first()?;
        let (mut x0, mut y0, mut x1, mut y1) = (first.x, first.y, first.x, first.y);
        for c in &self.cells {
            x0 = x0.min(c.x);
            x1 = x1.max(c.x);
            y0 = y0.min(c.y);
            y1 = y1.max(c.y);
        }
        Some(Rect::new(
            x0 as i32,
            y0 as i32,
            (x1 - x0 + 1) as i32,
            (y1 - y0 + 1) as i32,
        ))
    }
}

/// All regions, keeping singletons.
pub fn segment(grid: &Grid<CellKind>) -> Vec<Region> {
    segment_with(grid, 1)
}

/// All regions of at least `min_area` cells, scanned row-major.
pub fn segment_with(grid: &Grid<CellKind>, min_area: usize) -> Vec<Region> {
    let mut visited = Grid::new(grid.width(), grid.height(), false);
    let mut regions = Vec::new();
    let mut dropped = 0usize;

    for (start, kind) in grid.iter() {
        if !kind.is_room_like() || visited.get(start).copied().unwrap_or(true) {
            continue;
        }
        let mut region = flood(grid, &mut visited, start);
        if region.area() < min_area {
            dropped += 1;
            continue;
        }
        region.id = regions.len();
        regions.push(region);
    }

    log::debug!(
        "Segmented {} regions ({} below minimum area dropped)",
        regions.len(),
        dropped
    );
    regions
}

fn flood(grid: &Grid<CellKind>, visited: &mut Grid<bool>, start: Cell) -> Region {
    let mut cells = Vec::new();
    let mut doors = 0;
    let mut windows = 0;
    let mut queue = VecDeque::new();

    visited.set(start, true);
    queue.push_back(start);

    while let Some(cell) = queue.pop_front() {
        cells.push(cell);
        for n in grid.neighbors4(cell) {
            match grid.get(n).copied().unwrap_or_default() {
                CellKind::Door => doors += 1,
                CellKind::Window => windows += 1,
                k if k.is_room_like() => {
                    if let Some(seen) = visited.get_mut(n) {
                        if !*seen {
                            *seen = true;
                            queue.push_back(n);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    cells.sort_by_key(|c| (c.y, c.x));
    Region {
        id: 0,
        cells,
        doors,
        windows,
    }
}
