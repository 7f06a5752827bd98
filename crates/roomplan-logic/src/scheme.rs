//! Scheme rasters and spawn plans.
//!
//! The scheme is the plan raster with every placement painted in its item
//! color. The 3D collaborator reads it back as a list of [`SpawnRequest`]s:
//! one per same-colored blob, positioned at the blob's bounding-box center.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::codec::encode_colors;
use crate::color::Rgb;
use crate::constants::{palette, PALETTE_TOLERANCE};
use crate::grid::{Cell, CellKind, Grid, Rect};
use crate::occupancy::Placement;
use crate::raster::Raster;

/// One object for the scene builder to instantiate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnRequest {
    pub item: String,
    /// Bounding box in logical cells.
    pub rect: Rect,
    /// Bounding-box center in cell units, cell centers at integer values.
    pub center: (f32, f32),
    /// Rests on top of a support rather than the floor.
    pub elevated: bool,
}

fn center_of(rect: &Rect) -> (f32, f32) {
    let axis = |min: i32, len: i32| (min + (min + len - 1) + 1) as f32 / 2.0 - 0.5;
    (axis(rect.x, rect.width), axis(rect.y, rect.height))
}

/// Paint placements over the plan colors: floor items first, then stacked
/// items so they stay visible on top of their supports.
pub fn render_scheme(grid: &Grid<CellKind>, placements: &[Placement], catalog: &Catalog) -> Raster {
    let mut colors = grid.map(|_, k| k.color());
    let (floor, stacked): (Vec<&Placement>, Vec<&Placement>) =
        placements.iter().partition(|p| !p.only_on_support);
    for p in floor.into_iter().chain(stacked) {
        let Some(item) = catalog.get(&p.item) else {
            log::warn!("No catalog color for {} {}", p.item, p.id);
            continue;
        };
        for cell in p.rect().cells() {
            colors.set(cell, item.color);
        }
    }
    encode_colors(&colors)
}

/// Recover the spawn plan from a scheme raster.
pub fn extract_spawns(raster: &Raster, catalog: &Catalog) -> Vec<SpawnRequest> {
    let (w, h) = (raster.width(), raster.height());
    let colors = Grid::from_fn(w, h, |c| {
        raster.pixel(c.x, h - 1 - c.y).unwrap_or(palette::EMPTY)
    });
    let mut visited = Grid::new(w, h, false);
    let mut blobs: Vec<(String, Rect, bool, bool)> = Vec::new();

    for (start, &color) in colors.iter() {
        if visited.get(start).copied().unwrap_or(true) {
            continue;
        }
        if is_reserved(color) {
            visited.set(start, true);
            continue;
        }
        let rect = flood_bounds(&colors, &mut visited, start, color);
        match catalog.find_by_color(color, PALETTE_TOLERANCE) {
            Some(item) => blobs.push((item.name.clone(), rect, item.support, item.only_on_support)),
            None => log::debug!(
                "Unmapped color {} at ({}, {})",
                color.to_hex(),
                start.x,
                start.y
            ),
        }
    }

    let supports: Vec<Rect> = blobs
        .iter()
        .filter(|(_, _, support, _)| *support)
        .map(|(_, r, _, _)| *r)
        .collect();
    let spawns: Vec<SpawnRequest> = blobs
        .into_iter()
        .map(|(item, rect, support, only_on_support)| SpawnRequest {
            elevated: only_on_support
                || (!support && supports.iter().any(|s| s.intersects(&rect))),
            center: center_of(&rect),
            item,
            rect,
        })
        .collect();
    log::info!("Scheme holds {} objects", spawns.len());
    spawns
}

/// The same plan taken straight from engine placements.
pub fn spawns_from_placements(placements: &[Placement]) -> Vec<SpawnRequest> {
    let supports: Vec<Rect> = placements
        .iter()
        .filter(|p| p.support)
        .map(Placement::rect)
        .collect();
    placements
        .iter()
        .map(|p| {
            let rect = p.rect();
            SpawnRequest {
                item: p.item.clone(),
                center: center_of(&rect),
                elevated: p.only_on_support
                    || (!p.support && supports.iter().any(|s| s.intersects(&rect))),
                rect,
            }
        })
        .collect()
}

fn is_reserved(color: Rgb) -> bool {
    palette::RESERVED
        .iter()
        .any(|r| r.approx_eq(color, PALETTE_TOLERANCE))
}

fn flood_bounds(colors: &Grid<Rgb>, visited: &mut Grid<bool>, start: Cell, color: Rgb) -> Rect {
    let (mut x0, mut y0, mut x1, mut y1) = (start.x, start.y, start.x, start.y);
    let mut queue = VecDeque::new();
    visited.set(start, true);
    queue.push_back(start);
    while let Some(cell) = queue.pop_front() {
        x0 = x0.min(cell.x);
        x1 = x1.max(cell.x);
        y0 = y0.min(cell.y);
        y1 = y1.max(cell.y);
        for n in colors.neighbors4(cell) {
            let same = colors.get(n).is_some_and(|c| c.approx_eq(color, PALETTE_TOLERANCE));
            if let Some(seen) = visited.get_mut(n) {
                if !*seen && same {
                    *seen = true;
                    queue.push_back(n);
                }
            }
        }
    }
    Rect::new(
        x0 as i32,
        y0 as i32,
        (x1 - x0 + 1) as i32,
        (y1 - y0 + 1) as i32,
    )
}
