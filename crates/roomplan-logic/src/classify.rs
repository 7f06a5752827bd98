//! Room / corridor classification and the corridor mask.
//!
//! A region is a corridor when it has at least one door and doors make up
//! most of its openings: `doors / (doors + windows + ε) ≥ ratio`. The mask
//! is the union of corridor cells; no equipment footprint may overlap it.

use serde::{Deserialize, Serialize};

use crate::codec::{encode_matrix, parse_matrix, MatrixWarning};
use crate::config::PlannerConfig;
use crate::constants::{CORRIDOR_DOOR_RATIO, RATIO_EPSILON};
use crate::error::Result;
use crate::grid::{Cell, CellKind, Grid, Rect};
use crate::segment::{segment_with, Region};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegionKind {
    Room,
    Corridor,
}

/// Threshold rule for [`RegionKind::Corridor`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierRules {
    pub min_doors: u32,
    pub corridor_ratio: f32,
    pub epsilon: f32,
}

impl Default for ClassifierRules {
    fn default() -> Self {
        Self {
            min_doors: 1,
            corridor_ratio: CORRIDOR_DOOR_RATIO,
            epsilon: RATIO_EPSILON,
        }
    }
}

impl ClassifierRules {
    pub fn from_config(config: &PlannerConfig) -> Self {
        Self {
            min_doors: config.min_doors,
            corridor_ratio: config.corridor_ratio,
            epsilon: config.ratio_epsilon,
        }
    }

    pub fn door_ratio(&self, region: &Region) -> f32 {
        let doors = region.doors as f32;
        doors / (doors + region.windows as f32 + self.epsilon)
    }

    pub fn classify(&self, region: &Region) -> RegionKind {
        if region.doors >= self.min_doors.max(1) && self.door_ratio(region) >= self.corridor_ratio {
            RegionKind::Corridor
        } else {
            RegionKind::Room
        }
    }
}

/// Classify with the stock thresholds.
pub fn classify(region: &Region) -> RegionKind {
    ClassifierRules::default().classify(region)
}

/// N×N set of corridor cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorridorMask {
    cells: Grid<bool>,
    count: usize,
}

impl CorridorMask {
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            cells: Grid::new(width, height, false),
            count: 0,
        }
    }

    pub fn width(&self) -> usize {
        self.cells.width()
    }

    pub fn height(&self) -> usize {
        self.cells.height()
    }

    pub fn insert(&mut self, cell: Cell) {
        if let Some(v) = self.cells.get_mut(cell) {
            if !*v {
                *v = true;
                self.count += 1;
            }
        }
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.cells.get(cell).copied().unwrap_or(false)
    }

    /// True when any in-bounds cell of `rect` is a corridor cell.
    pub fn intersects(&self, rect: &Rect) -> bool {
        self.count > 0 && rect.cells().any(|c| self.contains(c))
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Corridor map file contents: a `{0,1}` matrix.
    pub fn to_text(&self) -> String {
        encode_matrix(&self.cells, |v| if *v { "1" } else { "0" }.to_string())
    }

    /// Parse a corridor map. Any nonzero value marks a corridor cell.
    pub fn from_text(text: &str) -> Result<(Self, Vec<MatrixWarning>)> {
        let (raw, warnings) = parse_matrix(text)?;
        let mut mask = Self::empty(raw.width(), raw.height());
        for (cell, v) in raw.iter() {
            if matches!(v, Some(v) if *v != 0) {
                mask.insert(cell);
            }
        }
        Ok((mask, warnings))
    }
}

/// Union of every corridor region's cells.
pub fn build_corridor_mask(regions: &[ClassifiedRegion], width: usize, height: usize) -> CorridorMask {
    let mut mask = CorridorMask::empty(width, height);
    for r in regions.iter().filter(|r| r.kind == RegionKind::Corridor) {
        for &cell in &r.region.cells {
            mask.insert(cell);
        }
    }
    mask
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedRegion {
    pub region: Region,
    pub kind: RegionKind,
}

/// Result of one "apply": every region with its label, plus the mask.
#[derive(Debug, Clone, PartialEq)]
pub struct FloorAnalysis {
    pub regions: Vec<ClassifiedRegion>,
    pub mask: CorridorMask,
}

impl FloorAnalysis {
    pub fn analyze(grid: &Grid<CellKind>) -> Self {
        Self::analyze_with(grid, &ClassifierRules::default(), 1)
    }

    pub fn from_config(grid: &Grid<CellKind>, config: &PlannerConfig) -> Self {
        Self::analyze_with(
            grid,
            &ClassifierRules::from_config(config),
            config.min_region_area,
        )
    }

    pub fn analyze_with(grid: &Grid<CellKind>, rules: &ClassifierRules, min_area: usize) -> Self {
        let regions: Vec<ClassifiedRegion> = segment_with(grid, min_area)
            .into_iter()
            .map(|region| ClassifiedRegion {
                kind: rules.classify(&region),
                region,
            })
            .collect();
        let mask = build_corridor_mask(&regions, grid.width(), grid.height());
        let analysis = Self { regions, mask };
        log::info!(
            "Plan analyzed: {} regions, {} rooms, {} corridors ({} corridor cells)",
            analysis.regions.len(),
            analysis.room_count(),
            analysis.corridor_count(),
            analysis.mask.len()
        );
        analysis
    }

    pub fn room_count(&self) -> usize {
        self.regions
            .iter()
            .filter(|r| r.kind == RegionKind::Room)
            .count()
    }

    pub fn corridor_count(&self) -> usize {
        self.regions.len() - self.room_count()
    }

    pub fn region_at(&self, cell: Cell) -> Option<&ClassifiedRegion> {
        self.regions.iter().find(|r| r.region.contains(cell))
    }
}

/// Rewrite the cells of every classified region to Room or Corridor.
pub fn label_grid(grid: &Grid<CellKind>, analysis: &FloorAnalysis) -> Grid<CellKind> {
    let mut labelled = grid.clone();
    for r in &analysis.regions {
        let kind = match r.kind {
            RegionKind::Room => CellKind::Room,
            RegionKind::Corridor => CellKind::Corridor,
        };
        for &cell in &r.region.cells {
            labelled.set(cell, kind);
        }
    }
    labelled
}
