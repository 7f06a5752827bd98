//! Editor session: the explicit state an interactive editor drives.
//!
//! A session owns the decoded plan, its analysis, the placement engine and
//! its undo log, the current item selection, the optimize-panel counts and
//! the equipment status board. Every user gesture is a method call.

use std::collections::BTreeMap;

use rand::Rng;
use thiserror::Error;

use crate::catalog::{Catalog, Item, Rotation};
use crate::classify::{label_grid, FloorAnalysis};
use crate::codec::{decode, encode_text, Palette};
use crate::config::{validate_config, PlannerConfig};
use crate::error::{PlanError, Result};
use crate::grid::{Cell, CellKind, Grid};
use crate::history::UndoLog;
use crate::occupancy::{Placement, PlacementId};
use crate::placement::{BatchReport, BatchRequest, EngineState, FloorPlan, PlacementEngine, Rejection};
use crate::raster::Raster;
use crate::scheme::{render_scheme, spawns_from_placements, SpawnRequest};
use crate::status::{StatusBoard, StatusChange, StatusTicker};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("item not found in catalog: {0}")]
    UnknownItem(String),
    #[error("no item selected")]
    NoSelection,
    #[error("{0} cannot be rotated")]
    NotRotatable(String),
    #[error(transparent)]
    Rejected(#[from] Rejection),
}

#[derive(Debug, Clone)]
pub struct EditorSession {
    config: PlannerConfig,
    catalog: Catalog,
    palette: Palette,
    grid: Grid<CellKind>,
    analysis: FloorAnalysis,
    engine: PlacementEngine,
    history: UndoLog<EngineState>,
    selected: Option<String>,
    rotation: Rotation,
    counts: BTreeMap<String, u32>,
    status: StatusBoard,
    ticker: StatusTicker,
}

impl EditorSession {
    /// Start with an empty plan. Config and catalog are validated first.
    pub fn new(config: PlannerConfig, catalog: Catalog) -> Result<Self> {
        let errors = validate_config(&config);
        if !errors.is_empty() {
            return Err(PlanError::InvalidConfig(errors));
        }
        let errors = catalog.validate();
        if !errors.is_empty() {
            return Err(PlanError::InvalidCatalog(errors));
        }

        let n = config.grid_size;
        let grid = Grid::square(n, CellKind::Empty);
        let analysis = FloorAnalysis::from_config(&grid, &config);
        let engine = PlacementEngine::new(FloorPlan::from_analysis(grid.clone(), &analysis));
        Ok(Self {
            palette: Palette::from_config(&config),
            history: UndoLog::bounded(config.undo_limit),
            ticker: StatusTicker::new(config.status.clone()),
            config,
            catalog,
            grid,
            analysis,
            engine,
            selected: None,
            rotation: Rotation::Deg0,
            counts: BTreeMap::new(),
            status: StatusBoard::new(),
        })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn grid(&self) -> &Grid<CellKind> {
        &self.grid
    }

    pub fn analysis(&self) -> &FloorAnalysis {
        &self.analysis
    }

    pub fn engine(&self) -> &PlacementEngine {
        &self.engine
    }

    pub fn placements(&self) -> &[Placement] {
        self.engine.placements()
    }

    pub fn status(&self) -> &StatusBoard {
        &self.status
    }

    pub fn undo_depth(&self) -> usize {
        self.history.len()
    }

    /// Decode a painted raster and analyze it. Placements and undo history
    /// are dropped.
    pub fn load_raster(&mut self, raster: &Raster) {
        let grid = decode(raster, self.config.grid_size, &self.palette);
        self.load_grid(grid);
    }

    /// Replace the plan with an already typed grid.
    pub fn load_grid(&mut self, grid: Grid<CellKind>) {
        self.grid = grid;
        self.reanalyze();
        self.history.clear();
        self.status.sync(self.engine.placements());
    }

    fn reanalyze(&mut self) {
        self.analysis = FloorAnalysis::from_config(&self.grid, &self.config);
        self.engine
            .reset_plan(FloorPlan::from_analysis(self.grid.clone(), &self.analysis));
    }

    pub fn selected(&self) -> Option<&Item> {
        self.selected.as_deref().and_then(|n| self.catalog.get(n))
    }

    /// Select an item for interactive placement. Rotation starts from the
    /// item's stored rotation.
    pub fn select(&mut self, name: &str) -> std::result::Result<(), SessionError> {
        let item = self
            .catalog
            .get(name)
            .ok_or_else(|| SessionError::UnknownItem(name.to_string()))?;
        self.rotation = item.rotation;
        self.selected = Some(item.name.clone());
        log::debug!("Selected {}", name);
        Ok(())
    }

    pub fn deselect(&mut self) {
        self.selected = None;
        self.rotation = Rotation::Deg0;
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: Rotation) -> std::result::Result<(), SessionError> {
        let item = self.selected().ok_or(SessionError::NoSelection)?;
        if !item.rotatable && rotation != item.rotation {
            return Err(SessionError::NotRotatable(item.name.clone()));
        }
        self.rotation = rotation;
        Ok(())
    }

    /// Turn the selection a further 90 degrees.
    pub fn rotate(&mut self) -> std::result::Result<Rotation, SessionError> {
        let next = self.rotation.next();
        self.set_rotation(next)?;
        Ok(next)
    }

    /// Place the selected item at a clicked cell.
    pub fn click(&mut self, cell: Cell) -> std::result::Result<Placement, SessionError> {
        let item = self.selected().cloned().ok_or(SessionError::NoSelection)?;
        let before = self.engine.snapshot();
        let placement = self.engine.place_interactive(&item, cell, self.rotation)?;
        self.history.push(before);
        self.status.sync(self.engine.placements());
        Ok(placement)
    }

    /// Eraser on the scheme: remove whatever sits on top at `cell`.
    pub fn erase_at(&mut self, cell: Cell) -> Vec<Placement> {
        let before = self.engine.snapshot();
        let removed = self.engine.remove_at(cell);
        if !removed.is_empty() {
            self.history.push(before);
            self.status.sync(self.engine.placements());
        }
        removed
    }

    pub fn count(&self, name: &str) -> u32 {
        self.counts.get(name).copied().unwrap_or(0)
    }

    pub fn set_count(&mut self, name: &str, count: u32) -> std::result::Result<(), SessionError> {
        if self.catalog.get(name).is_none() {
            return Err(SessionError::UnknownItem(name.to_string()));
        }
        self.counts.insert(name.to_string(), count);
        Ok(())
    }

    pub fn increment(&mut self, name: &str) -> std::result::Result<u32, SessionError> {
        let next = self.count(name).saturating_add(1);
        self.set_count(name, next)?;
        Ok(next)
    }

    /// Decrease a count, never below zero.
    pub fn decrement(&mut self, name: &str) -> std::result::Result<u32, SessionError> {
        let next = self.count(name).saturating_sub(1);
        self.set_count(name, next)?;
        Ok(next)
    }

    /// Zero every count and clear the scheme.
    pub fn reset_counts(&mut self) {
        self.counts.clear();
        self.clear();
    }

    /// Requests in catalog order for every nonzero count.
    pub fn batch_requests(&self) -> Vec<BatchRequest> {
        self.catalog
            .items()
            .iter()
            .filter(|i| self.count(&i.name) > 0)
            .map(|i| BatchRequest {
                item: i.name.clone(),
                count: self.count(&i.name),
                rotation: i.rotation,
            })
            .collect()
    }

    /// Reanalyze the plan, clear the scheme and place the requested counts.
    pub fn apply_optimize(&mut self) -> BatchReport {
        let before = self.engine.snapshot();
        self.reanalyze();
        let requests = self.batch_requests();
        let report = self.engine.place_batch(&self.catalog, &requests);
        if self.engine.snapshot() != before {
            self.history.push(before);
        }
        self.status.sync(self.engine.placements());
        report
    }

    /// Remove every placement.
    pub fn clear(&mut self) {
        if self.engine.placements().is_empty() {
            return;
        }
        self.history.push(self.engine.snapshot());
        self.engine.clear();
        self.status.sync(self.engine.placements());
    }

    /// Revert the last placement change.
    pub fn undo(&mut self) -> bool {
        match self.history.pop() {
            Some(state) => {
                self.engine.restore(state);
                self.status.sync(self.engine.placements());
                log::debug!("Undo: {} placements", self.engine.placements().len());
                true
            }
            None => false,
        }
    }

    /// Plan colors with every placement painted on.
    pub fn render_scheme(&self) -> Raster {
        render_scheme(&self.grid, self.engine.placements(), &self.catalog)
    }

    pub fn spawn_plan(&self) -> Vec<SpawnRequest> {
        spawns_from_placements(self.engine.placements())
    }

    pub fn corridor_map_text(&self) -> String {
        self.analysis.mask.to_text()
    }

    pub fn grid_text(&self) -> String {
        encode_text(&self.grid)
    }

    /// The grid with floor rewritten to Room or Corridor.
    pub fn labelled_grid(&self) -> Grid<CellKind> {
        label_grid(&self.grid, &self.analysis)
    }

    pub fn advance_status<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) -> Vec<StatusChange> {
        self.ticker.advance(dt, &mut self.status, rng)
    }

    pub fn acknowledge(&mut self, id: PlacementId) -> Option<StatusChange> {
        self.status.acknowledge(id)
    }

    pub fn stop_status(&mut self) {
        self.ticker.cancel();
    }
}
