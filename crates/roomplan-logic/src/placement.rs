//! Placement engine: validates candidate footprints and commits them.
//!
//! Checks run in a fixed order and the first failure wins:
//!
//! 1. **Bounds**: the footprint lies inside the grid.
//! 2. **Floor**: every footprint cell is room-like.
//! 3. **Corridor**: no footprint cell is on the corridor mask.
//! 4. **Occupancy**: every cell is free for the item's claim.
//! 5. **Clearance**: the footprint inflated by the item's padding touches no
//!    committed placement. Skipped for support-only items.
//! 6. **Containment**: support-only items lie inside a support and share its
//!    integer horizontal center.
//!
//! A rejection never changes state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{Catalog, Item, Rotation};
use crate::classify::{CorridorMask, FloorAnalysis};
use crate::grid::{Cell, CellKind, Grid, Rect};
use crate::occupancy::{Claim, OccupancyError, OccupancyGrid, Placement, PlacementId};

/// The static plan items are placed onto.
#[derive(Debug, Clone, PartialEq)]
pub struct FloorPlan {
    pub grid: Grid<CellKind>,
    pub mask: CorridorMask,
}

impl FloorPlan {
    pub fn new(grid: Grid<CellKind>, mask: CorridorMask) -> Self {
        Self { grid, mask }
    }

    /// Segment, classify and keep the corridor mask.
    pub fn analyze(grid: Grid<CellKind>) -> Self {
        let mask = FloorAnalysis::analyze(&grid).mask;
        Self { grid, mask }
    }

    pub fn from_analysis(grid: Grid<CellKind>, analysis: &FloorAnalysis) -> Self {
        Self {
            grid,
            mask: analysis.mask.clone(),
        }
    }

    /// All-floor plan with no corridors.
    pub fn open(size: usize) -> Self {
        Self {
            grid: Grid::square(size, CellKind::Floor),
            mask: CorridorMask::empty(size, size),
        }
    }

    pub fn width(&self) -> usize {
        self.grid.width()
    }

    pub fn height(&self) -> usize {
        self.grid.height()
    }
}

/// Which rule a rejection came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Check {
    Bounds,
    Floor,
    Corridor,
    Occupancy,
    Clearance,
    Containment,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RejectReason {
    #[error("footprint leaves the grid")]
    OutOfBounds,
    #[error("cell ({}, {}) is not floor", .cell.x, .cell.y)]
    NotFloor { cell: Cell },
    #[error("cell ({}, {}) is part of a corridor", .cell.x, .cell.y)]
    Corridor { cell: Cell },
    #[error("cell ({}, {}) is occupied", .cell.x, .cell.y)]
    Occupied {
        cell: Cell,
        owner: Option<PlacementId>,
    },
    #[error("within {padding} cells of placement {other}")]
    Clearance { other: PlacementId, padding: u32 },
    #[error("footprint does not rest inside any support")]
    NoSupport,
    #[error("off center on support {support} by {offset} cells")]
    OffCenter { support: PlacementId, offset: i32 },
    #[error(transparent)]
    Refused(#[from] OccupancyError),
}

impl RejectReason {
    pub fn check(&self) -> Check {
        match self {
            Self::OutOfBounds => Check::Bounds,
            Self::NotFloor { .. } => Check::Floor,
            Self::Corridor { .. } => Check::Corridor,
            Self::Occupied { .. } | Self::Refused(_) => Check::Occupancy,
            Self::Clearance { .. } => Check::Clearance,
            Self::NoSupport | Self::OffCenter { .. } => Check::Containment,
        }
    }
}

/// A refused candidate.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("cannot place {item} at ({}, {}) {}x{}: {reason}", .rect.x, .rect.y, .rect.width, .rect.height)]
pub struct Rejection {
    pub item: String,
    pub rect: Rect,
    pub reason: RejectReason,
}

/// One line of a batch: place up to `count` copies of `item`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRequest {
    pub item: String,
    pub count: u32,
    #[serde(default)]
    pub rotation: Rotation,
}

impl BatchRequest {
    pub fn new(item: &str, count: u32) -> Self {
        Self {
            item: item.to_string(),
            count,
            rotation: Rotation::Deg0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub item: String,
    pub requested: u32,
    pub placed: Vec<PlacementId>,
}

impl BatchOutcome {
    pub fn shortfall(&self) -> u32 {
        self.requested.saturating_sub(self.placed.len() as u32)
    }
}

/// Per-item results of a batch, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub outcomes: Vec<BatchOutcome>,
    /// Requested names missing from the catalog.
    pub unknown: Vec<String>,
}

impl BatchReport {
    pub fn outcome(&self, item: &str) -> Option<&BatchOutcome> {
        self.outcomes.iter().find(|o| o.item == item)
    }

    pub fn total_placed(&self) -> usize {
        self.outcomes.iter().map(|o| o.placed.len()).sum()
    }

    pub fn total_shortfall(&self) -> u32 {
        self.outcomes.iter().map(BatchOutcome::shortfall).sum()
    }

    pub fn is_complete(&self) -> bool {
        self.unknown.is_empty() && self.total_shortfall() == 0
    }
}

/// Mutable engine state, captured whole for undo.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineState {
    occupancy: OccupancyGrid,
    placements: Vec<Placement>,
}

#[derive(Debug, Clone)]
pub struct PlacementEngine {
    plan: FloorPlan,
    state: EngineState,
    /// Outside the snapshot so undo never hands out an id twice.
    next_id: u32,
}

impl PlacementEngine {
    pub fn new(plan: FloorPlan) -> Self {
        let occupancy = OccupancyGrid::new(plan.width(), plan.height());
        Self {
            plan,
            state: EngineState {
                occupancy,
                placements: Vec::new(),
            },
            next_id: 1,
        }
    }

    pub fn plan(&self) -> &FloorPlan {
        &self.plan
    }

    /// Swap in a freshly analyzed plan. Placements are dropped; ids keep
    /// counting up so an id never names two different placements.
    pub fn reset_plan(&mut self, plan: FloorPlan) {
        self.state.occupancy = OccupancyGrid::new(plan.width(), plan.height());
        self.state.placements.clear();
        self.plan = plan;
    }

    pub fn placements(&self) -> &[Placement] {
        &self.state.placements
    }

    pub fn placement(&self, id: PlacementId) -> Option<&Placement> {
        self.state.placements.iter().find(|p| p.id == id)
    }

    pub fn occupancy(&self) -> &OccupancyGrid {
        &self.state.occupancy
    }

    /// Run every check without committing. Returns the support the item
    /// would rest on, if any.
    pub fn validate(
        &self,
        item: &Item,
        x: i32,
        y: i32,
        rotation: Rotation,
    ) -> Result<Option<PlacementId>, Rejection> {
        let rect = candidate(item, x, y, rotation);
        self.check(item, &rect).map_err(|reason| Rejection {
            item: item.name.clone(),
            rect,
            reason,
        })
    }

    fn check(&self, item: &Item, rect: &Rect) -> Result<Option<PlacementId>, RejectReason> {
        if !rect.within(self.plan.width(), self.plan.height()) {
            return Err(RejectReason::OutOfBounds);
        }

        if let Some(cell) = rect
            .cells()
            .find(|&c| !self.plan.grid.get(c).is_some_and(|k| k.is_room_like()))
        {
            return Err(RejectReason::NotFloor { cell });
        }

        if let Some(cell) = rect.cells().find(|&c| self.plan.mask.contains(c)) {
            return Err(RejectReason::Corridor { cell });
        }

        let claim = if item.only_on_support {
            Claim::OnSupport
        } else {
            Claim::Floor
        };
        if let Some(cell) = self.state.occupancy.first_conflict(rect, claim) {
            return Err(RejectReason::Occupied {
                cell,
                owner: self.state.occupancy.owner_at(cell),
            });
        }

        if item.only_on_support {
            return self.containment(rect).map(Some);
        }

        let padding = item.clearance().padding();
        // Past the grid extent every committed placement is already in reach.
        let extent = self.plan.width().max(self.plan.height());
        let reach = padding.min(u32::try_from(extent).unwrap_or(u32::MAX));
        let envelope = rect.inflate(reach);
        if let Some(other) = self
            .state
            .placements
            .iter()
            .find(|p| envelope.intersects(&p.rect()))
        {
            return Err(RejectReason::Clearance {
                other: other.id,
                padding,
            });
        }
        Ok(None)
    }

    fn containment(&self, rect: &Rect) -> Result<PlacementId, RejectReason> {
        let mut off_center = None;
        for support in self
            .state
            .placements
            .iter()
            .filter(|p| p.support && p.rect().contains_rect(rect))
        {
            let offset = rect.center_x() - support.rect().center_x();
            if offset == 0 {
                return Ok(support.id);
            }
            off_center.get_or_insert(RejectReason::OffCenter {
                support: support.id,
                offset,
            });
        }
        Err(off_center.unwrap_or(RejectReason::NoSupport))
    }

    /// Validate and commit `item` with its origin at `(x, y)`.
    pub fn try_place(
        &mut self,
        item: &Item,
        x: i32,
        y: i32,
        rotation: Rotation,
    ) -> Result<Placement, Rejection> {
        let result = self.place_unlogged(item, x, y, rotation);
        match &result {
            Ok(p) => log::debug!(
                "Placed {} {} at ({}, {}) rotated {}",
                p.item,
                p.id,
                p.x,
                p.y,
                p.rotation.degrees()
            ),
            Err(r) => log::debug!("{r}"),
        }
        result
    }

    fn place_unlogged(
        &mut self,
        item: &Item,
        x: i32,
        y: i32,
        rotation: Rotation,
    ) -> Result<Placement, Rejection> {
        self.validate(item, x, y, rotation)?;
        let fp = item.footprint_at(rotation);
        let placement = Placement {
            id: PlacementId(self.next_id),
            item: item.name.clone(),
            x,
            y,
            width: fp.width,
            height: fp.height,
            rotation,
            support: item.support,
            only_on_support: item.only_on_support,
        };
        self.state
            .occupancy
            .commit(&placement)
            .map_err(|e| Rejection {
                item: item.name.clone(),
                rect: placement.rect(),
                reason: e.into(),
            })?;
        self.next_id += 1;
        self.state.placements.push(placement.clone());
        Ok(placement)
    }

    /// Place from a clicked cell. The click is the footprint corner that
    /// the rotation turns toward the top-left.
    pub fn place_interactive(
        &mut self,
        item: &Item,
        click: Cell,
        rotation: Rotation,
    ) -> Result<Placement, Rejection> {
        let (x, y) = interactive_origin(item, click, rotation);
        self.try_place(item, x, y, rotation)
    }

    /// Place every request, scanning origins row-major. Support-only items
    /// run after everything else so their supports exist first.
    pub fn place_batch(&mut self, catalog: &Catalog, requests: &[BatchRequest]) -> BatchReport {
        let mut report = BatchReport::default();
        let (dependents, standalone): (Vec<_>, Vec<_>) = requests
            .iter()
            .filter(|r| r.count > 0)
            .partition(|r| catalog.get(&r.item).is_some_and(|i| i.only_on_support));

        for request in standalone.into_iter().chain(dependents) {
            let Some(item) = catalog.get(&request.item) else {
                log::error!("Item not found in catalog: {}", request.item);
                report.unknown.push(request.item.clone());
                continue;
            };
            let outcome = self.fill(item, request);
            if outcome.shortfall() > 0 {
                log::warn!(
                    "Could not place every {}: placed {} of {}",
                    outcome.item,
                    outcome.placed.len(),
                    outcome.requested
                );
            }
            report.outcomes.push(outcome);
        }

        log::info!(
            "Batch placement: {} placed, {} short, {} unknown",
            report.total_placed(),
            report.total_shortfall(),
            report.unknown.len()
        );
        report
    }

    fn fill(&mut self, item: &Item, request: &BatchRequest) -> BatchOutcome {
        let mut placed = Vec::new();
        'scan: for y in 0..self.plan.height() as i32 {
            for x in 0..self.plan.width() as i32 {
                if placed.len() as u32 >= request.count {
                    break 'scan;
                }
                if let Ok(p) = self.place_unlogged(item, x, y, request.rotation) {
                    placed.push(p.id);
                }
            }
        }
        BatchOutcome {
            item: item.name.clone(),
            requested: request.count,
            placed,
        }
    }

    /// Remove a placement and, for a support, everything resting on it.
    /// Returns the removed placements, dependents first.
    pub fn remove(&mut self, id: PlacementId) -> Vec<Placement> {
        let Some(target) = self.placement(id).cloned() else {
            return Vec::new();
        };
        let mut doomed: Vec<PlacementId> = Vec::new();
        if target.support {
            doomed.extend(
                self.state
                    .placements
                    .iter()
                    .filter(|p| {
                        p.only_on_support
                            && target.rect().contains_rect(&p.rect())
                            && p.rect()
                                .cells()
                                .next()
                                .is_some_and(|c| self.state.occupancy.support_at(c) == Some(id))
                    })
                    .map(|p| p.id),
            );
        }
        doomed.push(id);

        let mut removed = Vec::new();
        for victim in doomed {
            self.state.occupancy.release(victim);
            if let Some(pos) = self.state.placements.iter().position(|p| p.id == victim) {
                let p = self.state.placements.remove(pos);
                log::info!("Removed {} {}", p.item, p.id);
                removed.push(p);
            }
        }
        removed
    }

    /// Eraser: remove the topmost placement covering `cell`.
    pub fn remove_at(&mut self, cell: Cell) -> Vec<Placement> {
        match self.state.occupancy.owner_at(cell) {
            Some(id) => self.remove(id),
            None => Vec::new(),
        }
    }

    pub fn clear(&mut self) {
        self.state.occupancy.clear();
        self.state.placements.clear();
    }

    pub fn snapshot(&self) -> EngineState {
        self.state.clone()
    }

    /// Roll back to a snapshot. The id counter is not rewound.
    pub fn restore(&mut self, state: EngineState) {
        self.state = state;
    }
}

/// Effective footprint rect for an origin.
fn candidate(item: &Item, x: i32, y: i32, rotation: Rotation) -> Rect {
    let fp = item.footprint_at(rotation);
    Rect::sized(x, y, fp.width, fp.height)
}

/// Origin for an interactive click, using the effective dimensions.
pub fn interactive_origin(item: &Item, click: Cell, rotation: Rotation) -> (i32, i32) {
    let fp = item.footprint_at(rotation);
    let rect = Rect::sized(0, 0, fp.width, fp.height);
    let (w, h) = (rect.width, rect.height);
    let (cx, cy) = (click.x as i32, click.y as i32);
    match rotation {
        Rotation::Deg0 => (cx, cy),
        Rotation::Deg90 => (cx - (w - 1), cy),
        Rotation::Deg180 => (cx - (w - 1), cy - (h - 1)),
        Rotation::Deg270 => (cx, cy - (h - 1)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Clearance;
    use crate::color::Rgb;
    use crate::constants::item_names;
    use crate::test_support::grid_from;

    fn catalog() -> Catalog {
        Catalog::standard()
    }

    fn item(name: &str) -> Item {
        catalog().get(name).unwrap().clone()
    }

    fn open_engine(size: usize) -> PlacementEngine {
        PlacementEngine::new(FloorPlan::open(size))
    }

    #[test]
    fn test_bounds_rejection() {
        let engine = open_engine(8);
        let err = engine
            .validate(&item(item_names::SERVER), 6, 0, Rotation::Deg0)
            .unwrap_err();
        assert_eq!(err.reason, RejectReason::OutOfBounds);
        assert_eq!(err.reason.check(), Check::Bounds);
        assert_eq!(err.rect, Rect::new(6, 0, 3, 3));
    }

    #[test]
    fn test_floor_rejection() {
        let g = grid_from(&["#####", "#...#", "#...#", "#####"]);
        let engine = PlacementEngine::new(FloorPlan::new(g, CorridorMask::empty(5, 4)));
        let err = engine
            .validate(&item(item_names::NAS), 0, 1, Rotation::Deg0)
            .unwrap_err();
        assert_eq!(
            err.reason,
            RejectReason::NotFloor {
                cell: Cell::new(0, 1)
            }
        );
        assert!(engine
            .validate(&item(item_names::NAS), 1, 1, Rotation::Deg0)
            .is_ok());
    }

    #[test]
    fn test_corridor_rejection() {
        let mut mask = CorridorMask::empty(10, 10);
        mask.insert(Cell::new(4, 4));
        let engine = PlacementEngine::new(FloorPlan::new(Grid::square(10, CellKind::Floor), mask));
        let err = engine
            .validate(&item(item_names::NAS), 3, 3, Rotation::Deg0)
            .unwrap_err();
        assert_eq!(err.reason.check(), Check::Corridor);
    }

    #[test]
    fn test_occupancy_rejection_names_owner() {
        let mut engine = open_engine(12);
        let router = item(item_names::ROUTER);
        let placed = engine.try_place(&router, 5, 5, Rotation::Deg0).unwrap();
        let err = engine.validate(&router, 5, 5, Rotation::Deg0).unwrap_err();
        assert_eq!(
            err.reason,
            RejectReason::Occupied {
                cell: Cell::new(5, 5),
                owner: Some(placed.id)
            }
        );
    }

    #[test]
    fn test_server_clearance() {
        let mut engine = open_engine(20);
        let router = item(item_names::ROUTER);
        let existing = engine.try_place(&router, 10, 5, Rotation::Deg0).unwrap();
        // Server at (5,4) covers x 5..8; padding 3 reaches the router at x 10.
        let err = engine
            .validate(&item(item_names::SERVER), 5, 4, Rotation::Deg0)
            .unwrap_err();
        assert_eq!(
            err.reason,
            RejectReason::Clearance {
                other: existing.id,
                padding: 3
            }
        );
        // One cell further left the envelope ends just before it.
        assert!(engine
            .validate(&item(item_names::SERVER), 4, 4, Rotation::Deg0)
            .is_ok());
    }

    #[test]
    fn test_clearance_uses_new_item_padding_only() {
        let mut engine = open_engine(20);
        engine
            .try_place(&item(item_names::SERVER), 2, 2, Rotation::Deg0)
            .unwrap();
        // Router padding is 2: 2 cells of gap to the server's raw rect is enough.
        assert!(engine
            .validate(&item(item_names::ROUTER), 7, 2, Rotation::Deg0)
            .is_ok());
        assert!(engine
            .validate(&item(item_names::ROUTER), 6, 2, Rotation::Deg0)
            .is_err());
    }

    #[test]
    fn test_pc_centered_on_desk() {
        let mut engine = open_engine(20);
        let desk = engine
            .try_place(&item(item_names::DESK), 10, 10, Rotation::Deg0)
            .unwrap();
        let pc = item(item_names::PC);

        let off = engine.validate(&pc, 10, 10, Rotation::Deg0).unwrap_err();
        assert_eq!(
            off.reason,
            RejectReason::OffCenter {
                support: desk.id,
                offset: -1
            }
        );
        assert_eq!(
            engine.validate(&pc, 12, 11, Rotation::Deg0).unwrap_err().reason,
            RejectReason::OffCenter {
                support: desk.id,
                offset: 1
            }
        );

        let placed = engine.try_place(&pc, 11, 10, Rotation::Deg0).unwrap();
        assert_eq!(placed.rect().center_x(), desk.rect().center_x());
        assert_eq!(engine.occupancy().owner_at(Cell::new(12, 11)), Some(placed.id));
        assert_eq!(engine.occupancy().support_at(Cell::new(12, 11)), Some(desk.id));

        // The desk top is taken now.
        let again = engine.validate(&pc, 11, 11, Rotation::Deg0).unwrap_err();
        assert_eq!(again.reason.check(), Check::Occupancy);
    }

    #[test]
    fn test_pc_without_desk() {
        let engine = open_engine(10);
        let err = engine
            .validate(&item(item_names::PC), 2, 2, Rotation::Deg0)
            .unwrap_err();
        assert_eq!(err.reason, RejectReason::NoSupport);
    }

    #[test]
    fn test_rotated_footprint() {
        let mut engine = open_engine(10);
        let p = engine
            .try_place(&item(item_names::FIREWALL), 0, 0, Rotation::Deg90)
            .unwrap();
        assert_eq!((p.width, p.height), (1, 2));
        assert!(engine.occupancy().is_occupied(Cell::new(0, 1)));
        assert!(!engine.occupancy().is_occupied(Cell::new(1, 0)));
    }

    #[test]
    fn test_interactive_anchors() {
        let desk = item(item_names::DESK);
        let click = Cell::new(10, 10);
        assert_eq!(interactive_origin(&desk, click, Rotation::Deg0), (10, 10));
        // Rotated 90: effective 3x5.
        assert_eq!(interactive_origin(&desk, click, Rotation::Deg90), (8, 10));
        assert_eq!(interactive_origin(&desk, click, Rotation::Deg180), (6, 8));
        assert_eq!(interactive_origin(&desk, click, Rotation::Deg270), (10, 6));

        let mut engine = open_engine(20);
        let p = engine
            .place_interactive(&desk, click, Rotation::Deg180)
            .unwrap();
        assert!(p.rect().contains_cell(click));
    }

    #[test]
    fn test_batch_shortfall() {
        // Six floor cells in a row; routers need two free cells between them.
        let g = grid_from(&["########", "#......#", "########"]);
        let mut engine = PlacementEngine::new(FloorPlan::new(g, CorridorMask::empty(8, 3)));
        let report = engine.place_batch(&catalog(), &[BatchRequest::new(item_names::ROUTER, 3)]);
        let outcome = report.outcome(item_names::ROUTER).unwrap();
        assert_eq!(outcome.placed.len(), 2);
        assert_eq!(outcome.shortfall(), 1);
        assert_eq!(engine.placements()[0].x, 1);
        assert_eq!(engine.placements()[1].x, 4);
        assert!(!report.is_complete());
    }

    #[test]
    fn test_batch_places_dependents_last() {
        let mut engine = open_engine(24);
        let report = engine.place_batch(
            &catalog(),
            &[
                BatchRequest::new(item_names::PC, 2),
                BatchRequest::new(item_names::DESK, 2),
            ],
        );
        assert_eq!(report.outcomes[0].item, item_names::DESK);
        assert_eq!(report.outcomes[1].item, item_names::PC);
        assert_eq!(report.total_placed(), 4);
        for pc in engine.placements().iter().filter(|p| p.only_on_support) {
            let desk = engine
                .placements()
                .iter()
                .find(|d| d.support && d.rect().contains_rect(&pc.rect()))
                .unwrap();
            assert_eq!(desk.rect().center_x(), pc.rect().center_x());
        }
    }

    #[test]
    fn test_batch_unknown_item() {
        let mut engine = open_engine(8);
        let report = engine.place_batch(&catalog(), &[BatchRequest::new("Toaster", 1)]);
        assert_eq!(report.unknown, vec!["Toaster".to_string()]);
        assert!(engine.placements().is_empty());
    }

    #[test]
    fn test_remove_support_cascades() {
        let mut engine = open_engine(20);
        let desk = engine
            .try_place(&item(item_names::DESK), 2, 2, Rotation::Deg0)
            .unwrap();
        let pc = engine
            .try_place(&item(item_names::PC), 3, 2, Rotation::Deg0)
            .unwrap();
        let removed = engine.remove(desk.id);
        assert_eq!(
            removed.iter().map(|p| p.id).collect::<Vec<_>>(),
            vec![pc.id, desk.id]
        );
        assert!(engine.placements().is_empty());
        assert_eq!(engine.occupancy().occupied_count(), 0);
    }

    #[test]
    fn test_remove_at_takes_topmost() {
        let mut engine = open_engine(20);
        let desk = engine
            .try_place(&item(item_names::DESK), 2, 2, Rotation::Deg0)
            .unwrap();
        engine
            .try_place(&item(item_names::PC), 3, 2, Rotation::Deg0)
            .unwrap();
        let removed = engine.remove_at(Cell::new(4, 3));
        assert_eq!(removed.len(), 1);
        assert!(removed[0].only_on_support);
        assert_eq!(engine.placements().len(), 1);
        assert_eq!(engine.placements()[0].id, desk.id);
        assert!(engine.remove_at(Cell::new(0, 0)).is_empty());
    }

    #[test]
    fn test_snapshot_restore_round_trip() {
        let mut engine = open_engine(10);
        let before = engine.snapshot();
        engine
            .try_place(&item(item_names::MODEM), 1, 1, Rotation::Deg0)
            .unwrap();
        engine.restore(before.clone());
        assert_eq!(engine.snapshot(), before);
        assert!(engine.placements().is_empty());
    }

    #[test]
    fn test_ids_are_not_reused() {
        let mut engine = open_engine(10);
        let before = engine.snapshot();
        let first = engine
            .try_place(&item(item_names::MODEM), 1, 1, Rotation::Deg0)
            .unwrap();
        engine.restore(before);
        let second = engine
            .try_place(&item(item_names::MODEM), 1, 1, Rotation::Deg0)
            .unwrap();
        assert_ne!(first.id, second.id);

        engine.reset_plan(FloorPlan::open(10));
        assert!(engine.placements().is_empty());
        assert_eq!(engine.occupancy().occupied_count(), 0);
        let third = engine
            .try_place(&item(item_names::MODEM), 1, 1, Rotation::Deg0)
            .unwrap();
        assert!(third.id > second.id);
    }

    #[test]
    fn test_out_of_range_items_do_not_panic() {
        let mut engine = open_engine(8);
        let rack = Item::new("Rack", i32::MAX as u32, 1, Rgb::new(0.3, 0.2, 0.7));
        let report = engine.place_batch(&Catalog::new(vec![rack]), &[BatchRequest::new("Rack", 1)]);
        assert_eq!(report.total_shortfall(), 1);

        // A padding past i32::MAX saturates instead of wrapping negative.
        let cabinet = Item::new("Cabinet", 1, 1, Rgb::new(0.7, 0.2, 0.3))
            .with_clearance(Clearance::new(u32::MAX, 0, 0));
        engine.try_place(&cabinet, 0, 0, Rotation::Deg0).unwrap();
        let err = engine.validate(&cabinet, 7, 7, Rotation::Deg0).unwrap_err();
        assert_eq!(err.reason.check(), Check::Clearance);
    }

    #[test]
    fn test_custom_item_without_clearance_rule() {
        let mut engine = open_engine(10);
        let crate_item = Item::new("Crate", 1, 1, Rgb::new(0.3, 0.3, 0.9));
        engine.try_place(&crate_item, 0, 0, Rotation::Deg0).unwrap();
        // Default padding 2.
        assert!(engine.validate(&crate_item, 2, 0, Rotation::Deg0).is_err());
        assert!(engine.validate(&crate_item, 3, 0, Rotation::Deg0).is_ok());
    }
}
