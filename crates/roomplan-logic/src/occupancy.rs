//! Occupancy model: which placement owns which cell.
//!
//! Each cell has two layers. The floor layer holds at most one placement
//! standing on the plan; the top layer holds at most one support-only
//! placement resting on a support below it. A cell is occupied when either
//! layer is set.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::Rotation;
use crate::grid::{Cell, Grid, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlacementId(pub u32);

impl fmt::Display for PlacementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A committed item instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub id: PlacementId,
    pub item: String,
    pub x: i32,
    pub y: i32,
    /// Effective size after rotation.
    pub width: u32,
    pub height: u32,
    pub rotation: Rotation,
    pub support: bool,
    pub only_on_support: bool,
}

impl Placement {
    pub fn rect(&self) -> Rect {
        Rect::sized(self.x, self.y, self.width, self.height)
    }

    pub fn claim(&self) -> Claim {
        if self.only_on_support {
            Claim::OnSupport
        } else {
            Claim::Floor
        }
    }
}

/// How a footprint wants to use its cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Claim {
    /// Stand on the plan; every cell must be unoccupied.
    Floor,
    /// Rest on a support; cells may be held by a support with nothing on top.
    OnSupport,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
struct Slot {
    floor: Option<PlacementId>,
    floor_is_support: bool,
    top: Option<PlacementId>,
}

impl Slot {
    fn is_free_for(&self, claim: Claim) -> bool {
        match claim {
            Claim::Floor => self.floor.is_none() && self.top.is_none(),
            Claim::OnSupport => {
                self.floor.is_none() || (self.floor_is_support && self.top.is_none())
            }
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OccupancyError {
    #[error("placement {id} at {rect:?} leaves the grid")]
    OutOfBounds { id: PlacementId, rect: Rect },
    #[error("placement {id} conflicts with an occupied cell at ({}, {})", .cell.x, .cell.y)]
    Conflict { id: PlacementId, cell: Cell },
    #[error("placement {0} is already committed")]
    DuplicateId(PlacementId),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupancyGrid {
    slots: Grid<Slot>,
    footprints: BTreeMap<PlacementId, Rect>,
}

impl OccupancyGrid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            slots: Grid::new(width, height, Slot::default()),
            footprints: BTreeMap::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.slots.width()
    }

    pub fn height(&self) -> usize {
        self.slots.height()
    }

    /// True iff the rect is inside the grid and every cell accepts `claim`.
    pub fn is_free(&self, rect: &Rect, claim: Claim) -> bool {
        self.first_conflict(rect, claim).is_none() && rect.within(self.width(), self.height())
    }

    /// First in-bounds cell of `rect` (row-major) that refuses `claim`.
    pub fn first_conflict(&self, rect: &Rect, claim: Claim) -> Option<Cell> {
        rect.cells()
            .find(|&c| self.slots.get(c).is_some_and(|s| !s.is_free_for(claim)))
    }

    pub fn is_occupied(&self, cell: Cell) -> bool {
        self.slots
            .get(cell)
            .is_some_and(|s| s.floor.is_some() || s.top.is_some())
    }

    /// Topmost placement at `cell`.
    pub fn owner_at(&self, cell: Cell) -> Option<PlacementId> {
        self.slots.get(cell).and_then(|s| s.top.or(s.floor))
    }

    /// Support placement under `cell`, if any.
    pub fn support_at(&self, cell: Cell) -> Option<PlacementId> {
        self.slots
            .get(cell)
            .filter(|s| s.floor_is_support)
            .and_then(|s| s.floor)
    }

    pub fn occupied_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|(_, s)| s.floor.is_some() || s.top.is_some())
            .count()
    }

    pub fn contains(&self, id: PlacementId) -> bool {
        self.footprints.contains_key(&id)
    }

    /// Claim every cell of the placement. On failure nothing changes.
    pub fn commit(&mut self, placement: &Placement) -> Result<(), OccupancyError> {
        let id = placement.id;
        let rect = placement.rect();
        let claim = placement.claim();
        if self.footprints.contains_key(&id) {
            return Err(OccupancyError::DuplicateId(id));
        }
        if !rect.within(self.width(), self.height()) {
            return Err(OccupancyError::OutOfBounds { id, rect });
        }
        if let Some(cell) = self.first_conflict(&rect, claim) {
            return Err(OccupancyError::Conflict { id, cell });
        }

        for cell in rect.cells() {
            if let Some(slot) = self.slots.get_mut(cell) {
                if claim == Claim::OnSupport && slot.floor.is_some() {
                    slot.top = Some(id);
                } else {
                    slot.floor = Some(id);
                    slot.floor_is_support = placement.support;
                }
            }
        }
        self.footprints.insert(id, rect);
        self.debug_check();
        Ok(())
    }

    /// Free exactly the cells owned by `id`. Returns false if unknown.
    pub fn release(&mut self, id: PlacementId) -> bool {
        let Some(rect) = self.footprints.remove(&id) else {
            return false;
        };
        for cell in rect.cells() {
            if let Some(slot) = self.slots.get_mut(cell) {
                if slot.top == Some(id) {
                    slot.top = None;
                }
                if slot.floor == Some(id) {
                    // Anything resting here drops to the floor layer.
                    slot.floor = slot.top.take();
                    slot.floor_is_support = false;
                }
            }
        }
        self.debug_check();
        true
    }

    pub fn clear(&mut self) {
        *self = Self::new(self.width(), self.height());
    }

    pub fn snapshot(&self) -> OccupancyGrid {
        self.clone()
    }

    pub fn restore(&mut self, snapshot: OccupancyGrid) {
        *self = snapshot;
    }

    /// Every committed footprint owns exactly its cells.
    fn debug_check(&self) {
        if cfg!(debug_assertions) {
            let mut owned: BTreeMap<PlacementId, usize> = BTreeMap::new();
            for (_, slot) in self.slots.iter() {
                debug_assert!(
                    slot.top.is_none() || slot.floor.is_some(),
                    "stacked placement without a floor owner"
                );
                for id in [slot.floor, slot.top].into_iter().flatten() {
                    *owned.entry(id).or_default() += 1;
                }
            }
            for (id, rect) in &self.footprints {
                debug_assert_eq!(
                    owned.get(id).copied().unwrap_or(0),
                    rect.area() as usize,
                    "placement {id} owns the wrong number of cells"
                );
            }
            debug_assert_eq!(owned.len(), self.footprints.len());
        }
    }
}
