//! Equipment catalog: item templates, rotation and clearance rules.
//!
//! An [`Item`] is a template, not an instance. It keeps its original
//! footprint and derives the effective one from its current rotation, so
//! rotating four times always returns to the starting shape.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::Rgb;
use crate::constants::{item_names, palette, MAX_CLEARANCE, MAX_FOOTPRINT, PALETTE_TOLERANCE};
use crate::error::{PlanError, Result};

/// Quarter-turn rotation, serialized as degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub const ALL: [Rotation; 4] = [Self::Deg0, Self::Deg90, Self::Deg180, Self::Deg270];

    /// Normalizes any multiple of 90; other angles are rejected.
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        match degrees.rem_euclid(360) {
            0 => Some(Self::Deg0),
            90 => Some(Self::Deg90),
            180 => Some(Self::Deg180),
            270 => Some(Self::Deg270),
            _ => None,
        }
    }

    pub fn degrees(self) -> u16 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    /// Next clockwise quarter turn.
    pub fn next(self) -> Self {
        match self {
            Self::Deg0 => Self::Deg90,
            Self::Deg90 => Self::Deg180,
            Self::Deg180 => Self::Deg270,
            Self::Deg270 => Self::Deg0,
        }
    }

    /// True for 90 and 270, where width and height swap.
    pub fn swaps_axes(self) -> bool {
        matches!(self, Self::Deg90 | Self::Deg270)
    }
}

impl TryFrom<u16> for Rotation {
    type Error = String;

    fn try_from(value: u16) -> std::result::Result<Self, Self::Error> {
        Self::from_degrees(value as i32).ok_or_else(|| format!("rotation {value} is not a quarter turn"))
    }
}

impl From<Rotation> for u16 {
    fn from(r: Rotation) -> u16 {
        r.degrees()
    }
}

/// Width × height in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Footprint {
    pub width: u32,
    pub height: u32,
}

impl Footprint {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn rotated(self, rotation: Rotation) -> Self {
        if rotation.swaps_axes() {
            Self::new(self.height, self.width)
        } else {
            self
        }
    }
}

/// Free space an item wants around itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clearance {
    pub front: u32,
    pub sides: u32,
    pub back: u32,
}

impl Default for Clearance {
    fn default() -> Self {
        Self {
            front: 2,
            sides: 2,
            back: 0,
        }
    }
}

impl Clearance {
    pub const fn new(front: u32, sides: u32, back: u32) -> Self {
        Self { front, sides, back }
    }

    /// Uniform padding applied on every side of the candidate rect.
    pub fn padding(&self) -> u32 {
        self.front.max(self.sides).max(self.back)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    /// Footprint at rotation 0.
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub rotation: Rotation,
    pub color: Rgb,
    /// Other items may rest on top of this one.
    #[serde(default)]
    pub support: bool,
    /// Must rest fully on a support, centered horizontally.
    #[serde(default)]
    pub only_on_support: bool,
    #[serde(default = "default_rotatable")]
    pub rotatable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clearance: Option<Clearance>,
}

fn default_rotatable() -> bool {
    true
}

impl Item {
    pub fn new(name: &str, width: u32, height: u32, color: Rgb) -> Self {
        Self {
            name: name.to_string(),
            width,
            height,
            rotation: Rotation::Deg0,
            color,
            support: false,
            only_on_support: false,
            rotatable: true,
            clearance: None,
        }
    }

    pub fn with_support(mut self) -> Self {
        self.support = true;
        self
    }

    pub fn with_only_on_support(mut self) -> Self {
        self.only_on_support = true;
        self
    }

    pub fn with_clearance(mut self, clearance: Clearance) -> Self {
        self.clearance = Some(clearance);
        self
    }

    pub fn original_footprint(&self) -> Footprint {
        Footprint::new(self.width, self.height)
    }

    /// Footprint at the current rotation.
    pub fn footprint(&self) -> Footprint {
        self.original_footprint().rotated(self.rotation)
    }

    /// Footprint at an explicit rotation.
    pub fn footprint_at(&self, rotation: Rotation) -> Footprint {
        self.original_footprint().rotated(rotation)
    }

    /// Advance a quarter turn. Fixed items keep rotation 0.
    pub fn rotate(&mut self) {
        if self.rotatable {
            self.rotation = self.rotation.next();
        }
    }

    pub fn clearance(&self) -> Clearance {
        self.clearance.unwrap_or_default()
    }
}

/// Catalog validation error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("catalog has no items")]
    Empty,
    #[error("item with an empty name")]
    EmptyName,
    #[error("duplicate item name '{0}'")]
    DuplicateName(String),
    #[error("item '{0}' has a zero-sized footprint")]
    ZeroFootprint(String),
    #[error("item '{0}' cannot be both a support and support-only")]
    ConflictingFlags(String),
    #[error("item '{0}' uses a reserved plan color")]
    ReservedColor(String),
    #[error("items '{0}' and '{1}' have indistinguishable colors")]
    AmbiguousColor(String, String),
    #[error("item '{name}' footprint {width}x{height} exceeds {max} cells per side", max = MAX_FOOTPRINT)]
    OversizedFootprint { name: String, width: u32, height: u32 },
    #[error("item '{name}' clearance {padding} exceeds {max} cells", max = MAX_CLEARANCE)]
    ExcessiveClearance { name: String, padding: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    items: Vec<Item>,
}

impl Catalog {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    /// The ten stock items of the network-equipment editor.
    pub fn standard() -> Self {
        use item_names::*;
        Self::new(vec![
            Item::new(SERVER, 3, 3, Rgb::new(0.95, 0.5, 0.1)).with_clearance(Clearance::new(3, 2, 2)),
            Item::new(SWITCH, 1, 1, Rgb::new(0.3, 0.8, 1.0)),
            Item::new(ROUTER, 1, 1, Rgb::new(0.2, 1.0, 0.7)),
            Item::new(ACCESS_POINT, 1, 1, Rgb::new(1.0, 0.85, 0.1)),
            Item::new(FIREWALL, 2, 1, Rgb::new(0.8, 0.3, 1.0)),
            Item::new(NAS, 2, 2, Rgb::new(0.1, 0.95, 0.9)),
            Item::new(MODEM, 1, 1, Rgb::new(1.0, 0.6, 0.8)),
            Item::new(DESK, 5, 3, Rgb::new(0.6, 0.4, 0.2)).with_support(),
            Item::new(PC, 3, 2, Rgb::new(0.8, 0.8, 1.0))
                .with_only_on_support()
                .with_clearance(Clearance::new(1, 1, 0)),
            Item::new(PRINTER, 2, 3, Rgb::new(0.4, 0.4, 0.8)),
        ])
    }

    /// Parse and validate a JSON item list.
    pub fn from_json(text: &str) -> Result<Self> {
        let catalog: Self = serde_json::from_str(text)?;
        let errors = catalog.validate();
        if errors.is_empty() {
            Ok(catalog)
        } else {
            Err(PlanError::InvalidCatalog(errors))
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn get(&self, name: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.name == name)
    }

    /// First item whose color matches within `tolerance`.
    pub fn find_by_color(&self, color: Rgb, tolerance: f32) -> Option<&Item> {
        self.items.iter().find(|i| i.color.approx_eq(color, tolerance))
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Validate the catalog, returning all errors found.
    pub fn validate(&self) -> Vec<CatalogError> {
        let mut errors = Vec::new();
        if self.items.is_empty() {
            errors.push(CatalogError::Empty);
        }
        for (i, item) in self.items.iter().enumerate() {
            if item.name.trim().is_empty() {
                errors.push(CatalogError::EmptyName);
            }
            if self.items[..i].iter().any(|o| o.name == item.name) {
                errors.push(CatalogError::DuplicateName(item.name.clone()));
            }
            if item.width == 0 || item.height == 0 {
                errors.push(CatalogError::ZeroFootprint(item.name.clone()));
            }
            if item.width > MAX_FOOTPRINT || item.height > MAX_FOOTPRINT {
                errors.push(CatalogError::OversizedFootprint {
                    name: item.name.clone(),
                    width: item.width,
                    height: item.height,
                });
            }
            let padding = item.clearance().padding();
            if padding > MAX_CLEARANCE {
                errors.push(CatalogError::ExcessiveClearance {
                    name: item.name.clone(),
                    padding,
                });
            }
            if item.support && item.only_on_support {
                errors.push(CatalogError::ConflictingFlags(item.name.clone()));
            }
            if palette::RESERVED
                .iter()
                .any(|c| c.approx_eq(item.color, PALETTE_TOLERANCE))
            {
                errors.push(CatalogError::ReservedColor(item.name.clone()));
            }
            if let Some(other) = self.items[..i]
                .iter()
                .find(|o| o.color.approx_eq(item.color, PALETTE_TOLERANCE))
            {
                errors.push(CatalogError::AmbiguousColor(
                    other.name.clone(),
                    item.name.clone(),
                ));
            }
        }
        errors
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}
