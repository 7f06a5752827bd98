//! Plan constants: tolerances, text cell codes, palette colors and item names.
//!
//! These are plain constants with no engine dependency. Both the library
//! and the headless harness use them.

/// Default grid resolution (cells per side).
pub const DEFAULT_GRID_SIZE: usize = 64;

/// Per-channel tolerance when matching a sample against a palette color.
pub const PALETTE_TOLERANCE: f32 = 0.05;

/// Per-channel tolerance around mid-gray for the room-like predicate.
pub const ROOM_TOLERANCE: f32 = 0.1;

/// Minimum doors / (doors + windows + ε) for a region to be a corridor.
pub const CORRIDOR_DOOR_RATIO: f32 = 0.6;

/// The ε in the corridor ratio denominator.
pub const RATIO_EPSILON: f32 = 0.01;

/// Largest footprint side, in cells, a catalog item may declare.
pub const MAX_FOOTPRINT: u32 = 4096;

/// Largest clearance, in cells, a catalog item may declare.
pub const MAX_CLEARANCE: u32 = 256;

/// Integer codes written to the text grid file.
pub mod cell_codes {
    pub const EMPTY: u8 = 0;
    pub const WALL: u8 = 1;
    pub const DOOR: u8 = 2;
    pub const WINDOW: u8 = 3;
    pub const FLOOR: u8 = 4;
}

/// Plan palette. Channels on a [0, 1] scale.
pub mod palette {
    use crate::color::Rgb;

    pub const EMPTY: Rgb = Rgb::new(1.0, 1.0, 1.0);
    pub const WALL: Rgb = Rgb::new(0.0, 0.0, 0.0);
    pub const DOOR: Rgb = Rgb::new(1.0, 0.0, 0.0);
    pub const WINDOW: Rgb = Rgb::new(0.0, 1.0, 0.0);
    pub const FLOOR: Rgb = Rgb::new(0.5, 0.5, 0.5);

    /// Colors that never denote equipment on a scheme raster.
    pub const RESERVED: [Rgb; 5] = [EMPTY, WALL, DOOR, WINDOW, FLOOR];
}

/// Names of the standard catalog items.
pub mod item_names {
    pub const SERVER: &str = "Server";
    pub const SWITCH: &str = "Switch";
    pub const ROUTER: &str = "Router";
    pub const ACCESS_POINT: &str = "Access Point";
    pub const FIREWALL: &str = "Firewall";
    pub const NAS: &str = "Network Storage";
    pub const MODEM: &str = "Modem";
    pub const DESK: &str = "Desk";
    pub const PC: &str = "PC";
    pub const PRINTER: &str = "Printer";
}
