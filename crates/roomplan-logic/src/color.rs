//! RGB color samples on a [0, 1] channel scale.

use serde::{Deserialize, Serialize};

/// A single raster sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Convert 8-bit channels to the [0, 1] scale.
    pub fn from_bytes([r, g, b]: [u8; 3]) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// Convert to 8-bit channels, clamping out-of-range values.
    pub fn to_bytes(self) -> [u8; 3] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b)]
    }

    /// Component-wise match: every channel differs by strictly less than `tolerance`.
    pub fn approx_eq(self, other: Rgb, tolerance: f32) -> bool {
        (self.r - other.r).abs() < tolerance
            && (self.g - other.g).abs() < tolerance
            && (self.b - other.b).abs() < tolerance
    }

    /// `#RRGGBB`, channels truncated rather than rounded.
    pub fn to_hex(self) -> String {
        let t = |c: f32| (c.clamp(0.0, 1.0) * 255.0) as u8;
        format!("#{:02X}{:02X}{:02X}", t(self.r), t(self.g), t(self.b))
    }
}
