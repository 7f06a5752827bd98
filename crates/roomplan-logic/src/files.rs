//! Thin file helpers around the pure codecs.

use std::fs;
use std::path::Path;

use image::ImageFormat;

use crate::catalog::Catalog;
use crate::classify::CorridorMask;
use crate::codec::{decode_text, encode_text, MatrixWarning, TextGrid};
use crate::config::PlannerConfig;
use crate::error::Result;
use crate::grid::{CellKind, Grid};
use crate::raster::Raster;
use crate::scheme::SpawnRequest;

/// Read a plan or scheme image. Any format `image` can decode is accepted.
pub fn load_raster_png(path: impl AsRef<Path>) -> Result<Raster> {
    let image = image::open(path.as_ref())?.to_rgb8();
    log::info!(
        "Loaded {}x{} raster from {}",
        image.width(),
        image.height(),
        path.as_ref().display()
    );
    Ok(Raster::from_image(&image))
}

/// Write a lossless PNG.
pub fn save_raster_png(path: impl AsRef<Path>, raster: &Raster) -> Result<()> {
    raster
        .to_image()
        .save_with_format(path.as_ref(), ImageFormat::Png)?;
    log::info!("Saved raster to {}", path.as_ref().display());
    Ok(())
}

pub fn read_grid_file(path: impl AsRef<Path>) -> Result<TextGrid> {
    let text = fs::read_to_string(path)?;
    decode_text(&text)
}

pub fn write_grid_file(path: impl AsRef<Path>, grid: &Grid<CellKind>) -> Result<()> {
    fs::write(path.as_ref(), encode_text(grid))?;
    log::info!("Grid saved to {}", path.as_ref().display());
    Ok(())
}

pub fn write_corridor_map(path: impl AsRef<Path>, mask: &CorridorMask) -> Result<()> {
    fs::write(path.as_ref(), mask.to_text())?;
    log::info!(
        "Corridor map saved to {} ({} cells)",
        path.as_ref().display(),
        mask.len()
    );
    Ok(())
}

pub fn read_corridor_map(path: impl AsRef<Path>) -> Result<(CorridorMask, Vec<MatrixWarning>)> {
    let text = fs::read_to_string(path)?;
    CorridorMask::from_text(&text)
}

pub fn load_catalog(path: impl AsRef<Path>) -> Result<Catalog> {
    Catalog::from_json(&fs::read_to_string(path)?)
}

pub fn load_config(path: impl AsRef<Path>) -> Result<PlannerConfig> {
    PlannerConfig::from_json(&fs::read_to_string(path)?)
}

pub fn write_spawn_plan(path: impl AsRef<Path>, spawns: &[SpawnRequest]) -> Result<()> {
    fs::write(path.as_ref(), serde_json::to_string_pretty(spawns)?)?;
    Ok(())
}
