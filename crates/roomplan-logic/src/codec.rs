//! Grid codec: raster ↔ typed grid ↔ text matrix.
//!
//! All functions here are pure; reading and writing files is done by
//! [`crate::files`].
//!
//! Resampling is nearest-pixel: logical cell `(x, y)` reads raster pixel
//! `(⌊x·W/N⌋, H − 1 − ⌊y·H/N⌋)`. Because rasters are stored bottom-up this
//! puts logical row 0 at the top of the picture.

use crate::color::Rgb;
use crate::config::PlannerConfig;
use crate::constants::{palette, PALETTE_TOLERANCE, ROOM_TOLERANCE};
use crate::error::PlanError;
use crate::grid::{CellKind, Grid};
use crate::raster::Raster;

/// Color → cell kind rules.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    entries: Vec<(Rgb, CellKind)>,
    tolerance: f32,
    room_tolerance: f32,
}

impl Default for Palette {
    fn default() -> Self {
        Self::with_tolerances(PALETTE_TOLERANCE, ROOM_TOLERANCE)
    }
}

impl Palette {
    pub fn with_tolerances(tolerance: f32, room_tolerance: f32) -> Self {
        Self {
            entries: vec![
                (palette::EMPTY, CellKind::Empty),
                (palette::WALL, CellKind::Wall),
                (palette::DOOR, CellKind::Door),
                (palette::WINDOW, CellKind::Window),
                (palette::FLOOR, CellKind::Floor),
            ],
            tolerance,
            room_tolerance,
        }
    }

    pub fn from_config(config: &PlannerConfig) -> Self {
        Self::with_tolerances(config.palette_tolerance, config.room_tolerance)
    }

    /// Near mid-gray within the room tolerance.
    pub fn is_room_color(&self, color: Rgb) -> bool {
        color.approx_eq(palette::FLOOR, self.room_tolerance)
    }

    /// Exact palette match first, then the room-gray fallback; anything
    /// else is reserved and decodes as a wall.
    pub fn classify(&self, color: Rgb) -> CellKind {
        if let Some((_, kind)) = self
            .entries
            .iter()
            .find(|(c, _)| color.approx_eq(*c, self.tolerance))
        {
            return *kind;
        }
        if self.is_room_color(color) {
            CellKind::Floor
        } else {
            CellKind::Wall
        }
    }
}

/// Sample the raster color under logical cell `(x, y)` of an `n × n` grid.
pub fn sample(raster: &Raster, n: usize, x: usize, y: usize) -> Option<Rgb> {
    if n == 0 {
        return None;
    }
    let (w, h) = (raster.width(), raster.height());
    let px = (x * w / n) as i64;
    let py = (y * h / n) as i64;
    raster.pixel_clamped(px, h as i64 - 1 - py)
}

/// Decode a raster into an `n × n` typed grid. Never fails: an empty raster
/// yields an all-empty grid.
pub fn decode(raster: &Raster, n: usize, palette: &Palette) -> Grid<CellKind> {
    let grid = Grid::from_fn(n, n, |c| {
        sample(raster, n, c.x, c.y)
            .map(|color| palette.classify(color))
            .unwrap_or(CellKind::Empty)
    });
    log::debug!(
        "Decoded {}x{} raster into {}x{} grid",
        raster.width(),
        raster.height(),
        n,
        n
    );
    grid
}

/// Resample a raster into an `n × n` grid of raw colors (no palette).
pub fn resample_colors(raster: &Raster, n: usize, background: Rgb) -> Grid<Rgb> {
    Grid::from_fn(n, n, |c| sample(raster, n, c.x, c.y).unwrap_or(background))
}

/// Inverse of [`decode`]: one pixel per cell, representative colors.
pub fn encode_raster(grid: &Grid<CellKind>) -> Raster {
    encode_colors(&grid.map(|_, kind| kind.color()))
}

/// One pixel per cell, flipped into bottom-up rows.
pub fn encode_colors(grid: &Grid<Rgb>) -> Raster {
    let h = grid.height();
    let mut raster = Raster::filled(grid.width(), h, palette::EMPTY);
    for (cell, color) in grid.iter() {
        raster.set_pixel(cell.x, h - 1 - cell.y, *color);
    }
    raster
}

/// Row-major, space separated, one row per line.
pub fn encode_matrix<T>(grid: &Grid<T>, mut f: impl FnMut(&T) -> String) -> String {
    let mut out = String::new();
    for y in 0..grid.height() {
        let line = grid
            .row(y)
            .iter()
            .map(&mut f)
            .collect::<Vec<_>>()
            .join(" ");
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Text grid file contents (codes 0–4).
pub fn encode_text(grid: &Grid<CellKind>) -> String {
    encode_matrix(grid, |k| k.code().to_string())
}

/// Why a token of a text matrix was replaced by the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// Token is not an integer.
    NotNumeric,
    /// Integer outside the accepted code range.
    UnknownCode,
    /// Row has fewer tokens than the first row; the missing cell defaults.
    ShortRow,
    /// Row has more tokens than the first row; the extra token is dropped.
    LongRow,
}

/// A non-fatal problem found while parsing a text matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixWarning {
    pub row: usize,
    pub column: usize,
    pub kind: WarningKind,
    pub token: String,
}

/// Parse a whitespace-separated integer matrix.
///
/// The first non-blank line fixes the width. Malformed cells become `None`
/// and are reported; only a matrix with no rows at all is an error.
pub fn parse_matrix(text: &str) -> Result<(Grid<Option<i64>>, Vec<MatrixWarning>), PlanError> {
    let rows: Vec<Vec<&str>> = text
        .lines()
        .map(|l| l.split_whitespace().collect::<Vec<_>>())
        .filter(|tokens| !tokens.is_empty())
        .collect();
    let Some(first) = rows.first() else {
        return Err(PlanError::EmptyInput("text grid has no rows".into()));
    };
    let width = first.len();
    let mut warnings = Vec::new();
    let mut grid = Grid::new(width, rows.len(), None);

    for (y, tokens) in rows.iter().enumerate() {
        for x in 0..width {
            let Some(token) = tokens.get(x) else {
                warnings.push(MatrixWarning {
                    row: y,
                    column: x,
                    kind: WarningKind::ShortRow,
                    token: String::new(),
                });
                continue;
            };
            match token.parse::<i64>() {
                Ok(v) => {
                    grid.set(crate::grid::Cell::new(x, y), Some(v));
                }
                Err(_) => warnings.push(MatrixWarning {
                    row: y,
                    column: x,
                    kind: WarningKind::NotNumeric,
                    token: (*token).to_string(),
                }),
            }
        }
        for (x, token) in tokens.iter().enumerate().skip(width) {
            warnings.push(MatrixWarning {
                row: y,
                column: x,
                kind: WarningKind::LongRow,
                token: (*token).to_string(),
            });
        }
    }

    for w in &warnings {
        log::warn!(
            "Invalid value at ({}, {}): {:?} {:?}",
            w.column, w.row, w.token, w.kind
        );
    }
    Ok((grid, warnings))
}

/// A typed grid read back from the text encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct TextGrid {
    pub cells: Grid<CellKind>,
    pub warnings: Vec<MatrixWarning>,
}

/// Parse the text grid file. Bad cells default to [`CellKind::Empty`].
pub fn decode_text(text: &str) -> Result<TextGrid, PlanError> {
    let (raw, mut warnings) = parse_matrix(text)?;
    let cells = raw.map(|cell, v| match v {
        Some(v) => match u8::try_from(*v).ok().and_then(CellKind::from_code) {
            Some(kind) => kind,
            None => {
                log::warn!("Invalid value at ({}, {}): {}", cell.x, cell.y, v);
                warnings.push(MatrixWarning {
                    row: cell.y,
                    column: cell.x,
                    kind: WarningKind::UnknownCode,
                    token: v.to_string(),
                });
                CellKind::Empty
            }
        },
        None => CellKind::Empty,
    });
    Ok(TextGrid { cells, warnings })
}

/// Building pieces the 3D collaborator instantiates for a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructurePiece {
    Wall,
    Floor,
    Door,
    Window,
}

/// Pieces for a text grid code; `None` for codes outside 0–4.
pub fn structure(code: u8) -> Option<&'static [StructurePiece]> {
    use StructurePiece::*;
    match CellKind::from_code(code)? {
        CellKind::Empty => Some(&[]),
        CellKind::Wall => Some(&[Wall, Floor]),
        CellKind::Door => Some(&[Wall, Door, Floor]),
        CellKind::Window => Some(&[Wall, Window, Floor]),
        _ => Some(&[Floor]),
    }
}
