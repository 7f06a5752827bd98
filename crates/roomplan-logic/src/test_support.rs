//! Fixtures shared by unit tests.

use crate::grid::{CellKind, Grid};

/// Build a grid from rows of chars: `#` wall, `.` floor, `D` door,
/// `W` window, anything else empty.
pub(crate) fn grid_from(rows: &[&str]) -> Grid<CellKind> {
    let h = rows.len();
    let w = rows[0].len();
    Grid::from_fn(w, h, |c| match rows[c.y].as_bytes()[c.x] {
        b'#' => CellKind::Wall,
        b'.' => CellKind::Floor,
        b'D' => CellKind::Door,
        b'W' => CellKind::Window,
        _ => CellKind::Empty,
    })
}
