//! Integration tests for the full plan pipeline.
//!
//! Exercises: Canvas → Raster → decode → segment/classify → PlacementEngine
//! → scheme → spawn plan, plus the editor session on top.
//!
//! All tests are pure logic, no files and no rendering.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use roomplan_logic::canvas::{Brush, Canvas};
use roomplan_logic::catalog::{Catalog, Rotation};
use roomplan_logic::classify::{FloorAnalysis, RegionKind};
use roomplan_logic::codec::{decode, decode_text, encode_raster, encode_text, Palette};
use roomplan_logic::config::PlannerConfig;
use roomplan_logic::constants::{item_names, palette};
use roomplan_logic::grid::{Cell, CellKind, Grid};
use roomplan_logic::occupancy::Placement;
use roomplan_logic::placement::{BatchRequest, Check, FloorPlan, PlacementEngine, RejectReason};
use roomplan_logic::scheme::{extract_spawns, spawns_from_placements, SpawnRequest};
use roomplan_logic::session::EditorSession;

// ── Helpers ────────────────────────────────────────────────────────────

/// 6×6 walled room with a 4×4 floor and one door in the top wall.
const SCENARIO_A: &str = "\
1 1 2 1 1 1
1 4 4 4 4 1
1 4 4 4 4 1
1 4 4 4 4 1
1 4 4 4 4 1
1 1 1 1 1 1
";

/// The same room with four windows, each touching the floor once.
const SCENARIO_B: &str = "\
1 1 2 1 1 1
1 4 4 4 4 1
3 4 4 4 4 3
3 4 4 4 4 1
1 4 4 4 4 1
1 1 3 1 1 1
";

fn grid(text: &str) -> Grid<CellKind> {
    let parsed = decode_text(text).unwrap();
    assert!(parsed.warnings.is_empty());
    parsed.cells
}

fn item(name: &str) -> roomplan_logic::catalog::Item {
    Catalog::standard().get(name).unwrap().clone()
}

/// Two rooms joined by a doorway into a corridor, painted on a canvas.
fn painted_plan(size: usize) -> Canvas {
    let mut canvas = Canvas::new(size);
    let last = size - 2;
    let mid = size / 2;
    let corner = |x, y| Cell::new(x, y);
    // Outer walls.
    canvas.draw_line(corner(1, 1), corner(last, 1), Brush::Wall);
    canvas.draw_line(corner(last, 1), corner(last, last), Brush::Wall);
    canvas.draw_line(corner(last, last), corner(1, last), Brush::Wall);
    canvas.draw_line(corner(1, last), corner(1, 1), Brush::Wall);
    // Corridor wall across the middle, with two doors.
    canvas.draw_line(corner(1, mid), corner(last, mid), Brush::Wall);
    canvas.draw_line(corner(1, mid + 3), corner(last, mid + 3), Brush::Wall);
    canvas.apply_stroke(&[corner(4, mid), corner(last - 4, mid + 3)], palette::DOOR);
    // Windows on the outside of the big room.
    canvas.apply_stroke(&[corner(1, 4), corner(last, 4)], palette::WINDOW);

    canvas.fill(corner(3, 3), palette::FLOOR);
    canvas.fill(corner(3, mid + 1), palette::FLOOR);
    canvas.fill(corner(3, mid + 5), palette::FLOOR);
    canvas
}

fn stacked_on_support(top: &Placement, bottom: &Placement) -> bool {
    top.only_on_support && bottom.support && bottom.rect().contains_rect(&top.rect())
}

fn assert_no_overlap(placements: &[Placement]) {
    for (i, a) in placements.iter().enumerate() {
        for b in &placements[i + 1..] {
            if a.rect().intersects(&b.rect()) {
                assert!(
                    stacked_on_support(a, b) || stacked_on_support(b, a),
                    "{} {} overlaps {} {}",
                    a.item,
                    a.id,
                    b.item,
                    b.id
                );
            }
        }
    }
}

fn sorted(mut spawns: Vec<SpawnRequest>) -> Vec<SpawnRequest> {
    spawns.sort_by_key(|s| (s.rect.y, s.rect.x, s.item.clone()));
    spawns
}

// ── Classification scenarios ──────────────────────────────────────────

#[test]
fn single_door_room_is_corridor() {
    let analysis = FloorAnalysis::analyze(&grid(SCENARIO_A));
    assert_eq!(analysis.regions.len(), 1);
    let r = &analysis.regions[0];
    assert_eq!((r.region.doors, r.region.windows), (1, 0));
    assert_eq!(r.region.area(), 16);
    assert_eq!(r.kind, RegionKind::Corridor);
    assert_eq!(analysis.mask.len(), 16);
}

#[test]
fn windowed_room_is_room() {
    let analysis = FloorAnalysis::analyze(&grid(SCENARIO_B));
    let r = &analysis.regions[0];
    assert_eq!((r.region.doors, r.region.windows), (1, 4));
    assert_eq!(r.kind, RegionKind::Room);
    assert!(analysis.mask.is_empty());
}

#[test]
fn painted_plan_segments_into_three_regions() {
    let canvas = painted_plan(24);
    let grid = canvas.to_kinds(&Palette::default());
    let analysis = FloorAnalysis::analyze(&grid);
    assert_eq!(analysis.regions.len(), 3);
    // The middle strip has two doors and no windows.
    let corridor = analysis.region_at(Cell::new(3, 13)).unwrap();
    assert_eq!(corridor.kind, RegionKind::Corridor);
    assert_eq!(corridor.region.doors, 2);
    // The top room has a door and two windows: 1 / 3.01 < 0.6.
    let top = analysis.region_at(Cell::new(3, 3)).unwrap();
    assert_eq!(top.kind, RegionKind::Room);
    assert_eq!(analysis.corridor_count(), 2);
}

#[test]
fn text_and_raster_round_trips() {
    let grid = painted_plan(20).to_kinds(&Palette::default());
    assert_eq!(decode_text(&encode_text(&grid)).unwrap().cells, grid);
    assert_eq!(decode(&encode_raster(&grid), 20, &Palette::default()), grid);
}

// ── Placement scenarios ───────────────────────────────────────────────

#[test]
fn server_clearance_touching_existing_rect_is_rejected() {
    let mut engine = PlacementEngine::new(FloorPlan::open(20));
    engine
        .try_place(&item(item_names::ROUTER), 10, 5, Rotation::Deg0)
        .unwrap();
    let err = engine
        .validate(&item(item_names::SERVER), 5, 4, Rotation::Deg0)
        .unwrap_err();
    assert_eq!(err.reason.check(), Check::Clearance);
}

#[test]
fn off_center_pc_is_rejected() {
    let mut engine = PlacementEngine::new(FloorPlan::open(20));
    let desk = engine
        .try_place(&item(item_names::DESK), 10, 10, Rotation::Deg0)
        .unwrap();
    let err = engine
        .validate(&item(item_names::PC), 12, 10, Rotation::Deg0)
        .unwrap_err();
    assert_eq!(
        err.reason,
        RejectReason::OffCenter {
            support: desk.id,
            offset: 1
        }
    );
}

#[test]
fn batch_reports_shortfall() {
    let strip = grid("1 1 1 1 1 1 1 1\n1 4 4 4 4 4 4 1\n1 1 1 1 1 1 1 1\n");
    let mut engine = PlacementEngine::new(FloorPlan::analyze(strip));
    let report = engine.place_batch(
        &Catalog::standard(),
        &[BatchRequest::new(item_names::ROUTER, 3)],
    );
    let outcome = report.outcome(item_names::ROUTER).unwrap();
    assert_eq!(outcome.placed.len(), 2);
    assert_eq!(outcome.shortfall(), 1);
}

#[test]
fn corridor_cells_never_hold_equipment() {
    let grid = painted_plan(24).to_kinds(&Palette::default());
    let plan = FloorPlan::analyze(grid);
    let mask = plan.mask.clone();
    let mut engine = PlacementEngine::new(plan);
    let requests: Vec<_> = Catalog::standard()
        .items()
        .iter()
        .map(|i| BatchRequest::new(&i.name, 2))
        .collect();
    engine.place_batch(&Catalog::standard(), &requests);
    assert!(!engine.placements().is_empty());
    for p in engine.placements() {
        assert!(!mask.intersects(&p.rect()), "{} on a corridor", p.item);
    }
    assert_no_overlap(engine.placements());
}

#[test]
fn random_placements_never_overlap() {
    let catalog = Catalog::standard();
    for seed in 0..8u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut engine = PlacementEngine::new(FloorPlan::open(32));
        for _ in 0..300 {
            let item = &catalog.items()[rng.gen_range(0..catalog.len())];
            let rotation = Rotation::ALL[rng.gen_range(0..4)];
            let (x, y) = (rng.gen_range(-2..32), rng.gen_range(-2..32));
            let before = engine.snapshot();
            if engine.try_place(item, x, y, rotation).is_err() {
                assert_eq!(engine.snapshot(), before, "rejection changed state");
            }
        }
        assert_no_overlap(engine.placements());
        let covered: usize = engine
            .placements()
            .iter()
            .filter(|p| !p.only_on_support)
            .map(|p| p.rect().area() as usize)
            .sum();
        assert_eq!(engine.occupancy().occupied_count(), covered);
    }
}

// ── Scheme and session ────────────────────────────────────────────────

#[test]
fn scheme_round_trips_to_spawn_plan() {
    let mut session = EditorSession::new(
        PlannerConfig {
            grid_size: 24,
            ..PlannerConfig::default()
        },
        Catalog::standard(),
    )
    .unwrap();
    session.load_raster(&painted_plan(24).to_raster());
    session.set_count(item_names::DESK, 1).unwrap();
    session.set_count(item_names::PC, 1).unwrap();
    session.set_count(item_names::SERVER, 1).unwrap();
    let report = session.apply_optimize();
    assert!(report.is_complete(), "{report:?}");

    let extracted = extract_spawns(&session.render_scheme(), session.catalog());
    assert_eq!(sorted(extracted), sorted(spawns_from_placements(session.placements())));
}

#[test]
fn undo_after_one_placement_restores_state() {
    let mut session = EditorSession::new(
        PlannerConfig {
            grid_size: 16,
            ..PlannerConfig::default()
        },
        Catalog::standard(),
    )
    .unwrap();
    session.load_grid(Grid::square(16, CellKind::Floor));
    let before = session.engine().snapshot();
    session.select(item_names::PRINTER).unwrap();
    session.click(Cell::new(4, 4)).unwrap();
    assert_eq!(session.engine().occupancy().occupied_count(), 6);
    assert!(session.undo());
    assert_eq!(session.engine().snapshot(), before);
    assert_eq!(session.engine().occupancy().occupied_count(), 0);
}
