//! roomplan Headless Pipeline Harness
//!
//! Validates the plan pipeline end to end without an editor or renderer:
//! paint, decode, segment, classify, place, render the scheme, read the
//! spawn plan back and simulate equipment status.
//!
//! Usage:
//!   cargo run -p roomplan-simtest
//!   cargo run -p roomplan-simtest -- --verbose
//!   RUST_LOG=roomplan_logic=debug cargo run -p roomplan-simtest

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use roomplan_logic::canvas::{Brush, Canvas};
use roomplan_logic::catalog::{Catalog, Rotation};
use roomplan_logic::classify::{label_grid, FloorAnalysis, RegionKind};
use roomplan_logic::codec::{decode, decode_text, encode_raster, encode_text, Palette};
use roomplan_logic::config::{validate_config, PlannerConfig};
use roomplan_logic::constants::{item_names, palette};
use roomplan_logic::grid::{Cell, CellKind};
use roomplan_logic::occupancy::Placement;
use roomplan_logic::placement::{BatchRequest, Check, FloorPlan, PlacementEngine};
use roomplan_logic::raster::Raster;
use roomplan_logic::scheme::{extract_spawns, render_scheme, spawns_from_placements, SpawnRequest};
use roomplan_logic::session::EditorSession;
use roomplan_logic::status::{EquipmentStatus, StatusBoard, StatusPolicy, StatusTicker};
use tracing_subscriber::EnvFilter;

// ── Item catalog (same JSON the editor ships) ───────────────────────────
const CATALOG_JSON: &str = include_str!("../../../data/catalog.json");

const PLAN_SIZE: usize = 32;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    let default_level = if verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    println!("=== roomplan Pipeline Harness ===\n");

    let mut results = Vec::new();

    // 1. Catalog and config
    let catalog = validate_catalog(&mut results).unwrap_or_else(Catalog::standard);
    results.extend(validate_config_defaults());

    // 2. Codec round trips on a painted plan
    results.extend(validate_codec());

    // 3. Segmentation and classification
    results.extend(validate_classification());

    // 4. Placement rules
    results.extend(validate_placement_rules(&catalog));

    // 5. Randomized batch sweep
    results.extend(validate_batch_sweep(&catalog, verbose));

    // 6. Scheme and spawn plan
    results.extend(validate_scheme(&catalog));

    // 7. Editor session
    results.extend(validate_session(&catalog));

    // 8. Equipment status simulation
    results.extend(validate_status_rates(verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn check(name: &str, passed: bool, detail: impl Into<String>) -> TestResult {
    TestResult {
        name: name.into(),
        passed,
        detail: detail.into(),
    }
}

/// Two rooms around a corridor strip, painted the way a user would.
fn sample_canvas(size: usize) -> Canvas {
    let mut canvas = Canvas::new(size);
    let last = size - 2;
    let (a, b) = (size / 2 - 2, size / 2 + 2);
    let c = Cell::new;
    canvas.draw_line(c(1, 1), c(last, 1), Brush::Wall);
    canvas.draw_line(c(last, 1), c(last, last), Brush::Wall);
    canvas.draw_line(c(last, last), c(1, last), Brush::Wall);
    canvas.draw_line(c(1, last), c(1, 1), Brush::Wall);
    canvas.draw_line(c(1, a), c(last, a), Brush::Wall);
    canvas.draw_line(c(1, b), c(last, b), Brush::Wall);
    canvas.draw_line(c(5, a), c(6, a), Brush::Door);
    canvas.draw_line(c(last - 6, b), c(last - 5, b), Brush::Door);
    canvas.draw_line(c(1, 4), c(1, 6), Brush::Window);
    canvas.draw_line(c(last, last - 6), c(last, last - 4), Brush::Window);
    for start in [c(3, 3), c(3, a + 1), c(3, b + 1)] {
        canvas.fill(start, palette::FLOOR);
    }
    canvas
}

fn sample_plan() -> FloorPlan {
    FloorPlan::analyze(sample_canvas(PLAN_SIZE).to_kinds(&Palette::default()))
}

fn overlaps(placements: &[Placement]) -> usize {
    let stacked = |top: &Placement, bottom: &Placement| {
        top.only_on_support && bottom.support && bottom.rect().contains_rect(&top.rect())
    };
    let mut count = 0;
    for (i, a) in placements.iter().enumerate() {
        for b in &placements[i + 1..] {
            if a.rect().intersects(&b.rect()) && !stacked(a, b) && !stacked(b, a) {
                count += 1;
            }
        }
    }
    count
}

fn sorted(mut spawns: Vec<SpawnRequest>) -> Vec<SpawnRequest> {
    spawns.sort_by_key(|s| (s.rect.y, s.rect.x, s.item.clone()));
    spawns
}

// ── 1. Catalog & Config ─────────────────────────────────────────────────

fn validate_catalog(results: &mut Vec<TestResult>) -> Option<Catalog> {
    println!("--- Catalog ---");
    let catalog = match Catalog::from_json(CATALOG_JSON) {
        Ok(c) => c,
        Err(e) => {
            results.push(check("catalog_parse", false, format!("{}", e)));
            return None;
        }
    };

    results.push(check(
        "catalog_item_count",
        catalog.len() == 10,
        format!("{} items loaded", catalog.len()),
    ));
    results.push(check(
        "catalog_matches_builtin",
        catalog == Catalog::standard(),
        "shipped JSON equals the built-in catalog",
    ));

    let supports: Vec<_> = catalog.items().iter().filter(|i| i.support).collect();
    let dependents: Vec<_> = catalog
        .items()
        .iter()
        .filter(|i| i.only_on_support)
        .collect();
    results.push(check(
        "catalog_support_pairs",
        !supports.is_empty()
            && dependents.iter().all(|d| {
                supports
                    .iter()
                    .any(|s| s.width >= d.width && s.height >= d.height)
            }),
        format!(
            "{} supports, {} support-only items, all fit",
            supports.len(),
            dependents.len()
        ),
    ));

    let server_padding = catalog
        .get(item_names::SERVER)
        .map(|s| s.clearance().padding())
        .unwrap_or(0);
    results.push(check(
        "catalog_server_clearance",
        server_padding == 3,
        format!("server padding {}", server_padding),
    ));
    Some(catalog)
}

fn validate_config_defaults() -> Vec<TestResult> {
    let mut results = Vec::new();
    let config = PlannerConfig::default();
    let errors = validate_config(&config);
    results.push(check(
        "config_defaults_valid",
        errors.is_empty(),
        format!("{} errors", errors.len()),
    ));

    let bad = PlannerConfig {
        grid_size: 2,
        corridor_ratio: 1.5,
        ..PlannerConfig::default()
    };
    let errors = validate_config(&bad);
    results.push(check(
        "config_reports_every_error",
        errors.len() == 2,
        format!("{} errors for two bad fields", errors.len()),
    ));
    results
}

// ── 2. Codec ────────────────────────────────────────────────────────────

fn validate_codec() -> Vec<TestResult> {
    println!("--- Codec ---");
    let mut results = Vec::new();
    let palette = Palette::default();
    let raster = sample_canvas(PLAN_SIZE).to_raster();
    let grid = decode(&raster, PLAN_SIZE, &palette);

    let kinds = [
        CellKind::Empty,
        CellKind::Wall,
        CellKind::Door,
        CellKind::Window,
        CellKind::Floor,
    ];
    let missing: Vec<_> = kinds
        .iter()
        .filter(|k| !grid.iter().any(|(_, g)| g == *k))
        .collect();
    results.push(check(
        "codec_all_kinds_present",
        missing.is_empty(),
        format!("missing kinds: {:?}", missing),
    ));

    let again = decode(&encode_raster(&grid), PLAN_SIZE, &palette);
    results.push(check(
        "codec_raster_idempotent",
        again == grid,
        "decode(encode_raster(decode(r))) == decode(r)",
    ));

    match decode_text(&encode_text(&grid)) {
        Ok(text) => results.push(check(
            "codec_text_round_trip",
            text.cells == grid && text.warnings.is_empty(),
            format!("{} warnings", text.warnings.len()),
        )),
        Err(e) => results.push(check("codec_text_round_trip", false, e.to_string())),
    }

    // Resampling a larger raster keeps the plan.
    let mut big = Raster::filled(PLAN_SIZE * 2, PLAN_SIZE * 2, palette::EMPTY);
    for row in 0..PLAN_SIZE * 2 {
        for x in 0..PLAN_SIZE * 2 {
            if let Some(c) = raster.pixel(x / 2, row / 2) {
                big.set_pixel(x, row, c);
            }
        }
    }
    results.push(check(
        "codec_downsample",
        decode(&big, PLAN_SIZE, &palette) == grid,
        "2x raster decodes to the same grid",
    ));

    let noisy = decode_text("1 1 x\n4 9\n1 1 1 1\n").map(|t| t.warnings.len());
    results.push(check(
        "codec_text_warnings",
        matches!(noisy, Ok(4)),
        format!("{:?} warnings for a malformed matrix", noisy.ok()),
    ));
    results
}

// ── 3. Classification ───────────────────────────────────────────────────

fn validate_classification() -> Vec<TestResult> {
    println!("--- Classification ---");
    let mut results = Vec::new();
    let grid = sample_canvas(PLAN_SIZE).to_kinds(&Palette::default());
    let analysis = FloorAnalysis::analyze(&grid);

    results.push(check(
        "classify_region_count",
        analysis.regions.len() == 3,
        format!("{} regions", analysis.regions.len()),
    ));

    let top = analysis.region_at(Cell::new(3, 3));
    results.push(check(
        "classify_windowed_room",
        top.is_some_and(|r| r.kind == RegionKind::Room),
        format!(
            "top region: {:?}",
            top.map(|r| (r.region.doors, r.region.windows, r.kind))
        ),
    ));

    let strip = analysis.region_at(Cell::new(3, PLAN_SIZE / 2));
    results.push(check(
        "classify_corridor_strip",
        strip.is_some_and(|r| r.kind == RegionKind::Corridor),
        format!(
            "strip: {:?}",
            strip.map(|r| (r.region.doors, r.region.windows, r.kind))
        ),
    ));

    let labelled = label_grid(&grid, &analysis);
    let corridor_cells = labelled
        .iter()
        .filter(|(_, k)| **k == CellKind::Corridor)
        .count();
    results.push(check(
        "classify_mask_matches_labels",
        corridor_cells == analysis.mask.len(),
        format!("{} corridor cells", corridor_cells),
    ));
    results
}

// ── 4. Placement rules ──────────────────────────────────────────────────

fn validate_placement_rules(catalog: &Catalog) -> Vec<TestResult> {
    println!("--- Placement Rules ---");
    let mut results = Vec::new();
    let (Some(server), Some(router), Some(desk), Some(pc)) = (
        catalog.get(item_names::SERVER),
        catalog.get(item_names::ROUTER),
        catalog.get(item_names::DESK),
        catalog.get(item_names::PC),
    ) else {
        results.push(check("placement_items_present", false, "stock items missing"));
        return results;
    };

    let mut engine = PlacementEngine::new(FloorPlan::open(20));
    let placed_router = engine.try_place(router, 10, 5, Rotation::Deg0).is_ok();
    let clearance = engine.validate(server, 5, 4, Rotation::Deg0);
    results.push(check(
        "placement_server_clearance",
        placed_router && matches!(&clearance, Err(r) if r.reason.check() == Check::Clearance),
        format!("{:?}", clearance.err().map(|r| r.reason)),
    ));

    let desk_placed = engine.try_place(desk, 2, 12, Rotation::Deg0);
    let off = engine.validate(pc, 4, 12, Rotation::Deg0);
    let centered = engine.try_place(pc, 3, 12, Rotation::Deg0);
    results.push(check(
        "placement_pc_centered",
        desk_placed.is_ok()
            && matches!(&off, Err(r) if r.reason.check() == Check::Containment)
            && centered.is_ok(),
        format!("off-center: {:?}", off.err().map(|r| r.reason)),
    ));

    let before = engine.snapshot();
    let rejected = engine.try_place(server, 18, 18, Rotation::Deg0).is_err();
    results.push(check(
        "placement_rejection_no_side_effect",
        rejected && engine.snapshot() == before,
        "out-of-bounds server left state untouched",
    ));

    let removed = desk_placed
        .map(|d| engine.remove(d.id).len())
        .unwrap_or(0);
    results.push(check(
        "placement_remove_cascades",
        removed == 2 && engine.placements().len() == 1,
        format!("{} removed with the desk", removed),
    ));
    results
}

// ── 5. Batch sweep ──────────────────────────────────────────────────────

fn validate_batch_sweep(catalog: &Catalog, verbose: bool) -> Vec<TestResult> {
    println!("--- Batch Sweep ---");
    let mut results = Vec::new();
    let plan = sample_plan();
    let mask = plan.mask.clone();
    let mut rng = StdRng::seed_from_u64(42);

    let mut overlap_runs = 0;
    let mut corridor_hits = 0;
    let mut placed_total = 0;
    let runs = 50;
    for run in 0..runs {
        let requests: Vec<BatchRequest> = catalog
            .items()
            .iter()
            .map(|i| BatchRequest {
                item: i.name.clone(),
                count: rng.gen_range(0..4),
                rotation: if i.rotatable {
                    Rotation::ALL[rng.gen_range(0..4)]
                } else {
                    Rotation::Deg0
                },
            })
            .collect();
        let mut engine = PlacementEngine::new(plan.clone());
        let report = engine.place_batch(catalog, &requests);
        placed_total += report.total_placed();
        if overlaps(engine.placements()) > 0 {
            overlap_runs += 1;
        }
        corridor_hits += engine
            .placements()
            .iter()
            .filter(|p| mask.intersects(&p.rect()))
            .count();
        if verbose && run < 3 {
            println!(
                "    run {}: {} placed, {} short",
                run,
                report.total_placed(),
                report.total_shortfall()
            );
        }
    }

    results.push(check(
        "batch_places_something",
        placed_total > 0,
        format!("{} placements over {} runs", placed_total, runs),
    ));
    results.push(check(
        "batch_no_overlaps",
        overlap_runs == 0,
        format!("{} runs with overlapping footprints", overlap_runs),
    ));
    results.push(check(
        "batch_avoids_corridors",
        corridor_hits == 0,
        format!("{} placements on corridor cells", corridor_hits),
    ));

    let mut engine = PlacementEngine::new(plan);
    let report = engine.place_batch(catalog, &[BatchRequest::new(item_names::SERVER, 500)]);
    results.push(check(
        "batch_reports_shortfall",
        report.total_shortfall() > 0 && !report.is_complete(),
        format!(
            "{} servers placed, {} short",
            report.total_placed(),
            report.total_shortfall()
        ),
    ));
    results
}

// ── 6. Scheme ───────────────────────────────────────────────────────────

fn validate_scheme(catalog: &Catalog) -> Vec<TestResult> {
    println!("--- Scheme ---");
    let mut results = Vec::new();
    let mut engine = PlacementEngine::new(sample_plan());
    engine.place_batch(
        catalog,
        &[
            BatchRequest::new(item_names::DESK, 2),
            BatchRequest::new(item_names::PC, 2),
            BatchRequest::new(item_names::NAS, 1),
        ],
    );

    let scheme = render_scheme(&engine.plan().grid, engine.placements(), catalog);
    let extracted = sorted(extract_spawns(&scheme, catalog));
    let direct = sorted(spawns_from_placements(engine.placements()));
    results.push(check(
        "scheme_round_trip",
        !direct.is_empty() && extracted == direct,
        format!("{} spawns extracted, {} placed", extracted.len(), direct.len()),
    ));

    let elevated = direct.iter().filter(|s| s.elevated).count();
    let pcs = engine
        .placements()
        .iter()
        .filter(|p| p.only_on_support)
        .count();
    results.push(check(
        "scheme_pcs_elevated",
        elevated == pcs,
        format!("{} elevated, {} support-only", elevated, pcs),
    ));
    results
}

// ── 7. Session ──────────────────────────────────────────────────────────

fn validate_session(catalog: &Catalog) -> Vec<TestResult> {
    println!("--- Session ---");
    let mut results = Vec::new();
    let config = PlannerConfig {
        grid_size: PLAN_SIZE,
        undo_limit: 8,
        ..PlannerConfig::default()
    };
    let mut session = match EditorSession::new(config, catalog.clone()) {
        Ok(s) => s,
        Err(e) => {
            results.push(check("session_new", false, e.to_string()));
            return results;
        }
    };
    session.load_raster(&sample_canvas(PLAN_SIZE).to_raster());

    let clicked = session
        .select(item_names::PRINTER)
        .ok()
        .and_then(|_| session.click(Cell::new(4, 4)).ok());
    let occupied = session.engine().occupancy().occupied_count();
    let undone = session.undo();
    results.push(check(
        "session_click_undo",
        clicked.is_some() && occupied == 6 && undone && session.placements().is_empty(),
        format!("clicked {:?}, {} cells before undo", clicked.map(|p| p.id), occupied),
    ));

    for _ in 0..20 {
        let _ = session.select(item_names::ROUTER);
        let _ = session.click(Cell::new(3, 3));
        let _ = session.erase_at(Cell::new(3, 3));
    }
    results.push(check(
        "session_undo_bounded",
        session.undo_depth() <= 8,
        format!("undo depth {}", session.undo_depth()),
    ));

    let _ = session.set_count(item_names::MODEM, 3);
    let report = session.apply_optimize();
    results.push(check(
        "session_optimize",
        report.is_complete() && session.placements().len() == 3,
        format!("{} placed", report.total_placed()),
    ));
    session.reset_counts();
    results.push(check(
        "session_reset_clears_scheme",
        session.placements().is_empty() && session.count(item_names::MODEM) == 0,
        "counts and scheme cleared",
    ));
    results
}

// ── 8. Equipment status ─────────────────────────────────────────────────

fn validate_status_rates(verbose: bool) -> Vec<TestResult> {
    println!("--- Equipment Status ---");
    let mut results = Vec::new();
    let policy = StatusPolicy::default();
    let mut rng = StdRng::seed_from_u64(7);

    // One warning roll over many fresh items approximates the chance.
    let mut engine = PlacementEngine::new(FloorPlan::open(64));
    let modem = Catalog::standard().get(item_names::MODEM).cloned();
    if let Some(modem) = &modem {
        for y in (0..64).step_by(3) {
            for x in (0..64).step_by(3) {
                let _ = engine.try_place(modem, x, y, Rotation::Deg0);
            }
        }
    }
    let mut board = StatusBoard::new();
    board.sync(engine.placements());
    let n = board.len();
    let warned = board.roll_warning(&policy, &mut rng).len();
    let rate = warned as f32 / n.max(1) as f32;
    results.push(check(
        "status_warning_rate",
        n > 300 && (rate - policy.warning_chance).abs() < 0.07,
        format!("{} of {} warned ({:.3})", warned, n, rate),
    ));

    let mut ticker = StatusTicker::new(policy);
    let mut changes = 0;
    for _ in 0..600 {
        changes += ticker.advance(0.5, &mut board, &mut rng).len();
    }
    let errors = board.count(EquipmentStatus::Error);
    if verbose {
        println!(
            "    after {:.0}s: {} good, {} warning, {} error",
            ticker.elapsed(),
            board.count(EquipmentStatus::Good),
            board.count(EquipmentStatus::Warning),
            errors
        );
    }
    results.push(check(
        "status_degrades_over_time",
        changes > 0 && errors > n / 2,
        format!("{} transitions, {} in error", changes, errors),
    ));

    let ids: Vec<_> = board.iter().map(|(id, _)| id).collect();
    for id in &ids {
        board.acknowledge(*id);
    }
    ticker.cancel();
    let after_cancel = ticker.advance(1000.0, &mut board, &mut rng).len();
    results.push(check(
        "status_ack_and_cancel",
        board.count(EquipmentStatus::Good) == n && after_cancel == 0,
        "all acknowledged, no rolls after cancel",
    ));
    results
}
