//! Macrodata Headless Session Harness
//!
//! Builds sessions from bundled presets and auto-plays them to completion
//! through the engine's public input API. Runs entirely in-process: no
//! renderer, no audio, no UI.
//!
//! Usage:
//!   cargo run -p macrodata-simtest
//!   cargo run -p macrodata-simtest -- --verbose
//!   cargo run -p macrodata-simtest -- --preset dense

use std::collections::HashSet;

use log::{debug, info};
use macrodata_core::prelude::*;
use macrodata_logic::constants::timing::{HOVER_KEY_LOCK_MS, TRANSFER_MS};
use macrodata_logic::session::validate_config;
use serde::Deserialize;

// ── Session presets ─────────────────────────────────────────────────────
const PRESETS_JSON: &str = include_str!("../../../data/sessions.json");

#[derive(Debug, Deserialize)]
struct Preset {
    name: String,
    config: SessionConfig,
    #[serde(default)]
    expect_shortfall: bool,
}

/// Simulated frame length for the autoplayer.
const FRAME_MS: f64 = 16.0;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

impl TestResult {
    fn new(name: impl Into<String>, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed,
            detail: detail.into(),
        }
    }
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let verbose = args.iter().any(|a| a == "--verbose");
    let only = args
        .iter()
        .position(|a| a == "--preset")
        .and_then(|i| args.get(i + 1))
        .cloned();

    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    println!("=== Macrodata Session Harness ===\n");

    let mut results = Vec::new();

    // 1. Preset parsing and validation
    let presets = load_presets(&mut results).unwrap_or_default();

    // 2. One autoplayed session per preset
    for preset in presets
        .iter()
        .filter(|p| only.as_deref().map_or(true, |name| p.name == name))
    {
        results.extend(run_preset(preset, verbose));
    }

    if let Some(name) = &only {
        results.push(TestResult::new(
            "preset_selected",
            presets.iter().any(|p| &p.name == name),
            format!("preset '{}'", name),
        ));
    }

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

// ── 1. Presets ──────────────────────────────────────────────────────────

fn load_presets(results: &mut Vec<TestResult>) -> Option<Vec<Preset>> {
    println!("--- Presets ---");

    let presets: Vec<Preset> = match serde_json::from_str(PRESETS_JSON) {
        Ok(p) => p,
        Err(e) => {
            results.push(TestResult::new(
                "presets_parse",
                false,
                format!("JSON parse error: {}", e),
            ));
            return None;
        }
    };

    results.push(TestResult::new(
        "presets_not_empty",
        !presets.is_empty(),
        format!("{} presets loaded", presets.len()),
    ));

    let invalid: Vec<String> = presets
        .iter()
        .filter_map(|p| {
            let errors = validate_config(&p.config);
            (!errors.is_empty()).then(|| format!("{}: {:?}", p.name, errors))
        })
        .collect();
    results.push(TestResult::new(
        "presets_valid",
        invalid.is_empty(),
        if invalid.is_empty() {
            "all presets pass validation".to_string()
        } else {
            invalid.join("; ")
        },
    ));

    let mut names = HashSet::new();
    let duplicate = presets.iter().find(|p| !names.insert(p.name.as_str()));
    results.push(TestResult::new(
        "presets_unique_names",
        duplicate.is_none(),
        match duplicate {
            Some(p) => format!("duplicate preset '{}'", p.name),
            None => "all preset names unique".to_string(),
        },
    ));

    Some(presets)
}

// ── 2. Autoplay ─────────────────────────────────────────────────────────

fn run_preset(preset: &Preset, verbose: bool) -> Vec<TestResult> {
    println!("--- Session '{}' ---", preset.name);
    let name = |check: &str| format!("{}_{}", preset.name, check);
    let mut results = Vec::new();

    let mut engine = match GridEngine::new(preset.config.clone()) {
        Ok(e) => e,
        Err(e) => {
            results.push(TestResult::new(name("create"), false, e.to_string()));
            return results;
        }
    };
    let report = engine.placement_report().clone();
    if verbose {
        println!(
            "  {}x{} grid, {}/{} shapes placed, scale {:.3}",
            preset.config.rows,
            preset.config.cols,
            report.placed,
            report.requested,
            engine.viewport().scale()
        );
    }

    // Placement
    results.push(check_no_overlap(&engine, &name("no_overlap")));
    results.push(TestResult::new(
        name("shortfall_expected"),
        report.is_complete() != preset.expect_shortfall,
        format!("{} instances skipped", report.shortfalls.len()),
    ));

    // Wrong container leaves every box untouched
    if let Some(result) = check_wrong_container(&mut engine, &name("wrong_container")) {
        results.push(result);
    }

    // Save/load mid-session
    results.push(check_save_load(&engine, &name("save_load")));

    // Play every shape
    let mut events = engine.drain_events();
    let mut transfers = 0;
    for shape in engine.shapes() {
        if play_shape(&mut engine, &shape.cells, &mut events) {
            transfers += 1;
        } else {
            results.push(TestResult::new(
                name("transfer"),
                false,
                format!("shape #{} ({}) was not transferred", shape.id, shape.kind),
            ));
        }
    }
    info!("'{}': {} transfers", preset.name, transfers);

    results.push(TestResult::new(
        name("grid_cleared"),
        engine.shapes().is_empty() && engine.grid().occupied_count() == 0,
        format!("{} shapes left", engine.shapes().len()),
    ));

    let completions = events
        .iter()
        .filter(|e| matches!(e, EngineEvent::ShapeCompleted { .. }))
        .count();
    results.push(TestResult::new(
        name("completion_events"),
        completions == transfers,
        format!("{} completion events for {} transfers", completions, transfers),
    ));

    let overall_events = events
        .iter()
        .filter(|e| **e == EngineEvent::OverallComplete)
        .count();
    if report.is_complete() {
        let all_full = engine.storage().boxes().iter().all(|b| b.percent() == 100.0);
        results.push(TestResult::new(
            name("boxes_full"),
            all_full && engine.overall_percent() == 100,
            format!("overall {}%", engine.overall_percent()),
        ));
        results.push(TestResult::new(
            name("overall_once"),
            overall_events == 1,
            format!("{} overall-complete events", overall_events),
        ));
    } else {
        results.push(TestResult::new(
            name("overall_blocked"),
            overall_events == 0 && engine.overall_percent() < 100,
            format!(
                "overall {}% with {} instances missing",
                engine.overall_percent(),
                report.shortfalls.len()
            ),
        ));
    }

    results
}

fn hover_cells(engine: &mut GridEngine, cells: &[CellPos]) {
    for pos in cells {
        let (x, y) = engine.viewport().cell_center(*pos);
        engine.handle_input(InputEvent::PointerMove { x, y });
    }
}

/// Hover a shape, open its box with the hover key, confirm and wait for
/// the grid to settle. Returns whether the shape left the grid.
fn play_shape(engine: &mut GridEngine, cells: &[CellPos], events: &mut Vec<EngineEvent>) -> bool {
    let keys = engine.config().key_bindings.clone();
    hover_cells(engine, cells);
    engine.handle_input(InputEvent::key(keys.open_hovered));
    engine.handle_input(InputEvent::key(keys.confirm));
    if engine.transfer_phase() != TransferPhase::Armed {
        debug!("Confirm not accepted, notice: {:?}", engine.notice().map(|n| n.kind));
        events.extend(engine.drain_events());
        return false;
    }

    let mut waited = 0.0;
    while engine.transfer_phase() != TransferPhase::Idle && waited <= TRANSFER_MS * 2.0 {
        engine.update(FRAME_MS);
        waited += FRAME_MS;
    }
    // let the hover key unlock before the next shape
    if waited < HOVER_KEY_LOCK_MS {
        engine.update(HOVER_KEY_LOCK_MS - waited);
    }
    events.extend(engine.drain_events());

    cells.iter().all(|pos| engine.grid().shape_at(*pos).is_none())
}

fn check_no_overlap(engine: &GridEngine, name: &str) -> TestResult {
    let (rows, cols) = (engine.grid().rows(), engine.grid().cols());
    let mut seen = HashSet::new();
    let mut problems = 0;
    for shape in engine.shapes() {
        for pos in &shape.cells {
            if pos.row >= rows || pos.col >= cols || !seen.insert(*pos) {
                problems += 1;
            }
        }
    }
    TestResult::new(
        name,
        problems == 0,
        format!("{} cells checked, {} problems", seen.len(), problems),
    )
}

fn check_wrong_container(engine: &mut GridEngine, name: &str) -> Option<TestResult> {
    let shape = engine.shapes().into_iter().next()?;
    let wrong = shape.kind.box_index() % 5 + 1;
    let before: Vec<f32> = engine.storage().boxes().iter().map(|b| b.percent()).collect();

    hover_cells(engine, &shape.cells);
    engine.command(Command::ToggleBox(wrong));
    engine.command(Command::Confirm);

    let after: Vec<f32> = engine.storage().boxes().iter().map(|b| b.percent()).collect();
    let notice = engine.notice().map(|n| n.kind);
    let passed = before == after
        && engine.transfer_phase() == TransferPhase::Idle
        && notice == Some(NoticeKind::WrongContainer);

    // close the box again and let the notice expire
    engine.command(Command::ToggleBox(wrong));
    engine.handle_input(InputEvent::PointerLeave);
    engine.update(HOVER_KEY_LOCK_MS);

    Some(TestResult::new(
        name,
        passed,
        format!("box {} open for {}, notice {:?}", wrong, shape.kind, notice),
    ))
}

fn check_save_load(engine: &GridEngine, name: &str) -> TestResult {
    let mut buffer = Vec::new();
    if let Err(e) = engine.save(&mut buffer) {
        return TestResult::new(name, false, format!("save failed: {}", e));
    }

    let mut restored = match GridEngine::new(engine.config().clone()) {
        Ok(e) => e,
        Err(e) => return TestResult::new(name, false, e.to_string()),
    };
    if let Err(e) = restored.load(&buffer[..]) {
        return TestResult::new(name, false, format!("load failed: {}", e));
    }

    let same_shapes = restored
        .shapes()
        .iter()
        .map(|s| (s.id, s.cells.clone()))
        .eq(engine.shapes().iter().map(|s| (s.id, s.cells.clone())));
    TestResult::new(
        name,
        same_shapes && restored.overall_percent() == engine.overall_percent(),
        format!("{} bytes, {} shapes", buffer.len(), restored.shapes().len()),
    )
}
