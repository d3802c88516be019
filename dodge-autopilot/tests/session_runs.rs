use anyhow::Result;
use dodge_autopilot::cursors::create_cursor;
use dodge_autopilot::dataset::{append_rows, write_telemetry};
use dodge_autopilot::runner::{run_session, RunConfig};
use dodge_autopilot::sweep::{run_sweep, SweepConfig};
use dodge_core::constants::{ARENA_MAX, ARENA_MIN};

fn config(strategy: &str, cursor: &str, seed: u32) -> RunConfig {
    let mut config = RunConfig::new(strategy, cursor, 2, seed);
    config.max_ticks = 400;
    config
}

#[test]
fn recorded_rows_stay_inside_the_arena_and_in_order() -> Result<()> {
    let run = config("heuristic", "chaser", 11);
    let mut cursor = create_cursor("chaser").unwrap();
    let artifact = run_session(&run, cursor.as_mut())?;

    assert!(!artifact.rows.is_empty());
    for row in &artifact.rows {
        for value in [row.dot_x, row.dot_y, row.mouse_x, row.mouse_y] {
            assert!((ARENA_MIN..=ARENA_MAX).contains(&value));
        }
        assert_eq!(row.max_speed, 1.5);
        assert_eq!(row.session_uid, 11);
    }
    let ordered = artifact
        .rows
        .windows(2)
        .all(|w| w[0].timestamp < w[1].timestamp);
    assert!(ordered);

    assert_eq!(artifact.metrics.ticks, artifact.rows.len() as u64);
    assert_eq!(artifact.metrics.dropped_samples, 0);
    Ok(())
}

#[test]
fn model_strategy_runs_without_fallbacks_with_the_builtin_backend() -> Result<()> {
    let run = config("model", "interceptor", 5);
    let mut cursor = create_cursor("interceptor").unwrap();
    let artifact = run_session(&run, cursor.as_mut())?;
    assert_eq!(artifact.metrics.fallback_ticks, 0);
    assert_eq!(artifact.metrics.strategy_id, "model");
    Ok(())
}

#[test]
fn same_seed_reproduces_the_same_run() -> Result<()> {
    let run = config("heuristic", "wanderer", 21);
    let mut a = create_cursor("wanderer").unwrap();
    let mut b = create_cursor("wanderer").unwrap();
    let first = run_session(&run, a.as_mut())?;
    let second = run_session(&run, b.as_mut())?;

    assert_eq!(first.rows.len(), second.rows.len());
    for (ra, rb) in first.rows.iter().zip(&second.rows) {
        assert_eq!(ra.dot_x, rb.dot_x);
        assert_eq!(ra.dot_y, rb.dot_y);
        assert_eq!(ra.mouse_x, rb.mouse_x);
        assert_eq!(ra.mouse_y, rb.mouse_y);
    }
    assert_eq!(first.metrics.mean_distance_px, second.metrics.mean_distance_px);
    Ok(())
}

#[test]
fn writers_produce_readable_artifacts() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let dataset_path = dir.path().join("rows.jsonl");
    let telemetry_path = dir.path().join("telemetry.json");

    let run = config("heuristic", "chaser", 3);
    let mut cursor = create_cursor("chaser").unwrap();
    let artifact = run_session(&run, cursor.as_mut())?;

    append_rows(&dataset_path, &artifact.rows)?;
    append_rows(&dataset_path, &artifact.rows)?;
    write_telemetry(&telemetry_path, &artifact.telemetry)?;

    let raw = std::fs::read_to_string(&dataset_path)?;
    let lines: Vec<&str> = raw.lines().collect();
    assert_eq!(lines.len(), artifact.rows.len() * 2);
    let first: serde_json::Value = serde_json::from_str(lines[0])?;
    assert!(first["dotX"].is_number());
    assert!(first["mouseY"].is_number());
    assert_eq!(first["sessionUid"], 3);

    let telemetry: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&telemetry_path)?)?;
    assert_eq!(telemetry["level"], 2);
    assert!(telemetry["samples"].as_array().is_some());
    Ok(())
}

#[test]
fn sweep_aggregates_every_case() -> Result<()> {
    let sweep = SweepConfig {
        strategy_id: "heuristic".into(),
        cursor_id: "chaser".into(),
        levels: vec![1, 2],
        seeds: vec![1, 2, 3],
        max_ticks: 120,
        tick_ms: 16,
        deadline_ms: 8,
        noise_sigma: 0.1,
        threads: 2,
    };
    let report = run_sweep(&sweep)?;
    assert_eq!(report.runs.len(), 6);
    assert!(report.mean_distance_px > 0.0);
    assert!((0.0..=1.0).contains(&report.catch_rate));
    Ok(())
}

#[test]
fn sweep_rejects_empty_case_lists() {
    let sweep = SweepConfig {
        strategy_id: "heuristic".into(),
        cursor_id: "chaser".into(),
        levels: vec![],
        seeds: vec![1],
        max_ticks: 10,
        tick_ms: 16,
        deadline_ms: 8,
        noise_sigma: 0.0,
        threads: 0,
    };
    assert!(run_sweep(&sweep).is_err());
}
