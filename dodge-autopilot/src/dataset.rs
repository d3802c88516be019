//! Writers for the recorded artifacts: JSONL dataset rows for training and a
//! JSON telemetry document per session.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use dodge_core::SessionTelemetry;

use crate::runner::DatasetRow;

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed creating directory {}", parent.display()))?;
        }
    }
    Ok(())
}

/// Appends rows to a JSONL file, one row per line.
pub fn append_rows(path: &Path, rows: &[DatasetRow]) -> Result<()> {
    ensure_parent(path)?;
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed opening {}", path.display()))?;
    for row in rows {
        let line = serde_json::to_string(row).context("failed serializing dataset row")?;
        writeln!(file, "{line}").with_context(|| format!("failed writing {}", path.display()))?;
    }
    Ok(())
}

pub fn write_telemetry(path: &Path, telemetry: &SessionTelemetry) -> Result<()> {
    ensure_parent(path)?;
    let json =
        serde_json::to_vec_pretty(telemetry).context("failed serializing session telemetry")?;
    fs::write(path, json).with_context(|| format!("failed writing {}", path.display()))
}
