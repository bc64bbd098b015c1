//! Per-run log files
//!
//! Each run writes to `<logs_dir>/<timestamp>.log`. Terminal output belongs to
//! the prompts layer, so the subscriber never writes to stdout or stderr.
//! Older files beyond the configured limit are pruned oldest-first.

use crate::error::Result;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::SystemTime;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Open this run's log file, install the global subscriber and prune old logs.
/// Returns the path of the new log file.
pub fn init_logging(logs_dir: &Path, max_files: usize, debug: bool) -> Result<PathBuf> {
    fs::create_dir_all(logs_dir)?;

    let log_id = chrono::Local::now().format("%Y%m%d-%H%M%S-%3f");
    let log_path = logs_dir.join(format!("{}.log", log_id));
    let file = File::create(&log_path)?;

    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A subscriber may already be installed (tests, embedding); keep it.
    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(Mutex::new(file)),
        )
        .with(filter)
        .try_init();

    let removed = prune_logs(logs_dir, max_files)?;
    tracing::info!(log = %log_path.display(), pruned = removed.len(), "logging initialized");

    Ok(log_path)
}

/// Delete the oldest `.log` files so that at most `keep` remain.
/// Returns the removed paths.
pub fn prune_logs(logs_dir: &Path, keep: usize) -> Result<Vec<PathBuf>> {
    let mut logs: Vec<(SystemTime, PathBuf)> = Vec::new();
    for entry in fs::read_dir(logs_dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "log") && path.is_file() {
            let modified = fs::metadata(&path)?
                .modified()
                .unwrap_or(SystemTime::UNIX_EPOCH);
            logs.push((modified, path));
        }
    }

    if logs.len() <= keep {
        return Ok(Vec::new());
    }

    // Oldest first; name breaks ties since timestamps sort lexically
    logs.sort();
    let excess = logs.len() - keep;
    let mut removed = Vec::with_capacity(excess);
    for (_, path) in logs.into_iter().take(excess) {
        fs::remove_file(&path)?;
        removed.push(path);
    }
    Ok(removed)
}
