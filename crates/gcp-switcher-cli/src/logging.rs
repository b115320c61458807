// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub const BANNER: &str = "=== GCP Switcher Started ===";

/// Installs the file subscriber when `debug` is set. Keep the returned guard
/// alive for the life of the process or buffered lines are lost.
pub fn init(debug: bool, path: &Path) -> Result<Option<WorkerGuard>> {
    if !debug {
        return Ok(None);
    }

    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow!("log path {} has no file name", path.display()))?;

    std::fs::create_dir_all(directory)
        .map_err(|error| anyhow!("create log directory {}: {error}", directory.display()))?;

    let appender = tracing_appender::rolling::never(directory, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|error| anyhow!("install log subscriber: {error}"))?;

    tracing::info!("{BANNER}");
    tracing::debug!(path = %path.display(), "debug logging enabled");
    Ok(Some(guard))
}

#[cfg(test)]
mod tests {
    use super::{BANNER, init};
    use anyhow::Result;

    #[test]
    fn disabled_logging_installs_nothing() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("quiet.log");
        assert!(init(false, &path)?.is_none());
        assert!(!path.exists());
        Ok(())
    }

    #[test]
    fn debug_logging_writes_banner_first() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("nested").join("switcher.log");
        let guard = init(true, &path)?;
        assert!(guard.is_some());
        tracing::info!("after banner");
        drop(guard);

        let contents = std::fs::read_to_string(&path)?;
        let first = contents.lines().next().unwrap_or_default();
        assert!(first.contains(BANNER), "first line was {first:?}");
        Ok(())
    }
}
