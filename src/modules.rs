//! Best-effort kernel module loading

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, warn};

use crate::kernel::Kernel;

const MODULE_EXTENSION: &str = "ko";

/// Outcome of a [`load_kernel_modules`] pass
#[derive(Debug, Default, PartialEq)]
pub struct LoadReport {
    pub loaded: usize,
    pub failed: usize,
}

/// Load every `*.ko` file in `dir`, sorted by path.
///
/// A missing directory loads nothing. Individual failures are logged and
/// skipped; only an unreadable directory is an error.
pub fn load_kernel_modules(kernel: &impl Kernel, dir: &Path) -> Result<LoadReport> {
    let mut report = LoadReport::default();

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("no module directory at {}", dir.display());
            return Ok(report);
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read {}", dir.display()));
        }
    };

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("Failed to read {}", dir.display()))?
            .path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == MODULE_EXTENSION) {
            paths.push(path);
        }
    }
    paths.sort();

    for path in &paths {
        match load_kernel_module(kernel, path) {
            Ok(()) => report.loaded += 1,
            Err(e) => {
                warn!("failed to load module {}: {:#}", path.display(), e);
                report.failed += 1;
            }
        }
    }

    Ok(report)
}

fn load_kernel_module(kernel: &impl Kernel, path: &Path) -> Result<()> {
    debug!("loading module {}", path.display());

    let image = std::fs::read(path).context("Failed to read module")?;
    kernel
        .init_module(&image, c"")
        .context("init_module failed")?;

    Ok(())
}
