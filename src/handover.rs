//! Replacing this process with the real init

use anyhow::{anyhow, Result};
use std::convert::Infallible;
use std::path::Path;
use tracing::{debug, error};

use crate::kernel::Kernel;

/// Execute `program` with its file name as argv[0] and the current environment.
///
/// Never returns on success.
pub fn exec_init(kernel: &impl Kernel, program: &Path) -> Result<Infallible> {
    let name = program.file_name().unwrap_or(program.as_os_str());
    debug!("executing init {}", program.display());

    let err = kernel.exec(program, name);
    error!("failed to execute {}: {}", program.display(), err);

    Err(anyhow!(err).context(format!("Failed to execute {}", program.display())))
}
