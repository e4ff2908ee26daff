//! Moving the API mounts into the new root and switching to it

use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

use crate::kernel::Kernel;

/// Mounts carried over into the new root when it has a directory for them.
pub const SURVIVING_MOUNTS: &[&str] = &["/run", "/dev", "/proc", "/sys", "/tmp"];

/// Move each surviving mount under `new_root`, or unmount it when the new
/// root has no directory for it.
pub fn relocate_api_mounts(kernel: &impl Kernel, new_root: &Path) -> Result<()> {
    for mount_point in SURVIVING_MOUNTS {
        let source = Path::new(mount_point);
        let dest = new_root.join(mount_point.trim_start_matches('/'));

        if dest.is_dir() {
            debug!("moving {} to {}", source.display(), dest.display());
            kernel
                .mount_move(source, &dest)
                .with_context(|| format!("Failed to move {} to {}", mount_point, dest.display()))?;
        } else {
            debug!("unmounting {}", mount_point);
            kernel
                .unmount(source)
                .with_context(|| format!("Failed to unmount {}", mount_point))?;
        }
    }

    Ok(())
}

/// Make `new_root` the root of this process.
///
/// Not restartable: a failure part way leaves the mount table as it is.
pub fn switch_root(kernel: &impl Kernel, new_root: &Path) -> Result<()> {
    debug!("switching root to {}", new_root.display());

    kernel
        .chdir(new_root)
        .with_context(|| format!("Failed to chdir to {}", new_root.display()))?;

    // Keeps the old root alive until the new one is mounted over it.
    let _old_root = kernel
        .open_dir(Path::new("/"))
        .context("Failed to open old root")?;

    kernel
        .mount_move(Path::new("."), Path::new("/"))
        .context("Failed to move new root to /")?;
    kernel.chroot(Path::new(".")).context("Failed to chroot")?;
    kernel.chdir(Path::new("/")).context("Failed to chdir to /")?;

    Ok(())
}
