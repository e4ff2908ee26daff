//! Virtiofs share mounting

use anyhow::{Context, Result};
use rustix::mount::MountFlags;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::cmdline::ExtraMount;
use crate::kernel::Kernel;

pub fn mount_virtiofs(
    kernel: &impl Kernel,
    tag: &str,
    mountpoint: &Path,
    read_only: bool,
) -> Result<()> {
    debug!(
        "mounting virtiofs {} at {} (read_only: {})",
        tag,
        mountpoint.display(),
        read_only
    );

    let flags = if read_only {
        MountFlags::RDONLY
    } else {
        MountFlags::empty()
    };

    kernel
        .mount(tag, mountpoint, "virtiofs", flags, "")
        .with_context(|| format!("Failed to mount virtiofs {} at {}", tag, mountpoint.display()))
}

/// Mount the root share at `sysroot`. Always read-only.
pub fn mount_root(kernel: &impl Kernel, tag: &str, sysroot: &Path) -> Result<()> {
    kernel
        .create_dir_all(sysroot)
        .with_context(|| format!("Failed to create {}", sysroot.display()))?;

    mount_virtiofs(kernel, tag, sysroot, true)
}

/// Where an extra share with `tag` is mounted under `base`.
pub fn share_mountpoint(base: &Path, tag: &str) -> PathBuf {
    base.join(tag.trim_start_matches('/'))
}

/// Mount each extra share under `base`, in order, stopping at the first failure.
pub fn mount_extra_shares(kernel: &impl Kernel, mounts: &[ExtraMount], base: &Path) -> Result<()> {
    for share in mounts {
        let mountpoint = share_mountpoint(base, &share.tag);

        kernel
            .create_dir_all(&mountpoint)
            .with_context(|| format!("Failed to create directory {}", mountpoint.display()))?;

        mount_virtiofs(kernel, &share.tag, &mountpoint, share.read_only)?;
    }

    Ok(())
}
