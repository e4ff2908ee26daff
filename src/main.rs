//! vm-initrd: PID 1 of the initramfs, mounts a virtiofs root and hands over to its init

mod cmdline;
mod devices;
mod handover;
mod kernel;
mod layout;
mod logging;
mod modules;
mod mounts;
mod switch_root;
mod virtiofs;

#[cfg(test)]
mod testing;

use anyhow::{Context, Result};
use std::convert::Infallible;
use tracing::debug;

use crate::kernel::{Kernel, Linux};
use crate::layout::Layout;

fn main() -> Result<()> {
    boot(&Linux, &Layout::default()).map(|never| match never {})
}

/// Run the whole boot sequence. Returns only on failure.
fn boot(kernel: &impl Kernel, layout: &Layout) -> Result<Infallible> {
    // Mount kernel filesystems
    mounts::mount_kernel_filesystems(kernel)?;

    kernel
        .create_dir_all(&layout.share_base)
        .with_context(|| format!("Failed to create {}", layout.share_base.display()))?;

    // Parse kernel cmdline
    let cmdline_str = cmdline::read_cmdline(&layout.cmdline)?;
    let options = cmdline::parse_cmdline(&cmdline_str);
    let _log = logging::init(options.debug);

    debug!("kernel cmdline: {}", cmdline_str);
    debug!("parsed options: {:?}", options);

    devices::create_static_devices(kernel)?;

    let report = modules::load_kernel_modules(kernel, &layout.modules_dir)?;
    debug!(
        "kernel modules: {} loaded, {} failed",
        report.loaded, report.failed
    );

    virtiofs::mount_root(kernel, &options.rootfs_tag, &layout.sysroot)?;
    virtiofs::mount_extra_shares(kernel, &options.extra_mounts, &layout.share_base)?;

    switch_root::relocate_api_mounts(kernel, &layout.sysroot)?;
    switch_root::switch_root(kernel, &layout.sysroot)?;

    handover::exec_init(kernel, &options.init)
}
