//! Kernel API filesystems mounted before anything else runs

use anyhow::{Context, Result};
use rustix::mount::MountFlags;
use std::path::Path;
use tracing::debug;

use crate::kernel::Kernel;

pub struct KernelMount {
    pub source: &'static str,
    pub target: &'static str,
    pub fstype: &'static str,
    pub flags: MountFlags,
    pub data: &'static str,
}

const NOSUID_NOEXEC_NODEV: MountFlags = MountFlags::NOSUID
    .union(MountFlags::NOEXEC)
    .union(MountFlags::NODEV);

const NOSUID_NODEV: MountFlags = MountFlags::NOSUID.union(MountFlags::NODEV);

pub const KERNEL_MOUNTS: &[KernelMount] = &[
    KernelMount {
        source: "sysfs",
        target: "/sys",
        fstype: "sysfs",
        flags: NOSUID_NOEXEC_NODEV,
        data: "",
    },
    KernelMount {
        source: "devtmpfs",
        target: "/dev",
        fstype: "devtmpfs",
        flags: MountFlags::NOSUID,
        data: "seclabel,mode=0755,size=4m",
    },
    KernelMount {
        source: "proc",
        target: "/proc",
        fstype: "proc",
        flags: NOSUID_NOEXEC_NODEV,
        data: "",
    },
    KernelMount {
        source: "tmpfs",
        target: "/run",
        fstype: "tmpfs",
        flags: NOSUID_NODEV,
        data: "seclabel,mode=0755,size=64m",
    },
    KernelMount {
        source: "tmpfs",
        target: "/tmp",
        fstype: "tmpfs",
        flags: NOSUID_NODEV,
        data: "seclabel,mode=0755,size=128m",
    },
];

/// Mount every entry of [`KERNEL_MOUNTS`] in order, stopping at the first failure.
pub fn mount_kernel_filesystems(kernel: &impl Kernel) -> Result<()> {
    for m in KERNEL_MOUNTS {
        let target = Path::new(m.target);

        kernel
            .create_dir_all(target)
            .with_context(|| format!("Failed to create {}", m.target))?;

        kernel
            .mount(m.source, target, m.fstype, m.flags, m.data)
            .with_context(|| format!("Failed to mount {}", m.target))?;

        debug!("mounted {}", m.target);
    }

    Ok(())
}
