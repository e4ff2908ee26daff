//! Static device nodes and standard stream links in /dev

use anyhow::{Context, Result};
use rustix::fs::{makedev, Mode};
use std::path::Path;
use tracing::debug;

use crate::kernel::{ignore_exists, Kernel};

/// Character device node to create
pub struct DeviceSpec {
    pub path: &'static str,
    pub major: u32,
    pub minor: u32,
    pub mode: u32,
}

/// Symbolic link to create
pub struct SymlinkSpec {
    pub link: &'static str,
    pub target: &'static str,
}

const DEV_DIR: &str = "/dev";

pub const DEVICES: &[DeviceSpec] = &[
    DeviceSpec {
        path: "/dev/kvm",
        major: 10,
        minor: 232,
        mode: 0o660,
    },
    DeviceSpec {
        path: "/dev/loop-control",
        major: 10,
        minor: 237,
        mode: 0o660,
    },
    DeviceSpec {
        path: "/dev/fuse",
        major: 10,
        minor: 229,
        mode: 0o666,
    },
];

pub const SYMLINKS: &[SymlinkSpec] = &[
    SymlinkSpec {
        link: "/dev/fd",
        target: "/proc/self/fd",
    },
    SymlinkSpec {
        link: "/dev/stdin",
        target: "/proc/self/fd/0",
    },
    SymlinkSpec {
        link: "/dev/stdout",
        target: "/proc/self/fd/1",
    },
    SymlinkSpec {
        link: "/dev/stderr",
        target: "/proc/self/fd/2",
    },
];

/// Create the static device nodes and links. Existing entries are left alone.
pub fn create_static_devices(kernel: &impl Kernel) -> Result<()> {
    debug!("creating static device nodes");

    for dev in DEVICES {
        let path = Path::new(dev.path);
        debug!("creating {}", dev.path);

        if let Some(parent) = path.parent() {
            if parent != Path::new(DEV_DIR) {
                kernel
                    .create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }

        ignore_exists(kernel.mknod_char(
            path,
            Mode::from_raw_mode(dev.mode),
            makedev(dev.major, dev.minor),
        ))
        .with_context(|| format!("Failed to create device {}", dev.path))?;
    }

    for link in SYMLINKS {
        debug!("creating {}", link.link);
        ignore_exists(kernel.symlink(Path::new(link.target), Path::new(link.link)))
            .with_context(|| format!("Failed to create symlink {}", link.link))?;
    }

    Ok(())
}
