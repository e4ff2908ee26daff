//! Filesystem locations the boot sequence reads from or mounts at

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Layout {
    /// Kernel command line
    pub cmdline: PathBuf,
    /// Directory scanned for `*.ko` files
    pub modules_dir: PathBuf,
    /// Mount point of the root share, becomes `/`
    pub sysroot: PathBuf,
    /// Parent of the extra share mount points
    pub share_base: PathBuf,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            cmdline: PathBuf::from("/proc/cmdline"),
            modules_dir: PathBuf::from("/usr/lib/modules"),
            sysroot: PathBuf::from("/sysroot"),
            share_base: PathBuf::from("/run/mnt"),
        }
    }
}
