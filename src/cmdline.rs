//! Kernel cmdline parser for boot options

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Share tag used for the root filesystem when `rootfs=` is absent.
pub const DEFAULT_ROOTFS_TAG: &str = "rootfs";

/// Program executed after the root switch when `init=` is absent.
pub const DEFAULT_INIT: &str = "/bin/sh";

/// Additional virtiofs share requested with `mount=` or `mount-ro=`
#[derive(Debug, Clone, PartialEq)]
pub struct ExtraMount {
    /// Virtiofs tag to mount
    pub tag: String,
    /// Whether the share is mounted read-only
    pub read_only: bool,
}

/// Parsed boot configuration from kernel cmdline
#[derive(Debug, PartialEq)]
pub struct BootOptions {
    /// Emit step-by-step diagnostics
    pub debug: bool,
    /// Virtiofs tag of the root filesystem
    pub rootfs_tag: String,
    /// Program to execute in the new root
    pub init: PathBuf,
    /// Additional shares, in cmdline order
    pub extra_mounts: Vec<ExtraMount>,
}

impl Default for BootOptions {
    fn default() -> Self {
        Self {
            debug: false,
            rootfs_tag: DEFAULT_ROOTFS_TAG.to_string(),
            init: PathBuf::from(DEFAULT_INIT),
            extra_mounts: Vec::new(),
        }
    }
}

/// Parse kernel cmdline into BootOptions
///
/// Supports: debug, rootfs=TAG, init=PATH, mount=TAG, mount-ro=TAG.
/// Unknown parameters are ignored.
pub fn parse_cmdline(cmdline: &str) -> BootOptions {
    let mut options = BootOptions {
        debug: lookup(cmdline, "debug").is_some(),
        ..BootOptions::default()
    };

    if let Some(tag) = lookup(cmdline, "rootfs").filter(|v| !v.is_empty()) {
        options.rootfs_tag = tag.to_string();
    }
    if let Some(init) = lookup(cmdline, "init").filter(|v| !v.is_empty()) {
        options.init = PathBuf::from(init);
    }

    for param in cmdline.split_whitespace() {
        let (tag, read_only) = if let Some(tag) = param.strip_prefix("mount=") {
            (tag, false)
        } else if let Some(tag) = param.strip_prefix("mount-ro=") {
            (tag, true)
        } else {
            continue;
        };

        if !tag.is_empty() {
            options.extra_mounts.push(ExtraMount {
                tag: tag.to_string(),
                read_only,
            });
        }
    }

    options
}

/// Value of the first parameter named `key`.
///
/// A bare `key` yields an empty value.
fn lookup<'a>(cmdline: &'a str, key: &str) -> Option<&'a str> {
    cmdline.split_whitespace().find_map(|param| {
        if param == key {
            return Some("");
        }
        param.strip_prefix(key)?.strip_prefix('=')
    })
}

/// Read kernel cmdline from `path` (normally /proc/cmdline)
pub fn read_cmdline(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))
        .map(|s| s.trim().to_string())
}
