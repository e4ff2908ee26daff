//! Kernel operations used during boot

use std::ffi::{CStr, OsStr};
use std::os::fd::OwnedFd;
use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::Command;

use rustix::fs::{Dev, FileType, Mode, OFlags, CWD};
use rustix::io::{self, Errno};
use rustix::mount::{MountFlags, UnmountFlags};

/// Every call the boot sequence makes that changes kernel state.
///
/// The production implementation is [`Linux`]; tests substitute a recorder.
pub trait Kernel {
    /// Handle keeping a directory open until dropped.
    type DirHandle;

    fn create_dir(&self, path: &Path, mode: Mode) -> io::Result<()>;

    fn mount(
        &self,
        source: &str,
        target: &Path,
        fstype: &str,
        flags: MountFlags,
        data: &str,
    ) -> io::Result<()>;

    /// Atomically move the mount at `from` to `to`.
    fn mount_move(&self, from: &Path, to: &Path) -> io::Result<()>;

    fn unmount(&self, target: &Path) -> io::Result<()>;

    fn mknod_char(&self, path: &Path, mode: Mode, dev: Dev) -> io::Result<()>;

    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()>;

    /// Hand a module image to the kernel with the given parameter string.
    fn init_module(&self, image: &[u8], params: &CStr) -> io::Result<()>;

    fn chdir(&self, path: &Path) -> io::Result<()>;

    fn chroot(&self, path: &Path) -> io::Result<()>;

    fn open_dir(&self, path: &Path) -> io::Result<Self::DirHandle>;

    /// Replace the current process image. Only returns on failure.
    fn exec(&self, program: &Path, arg0: &OsStr) -> std::io::Error;

    /// Create `path` and any missing parents with mode 0755.
    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut dirs: Vec<&Path> = path
            .ancestors()
            .filter(|p| !p.as_os_str().is_empty() && *p != Path::new("/"))
            .collect();
        dirs.reverse();

        for dir in dirs {
            ignore_exists(self.create_dir(dir, Mode::from_raw_mode(0o755)))?;
        }
        Ok(())
    }
}

/// Treat `EEXIST` as success.
pub fn ignore_exists(result: io::Result<()>) -> io::Result<()> {
    result.or_else(|e| if e == Errno::EXIST { Ok(()) } else { Err(e) })
}

/// The running Linux kernel.
pub struct Linux;

impl Kernel for Linux {
    type DirHandle = OwnedFd;

    fn create_dir(&self, path: &Path, mode: Mode) -> io::Result<()> {
        rustix::fs::mkdir(path, mode)
    }

    fn mount(
        &self,
        source: &str,
        target: &Path,
        fstype: &str,
        flags: MountFlags,
        data: &str,
    ) -> io::Result<()> {
        rustix::mount::mount(source, target, fstype, flags, data)
    }

    fn mount_move(&self, from: &Path, to: &Path) -> io::Result<()> {
        rustix::mount::mount_move(from, to)
    }

    fn unmount(&self, target: &Path) -> io::Result<()> {
        rustix::mount::unmount(target, UnmountFlags::empty())
    }

    fn mknod_char(&self, path: &Path, mode: Mode, dev: Dev) -> io::Result<()> {
        rustix::fs::mknodat(CWD, path, FileType::CharacterDevice, mode, dev)
    }

    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()> {
        rustix::fs::symlinkat(target, CWD, link)
    }

    fn init_module(&self, image: &[u8], params: &CStr) -> io::Result<()> {
        rustix::system::init_module(image, params)
    }

    fn chdir(&self, path: &Path) -> io::Result<()> {
        rustix::process::chdir(path)
    }

    fn chroot(&self, path: &Path) -> io::Result<()> {
        rustix::process::chroot(path)
    }

    fn open_dir(&self, path: &Path) -> io::Result<OwnedFd> {
        rustix::fs::open(
            path,
            OFlags::RDONLY | OFlags::DIRECTORY | OFlags::CLOEXEC,
            Mode::empty(),
        )
    }

    fn exec(&self, program: &Path, arg0: &OsStr) -> std::io::Error {
        Command::new(program).arg0(arg0).exec()
    }
}
