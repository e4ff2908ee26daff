//! Recording kernel for tests

use std::cell::RefCell;
use std::collections::HashSet;
use std::ffi::{CStr, OsStr, OsString};
use std::path::{Path, PathBuf};

use rustix::fs::{Dev, Mode};
use rustix::io::{self, Errno};
use rustix::mount::MountFlags;

use crate::kernel::Kernel;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateDir(PathBuf),
    Mount {
        source: String,
        target: PathBuf,
        fstype: String,
        flags: MountFlags,
        data: String,
    },
    MoveMount {
        from: PathBuf,
        to: PathBuf,
    },
    Unmount(PathBuf),
    Mknod {
        path: PathBuf,
        mode: Mode,
        dev: Dev,
    },
    Symlink {
        target: PathBuf,
        link: PathBuf,
    },
    InitModule {
        image: Vec<u8>,
        params: Vec<u8>,
    },
    Chdir(PathBuf),
    Chroot(PathBuf),
    OpenDir(PathBuf),
    Exec {
        program: PathBuf,
        arg0: OsString,
    },
}

/// Records calls instead of performing them.
///
/// Creating the same directory, node or link twice fails with `EEXIST`, as
/// the real kernel would.
#[derive(Default)]
pub struct FakeKernel {
    calls: RefCell<Vec<Call>>,
    created: RefCell<HashSet<PathBuf>>,
    fail_mount_at: Option<PathBuf>,
    rejected_images: Vec<Vec<u8>>,
}

impl FakeKernel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail any mount whose target is `target`.
    pub fn failing_mount_at(mut self, target: impl Into<PathBuf>) -> Self {
        self.fail_mount_at = Some(target.into());
        self
    }

    /// Reject module images equal to `image`.
    pub fn rejecting_module(mut self, image: &[u8]) -> Self {
        self.rejected_images.push(image.to_vec());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn mounts(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Mount { .. }))
            .collect()
    }

    pub fn module_images(&self) -> Vec<Vec<u8>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::InitModule { image, .. } => Some(image),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn create(&self, path: &Path) -> io::Result<()> {
        if self.created.borrow_mut().insert(path.to_path_buf()) {
            Ok(())
        } else {
            Err(Errno::EXIST)
        }
    }
}

impl Kernel for FakeKernel {
    type DirHandle = ();

    fn create_dir(&self, path: &Path, _mode: Mode) -> io::Result<()> {
        self.record(Call::CreateDir(path.to_path_buf()));
        self.create(path)
    }

    fn mount(
        &self,
        source: &str,
        target: &Path,
        fstype: &str,
        flags: MountFlags,
        data: &str,
    ) -> io::Result<()> {
        self.record(Call::Mount {
            source: source.to_string(),
            target: target.to_path_buf(),
            fstype: fstype.to_string(),
            flags,
            data: data.to_string(),
        });
        if self.fail_mount_at.as_deref() == Some(target) {
            return Err(Errno::NODEV);
        }
        Ok(())
    }

    fn mount_move(&self, from: &Path, to: &Path) -> io::Result<()> {
        self.record(Call::MoveMount {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
        });
        Ok(())
    }

    fn unmount(&self, target: &Path) -> io::Result<()> {
        self.record(Call::Unmount(target.to_path_buf()));
        Ok(())
    }

    fn mknod_char(&self, path: &Path, mode: Mode, dev: Dev) -> io::Result<()> {
        self.record(Call::Mknod {
            path: path.to_path_buf(),
            mode,
            dev,
        });
        self.create(path)
    }

    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()> {
        self.record(Call::Symlink {
            target: target.to_path_buf(),
            link: link.to_path_buf(),
        });
        self.create(link)
    }

    fn init_module(&self, image: &[u8], params: &CStr) -> io::Result<()> {
        self.record(Call::InitModule {
            image: image.to_vec(),
            params: params.to_bytes().to_vec(),
        });
        if self.rejected_images.iter().any(|r| r == image) {
            return Err(Errno::NOEXEC);
        }
        Ok(())
    }

    fn chdir(&self, path: &Path) -> io::Result<()> {
        self.record(Call::Chdir(path.to_path_buf()));
        Ok(())
    }

    fn chroot(&self, path: &Path) -> io::Result<()> {
        self.record(Call::Chroot(path.to_path_buf()));
        Ok(())
    }

    fn open_dir(&self, path: &Path) -> io::Result<()> {
        self.record(Call::OpenDir(path.to_path_buf()));
        Ok(())
    }

    fn exec(&self, program: &Path, arg0: &OsStr) -> std::io::Error {
        self.record(Call::Exec {
            program: program.to_path_buf(),
            arg0: arg0.to_os_string(),
        });
        std::io::Error::from(std::io::ErrorKind::NotFound)
    }
}
