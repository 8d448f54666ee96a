use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Error};
use log::{debug, warn};

use crate::dependencies::{Dependency, DependencyError};

/// Mounts a partition on the given directory.
pub fn mount(source: impl AsRef<Path>, mount_dir: impl AsRef<Path>) -> Result<(), Error> {
    let source = source.as_ref();
    let mount_dir = mount_dir.as_ref();
    debug!(
        "Mounting '{}' on '{}'",
        source.display(),
        mount_dir.display()
    );
    Dependency::Mount
        .cmd()
        .arg(source)
        .arg(mount_dir)
        .run_and_check()
        .with_context(|| {
            format!(
                "Failed to mount '{}' on '{}'",
                source.display(),
                mount_dir.display()
            )
        })
}

/// Unmounts the given directory.
pub fn umount(mount_dir: impl AsRef<Path>) -> Result<(), Error> {
    let mount_dir = mount_dir.as_ref();
    debug!("Unmounting '{}'", mount_dir.display());
    Dependency::Umount
        .cmd()
        .arg(mount_dir)
        .run_and_check()
        .with_context(|| format!("Failed to unmount '{}'", mount_dir.display()))
}

/// Checks whether a path is currently a mount point.
pub fn is_mountpoint(path: impl AsRef<Path>) -> Result<bool, Error> {
    let result = Dependency::Mountpoint
        .cmd()
        .arg("-q")
        .arg(path.as_ref())
        .run_and_check();
    match result {
        Ok(()) => Ok(true),
        Err(e) => match *e {
            DependencyError::ExecutionFailed { .. } => Ok(false),
            _ => Err(e).context("Failed to execute mountpoint"),
        },
    }
}

/// Checks that a directory is usable as a mount point: it must either not
/// exist yet (it is then created) or be an empty directory with nothing
/// mounted on it.
pub fn ensure_mount_directory(mount_dir: impl AsRef<Path>) -> Result<(), Error> {
    let mount_dir = mount_dir.as_ref();
    if !mount_dir.exists() {
        fs::create_dir_all(mount_dir).with_context(|| {
            format!(
                "Failed to create mount directory '{}'",
                mount_dir.display()
            )
        })?;
        return Ok(());
    }

    if !mount_dir.is_dir() {
        bail!("Mount path '{}' is not a directory", mount_dir.display());
    }

    if is_mountpoint(mount_dir)? {
        bail!(
            "Mount directory '{}' already has a filesystem mounted on it",
            mount_dir.display()
        );
    }

    let occupied = fs::read_dir(mount_dir)
        .with_context(|| format!("Failed to read directory '{}'", mount_dir.display()))?
        .next()
        .is_some();
    if occupied {
        bail!("Mount directory '{}' is not empty", mount_dir.display());
    }

    Ok(())
}

/// Unmounts the tracked directory when dropped.
pub struct MountGuard {
    mount_dir: PathBuf,
}

impl Drop for MountGuard {
    fn drop(&mut self) {
        if let Err(e) = umount(&self.mount_dir) {
            warn!("Failed to unmount '{}': {e:#}", self.mount_dir.display());
        }
    }
}

/// Mounts a partition, runs the closure with the mount directory and unmounts
/// again, also when the closure fails.
pub fn with_mount<T>(
    source: impl AsRef<Path>,
    mount_dir: impl AsRef<Path>,
    f: impl FnOnce(&Path) -> Result<T, Error>,
) -> Result<T, Error> {
    let mount_dir = mount_dir.as_ref();
    mount(source, mount_dir)?;
    let _guard = MountGuard {
        mount_dir: mount_dir.to_path_buf(),
    };
    f(mount_dir)
}
