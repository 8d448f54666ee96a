use std::{
    fs::{self, OpenOptions, Permissions},
    io::Write,
    os::unix::fs::{FileTypeExt, MetadataExt, PermissionsExt},
    path::Path,
};

use anyhow::{bail, Context, Error};
use nix::unistd::{Gid, Uid};

/// Creates an empty file, truncating it if it already exists.
pub fn create_file(path: impl AsRef<Path>) -> Result<fs::File, Error> {
    let path = path.as_ref();
    fs::File::create(path)
        .with_context(|| format!("Failed to create file '{}'", path.display()))
}

/// Creates all missing directories of a path.
pub fn create_dirs(path: impl AsRef<Path>) -> Result<(), Error> {
    let path = path.as_ref();
    fs::create_dir_all(path)
        .with_context(|| format!("Failed to create directory '{}'", path.display()))
}

/// Writes a file with the given permission bits, truncating existing content.
pub fn write_file(
    path: impl AsRef<Path>,
    mode: u32,
    contents: impl AsRef<[u8]>,
) -> Result<(), Error> {
    let path = path.as_ref();
    let mut file = create_file(path)?;
    file.write_all(contents.as_ref())
        .with_context(|| format!("Failed to write file '{}'", path.display()))?;
    set_permissions(path, mode)
}

/// Sets the permission bits of an existing path.
pub fn set_permissions(path: impl AsRef<Path>, mode: u32) -> Result<(), Error> {
    let path = path.as_ref();
    fs::set_permissions(path, Permissions::from_mode(mode)).with_context(|| {
        format!(
            "Failed to set permissions {mode:o} on '{}'",
            path.display()
        )
    })
}

/// Appends to a file. When `must_exist` is set, a missing file is an error
/// instead of being created.
pub fn append_file(
    path: impl AsRef<Path>,
    must_exist: bool,
    contents: impl AsRef<[u8]>,
) -> Result<(), Error> {
    let path = path.as_ref();
    if must_exist && !path.is_file() {
        bail!("File '{}' does not exist", path.display());
    }
    let mut file = OpenOptions::new()
        .append(true)
        .create(!must_exist)
        .open(path)
        .with_context(|| format!("Failed to open file '{}'", path.display()))?;
    file.write_all(contents.as_ref())
        .with_context(|| format!("Failed to append to file '{}'", path.display()))
}

/// Truncates a file to zero length, creating it when missing.
pub fn truncate_file(path: impl AsRef<Path>) -> Result<(), Error> {
    create_file(path).map(|_| ())
}

/// Reads a file as a string with surrounding whitespace removed.
pub fn read_file_trim(path: impl AsRef<Path>) -> Result<String, Error> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file '{}'", path.display()))?;
    Ok(content.trim().to_string())
}

/// Changes the owner of a path.
pub fn chown_path(path: impl AsRef<Path>, uid: Uid, gid: Gid) -> Result<(), Error> {
    let path = path.as_ref();
    nix::unistd::chown(path, Some(uid), Some(gid))
        .with_context(|| format!("Failed to change owner of '{}'", path.display()))
}

/// Returns the owning uid and gid of a path.
pub fn owner_ids(path: impl AsRef<Path>) -> Result<(Uid, Gid), Error> {
    let path = path.as_ref();
    let metadata = fs::metadata(path)
        .with_context(|| format!("Failed to stat '{}'", path.display()))?;
    Ok((
        Uid::from_raw(metadata.uid()),
        Gid::from_raw(metadata.gid()),
    ))
}

/// Whether the path exists and is a block special device.
pub fn is_block_device(path: impl AsRef<Path>) -> bool {
    fs::metadata(path.as_ref())
        .map(|metadata| metadata.file_type().is_block_device())
        .unwrap_or(false)
}

/// Creates a symlink, replacing an existing file or link at the destination.
pub fn symlink_file(target: impl AsRef<Path>, link: impl AsRef<Path>) -> Result<(), Error> {
    let target = target.as_ref();
    let link = link.as_ref();
    if link.symlink_metadata().is_ok() {
        fs::remove_file(link)
            .with_context(|| format!("Failed to remove existing '{}'", link.display()))?;
    }
    std::os::unix::fs::symlink(target, link).with_context(|| {
        format!(
            "Failed to link '{}' to '{}'",
            link.display(),
            target.display()
        )
    })
}
