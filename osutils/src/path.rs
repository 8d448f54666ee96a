use std::path::{Path, PathBuf};

/// Joins a path onto a root directory, treating an absolute path as relative
/// to that root: join_relative("/mnt", "/etc/hostname") -> "/mnt/etc/hostname".
pub fn join_relative(root: impl AsRef<Path>, path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    root.as_ref()
        .join(path.strip_prefix("/").unwrap_or(path))
}
