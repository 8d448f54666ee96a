use std::path::PathBuf;

/// A requirement that must hold before any side effect is taken. Reported and
/// the process terminates with a non-zero status.
#[derive(Debug, thiserror::Error)]
pub enum PreconditionError {
    #[error("root privileges required")]
    RootRequired,

    #[error("unsupported operating system: {0}")]
    UnsupportedOs(String),

    #[error("'{0}' is already a mount point; unmount it and re-run")]
    MountPointBusy(PathBuf),

    #[error("specified device '{0}' does not exist")]
    DeviceNotFound(PathBuf),

    #[error("no block devices found")]
    NoDevices,

    #[error("no base OS images found in '{0}'")]
    NoImagesFound(PathBuf),

    #[error("missing required group(s): {0}")]
    MissingGroups(String),
}

/// How a successful run ended. An operator abort during an interactive prompt
/// is a clean exit, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitKind {
    Done,
    Aborted,
}
