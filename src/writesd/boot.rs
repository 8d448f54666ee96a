use std::{fs, path::Path};

use anyhow::{Context, Error};

use osutils::files;
use patemon_api::{
    constants::{INSTALLER_FILENAME, MODE_MARKER_FILENAME, SSH_MARKER_FILENAME},
    marker,
    mode::InstanceMode,
};

use super::report::Report;

/// Stages first-boot inputs into the mounted boot partition: the marker that
/// enables the SSH server, the installer binary and the mode marker the
/// installer reads on first boot.
pub fn stage(
    root: impl AsRef<Path>,
    installer: impl AsRef<Path>,
    mode: InstanceMode,
    report: &mut Report,
) -> Result<(), Error> {
    let root = root.as_ref();

    files::write_file(root.join(SSH_MARKER_FILENAME), 0o644, "")
        .context("Failed to enable SSH server")?;
    report.add("SSH server enabled");

    let target = root.join(INSTALLER_FILENAME);
    fs::copy(installer.as_ref(), &target).with_context(|| {
        format!(
            "Failed to copy installer '{}'",
            installer.as_ref().display()
        )
    })?;
    files::set_permissions(&target, 0o755)?;
    report.add(format!("/boot/{INSTALLER_FILENAME}"));

    marker::write(root.join(MODE_MARKER_FILENAME), mode)?;
    report.add(format!("/boot/{MODE_MARKER_FILENAME}"));

    Ok(())
}
