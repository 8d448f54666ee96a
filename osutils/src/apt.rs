use anyhow::{Context, Error};

use crate::dependencies::Dependency;

fn apt_cmd(action: &str) -> crate::dependencies::Command {
    let mut cmd = Dependency::Apt.cmd();
    cmd.env("DEBIAN_FRONTEND", "noninteractive");
    cmd.args([action, "-y"]);
    cmd
}

/// Refreshes the package index.
pub fn update() -> Result<(), Error> {
    apt_cmd("update")
        .run_and_check()
        .context("Failed to update package index")
}

/// Upgrades all installed packages.
pub fn upgrade() -> Result<(), Error> {
    apt_cmd("upgrade")
        .run_and_check()
        .context("Failed to upgrade packages")
}

/// Installs the given packages.
pub fn install(packages: &[&str]) -> Result<(), Error> {
    apt_cmd("install")
        .args(packages)
        .run_and_check()
        .with_context(|| format!("Failed to install packages: {}", packages.join(", ")))
}
