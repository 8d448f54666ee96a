use anyhow::{Context, Error};

use crate::dependencies::Dependency;

/// Installs a Python package system-wide.
pub fn install(package: &str) -> Result<(), Error> {
    Dependency::Pip3
        .cmd()
        .args(["install", package])
        .run_and_check()
        .with_context(|| format!("Failed to install Python package '{package}'"))
}
