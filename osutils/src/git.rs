use std::path::Path;

use anyhow::{Context, Error};

use crate::dependencies::Dependency;

/// Clones a repository with its submodules.
pub fn clone_recursive(url: &str, destination: impl AsRef<Path>) -> Result<(), Error> {
    let destination = destination.as_ref();
    Dependency::Git
        .cmd()
        .args(["clone", "--recurse-submodules", url])
        .arg(destination)
        .run_and_check()
        .with_context(|| {
            format!(
                "Failed to clone '{url}' into '{}'",
                destination.display()
            )
        })
}
