use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Error};
use log::info;

use crate::dependencies::Dependency;

/// Streams an image file onto a block device. Blocks until the data has been
/// flushed to the device.
pub fn write_image(image: impl AsRef<Path>, device: impl AsRef<Path>) -> Result<(), Error> {
    let image = image.as_ref();
    let device = device.as_ref();
    info!(
        "Writing '{}' to '{}'",
        image.display(),
        device.display()
    );
    Dependency::Dd
        .cmd()
        .arg(format!("if={}", image.display()))
        .arg(format!("of={}", device.display()))
        .arg("bs=4M")
        .arg("conv=fsync")
        .run_and_check()
        .with_context(|| {
            format!(
                "Failed to write '{}' to '{}'",
                image.display(),
                device.display()
            )
        })
}

/// Lists the image files of a directory, sorted by name.
pub fn find_images(dir: impl AsRef<Path>, extension: &str) -> Result<Vec<PathBuf>, Error> {
    let dir = dir.as_ref();
    let mut images: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory '{}'", dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file() && path.extension().is_some_and(|ext| ext == extension)
        })
        .collect();
    images.sort();
    Ok(images)
}
