use std::path::Path;
use std::str::FromStr;

use anyhow::{anyhow, Context, Error};
use configparser::ini::Ini;

use crate::mode::InstanceMode;

const MARKER_SECTION: &str = "Config";
const MARKER_KEY: &str = "mode";

/// Writes the mode marker file, a single-section key/value file:
///
/// ```ini
/// [Config]
/// mode = DEV
/// ```
pub fn write(path: impl AsRef<Path>, mode: InstanceMode) -> Result<(), Error> {
    let mut ini = Ini::new();
    ini.set(MARKER_SECTION, MARKER_KEY, Some(mode.name().to_string()));
    ini.write(path.as_ref()).context(format!(
        "Failed to write mode marker '{}'",
        path.as_ref().display()
    ))
}

/// Reads the instance mode back from a marker file written by [`write`].
pub fn read(path: impl AsRef<Path>) -> Result<InstanceMode, Error> {
    let mut ini = Ini::new();
    ini.load(path.as_ref()).map_err(|e| {
        anyhow!(
            "Failed to load mode marker '{}': {e}",
            path.as_ref().display()
        )
    })?;

    let value = ini
        .get(MARKER_SECTION, MARKER_KEY)
        .ok_or_else(|| anyhow!("Mode marker has no '{MARKER_KEY}' entry"))?;

    InstanceMode::from_str(&value)
        .map_err(|_| anyhow!("Mode marker contains unknown mode '{value}'"))
}
