use std::path::Path;
use std::str::FromStr;

use anyhow::{anyhow, Error};
use configparser::ini::Ini;
use log::{info, warn};

use crate::mode::InstanceMode;

/// Operator configuration for the image writer, read from `writesd.config`.
///
/// The file is optional; every setting has a default. Built once at startup
/// and passed by reference from there on.
#[derive(Debug, Clone, PartialEq)]
pub struct WriterConfig {
    /// Mode used when `--mode` is not given.
    pub default_mode: InstanceMode,

    pub ddns: DdnsConfig,
}

/// Dynamic DNS client settings.
#[derive(Debug, Clone, PartialEq)]
pub struct DdnsConfig {
    pub username: String,
    pub password: String,

    /// Modes for which the DDNS client is installed when neither `--ddns` nor
    /// `--no-ddns` is given.
    pub enabled_modes: Vec<InstanceMode>,
}

impl DdnsConfig {
    pub fn has_credentials(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }

    pub fn enabled_for(&self, mode: InstanceMode) -> bool {
        self.enabled_modes.contains(&mode)
    }
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            default_mode: InstanceMode::Prd,
            ddns: DdnsConfig {
                username: String::new(),
                password: String::new(),
                enabled_modes: vec![InstanceMode::Dev, InstanceMode::Uat],
            },
        }
    }
}

impl WriterConfig {
    /// Loads the configuration file, falling back to defaults when it does
    /// not exist. A malformed file is an error; an unknown default mode is
    /// warned about and ignored.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        if !path.is_file() {
            info!(
                "Configuration file '{}' does not exist, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let mut ini = Ini::new();
        ini.load(path)
            .map_err(|e| anyhow!("Failed to load '{}': {e}", path.display()))?;

        Ok(Self::from_ini(&ini, &path.display().to_string()))
    }

    fn from_ini(ini: &Ini, origin: &str) -> Self {
        let mut config = Self::default();

        if let Some(value) = ini.get("Mode", "default") {
            match InstanceMode::from_str(&value) {
                Ok(mode) => config.default_mode = mode,
                Err(_) => warn!("{origin}: invalid Mode.default value '{value}', ignoring"),
            }
        }

        if let Some(username) = ini.get("DDNS", "username") {
            config.ddns.username = username;
        }
        if let Some(password) = ini.get("DDNS", "password") {
            config.ddns.password = password;
        }
        if let Some(modes) = ini.get("DDNS", "enabled modes") {
            if !modes.is_empty() {
                config.ddns.enabled_modes = parse_mode_list(&modes);
            }
        }

        config
    }
}

/// Parses a comma-separated mode list: whitespace-insensitive, deduplicated,
/// unknown values dropped.
fn parse_mode_list(value: &str) -> Vec<InstanceMode> {
    let mut modes = Vec::new();
    for item in value.split(',') {
        if let Ok(mode) = InstanceMode::from_str(item.trim()) {
            if !modes.contains(&mode) {
                modes.push(mode);
            }
        }
    }
    modes
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    fn parse(content: &str) -> WriterConfig {
        let mut ini = Ini::new();
        ini.read(content.to_string()).unwrap();
        WriterConfig::from_ini(&ini, "test")
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = WriterConfig::load(dir.path().join("writesd.config")).unwrap();
        assert_eq!(config, WriterConfig::default());
        assert!(!config.ddns.has_credentials());
        assert!(config.ddns.enabled_for(InstanceMode::Dev));
        assert!(!config.ddns.enabled_for(InstanceMode::Prd));
    }

    #[test]
    fn test_full_config() {
        let config = parse(indoc! {r#"
            [Mode]
            default = DEV

            [DDNS]
            username = jdoe
            password = hunter2
            enabled modes = dev, UAT, dev, BOGUS
        "#});

        assert_eq!(config.default_mode, InstanceMode::Dev);
        assert_eq!(config.ddns.username, "jdoe");
        assert_eq!(config.ddns.password, "hunter2");
        assert_eq!(
            config.ddns.enabled_modes,
            vec![InstanceMode::Dev, InstanceMode::Uat]
        );
        assert!(config.ddns.has_credentials());
    }

    #[test]
    fn test_invalid_default_mode_is_ignored() {
        let config = parse(indoc! {r#"
            [Mode]
            default = STAGING
        "#});
        assert_eq!(config.default_mode, InstanceMode::Prd);
    }

    #[test]
    fn test_empty_mode_list_keeps_default() {
        let config = parse(indoc! {r#"
            [DDNS]
            enabled modes =
        "#});
        assert_eq!(
            config.ddns.enabled_modes,
            vec![InstanceMode::Dev, InstanceMode::Uat]
        );
    }
}
