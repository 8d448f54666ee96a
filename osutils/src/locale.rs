use std::path::Path;

use anyhow::{Context, Error};
use log::debug;

use crate::{dependencies::Dependency, files};

/// Console keyboard settings, written to /etc/default/keyboard.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyboardConfig {
    pub model: String,
    pub layout: String,
    pub variant: String,
    pub options: String,
}

impl KeyboardConfig {
    fn render(&self) -> String {
        format!(
            "XKBMODEL=\"{}\"\nXKBLAYOUT=\"{}\"\nXKBVARIANT=\"{}\"\nXKBOPTIONS=\"{}\"\n\nBACKSPACE=\"guess\"\n",
            self.model, self.layout, self.variant, self.options
        )
    }
}

/// Switches the system time zone.
pub fn set_timezone(zone: &str) -> Result<(), Error> {
    debug!("Setting time zone to '{zone}'");
    let zoneinfo = Path::new("/usr/share/zoneinfo").join(zone);
    files::symlink_file(&zoneinfo, "/etc/localtime")
        .with_context(|| format!("Failed to set time zone '{zone}'"))?;
    Dependency::DpkgReconfigure
        .cmd()
        .args(["-f", "noninteractive", "tzdata"])
        .run_and_check()
        .context("Failed to reconfigure tzdata")
}

/// Writes the keyboard configuration and applies it to the running console.
pub fn configure_keyboard(config: &KeyboardConfig) -> Result<(), Error> {
    debug!("Configuring keyboard layout '{}'", config.layout);
    files::write_file("/etc/default/keyboard", 0o644, config.render())
        .context("Failed to write keyboard configuration")?;
    Dependency::DpkgReconfigure
        .cmd()
        .args(["-f", "noninteractive", "keyboard-configuration"])
        .run_and_check()
        .context("Failed to reconfigure keyboard-configuration")?;
    Dependency::InvokeRcd
        .cmd()
        .args(["keyboard-setup", "start"])
        .run_and_check()
        .context("Failed to restart keyboard-setup")?;
    Dependency::Setupcon
        .cmd()
        .args(["-k", "--force"])
        .run_and_check()
        .context("Failed to apply console keymap")?;
    Dependency::Udevadm
        .cmd()
        .args(["trigger", "--subsystem-match=input", "--action=change"])
        .run_and_check()
        .context("Failed to trigger udev")
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    #[test]
    fn test_keyboard_render() {
        let config = KeyboardConfig {
            model: "pc105".into(),
            layout: "fi".into(),
            variant: "".into(),
            options: "".into(),
        };
        assert_eq!(
            config.render(),
            indoc! {r#"
                XKBMODEL="pc105"
                XKBLAYOUT="fi"
                XKBVARIANT=""
                XKBOPTIONS=""

                BACKSPACE="guess"
            "#}
        );
    }
}
