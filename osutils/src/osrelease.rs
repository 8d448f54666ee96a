use std::path::Path;

use anyhow::{Context, Error};

use crate::files;

const OS_RELEASE_PATH: &str = "/etc/os-release";

/// Identity of the running distribution, parsed from /etc/os-release.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OsRelease {
    pub id: String,
    pub id_like: Vec<String>,
    pub pretty_name: String,
}

impl OsRelease {
    pub fn read() -> Result<Self, Error> {
        Self::read_from(OS_RELEASE_PATH)
    }

    pub fn read_from(path: impl AsRef<Path>) -> Result<Self, Error> {
        let content = files::read_file_trim(path.as_ref())
            .context("Failed to read OS release information")?;
        Ok(Self::parse(&content))
    }

    fn parse(content: &str) -> Self {
        let mut release = Self::default();
        for line in content.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim().trim_matches('"');
            match key.trim() {
                "ID" => release.id = value.to_string(),
                "ID_LIKE" => {
                    release.id_like =
                        value.split_whitespace().map(str::to_string).collect()
                }
                "PRETTY_NAME" => release.pretty_name = value.to_string(),
                _ => {}
            }
        }
        release
    }

    /// Whether the distribution is Debian or one of its derivatives.
    pub fn is_debian_family(&self) -> bool {
        self.id == "debian" || self.id_like.iter().any(|like| like == "debian")
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    #[test]
    fn test_parse_raspbian() {
        let release = OsRelease::parse(indoc! {r#"
            PRETTY_NAME="Raspbian GNU/Linux 9 (stretch)"
            NAME="Raspbian GNU/Linux"
            VERSION_ID="9"
            ID=raspbian
            ID_LIKE=debian
            HOME_URL="http://www.raspbian.org/"
        "#});
        assert_eq!(release.id, "raspbian");
        assert_eq!(release.id_like, vec!["debian"]);
        assert_eq!(release.pretty_name, "Raspbian GNU/Linux 9 (stretch)");
        assert!(release.is_debian_family());
    }

    #[test]
    fn test_parse_non_debian() {
        let release = OsRelease::parse(indoc! {r#"
            ID=fedora
            ID_LIKE="rhel centos"
        "#});
        assert!(!release.is_debian_family());
    }
}
