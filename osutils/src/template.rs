use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Error};

use crate::{files, path::join_relative, users};

/// A configuration file rendered from an inline template and installed into
/// a target filesystem tree.
///
/// Placeholders use the `{{name}}` form and are substituted with `render()`.
#[derive(Debug, Clone)]
pub struct TemplateFile {
    path: PathBuf,
    mode: u32,
    owner: Option<(String, String)>,
    content: String,
}

impl TemplateFile {
    pub fn new(path: impl Into<PathBuf>, mode: u32, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mode,
            owner: None,
            content: content.into(),
        }
    }

    /// Sets the owner the installed file is chowned to. Both names are
    /// resolved on the host at install time.
    pub fn owned_by(mut self, user: &str, group: &str) -> Self {
        self.owner = Some((user.to_string(), group.to_string()));
        self
    }

    /// Substitutes a `{{name}}` placeholder.
    pub fn render(mut self, placeholder: &str, value: &str) -> Self {
        self.content = self.content.replace(&format!("{{{{{placeholder}}}}}"), value);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Writes the rendered file under the given root directory.
    pub fn install(&self, root: impl AsRef<Path>) -> Result<(), Error> {
        let destination = join_relative(root, &self.path);
        if let Some(parent) = destination.parent() {
            files::create_dirs(parent)?;
        }
        files::write_file(&destination, self.mode, &self.content)
            .with_context(|| format!("Failed to install '{}'", self.path.display()))?;

        if let Some((user, group)) = &self.owner {
            let Some(user) = users::lookup_user(user)? else {
                bail!("Unknown user '{user}'");
            };
            let Some(group) = users::lookup_group(group)? else {
                bail!("Unknown group '{group}'");
            };
            files::chown_path(&destination, user.uid, group.gid)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, os::unix::fs::PermissionsExt};

    use super::*;

    #[test]
    fn test_render_and_install() {
        let dir = tempfile::TempDir::new().unwrap();

        let template = TemplateFile::new(
            "/etc/sample/sample.conf",
            0o640,
            "user = {{user}}\npass = {{pass}}\n",
        )
        .render("user", "jdoe")
        .render("pass", "hunter2");

        assert_eq!(template.content(), "user = jdoe\npass = hunter2\n");

        template.install(dir.path()).unwrap();
        let installed = dir.path().join("etc/sample/sample.conf");
        assert_eq!(
            fs::read_to_string(&installed).unwrap(),
            "user = jdoe\npass = hunter2\n"
        );
        assert_eq!(
            fs::metadata(&installed).unwrap().permissions().mode() & 0o777,
            0o640
        );
    }

    #[test]
    fn test_unrendered_placeholders_are_kept() {
        let template = TemplateFile::new("/etc/x", 0o644, "a = {{a}}\n").render("b", "2");
        assert_eq!(template.content(), "a = {{a}}\n");
    }

    #[test]
    fn test_unknown_owner_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = TemplateFile::new("/etc/x", 0o644, "")
            .owned_by("no-such-user-here", "root")
            .install(dir.path());
        assert!(result.unwrap_err().to_string().contains("Unknown user"));
    }
}
