use std::{fs, path::Path};

use anyhow::{Context, Error};

use osutils::{files, path::join_relative};
use patemon_api::constants::TARGET_USER_HOME;

use super::{ddns, report::Report};

const HOSTNAME_PATH: &str = "/etc/hostname";

// Git-aware prompt appended to the target user's .bashrc.
const BASH_PROMPT_SNIPPET: &str = r#"


git_status() {
    STATUS=$(git status 2>/dev/null |
    awk '
    /^On branch / {printf($3)}
    /^You are currently rebasing/ {printf("rebasing %s", $6)}
    /^Initial commit/ {printf(" (init)")}
    /^Untracked files/ {printf("|+")}
    /^Changes not staged / {printf("|?")}
    /^Changes to be committed/ {printf("|*")}
    /^Your branch is ahead of/ {printf("|^")}
    ')
    [ -n "$STATUS" ] &&  echo -ne " [$STATUS]"
}

PS1='\[\033[0;32m\]\[\033[0m\033[0;32m\]\u\[\033[0;36m\]@\h:\w\[\033[0;32m\]$(git_status)\[\033[0m\033[0;32m\] \$\[\033[0m\033[0;32m\]\[\033[0m\] '
"#;

pub struct Options<'a> {
    pub ddns: bool,
    pub ddns_username: &'a str,
    pub ddns_password: &'a str,
    /// Directory holding the key material to copy, typically `<asset dir>/ssh`.
    /// None suppresses the copy entirely (`--no-keys`).
    pub key_dir: Option<&'a Path>,
}

/// Applies the system-partition customizations while it is mounted: clear
/// the hostname so a DHCP-assigned name is accepted, optionally stage the
/// DDNS client, customize the target user's shell prompt and copy SSH key
/// material preserving the user's ownership.
pub fn stage(
    root: impl AsRef<Path>,
    options: &Options,
    report: &mut Report,
) -> Result<(), Error> {
    let root = root.as_ref();

    files::truncate_file(join_relative(root, HOSTNAME_PATH))
        .context("Failed to clear hostname")?;
    report.add("/etc/hostname cleared");

    if options.ddns {
        let msg = ddns::install(root, options.ddns_username, options.ddns_password)?;
        report.add(msg);
    }

    let home = join_relative(root, TARGET_USER_HOME);
    files::append_file(home.join(".bashrc"), true, BASH_PROMPT_SNIPPET)
        .context("Failed to customise Bash prompt")?;
    report.add("User 'pi' Bash prompt customised");

    if let Some(key_dir) = options.key_dir {
        match copy_ssh_keys(&home, key_dir).context("Failed to copy SSH keys")? {
            Some(copied) => report.add(format!("SSH keys copied: {}", copied.join(", "))),
            None => report.add(format!(
                "No SSH keys copied. '{}' does not exist.",
                key_dir.display()
            )),
        }
    }

    Ok(())
}

/// Copies the files of `key_dir` into `<home>/.ssh`, owned like the home
/// directory itself. Returns the copied names, or None when the source
/// directory does not exist.
fn copy_ssh_keys(home: &Path, key_dir: &Path) -> Result<Option<Vec<String>>, Error> {
    if !key_dir.is_dir() {
        return Ok(None);
    }

    let (uid, gid) = files::owner_ids(home)?;
    let target = home.join(".ssh");
    if !target.is_dir() {
        files::create_dirs(&target)?;
        files::set_permissions(&target, 0o755)?;
        files::chown_path(&target, uid, gid)?;
    }

    let mut copied = Vec::new();
    for entry in fs::read_dir(key_dir)
        .with_context(|| format!("Failed to read directory '{}'", key_dir.display()))?
    {
        let entry = entry?;
        if !entry.path().is_file() {
            continue;
        }
        let destination = target.join(entry.file_name());
        fs::copy(entry.path(), &destination)
            .with_context(|| format!("Failed to copy '{}'", entry.path().display()))?;
        files::chown_path(&destination, uid, gid)?;
        copied.push(entry.file_name().to_string_lossy().into_owned());
    }
    copied.sort();
    Ok(Some(copied))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_system_root() -> tempfile::TempDir {
        let dir = tempfile::TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("etc/systemd/system/multi-user.target.wants"))
            .unwrap();
        fs::write(dir.path().join("etc/hostname"), "raspberrypi\n").unwrap();
        fs::create_dir_all(dir.path().join("home/pi")).unwrap();
        fs::write(dir.path().join("home/pi/.bashrc"), "# original\n").unwrap();
        dir
    }

    #[test]
    fn test_stage_with_ddns_and_keys() {
        let root = fake_system_root();
        let keys = tempfile::TempDir::new().unwrap();
        fs::write(keys.path().join("id_rsa"), "key").unwrap();
        fs::write(keys.path().join("id_rsa.pub"), "pub").unwrap();

        let mut report = Report::new("/dev/mmcblk0");
        stage(
            root.path(),
            &Options {
                ddns: true,
                ddns_username: "jdoe",
                ddns_password: "hunter2",
                key_dir: Some(keys.path()),
            },
            &mut report,
        )
        .unwrap();

        assert_eq!(
            fs::metadata(root.path().join("etc/hostname")).unwrap().len(),
            0
        );

        let bashrc = fs::read_to_string(root.path().join("home/pi/.bashrc")).unwrap();
        assert!(bashrc.starts_with("# original\n"));
        assert!(bashrc.contains("git_status()"));
        assert!(bashrc.contains("PS1="));

        assert_eq!(
            fs::read_to_string(root.path().join("home/pi/.ssh/id_rsa")).unwrap(),
            "key"
        );

        let summary = report.render();
        assert!(summary.contains("  - /etc/hostname cleared\n"));
        assert!(summary.contains("  - DDNS client installed\n"));
        assert!(summary.contains("  - User 'pi' Bash prompt customised\n"));
        assert!(summary.contains("  - SSH keys copied: id_rsa, id_rsa.pub\n"));
    }

    #[test]
    fn test_stage_without_ddns_or_key_material() {
        let root = fake_system_root();
        let missing = root.path().join("no-such-dir");
        let mut report = Report::new("/dev/mmcblk0");
        stage(
            root.path(),
            &Options {
                ddns: false,
                ddns_username: "",
                ddns_password: "",
                key_dir: Some(missing.as_path()),
            },
            &mut report,
        )
        .unwrap();

        let summary = report.render();
        assert!(!summary.contains("DDNS"));
        assert!(summary.contains("No SSH keys copied."));
        assert!(!root.path().join("usr/local/bin/dynudns.sh").exists());
    }

    #[test]
    fn test_missing_bashrc_is_an_error() {
        let root = fake_system_root();
        fs::remove_file(root.path().join("home/pi/.bashrc")).unwrap();

        let mut report = Report::new("/dev/mmcblk0");
        let error = stage(
            root.path(),
            &Options {
                ddns: false,
                ddns_username: "",
                ddns_password: "",
                key_dir: None,
            },
            &mut report,
        )
        .unwrap_err();
        assert!(error.to_string().contains("Failed to customise Bash prompt"));

        // Earlier steps are still reported.
        assert!(report.render().contains("/etc/hostname cleared"));
    }
}
