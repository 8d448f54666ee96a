use anyhow::{Context, Error};
use nix::unistd::{Group, Uid, User};

use crate::dependencies::Dependency;

/// Checks whether the process runs with root privileges.
pub fn is_effective_root() -> bool {
    Uid::effective().is_root()
}

/// Looks up a user account by name.
pub fn lookup_user(name: &str) -> Result<Option<User>, Error> {
    User::from_name(name).with_context(|| format!("Failed to look up user '{name}'"))
}

/// Looks up a group by name.
pub fn lookup_group(name: &str) -> Result<Option<Group>, Error> {
    Group::from_name(name).with_context(|| format!("Failed to look up group '{name}'"))
}

pub fn user_exists(name: &str) -> Result<bool, Error> {
    Ok(lookup_user(name)?.is_some())
}

pub fn group_exists(name: &str) -> Result<bool, Error> {
    Ok(lookup_group(name)?.is_some())
}

/// Returns the names of the members of a group, or None when the group does
/// not exist. Primary members are not listed.
pub fn group_members(name: &str) -> Result<Option<Vec<String>>, Error> {
    Ok(lookup_group(name)?.map(|group| group.mem))
}

/// Hashes a password for /etc/shadow using the platform crypt routine.
pub fn hash_password(password: &str) -> Result<String, Error> {
    let output = Dependency::Openssl
        .cmd()
        .args(["passwd", "-1", password])
        .output_and_check()
        .context("Failed to hash password")?;
    Ok(output.trim().to_string())
}

/// Creates a user account with a home directory. When no primary group is
/// given, a group named after the user is created.
pub fn create_user(
    name: &str,
    password_hash: Option<&str>,
    uid: Option<u32>,
    primary_group: Option<&str>,
) -> Result<(), Error> {
    let mut cmd = Dependency::Useradd.cmd();
    if let Some(hash) = password_hash {
        cmd.args(["--password", hash]);
    }
    if let Some(uid) = uid {
        cmd.args(["--uid", &uid.to_string()]);
    }
    match primary_group {
        Some(group) => {
            cmd.args(["--gid", group]);
        }
        None => {
            cmd.arg("--user-group");
        }
    }
    cmd.arg("--create-home")
        .arg(name)
        .run_and_check()
        .with_context(|| format!("Failed to create user '{name}'"))?;

    // useradd on the target platform leaves the login shell unset, which
    // locks the account out of interactive use.
    Dependency::Usermod
        .cmd()
        .args(["--shell", "/bin/bash", name])
        .run_and_check()
        .with_context(|| format!("Failed to set login shell of '{name}'"))
}

/// Adds a user to a supplementary group.
pub fn add_to_group(user: &str, group: &str) -> Result<(), Error> {
    Dependency::Usermod
        .cmd()
        .args(["-a", "-G", group, user])
        .run_and_check()
        .with_context(|| format!("Failed to add user '{user}' to group '{group}'"))
}
