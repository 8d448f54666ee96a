use std::path::Path;

use anyhow::{bail, Context, Error};
use log::info;

use osutils::{
    apt,
    dependencies::Dependency,
    files, git, locale, osrelease::OsRelease, pip, users,
};
use patemon_api::{
    constants::{LOCAL_TIMEZONE, MODE_MARKER_BOOT_PATH},
    error::{ExitKind, PreconditionError},
    marker,
};

pub mod catalog;
pub mod check;

use catalog::{PathSpec, FILESYSTEM, MEMBERSHIPS, PACKAGES, PYTHON_PACKAGES, REPOSITORIES, USERS};

/// First-boot bootstrap of the provisioned device. Every step is fatal on
/// failure; there is no partial-state rollback.
pub fn execute(check_only: bool) -> Result<ExitKind, Error> {
    if !users::is_effective_root() {
        return Err(PreconditionError::RootRequired.into());
    }
    let release = OsRelease::read()?;
    if !release.is_debian_family() {
        return Err(PreconditionError::UnsupportedOs(release.pretty_name).into());
    }

    if check_only {
        check::run()?;
        return Ok(ExitKind::Done);
    }

    let mode = marker::read(MODE_MARKER_BOOT_PATH)
        .context("Failed to read the installation mode marker")?;
    info!("Installing {mode} instance");

    let missing = catalog::missing_groups(users::group_exists)?;
    if !missing.is_empty() {
        return Err(PreconditionError::MissingGroups(missing.join(", ")).into());
    }

    create_accounts()?;
    assign_memberships()?;

    info!("Setting up initial filesystem ownerships and permissions");
    for spec in FILESYSTEM {
        prepare_directory(spec)?;
    }

    info!("Setting local timezone");
    locale::set_timezone(LOCAL_TIMEZONE)?;

    info!("Updating system packages");
    apt::update()?;
    apt::upgrade()?;
    info!("Installing software packages");
    apt::install(PACKAGES)?;
    for package in PYTHON_PACKAGES {
        pip::install(package)?;
    }

    clone_repositories()?;

    println!("PATE Monitor installation done.");
    Ok(ExitKind::Done)
}

fn create_accounts() -> Result<(), Error> {
    info!("Creating PATE Monitor specific user accounts");
    for spec in USERS {
        if users::user_exists(spec.name)? {
            info!("User '{}' already exists, skipping", spec.name);
            continue;
        }
        for group in spec.secondary_groups {
            if !users::group_exists(group)? {
                bail!(
                    "Cannot create user '{}'! Secondary group '{group}' does not exist",
                    spec.name
                );
            }
        }
        info!("Creating user '{}'", spec.name);
        let hash = spec.password.map(users::hash_password).transpose()?;
        users::create_user(spec.name, hash.as_deref(), spec.uid, spec.primary_group)?;
        for group in spec.secondary_groups {
            users::add_to_group(spec.name, group)?;
        }
    }
    Ok(())
}

fn assign_memberships() -> Result<(), Error> {
    info!("Assigning group memberships");
    for (user, groups) in MEMBERSHIPS {
        for group in *groups {
            // Adding an existing membership is not an error.
            users::add_to_group(user, group)?;
        }
    }
    Ok(())
}

/// Creates the directory when absent, then applies the declared ownership
/// and permission bits. An existing non-directory is an error.
fn prepare_directory(spec: &PathSpec) -> Result<(), Error> {
    let path = Path::new(spec.path);
    if !path.exists() {
        files::create_dirs(path)?;
    } else if !path.is_dir() {
        bail!("'{}' exists and is not a directory", spec.path);
    }

    let Some(owner) = users::lookup_user(spec.owner)? else {
        bail!("Unknown user '{}'", spec.owner);
    };
    let Some(group) = users::lookup_group(spec.group)? else {
        bail!("Unknown group '{}'", spec.group);
    };
    files::chown_path(path, owner.uid, group.gid)?;
    files::set_permissions(path, spec.mode)
}

fn clone_repositories() -> Result<(), Error> {
    info!("Cloning application repositories");
    for repo in REPOSITORIES {
        let path = Path::new(repo.target.path);
        if !path.exists() {
            files::create_dirs(path)?;
        } else if !path.is_dir() {
            bail!("'{}' exists and is not a directory", repo.target.path);
        }

        git::clone_recursive(repo.url, path)?;

        if let Some(script) = repo.setup_script {
            info!("Running '{script}' in '{}'", repo.target.path);
            Dependency::Python3
                .cmd()
                .arg(script)
                .current_dir(path)
                .run_and_check()
                .with_context(|| {
                    format!("Setup script of '{}' failed", repo.url)
                })?;
        }

        prepare_directory(&repo.target)?;
    }
    info!("All repositories cloned");
    Ok(())
}
