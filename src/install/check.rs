use std::{fs, os::unix::fs::MetadataExt, path::Path};

use anyhow::Error;
use nix::unistd::{Gid, Uid};

use osutils::users;

use super::catalog::{PathSpec, FILESYSTEM, MEMBERSHIPS};

/// Read-only verification of the installation: prints OK/mismatch per group
/// membership and per filesystem entry without mutating anything.
pub fn run() -> Result<(), Error> {
    println!("Group memberships:");
    for (user, groups) in MEMBERSHIPS {
        println!("{user}");
        for group in *groups {
            let status = match users::group_members(group)? {
                Some(members) if members.iter().any(|m| m == user) => "OK",
                Some(_) => "MISSING!",
                None => "NO SUCH GROUP!",
            };
            println!("{}", render_line(group, status));
        }
    }
    println!();

    println!("Filesystem statuses:");
    for spec in FILESYSTEM {
        println!("{}", render_line(spec.path, &path_status(spec)?));
    }
    Ok(())
}

fn path_status(spec: &PathSpec) -> Result<String, Error> {
    let Some(owner) = users::lookup_user(spec.owner)? else {
        return Ok(format!("Owner '{}' does not exist!", spec.owner));
    };
    let Some(group) = users::lookup_group(spec.group)? else {
        return Ok(format!("Group '{}' does not exist!", spec.group));
    };
    Ok(verify_path(Path::new(spec.path), spec.mode, owner.uid, group.gid).to_string())
}

fn verify_path(path: &Path, mode: u32, uid: Uid, gid: Gid) -> &'static str {
    let Ok(stats) = fs::metadata(path) else {
        return "Does not exist!";
    };
    if stats.mode() & 0o777 != mode {
        "Permission mode NOT OK!"
    } else if stats.uid() != uid.as_raw() {
        "Incorrect owner!"
    } else if stats.gid() != gid.as_raw() {
        "Incorrect group!"
    } else {
        "OK"
    }
}

fn render_line(name: &str, status: &str) -> String {
    format!("    {name:.<20} : {status}")
}
