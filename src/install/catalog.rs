use anyhow::Error;

/// A user account required by the solution.
pub struct UserSpec {
    pub name: &'static str,
    /// None lets the system assign the next free UID.
    pub uid: Option<u32>,
    /// None disables password login.
    pub password: Option<&'static str>,
    /// None creates a same-named user group (like pi.pi).
    pub primary_group: Option<&'static str>,
    /// Must exist before the account is created.
    pub secondary_groups: &'static [&'static str],
}

/// A directory with declared ownership and permission bits.
pub struct PathSpec {
    pub path: &'static str,
    pub mode: u32,
    pub owner: &'static str,
    pub group: &'static str,
}

/// A source repository cloned into a prepared target directory.
pub struct RepoSpec {
    pub target: PathSpec,
    pub url: &'static str,
    /// Setup script executed inside the clone, when present.
    pub setup_script: Option<&'static str>,
}

pub const USERS: &[UserSpec] = &[UserSpec {
    name: "patemon",
    uid: None,
    password: Some("patemon"),
    primary_group: None,
    secondary_groups: &["dialout"],
}];

/// Group memberships, applied after the accounts exist.
pub const MEMBERSHIPS: &[(&str, &[&str])] = &[
    ("patemon", &["patemon", "dialout", "www-data"]),
    ("www-data", &["www-data", "patemon"]),
];

pub const FILESYSTEM: &[PathSpec] = &[
    PathSpec {
        path: "/srv",
        mode: 0o775,
        owner: "patemon",
        group: "patemon",
    },
    PathSpec {
        path: "/srv/nginx-root",
        mode: 0o755,
        owner: "www-data",
        group: "patemon",
    },
    PathSpec {
        path: "/srv/backend",
        mode: 0o755,
        owner: "patemon",
        group: "patemon",
    },
];

// uwsgi refuses to cooperate as an apt package on the target platform, it is
// installed with pip3 instead.
pub const PACKAGES: &[&str] = &[
    "nginx",
    "build-essential",
    "python3-dev",
    "python3-pip",
    "python3-flask",
    "git-all",
    "sqlite3",
];

pub const PYTHON_PACKAGES: &[&str] = &["uwsgi"];

pub const REPOSITORIES: &[RepoSpec] = &[
    RepoSpec {
        target: PathSpec {
            path: "/srv/pmdatabase",
            mode: 0o755,
            owner: "root",
            group: "root",
        },
        url: "https://github.com/jasata/pmdatabase",
        setup_script: Some("setup.py"),
    },
    RepoSpec {
        target: PathSpec {
            path: "/srv/nginx-root",
            mode: 0o775,
            owner: "www-data",
            group: "www-data",
        },
        url: "https://github.com/jasata/pmapi",
        setup_script: Some("setup.py"),
    },
    RepoSpec {
        target: PathSpec {
            path: "/srv/backend",
            mode: 0o775,
            owner: "patemon",
            group: "patemon",
        },
        url: "https://github.com/jasata/psud",
        setup_script: Some("setup.py"),
    },
];

/// Groups the membership table needs but which neither exist nor will be
/// created as a user group of a catalog account.
pub fn missing_groups(
    group_exists: impl Fn(&str) -> Result<bool, Error>,
) -> Result<Vec<String>, Error> {
    let future_groups: Vec<&str> = USERS
        .iter()
        .filter(|user| user.primary_group.is_none())
        .map(|user| user.name)
        .collect();

    let mut needed: Vec<&str> = Vec::new();
    for (_, groups) in MEMBERSHIPS {
        for group in *groups {
            if !needed.contains(group) {
                needed.push(*group);
            }
        }
    }

    let mut missing = Vec::new();
    for group in needed {
        if !future_groups.contains(&group) && !group_exists(group)? {
            missing.push(group.to_string());
        }
    }
    Ok(missing)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_groups_counts_future_user_groups_as_existing() {
        // 'patemon' has no primary group and will be created as a user group;
        // only the genuinely absent groups are reported.
        let missing = missing_groups(|group| Ok(group == "dialout")).unwrap();
        assert_eq!(missing, vec!["www-data"]);
    }

    #[test]
    fn test_missing_groups_all_present() {
        assert!(missing_groups(|_| Ok(true)).unwrap().is_empty());
    }

    #[test]
    fn test_membership_table_is_covered_by_catalog() {
        // Every secondary group of a catalog user appears in the membership
        // requirement computation.
        for user in USERS {
            for group in user.secondary_groups {
                let required = MEMBERSHIPS
                    .iter()
                    .any(|(name, groups)| *name == user.name && groups.contains(group));
                assert!(required, "secondary group '{group}' not in memberships");
            }
        }
    }
}
