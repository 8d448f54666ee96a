use std::path::Path;

use anyhow::{Context, Error};
use log::info;

use osutils::{
    apt,
    dependencies::Dependency,
    files, git,
    locale::{self, KeyboardConfig},
    users,
};
use patemon_api::{
    constants::{LOCAL_TIMEZONE, TARGET_USER},
    error::{ExitKind, PreconditionError},
};

pub mod templates;

use templates::{
    NGINX_SITE_LINK, NGINX_SITE_PATH, SITE_REPO_URL, SITE_ROOT, UWSGI_APP_LINK, UWSGI_APP_PATH,
};

const PACKAGES: &[&str] = &[
    "nginx",
    "build-essential",
    "python3-dev",
    "python3-pip",
    "python3-flask",
    "git",
    "sqlite3",
    "uwsgi",
    "uwsgi-plugin-python3",
];

const TLS_CERT_PATH: &str = "/etc/ssl/certs/vm.utu.fi.pem";
const TLS_KEY_PATH: &str = "/etc/ssl/private/vm.utu.fi.key";

const DATABASE_SCRIPT: &str = "create.sql";
const DATABASE_FILE: &str = "application.sqlite3";

/// Provisions the vm.utu.fi development VM: localization, web stack,
/// templated nginx/uwsgi/Flask configuration, self-signed TLS certificate,
/// site repository clone and the application database. Any failure is fatal.
pub fn execute() -> Result<ExitKind, Error> {
    if !users::is_effective_root() {
        return Err(PreconditionError::RootRequired.into());
    }

    info!("Setting Finnish localtime");
    locale::set_timezone(LOCAL_TIMEZONE)?;

    info!("Setting Finnish keymap");
    locale::configure_keyboard(&KeyboardConfig {
        model: "pc105".into(),
        layout: "fi".into(),
        variant: String::new(),
        options: String::new(),
    })?;

    info!("Updating system packages");
    apt::update()?;
    apt::upgrade()?;
    info!("Installing software packages");
    apt::install(PACKAGES)?;

    info!("Adding user 'www-data' to group '{TARGET_USER}'");
    users::add_to_group("www-data", TARGET_USER)?;

    info!("Creating {SITE_ROOT}");
    files::create_dirs(SITE_ROOT)?;
    chown_to_user(SITE_ROOT, TARGET_USER)?;

    info!("Creating virtual host into nginx");
    templates::nginx_site().install("/")?;
    files::symlink_file(NGINX_SITE_PATH, NGINX_SITE_LINK)?;

    info!("Creating uWSGI application config");
    templates::uwsgi_app().install("/")?;
    files::symlink_file(UWSGI_APP_PATH, UWSGI_APP_LINK)?;

    info!("Creating self-signed TLS certificate");
    create_tls_certificate()?;

    info!("Cloning {SITE_REPO_URL}");
    git::clone_recursive(SITE_REPO_URL, SITE_ROOT)?;
    Dependency::Chown
        .cmd()
        .args(["-R", "pi:pi", SITE_ROOT])
        .run_and_check()
        .context("Failed to set site repository ownership")?;

    info!("Creating configuration file for the Flask application instance");
    let secret_key = generate_secret_key()?;
    templates::flask_conf(&secret_key).install("/")?;

    info!("Creating application database");
    create_database(Path::new(SITE_ROOT))?;

    info!("Restarting uwsgi and nginx");
    for service in ["uwsgi", "nginx"] {
        Dependency::Systemctl
            .cmd()
            .args(["restart", service])
            .run_and_check()
            .with_context(|| format!("Failed to restart {service}"))?;
    }

    println!("vm.utu.fi development VM provisioned.");
    Ok(ExitKind::Done)
}

fn chown_to_user(path: &str, name: &str) -> Result<(), Error> {
    let Some(user) = users::lookup_user(name)? else {
        anyhow::bail!("Unknown user '{name}'");
    };
    files::chown_path(path, user.uid, user.gid)
}

fn create_tls_certificate() -> Result<(), Error> {
    Dependency::Openssl
        .cmd()
        .args([
            "req", "-x509", "-nodes", "-days", "3650", "-newkey", "rsa:2048",
        ])
        .args(["-keyout", TLS_KEY_PATH])
        .args(["-out", TLS_CERT_PATH])
        .args(["-subj", "/CN=vm.utu.fi"])
        .run_and_check()
        .context("Failed to create TLS certificate")?;
    files::set_permissions(TLS_KEY_PATH, 0o600)
}

fn generate_secret_key() -> Result<String, Error> {
    let key = Dependency::Openssl
        .cmd()
        .args(["rand", "-hex", "32"])
        .output_and_check()
        .context("Failed to generate secret key")?;
    Ok(key.trim().to_string())
}

/// Creates the application database by executing the SQL script shipped in
/// the site repository.
fn create_database(site_root: &Path) -> Result<(), Error> {
    let script = files::read_file_trim(site_root.join(DATABASE_SCRIPT))?;
    let connection = sqlite::open(site_root.join(DATABASE_FILE))
        .context("Failed to open application database")?;
    connection
        .execute(&script)
        .context("Database creation script failed")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_database() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("create.sql"),
            "CREATE TABLE vm (id INTEGER PRIMARY KEY, name TEXT);\n\
             INSERT INTO vm (name) VALUES ('test');\n",
        )
        .unwrap();

        create_database(dir.path()).unwrap();

        let connection = sqlite::open(dir.path().join("application.sqlite3")).unwrap();
        let mut rows = 0;
        connection
            .iterate("SELECT name FROM vm", |pairs| {
                rows += 1;
                assert_eq!(pairs[0].1, Some("test"));
                true
            })
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn test_create_database_requires_the_script() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(create_database(dir.path()).is_err());
    }
}
