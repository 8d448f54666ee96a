use std::{env, path::PathBuf, thread, time::Duration};

use anyhow::{Context, Error};
use log::info;

use osutils::{
    image::write_image,
    lsblk::{self, partition_path},
    mount::{ensure_mount_directory, is_mountpoint, with_mount},
    users,
};
use patemon_api::{
    config::{DdnsConfig, WriterConfig},
    constants::{
        KEY_MATERIAL_DIRNAME, SETTLE_DELAY_SECS, STAGING_MOUNT_POINT, WRITER_CONFIG_FILENAME,
    },
    error::{ExitKind, PreconditionError},
    mode::InstanceMode,
};

use crate::prompt::Prompter;

pub mod boot;
pub mod ddns;
pub mod disk;
pub mod image;
pub mod report;
pub mod rootfs;

use disk::DiskSelection;
use report::Report;

pub struct Request {
    pub mode: Option<InstanceMode>,
    pub device: Option<PathBuf>,
    pub ddns: bool,
    pub no_ddns: bool,
    pub no_keys: bool,
    pub asset_dir: Option<PathBuf>,
}

/// Whether the DDNS client goes into the instance: an explicit enable flag
/// wins over an explicit disable flag, which wins over the configured
/// per-mode default.
fn resolve_ddns(enable: bool, disable: bool, mode: InstanceMode, config: &DdnsConfig) -> bool {
    if enable {
        true
    } else if disable {
        false
    } else {
        config.enabled_for(mode)
    }
}

fn settle() {
    // Mounting immediately after dd or umount fails intermittently while the
    // kernel re-reads the partition table.
    thread::sleep(Duration::from_secs(SETTLE_DELAY_SECS));
}

pub fn execute(request: &Request, prompter: &mut dyn Prompter) -> Result<ExitKind, Error> {
    if !users::is_effective_root() {
        return Err(PreconditionError::RootRequired.into());
    }
    if is_mountpoint(STAGING_MOUNT_POINT)? {
        println!("Directory '{STAGING_MOUNT_POINT}' is already mounted!");
        println!("Unmount ('umount {STAGING_MOUNT_POINT}') and re-run.");
        return Err(PreconditionError::MountPointBusy(STAGING_MOUNT_POINT.into()).into());
    }
    ensure_mount_directory(STAGING_MOUNT_POINT)?;

    let installer = env::current_exe().context("Failed to locate this executable")?;
    let asset_dir = match &request.asset_dir {
        Some(dir) => dir.clone(),
        None => installer
            .parent()
            .context("Executable has no parent directory")?
            .to_path_buf(),
    };

    let config = WriterConfig::load(asset_dir.join(WRITER_CONFIG_FILENAME))?;
    let mode = request.mode.unwrap_or(config.default_mode);
    println!("Creating {mode} instance (use -m [DEV|UAT|PRD] to change)");

    let device = match disk::choose_disk(
        request.device.as_deref(),
        &lsblk::list_disks()?,
        prompter,
    )? {
        DiskSelection::Selected(device) => device,
        DiskSelection::Aborted => return Ok(ExitKind::Aborted),
    };

    let Some(image) = image::choose_image(&asset_dir, prompter)? else {
        return Ok(ExitKind::Aborted);
    };

    let ddns = resolve_ddns(request.ddns, request.no_ddns, mode, &config.ddns);
    if ddns && !config.ddns.has_credentials() {
        println!("WARNING! DDNS client is requested, but credentials for it are not set!");
        println!(
            "Tip: Add DDNS username and password into '{}'.",
            asset_dir.join(WRITER_CONFIG_FILENAME).display()
        );
        if !prompter.confirm("Continue without DDNS credentials?")? {
            return Ok(ExitKind::Aborted);
        }
    }

    println!("Writing image to block device '{device}'...");
    write_image(&image, &device)?;
    settle();

    let mut summary = Report::new(&device);
    summary.add(format!("Raspbian image '{}'", image.display()));

    info!("Staging boot partition");
    with_mount(
        partition_path(&device, 1),
        STAGING_MOUNT_POINT,
        |root| {
            if let Err(e) = boot::stage(root, &installer, mode, &mut summary) {
                summary.add(format!("ERROR: {e:#}"));
            }
            Ok(())
        },
    )?;
    settle();

    info!("Staging system partition");
    let key_dir = asset_dir.join(KEY_MATERIAL_DIRNAME);
    let options = rootfs::Options {
        ddns,
        ddns_username: &config.ddns.username,
        ddns_password: &config.ddns.password,
        key_dir: (!request.no_keys).then_some(key_dir.as_path()),
    };
    with_mount(
        partition_path(&device, 2),
        STAGING_MOUNT_POINT,
        |root| {
            if let Err(e) = rootfs::stage(root, &options, &mut summary) {
                summary.add(format!("ERROR: {e:#}"));
            }
            Ok(())
        },
    )?;

    println!("PATE Monitor image creation is done!");
    println!("{}", summary.render());
    println!("You can safely remove the SD card now.");
    println!("Next:");
    println!("\t1. Insert the SD into the PATE Monitor Raspberry and start it up.");
    println!("\t2. Login as pi/raspberry.");
    println!("\t3. Run 'sudo /boot/patemon install'");
    println!("\t4. Follow the instructions.");

    Ok(ExitKind::Done)
}
