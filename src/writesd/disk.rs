use std::path::Path;

use anyhow::Error;

use osutils::{files, lsblk::BlockDevice};
use patemon_api::error::PreconditionError;

use crate::prompt::{choose_index, Prompter};

#[derive(Debug, Clone, PartialEq)]
pub enum DiskSelection {
    /// Canonical path of the chosen device.
    Selected(String),
    /// Operator declined or exited.
    Aborted,
}

/// Verbose reason why a disk is not safe to overwrite, or empty when safe.
fn safety_message(disk: &BlockDevice) -> &'static str {
    if disk.holds_system_root() {
        "FATAL! Contains system root partition!"
    } else if disk.is_mounted() {
        "UNSAFE! One or more partitions are mounted"
    } else {
        ""
    }
}

/// Picks exactly one block device to overwrite.
///
/// An explicitly requested device must exist; if it has mounted partitions
/// the operator must confirm. Without a request, a single safe removable
/// device is auto-selected, anything else goes through a numbered menu where
/// choosing an unsafe disk needs confirmation and declining re-enters the
/// selection.
pub fn choose_disk(
    requested: Option<&Path>,
    disks: &[BlockDevice],
    prompter: &mut dyn Prompter,
) -> Result<DiskSelection, Error> {
    if let Some(requested) = requested {
        if let Some(disk) = disks
            .iter()
            .find(|disk| Path::new(&disk.name) == requested)
        {
            if disk.is_mounted() {
                println!(
                    "Specified device '{}' has mounted partition(s)!",
                    disk.name
                );
                if !prompter.confirm("This is unsafe! Continue?")? {
                    return Ok(DiskSelection::Aborted);
                }
            }
            return Ok(DiskSelection::Selected(disk.name.clone()));
        }
        // lsblk lists whole disks only; loop and mapper devices are still
        // valid targets.
        if files::is_block_device(requested) {
            return Ok(DiskSelection::Selected(
                requested.display().to_string(),
            ));
        }
        return Err(PreconditionError::DeviceNotFound(requested.to_path_buf()).into());
    }

    if disks.is_empty() {
        return Err(PreconditionError::NoDevices.into());
    }

    let safes: Vec<&BlockDevice> = disks.iter().filter(|disk| !disk.is_mounted()).collect();
    if safes.len() == 1 && safes[0].is_removable_class() {
        println!(
            "Single removable device detected ('{}') and none of its partitions are mounted.",
            safes[0].name
        );
        println!("Autoselecting '{}'", safes[0].name);
        return Ok(DiskSelection::Selected(safes[0].name.clone()));
    }

    loop {
        println!("Choose target device:");
        for (i, disk) in disks.iter().enumerate() {
            println!("{:>4} {:<20} {}", i + 1, disk.name, safety_message(disk));
        }
        let Some(index) = choose_index(prompter, disks.len())? else {
            return Ok(DiskSelection::Aborted);
        };
        let disk = &disks[index];
        if disk.is_mounted()
            && !prompter.confirm("Choosing a mounted disk is VERY unsafe! Continue?")?
        {
            // Back to the menu, nothing is excluded.
            continue;
        }
        return Ok(DiskSelection::Selected(disk.name.clone()));
    }
}

#[cfg(test)]
mod tests {
    use crate::prompt::testing::ScriptedPrompter;

    use super::*;

    fn disk(name: &str, removable: bool, mountpoint: Option<&str>) -> BlockDevice {
        BlockDevice {
            name: name.to_string(),
            removable,
            device_type: "disk".to_string(),
            children: mountpoint.map(|mp| {
                vec![BlockDevice {
                    name: format!("{name}1"),
                    device_type: "part".to_string(),
                    mountpoint: Some(mp.to_string()),
                    ..Default::default()
                }]
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_single_safe_removable_is_autoselected() {
        let disks = vec![
            disk("/dev/sda", false, Some("/")),
            disk("/dev/mmcblk0", true, None),
        ];
        let mut prompter = ScriptedPrompter::new(Vec::<String>::new());
        assert_eq!(
            choose_disk(None, &disks, &mut prompter).unwrap(),
            DiskSelection::Selected("/dev/mmcblk0".to_string())
        );
        assert!(prompter.exhausted());
    }

    #[test]
    fn test_multiple_safe_devices_require_a_menu() {
        let disks = vec![disk("/dev/mmcblk0", true, None), disk("/dev/sdb", true, None)];
        let mut prompter = ScriptedPrompter::new(["2"]);
        assert_eq!(
            choose_disk(None, &disks, &mut prompter).unwrap(),
            DiskSelection::Selected("/dev/sdb".to_string())
        );
    }

    #[test]
    fn test_single_safe_non_removable_requires_a_menu() {
        let disks = vec![disk("/dev/sdb", false, None)];
        let mut prompter = ScriptedPrompter::new(["1"]);
        assert_eq!(
            choose_disk(None, &disks, &mut prompter).unwrap(),
            DiskSelection::Selected("/dev/sdb".to_string())
        );
    }

    #[test]
    fn test_mounted_choice_needs_confirmation_and_decline_reenters() {
        let disks = vec![disk("/dev/sda", false, Some("/")), disk("/dev/sdb", true, None)];
        // Pick the system disk, decline, then pick the safe one.
        let mut prompter = ScriptedPrompter::new(["1", "n", "2"]);
        assert_eq!(
            choose_disk(None, &disks, &mut prompter).unwrap(),
            DiskSelection::Selected("/dev/sdb".to_string())
        );
        assert!(prompter.exhausted());
    }

    #[test]
    fn test_empty_input_aborts() {
        let disks = vec![disk("/dev/sda", false, Some("/")), disk("/dev/sdb", true, None)];
        let mut prompter = ScriptedPrompter::new([""]);
        assert_eq!(
            choose_disk(None, &disks, &mut prompter).unwrap(),
            DiskSelection::Aborted
        );
    }

    #[test]
    fn test_requested_device() {
        let disks = vec![disk("/dev/sda", false, Some("/")), disk("/dev/sdb", true, None)];

        let mut prompter = ScriptedPrompter::new(Vec::<String>::new());
        assert_eq!(
            choose_disk(Some(Path::new("/dev/sdb")), &disks, &mut prompter).unwrap(),
            DiskSelection::Selected("/dev/sdb".to_string())
        );

        // Mounted requested device: declined confirmation aborts.
        let mut prompter = ScriptedPrompter::new(["n"]);
        assert_eq!(
            choose_disk(Some(Path::new("/dev/sda")), &disks, &mut prompter).unwrap(),
            DiskSelection::Aborted
        );

        let error = choose_disk(
            Some(Path::new("/dev/sdz")),
            &disks,
            &mut ScriptedPrompter::new(Vec::<String>::new()),
        )
        .unwrap_err();
        assert!(matches!(
            error.downcast_ref::<PreconditionError>(),
            Some(PreconditionError::DeviceNotFound(_))
        ));
    }

    #[test]
    fn test_requested_device_outside_the_disk_list() {
        let disks = vec![disk("/dev/sda", false, Some("/"))];

        // An existing regular file is still rejected.
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("not-a-device");
        std::fs::write(&file, "x").unwrap();
        let error = choose_disk(
            Some(&file),
            &disks,
            &mut ScriptedPrompter::new(Vec::<String>::new()),
        )
        .unwrap_err();
        assert!(matches!(
            error.downcast_ref::<PreconditionError>(),
            Some(PreconditionError::DeviceNotFound(_))
        ));

        // Loop devices are not typed "disk" by lsblk but are valid targets.
        let loop0 = Path::new("/dev/loop0");
        if files::is_block_device(loop0) {
            assert_eq!(
                choose_disk(Some(loop0), &disks, &mut ScriptedPrompter::new(Vec::<String>::new()))
                    .unwrap(),
                DiskSelection::Selected("/dev/loop0".to_string())
            );
        }
    }

    #[test]
    fn test_no_devices() {
        let error = choose_disk(None, &[], &mut ScriptedPrompter::new(Vec::<String>::new()))
            .unwrap_err();
        assert!(matches!(
            error.downcast_ref::<PreconditionError>(),
            Some(PreconditionError::NoDevices)
        ));
    }

    #[test]
    fn test_safety_messages() {
        assert_eq!(
            safety_message(&disk("/dev/sda", false, Some("/"))),
            "FATAL! Contains system root partition!"
        );
        assert_eq!(
            safety_message(&disk("/dev/sdb", false, Some("/media/usb"))),
            "UNSAFE! One or more partitions are mounted"
        );
        assert_eq!(safety_message(&disk("/dev/sdc", true, None)), "");
    }
}
