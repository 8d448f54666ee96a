use serde::{Deserialize, Serialize};

use anyhow::{Context, Error};
use log::warn;

use crate::dependencies::Dependency;

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct LsBlkOutput {
    pub blockdevices: Vec<BlockDevice>,
}

/// A block device as reported by `lsblk`, with its partitions as children.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct BlockDevice {
    /// Canonical device path, e.g. `/dev/sda`.
    pub name: String,

    #[serde(default)]
    pub size: u64,

    #[serde(rename = "rm", default)]
    pub removable: bool,

    #[serde(rename = "type", default)]
    pub device_type: String,

    #[serde(default)]
    pub mountpoint: Option<String>,

    /// Filled by newer lsblk versions instead of `mountpoint`.
    #[serde(default)]
    pub mountpoints: Vec<Option<String>>,

    #[serde(default)]
    pub children: Option<Vec<BlockDevice>>,
}

impl BlockDevice {
    /// Mount points of this device and all of its partitions.
    pub fn all_mountpoints(&self) -> Vec<&str> {
        let mut points: Vec<&str> = self
            .mountpoint
            .iter()
            .map(String::as_str)
            .chain(self.mountpoints.iter().flatten().map(String::as_str))
            .collect();
        for child in self.children.iter().flatten() {
            points.extend(child.all_mountpoints());
        }
        points.dedup();
        points
    }

    /// Whether any partition of this device is currently mounted.
    pub fn is_mounted(&self) -> bool {
        !self.all_mountpoints().is_empty()
    }

    /// Whether one of the mounted partitions is the system root.
    pub fn holds_system_root(&self) -> bool {
        self.all_mountpoints().contains(&"/")
    }

    /// Whether the device belongs to the removable-media class (an SD/MMC
    /// reader slot, or anything the kernel flags as removable).
    pub fn is_removable_class(&self) -> bool {
        self.removable
            || self
                .name
                .rsplit('/')
                .next()
                .is_some_and(|base| base.starts_with("mmcblk"))
    }
}

/// Lists whole disks (no partitions) present on the host.
pub fn list_disks() -> Result<Vec<BlockDevice>, Error> {
    let result = Dependency::Lsblk
        .cmd()
        .args([
            "--json",
            "--paths",
            "--bytes",
            "--output",
            "NAME,SIZE,RM,TYPE,MOUNTPOINT",
        ])
        .output_and_check()
        .context("Failed to execute lsblk")?;

    let parsed = parse_lsblk_output(result.as_str());
    if parsed.is_err() {
        warn!("lsblk output: {}", result);
    }

    Ok(parsed?
        .into_iter()
        .filter(|device| device.device_type == "disk")
        .collect())
}

fn parse_lsblk_output(output: &str) -> Result<Vec<BlockDevice>, Error> {
    let parsed: LsBlkOutput =
        serde_json::from_str(output).context("Failed to parse lsblk output")?;

    Ok(parsed.blockdevices)
}

/// Path of the n-th partition of a disk. Devices whose name ends in a digit
/// (mmcblk0, nvme0n1) get a 'p' separator: /dev/mmcblk0 -> /dev/mmcblk0p1.
pub fn partition_path(disk: &str, index: u32) -> String {
    if disk.ends_with(|c: char| c.is_ascii_digit()) {
        format!("{disk}p{index}")
    } else {
        format!("{disk}{index}")
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    const SAMPLE: &str = indoc! {r#"
        {
            "blockdevices": [
                {
                    "name": "/dev/sda",
                    "size": 512110190592,
                    "rm": false,
                    "type": "disk",
                    "mountpoint": null,
                    "children": [
                        {
                            "name": "/dev/sda1",
                            "size": 536870912,
                            "rm": false,
                            "type": "part",
                            "mountpoint": "/boot"
                        },{
                            "name": "/dev/sda2",
                            "size": 511571918848,
                            "rm": false,
                            "type": "part",
                            "mountpoint": "/"
                        }
                    ]
                },
                {
                    "name": "/dev/mmcblk0",
                    "size": 15931539456,
                    "rm": true,
                    "type": "disk",
                    "mountpoint": null
                }
            ]
        }
    "#};

    #[test]
    fn test_parse_lsblk_output() {
        let devices = parse_lsblk_output(SAMPLE).unwrap();
        assert_eq!(devices.len(), 2);

        let system = &devices[0];
        assert_eq!(system.name, "/dev/sda");
        assert_eq!(system.all_mountpoints(), vec!["/boot", "/"]);
        assert!(system.is_mounted());
        assert!(system.holds_system_root());
        assert!(!system.is_removable_class());

        let card = &devices[1];
        assert_eq!(card.size, 15931539456);
        assert!(!card.is_mounted());
        assert!(!card.holds_system_root());
        assert!(card.is_removable_class());

        assert!(parse_lsblk_output("bad output").is_err());
    }

    #[test]
    fn test_mountpoints_field_of_newer_lsblk() {
        let devices = parse_lsblk_output(indoc! {r#"
            {
                "blockdevices": [
                    {
                        "name": "/dev/sdb",
                        "type": "disk",
                        "children": [
                            {
                                "name": "/dev/sdb1",
                                "type": "part",
                                "mountpoints": ["/srv", null]
                            }
                        ]
                    }
                ]
            }
        "#})
        .unwrap();
        assert_eq!(devices[0].all_mountpoints(), vec!["/srv"]);
    }

    #[test]
    fn test_removable_class_by_name() {
        let device = BlockDevice {
            name: "/dev/mmcblk1".into(),
            ..Default::default()
        };
        assert!(device.is_removable_class());

        let device = BlockDevice {
            name: "/dev/sdc".into(),
            ..Default::default()
        };
        assert!(!device.is_removable_class());
    }

    #[test]
    fn test_partition_path() {
        assert_eq!(partition_path("/dev/sda", 1), "/dev/sda1");
        assert_eq!(partition_path("/dev/sdb", 2), "/dev/sdb2");
        assert_eq!(partition_path("/dev/mmcblk0", 1), "/dev/mmcblk0p1");
        assert_eq!(partition_path("/dev/nvme0n1", 2), "/dev/nvme0n1p2");
    }
}
