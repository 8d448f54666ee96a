// Configuration constants

/// Mount point used while staging either partition of the target device.
pub const STAGING_MOUNT_POINT: &str = "/mnt";

/// Name of the marker file recording the selected instance mode. Written into
/// the boot partition by the image writer, read once by the installer.
pub const MODE_MARKER_FILENAME: &str = "install.config";

/// Location of the mode marker as seen from the booted appliance.
pub const MODE_MARKER_BOOT_PATH: &str = "/boot/install.config";

/// Name of the operator configuration file, looked up in the image directory.
pub const WRITER_CONFIG_FILENAME: &str = "writesd.config";

/// Marker file that enables the SSH server on first boot.
pub const SSH_MARKER_FILENAME: &str = "ssh";

/// Name under which the installer is copied into the boot partition.
pub const INSTALLER_FILENAME: &str = "patemon";

/// Extension of base OS images in the image directory.
pub const IMAGE_EXTENSION: &str = "img";

/// Directory of key material next to the image directory, copied into the
/// target user's profile when present.
pub const KEY_MATERIAL_DIRNAME: &str = "ssh";

/// Default login account of the base OS image.
pub const TARGET_USER: &str = "pi";

/// Home directory of the default login account, relative to the image root.
pub const TARGET_USER_HOME: &str = "/home/pi";

/// Seconds to wait after the block copy (and after each unmount) before the
/// next mount. Mounting immediately is known to fail intermittently while the
/// kernel re-reads the partition table.
pub const SETTLE_DELAY_SECS: u64 = 3;

/// Timezone applied by the installers.
pub const LOCAL_TIMEZONE: &str = "Europe/Helsinki";
