pub mod apt;
pub mod dependencies;
pub mod files;
pub mod git;
pub mod image;
pub mod locale;
pub mod lsblk;
pub mod mount;
pub mod osrelease;
pub mod path;
pub mod pip;
pub mod template;
pub mod users;
