use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    path::PathBuf,
};

use clap::{Parser, Subcommand};
use log::LevelFilter;
use patemon_api::mode::InstanceMode;

use crate::PATEMON_VERSION;

#[derive(Parser, Debug)]
#[clap(version = PATEMON_VERSION)]
pub struct Cli {
    /// Logging verbosity [OFF, ERROR, WARN, INFO, DEBUG, TRACE]
    #[arg(global = true, short, long, default_value_t = LevelFilter::Info)]
    pub verbosity: LevelFilter,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a base image to an SD card and stage first-boot configuration
    #[clap(name = "write-sd")]
    WriteSd {
        /// Instance mode [DEV, UAT, PRD]
        #[clap(short, long)]
        mode: Option<InstanceMode>,

        /// Write to the specified block device
        #[clap(long)]
        device: Option<PathBuf>,

        /// Add the DDNS client into the instance
        #[clap(long, conflicts_with = "no_ddns")]
        ddns: bool,

        /// Do not add the DDNS client into the instance
        #[clap(long = "no-ddns")]
        no_ddns: bool,

        /// Do not copy SSH keys
        #[clap(short = 's', long = "no-keys")]
        no_keys: bool,

        /// Directory holding the images, key material and writesd.config
        /// (defaults to the directory of this executable)
        #[clap(long)]
        asset_dir: Option<PathBuf>,
    },

    /// First-boot installation on the provisioned device
    Install {
        /// Verify the installation without changing anything
        #[clap(long)]
        check: bool,
    },

    /// Provision a vm.utu.fi development virtual machine
    #[clap(name = "vm-install")]
    VmInstall,
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Commands::WriteSd { .. } => "write-sd",
            Commands::Install { .. } => "install",
            Commands::VmInstall => "vm-install",
        }
    }
}

impl Display for Commands {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.name())
    }
}
