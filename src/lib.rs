pub mod cli;
pub mod install;
pub mod prompt;
pub mod vminstall;
pub mod writesd;

pub const PATEMON_VERSION: &str = env!("CARGO_PKG_VERSION");
