pub mod cli;
pub mod load_config;
pub mod session;
pub mod storage;

pub use cli::{execute, run, Cli, Commands};
