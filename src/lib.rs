pub mod bonus;
pub mod cli;
pub mod config;
pub mod error;
pub mod records;
pub mod report;
pub mod run_log;
pub mod storage;
pub mod text;
pub mod utils;

pub use config::Config;
pub use error::{BonusError, Result};
