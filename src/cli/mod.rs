pub mod commands;

pub use commands::{CategoryAction, Cli, Commands, OutputFormat};
