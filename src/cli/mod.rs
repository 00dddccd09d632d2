//! Command-line interface definitions and helpers.
//!
//! This module contains all CLI argument parsing, enums, and subcommand handlers.

mod args;
mod commands;
mod enums;

pub use args::{Args, CacheAction, Command, ConfigAction, LayerArgs};
pub use commands::{format_size, handle_cache_action, handle_config_action, init_config_file};
pub use enums::Output;
