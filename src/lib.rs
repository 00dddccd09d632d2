//! termlayer library crate.
//!
//! A coordinator that reads line-delimited JSON commands and keeps at most
//! one image drawn over the terminal. The binary wires these pieces to stdin
//! and stdout; the modules are public for integration testing.

pub mod cache;
pub mod cancel;
pub mod canvas;
pub mod cli;
pub mod command;
pub mod command_loop;
pub mod config;
pub mod coordinator;
pub mod geometry;
pub mod loader;
pub mod logging;
pub mod overlay;
pub mod process;
pub mod terminal;
