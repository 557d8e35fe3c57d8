//! Command-line host for the heads-up poker tools.
//!
//! Loads configuration, sets up logging and the game store, and exposes the
//! commands the `pt_cli` binary dispatches to.

pub mod commands;
pub mod config;
pub mod logging;
