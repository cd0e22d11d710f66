//! Command-line interface for netbound
//!
//! - `args`: argument definitions (clap)
//! - `run`: entry point and dispatch
//! - `commands`: command implementations
//! - `render`: human and JSON output of states

pub mod args;
mod commands;
mod render;
mod run;

pub use args::{Cli, Commands};
pub use run::run;
