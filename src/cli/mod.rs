//! Command line interface module
//!
//! Argument parsing and the runner that resolves credentials, builds the
//! configuration and dispatches to the retag or prune workflow.

pub mod args;
pub mod runner;

pub use args::{Args, Command};
pub use runner::Runner;
