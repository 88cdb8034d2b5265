//! Command-line interface

pub mod args;
pub mod commands;

pub use args::{lifecycle_args, BuildArgs, Cli, Commands, DetectArgs};
