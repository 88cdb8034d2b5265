//! Lifecycle phase implementations
//!
//! Each phase returns the process exit code on success.

pub mod build;
pub mod detect;

pub use build::execute as build;
pub use detect::execute as detect;

use crate::error::{StarknetError, StarknetResult};
use std::path::PathBuf;

/// `dir`, or the current directory when unset
fn app_dir(dir: Option<PathBuf>) -> StarknetResult<PathBuf> {
    match dir {
        Some(dir) => Ok(dir),
        None => std::env::current_dir()
            .map_err(|e| StarknetError::io("getting current directory", e)),
    }
}
