//! Starknet Buildpack
//!
//! Cloud Native Buildpack for Scarb projects: installs `starkli` into a
//! cached layer, declares the compiled contract class and can contribute a
//! `starkli deploy` launch process.

pub mod archive;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod exec;
pub mod layer;
pub mod lifecycle;
pub mod starknet;
pub mod ui;

pub use error::{StarknetError, StarknetResult};
