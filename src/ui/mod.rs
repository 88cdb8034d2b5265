//! Build log output
//!
//! Everything printed here is plain text with optional ANSI styling; `console`
//! drops the colors when stdout is not a terminal.
//!
//! ```text
//! Starknet Buildpack 0.1.0
//!   Build Configuration:
//!     $BP_STARKNET_LIBC  gnu   the libc flavour of the starkli artifact (default)
//!   Starkli 0.3.5
//!     Downloading from https://...
//! ```

mod output;

pub use output::{body, header, title, warn};
