//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Starknet Buildpack
///
/// Provisions starkli, declares the compiled Starknet contract and
/// optionally contributes a deploy process.
#[derive(Parser, Debug)]
#[command(name = "starknet-buildpack")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Lifecycle phase to run
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Lifecycle phases
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decide whether the application is a Starknet project
    Detect(DetectArgs),

    /// Install starkli and declare the contract
    Build(BuildArgs),
}

/// Arguments for the detect phase
#[derive(Parser, Debug)]
pub struct DetectArgs {
    /// Platform directory
    pub platform: PathBuf,

    /// Build plan file to write
    pub plan: PathBuf,

    /// Application directory [default: current directory]
    #[arg(long)]
    pub app_dir: Option<PathBuf>,
}

/// Arguments for the build phase
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Layers directory
    pub layers: PathBuf,

    /// Platform directory
    pub platform: PathBuf,

    /// Resolved buildpack plan file
    pub plan: PathBuf,

    /// Application directory [default: current directory]
    #[arg(long)]
    pub app_dir: Option<PathBuf>,

    /// Buildpack root holding buildpack.toml [default: parent of bin/]
    #[arg(long, env = "CNB_BUILDPACK_DIR")]
    pub buildpack_dir: Option<PathBuf>,

    /// Stack of the build image
    #[arg(long, env = "CNB_STACK_ID")]
    pub stack_id: Option<String>,

    /// Download cache directory
    #[arg(long, env = "BP_DEPENDENCY_CACHE")]
    pub cache_dir: Option<PathBuf>,
}

/// Rewrite `bin/detect ...` and `bin/build ...` into subcommand form
pub fn lifecycle_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut args: Vec<OsString> = args.into_iter().collect();
    let phase = args
        .first()
        .and_then(|argv0| Path::new(argv0).file_name())
        .and_then(|name| name.to_str())
        .filter(|name| matches!(*name, "detect" | "build"))
        .map(OsString::from);

    if let Some(phase) = phase {
        args.insert(1, phase);
    }
    args
}
