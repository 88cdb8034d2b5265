//! Build phase

use super::app_dir;
use crate::cli::BuildArgs;
use crate::config;
use crate::error::{StarknetError, StarknetResult};
use crate::exec::CommandExecutor;
use crate::layer::ProcessEnv;
use crate::lifecycle::{BuildpackPlan, Platform, SUCCESS};
use crate::starknet::{self, BuildContext};
use std::path::PathBuf;
use tracing::debug;

/// Execute the build phase
pub async fn execute(args: BuildArgs) -> StarknetResult<u8> {
    let buildpack_dir = match args.buildpack_dir {
        Some(dir) => dir,
        None => default_buildpack_dir()?,
    };
    let cache_dir = args.cache_dir.unwrap_or_else(default_cache_dir);
    debug!(
        "Buildpack {}, download cache {}",
        buildpack_dir.display(),
        cache_dir.display()
    );

    let context = BuildContext {
        app_dir: app_dir(args.app_dir)?,
        layers_dir: args.layers.clone(),
        buildpack: config::load_descriptor(&buildpack_dir).await?,
        buildpack_dir,
        platform: Platform::load(&args.platform).await?,
        plan: BuildpackPlan::read(&args.plan).await?,
        stack_id: args.stack_id,
        cache_dir,
        env: ProcessEnv::from_current(),
    };

    let result = starknet::build(&context, &CommandExecutor::new()).await?;
    result.write_launch(&args.layers).await?;
    Ok(SUCCESS)
}

/// `bin/build` lives in `<buildpack>/bin`
fn default_buildpack_dir() -> StarknetResult<PathBuf> {
    let exe = std::env::current_exe()
        .map_err(|e| StarknetError::io("locating the buildpack executable", e))?;
    exe.parent()
        .and_then(|bin| bin.parent())
        .map(PathBuf::from)
        .ok_or_else(|| {
            StarknetError::Internal(format!(
                "cannot derive buildpack directory from {}",
                exe.display()
            ))
        })
}

fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("starknet-buildpack")
}
