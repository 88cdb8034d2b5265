//! Detect phase

use super::app_dir;
use crate::cli::DetectArgs;
use crate::error::StarknetResult;
use crate::lifecycle::{Platform, DETECT_FAIL, SUCCESS};
use crate::starknet;
use tracing::{debug, info};

/// Execute the detect phase
pub async fn execute(args: DetectArgs) -> StarknetResult<u8> {
    let app = app_dir(args.app_dir)?;
    let platform = Platform::load(&args.platform).await?;
    debug!(
        "Detecting {} with {} platform variables",
        app.display(),
        platform.environment.len()
    );

    let result = starknet::detect(&app).await?;
    if !result.pass {
        info!("{} is not a Starknet project", app.display());
        return Ok(DETECT_FAIL);
    }

    result.write(&args.plan).await?;
    info!("Wrote build plan to {}", args.plan.display());
    Ok(SUCCESS)
}
