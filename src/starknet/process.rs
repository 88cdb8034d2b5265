//! Launch process for contract deployment

use super::{
    BP_ENABLE_STARKNET_DEPLOY, BP_STARKNET_DEPLOY_ARGS, BP_STARKNET_DEPLOY_PRIVATE_KEY,
    PLAN_ENTRY_STARKLI, STARKNET_CLASS_HASH,
};
use crate::config::ConfigurationResolver;
use crate::error::{StarknetError, StarknetResult};
use crate::lifecycle::ProcessDefinition;
use crate::ui;

/// The default `starkli deploy` process, or nothing when deploys are off.
///
/// `$STARKNET_CLASS_HASH` is left for the launcher shell to expand, so the
/// process is never direct.
pub fn build_process_types(config: &ConfigurationResolver) -> StarknetResult<Vec<ProcessDefinition>> {
    if !config.resolve_bool(BP_ENABLE_STARKNET_DEPLOY) {
        return Ok(Vec::new());
    }

    if config.value(BP_STARKNET_DEPLOY_PRIVATE_KEY).is_empty() {
        return Err(StarknetError::ConfigMissing(
            BP_STARKNET_DEPLOY_PRIVATE_KEY.to_string(),
        ));
    }

    let raw = config.value(BP_STARKNET_DEPLOY_ARGS);
    let extra = shlex::split(&raw).ok_or_else(|| StarknetError::ConfigArgs {
        name: BP_STARKNET_DEPLOY_ARGS.to_string(),
        value: raw.clone(),
    })?;

    let mut args = vec![
        "deploy".to_string(),
        "--strk".to_string(),
        format!("${STARKNET_CLASS_HASH}"),
    ];
    args.extend(extra);
    ui::body(&format!("Deploying contract with args: {}", args.join(" ")));

    Ok(vec![ProcessDefinition {
        process_type: PLAN_ENTRY_STARKLI.to_string(),
        command: PLAN_ENTRY_STARKLI.to_string(),
        args,
        direct: false,
        default: true,
    }])
}
