//! Deploy wallet initialization

use super::{
    BP_ENABLE_STARKNET_DEPLOY, BP_STARKNET_DEPLOY_ACCOUNT, BP_STARKNET_DEPLOY_RPC,
    BP_STARKNET_DEPLOY_WALLET_ADDRESS, PLAN_ENTRY_STARKLI,
};
use crate::config::ConfigurationResolver;
use crate::error::{StarknetError, StarknetResult};
use crate::exec::{Execution, Executor};
use crate::layer::ProcessEnv;
use crate::ui;
use std::path::Path;
use tracing::debug;

/// Fetch the deployer account when deploys are enabled.
///
/// Runs `starkli account fetch <address> --output <account> --rpc <rpc>`.
/// Does nothing when `BP_ENABLE_STARKNET_DEPLOY` is off.
pub async fn initialize_deploy_wallet(
    config: &ConfigurationResolver,
    executor: &dyn Executor,
    env: &ProcessEnv,
) -> StarknetResult<()> {
    if !config.resolve_bool(BP_ENABLE_STARKNET_DEPLOY) {
        debug!("Deploy disabled, skipping wallet initialization");
        return Ok(());
    }

    fetch_account(config, executor, env)
        .await
        .map_err(|e| StarknetError::WalletInit(Box::new(e)))
}

async fn fetch_account(
    config: &ConfigurationResolver,
    executor: &dyn Executor,
    env: &ProcessEnv,
) -> StarknetResult<()> {
    let address = required(config, BP_STARKNET_DEPLOY_WALLET_ADDRESS)?;
    let account = required(config, BP_STARKNET_DEPLOY_ACCOUNT)?;
    let rpc = required(config, BP_STARKNET_DEPLOY_RPC)?;

    if let Some(dir) = Path::new(&account).parent().filter(|d| !d.as_os_str().is_empty()) {
        ui::body(&format!(
            "Initializing deploy wallet and saving to {}",
            dir.display()
        ));
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| StarknetError::io(format!("creating {}", dir.display()), e))?;
    }

    let execution = Execution::new(
        PLAN_ENTRY_STARKLI,
        [
            "account",
            "fetch",
            address.as_str(),
            "--output",
            account.as_str(),
            "--rpc",
            rpc.as_str(),
        ],
        env,
    );
    executor.execute(&execution).await?;
    Ok(())
}

fn required(config: &ConfigurationResolver, name: &str) -> StarknetResult<String> {
    let value = config.value(name);
    if value.is_empty() {
        return Err(StarknetError::ConfigMissing(name.to_string()));
    }
    Ok(value)
}
