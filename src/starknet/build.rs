//! Build phase

use super::{
    build_process_types, ContractDeclarer, StarkliInstaller, BP_STARKNET_LIBC,
    BP_STARKNET_VERSION, PLAN_ENTRY_STARKLI,
};
use crate::cache::{DependencyCache, DependencyResolver};
use crate::config::{BuildpackDescriptor, ConfigurationResolver};
use crate::error::StarknetResult;
use crate::exec::Executor;
use crate::layer::{DependencyLayerContributor, LayerTypes, Layers, ProcessEnv};
use crate::lifecycle::{BuildResult, BuildpackPlan, PlanEntryResolver, Platform};
use crate::ui;
use std::path::PathBuf;
use tracing::debug;

/// Everything the build phase reads
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// Application source directory
    pub app_dir: PathBuf,
    /// Layers directory handed over by the lifecycle
    pub layers_dir: PathBuf,
    /// Root of the buildpack (holds `buildpack.toml`)
    pub buildpack_dir: PathBuf,
    pub buildpack: BuildpackDescriptor,
    pub platform: Platform,
    pub plan: BuildpackPlan,
    /// Stack of the build image, if the lifecycle told us
    pub stack_id: Option<String>,
    /// Writable download cache
    pub cache_dir: PathBuf,
    /// Environment of the buildpack process
    pub env: ProcessEnv,
}

/// Install `starkli` into its layer and collect the deploy process.
///
/// Nothing is contributed unless the plan carries a `starkli` entry.
pub async fn build(context: &BuildContext, executor: &dyn Executor) -> StarknetResult<BuildResult> {
    ui::title(&context.buildpack.buildpack);
    let mut result = BuildResult::new();

    if PlanEntryResolver::new(&context.plan)
        .resolve(PLAN_ENTRY_STARKLI)
        .is_none()
    {
        debug!("No {} plan entry, nothing to contribute", PLAN_ENTRY_STARKLI);
        return Ok(result);
    }

    let config = ConfigurationResolver::from_descriptor(
        &context.buildpack,
        context.platform.merged_environment(&context.env),
    );
    config.log_configuration();

    let version = config.value(BP_STARKNET_VERSION);
    let libc = config.value(BP_STARKNET_LIBC);
    let dependency = DependencyResolver::new(
        context.buildpack.metadata.dependencies.clone(),
        context.stack_id.clone(),
    )
    .resolve(&format!("{PLAN_ENTRY_STARKLI}-{libc}"), &version)
    .map_err(|e| e.context("unable to find dependency"))?;

    let processes = build_process_types(&config)
        .map_err(|e| e.context("unable to build list of process types"))?;

    let contributor = DependencyLayerContributor::new(
        dependency,
        DependencyCache::new(
            context.buildpack_dir.join("dependencies"),
            context.cache_dir.clone(),
        ),
        LayerTypes {
            build: false,
            cache: true,
            launch: true,
        },
    );
    let layer = Layers::new(&context.layers_dir)
        .layer(contributor.layer_name())
        .await?;

    let mut installer = StarkliInstaller::new(
        &config,
        executor,
        ContractDeclarer::for_application(&context.app_dir),
        context.env.clone(),
    );
    let layer = contributor.contribute(layer, &mut installer).await?;

    result.layers.push(layer);
    for process in processes {
        result.add_process(process)?;
    }
    Ok(result)
}
