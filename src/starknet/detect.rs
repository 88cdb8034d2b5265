//! Scarb project detection

use super::{MANIFEST_FILE, PLAN_ENTRY_SCARB, PLAN_ENTRY_STARKLI, SOURCE_EXTENSION};
use crate::error::{StarknetError, StarknetResult};
use crate::lifecycle::{BuildPlan, BuildPlanProvide, BuildPlanRequire, DetectResult};
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Pass when `app` holds a `Scarb.toml` and at least one Cairo source.
///
/// A project without a manifest simply does not apply. A manifest without
/// any `.cairo` file is an error.
pub async fn detect(app: &Path) -> StarknetResult<DetectResult> {
    let app = app.to_path_buf();
    let found = tokio::task::spawn_blocking(move || starknet_project(&app))
        .await
        .map_err(|e| StarknetError::Internal(format!("detect task failed: {e}")))?
        .map_err(|e| e.context("unable to detect Starknet requirements"))?;

    if !found {
        return Ok(DetectResult::fail());
    }

    Ok(DetectResult {
        pass: true,
        plans: vec![BuildPlan {
            provides: vec![BuildPlanProvide {
                name: PLAN_ENTRY_STARKLI.to_string(),
            }],
            requires: vec![
                BuildPlanRequire::named(PLAN_ENTRY_SCARB),
                BuildPlanRequire::named(PLAN_ENTRY_STARKLI),
            ],
        }],
    })
}

fn starknet_project(app: &Path) -> StarknetResult<bool> {
    let manifest = app.join(MANIFEST_FILE);
    match std::fs::metadata(&manifest) {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("{} not found", manifest.display());
            return Ok(false);
        }
        Err(e) => {
            return Err(StarknetError::io(
                format!("unable to determine if {MANIFEST_FILE} exists"),
                e,
            ))
        }
    }

    for entry in WalkDir::new(app) {
        let entry = entry.map_err(|source| StarknetError::Walk {
            path: app.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_dir()
            && entry.path().extension().and_then(|e| e.to_str()) == Some(SOURCE_EXTENSION)
        {
            debug!("Found Cairo source {}", entry.path().display());
            return Ok(true);
        }
    }

    Err(StarknetError::SourceFilesMissing {
        extension: SOURCE_EXTENSION.to_string(),
        path: app.to_path_buf(),
    })
}
