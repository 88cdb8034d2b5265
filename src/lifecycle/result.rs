//! Build phase output

use crate::error::{StarknetError, StarknetResult};
use crate::layer::LayerRecord;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// A `[[processes]]` entry of `launch.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessDefinition {
    #[serde(rename = "type")]
    pub process_type: String,
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// `false` runs the command through the launcher shell
    #[serde(default)]
    pub direct: bool,
    #[serde(default)]
    pub default: bool,
}

#[derive(Serialize)]
struct LaunchFile<'a> {
    processes: &'a [ProcessDefinition],
}

/// Layers and processes contributed by one build
#[derive(Debug, Clone, Default)]
pub struct BuildResult {
    pub layers: Vec<LayerRecord>,
    processes: Vec<ProcessDefinition>,
}

impl BuildResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn processes(&self) -> &[ProcessDefinition] {
        &self.processes
    }

    /// Add a process; only one process may be the default
    pub fn add_process(&mut self, process: ProcessDefinition) -> StarknetResult<()> {
        if process.default {
            if let Some(existing) = self.processes.iter().find(|p| p.default) {
                return Err(StarknetError::DuplicateDefaultProcess {
                    existing: existing.process_type.clone(),
                    new: process.process_type,
                });
            }
        }
        self.processes.push(process);
        Ok(())
    }

    /// Write `<layers>/launch.toml` when any process was contributed
    pub async fn write_launch(&self, layers_path: &Path) -> StarknetResult<()> {
        if self.processes.is_empty() {
            return Ok(());
        }

        let path = layers_path.join("launch.toml");
        let content = toml::to_string(&LaunchFile {
            processes: &self.processes,
        })?;
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| StarknetError::io(format!("writing {}", path.display()), e))?;
        info!("Wrote {} process types to {}", self.processes.len(), path.display());
        Ok(())
    }
}
