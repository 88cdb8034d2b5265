//! Platform directory handed to detect and build

use crate::error::{StarknetError, StarknetResult};
use crate::layer::ProcessEnv;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// User-provided environment from `<platform>/env/<NAME>` files
#[derive(Debug, Clone, Default)]
pub struct Platform {
    pub path: PathBuf,
    pub environment: HashMap<String, String>,
}

impl Platform {
    /// Load `<path>/env`; a missing directory is an empty environment
    pub async fn load(path: &Path) -> StarknetResult<Self> {
        let env_dir = path.join("env");
        let mut environment = HashMap::new();

        let mut entries = match tokio::fs::read_dir(&env_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self {
                    path: path.to_path_buf(),
                    environment,
                })
            }
            Err(e) => {
                return Err(StarknetError::io(
                    format!("reading {}", env_dir.display()),
                    e,
                ))
            }
        };

        let io_err = |e| StarknetError::io(format!("reading {}", env_dir.display()), e);
        while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
            if !entry.file_type().await.map_err(io_err)?.is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            let value = tokio::fs::read_to_string(entry.path())
                .await
                .map_err(|e| StarknetError::io(format!("reading {}", entry.path().display()), e))?;
            debug!("Platform environment {}", name);
            environment.insert(name, value);
        }

        Ok(Self {
            path: path.to_path_buf(),
            environment,
        })
    }

    /// `base` overlaid with the platform environment
    pub fn merged_environment(&self, base: &ProcessEnv) -> HashMap<String, String> {
        let mut merged: HashMap<String, String> = base
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        merged.extend(self.environment.clone());
        merged
    }
}
