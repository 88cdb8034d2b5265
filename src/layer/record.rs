//! Layer records and their on-disk metadata
//!
//! A layer lives at `<layers>/<name>/` with its metadata in
//! `<layers>/<name>.toml`:
//!
//! ```toml
//! [types]
//! build = false
//! cache = true
//! launch = true
//!
//! [metadata]
//! checksum = "5f2c..."
//! version = "0.3.5"
//! ```

use crate::error::{StarknetError, StarknetResult};
use crate::layer::env::EnvironmentBindings;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Metadata key holding the dependency checksum a layer was built from
pub const CHECKSUM_KEY: &str = "checksum";

/// Which phases a layer is exposed to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerTypes {
    pub build: bool,
    pub cache: bool,
    pub launch: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct LayerFile {
    #[serde(default)]
    types: LayerTypes,
    #[serde(default)]
    metadata: BTreeMap<String, String>,
}

/// A contributed (or to-be-contributed) layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerRecord {
    /// Layer name, also the directory name
    pub name: String,
    /// Layer directory
    pub path: PathBuf,
    /// Metadata file next to the directory
    pub metadata_file: PathBuf,
    pub types: LayerTypes,
    /// Checksum of the dependency the layer was materialized from
    pub checksum: Option<String>,
    /// Free-form string metadata
    pub metadata: BTreeMap<String, String>,
    /// Variables exported to the launch environment
    pub launch_env: EnvironmentBindings,
}

impl LayerRecord {
    /// Write the metadata file and launch environment
    pub async fn persist(&self) -> StarknetResult<()> {
        let mut metadata = self.metadata.clone();
        if let Some(ref checksum) = self.checksum {
            metadata.insert(CHECKSUM_KEY.to_string(), checksum.clone());
        }
        let file = LayerFile {
            types: self.types,
            metadata,
        };
        let content = toml::to_string(&file)?;

        tokio::fs::write(&self.metadata_file, content)
            .await
            .map_err(|e| {
                StarknetError::io(format!("writing {}", self.metadata_file.display()), e)
            })?;

        self.launch_env.write(&self.path.join("env.launch")).await?;
        debug!("Persisted layer {} to {}", self.name, self.metadata_file.display());
        Ok(())
    }

    /// Forget previous contents: delete the metadata file and empty the
    /// layer directory.
    pub async fn reset(&mut self) -> StarknetResult<()> {
        match tokio::fs::remove_file(&self.metadata_file).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(StarknetError::io(
                    format!("removing {}", self.metadata_file.display()),
                    e,
                ))
            }
        }

        match tokio::fs::remove_dir_all(&self.path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(StarknetError::io(
                    format!("removing {}", self.path.display()),
                    e,
                ))
            }
        }
        tokio::fs::create_dir_all(&self.path)
            .await
            .map_err(|e| StarknetError::io(format!("creating {}", self.path.display()), e))?;

        self.types = LayerTypes::default();
        self.checksum = None;
        self.metadata.clear();
        self.launch_env = EnvironmentBindings::new();
        Ok(())
    }
}

/// The layers directory handed to the build phase
#[derive(Debug, Clone)]
pub struct Layers {
    pub path: PathBuf,
}

impl Layers {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load layer `name`, restoring persisted metadata when present
    pub async fn layer(&self, name: &str) -> StarknetResult<LayerRecord> {
        let path = self.path.join(name);
        let metadata_file = self.path.join(format!("{name}.toml"));

        let mut record = LayerRecord {
            name: name.to_string(),
            path,
            metadata_file,
            types: LayerTypes::default(),
            checksum: None,
            metadata: BTreeMap::new(),
            launch_env: EnvironmentBindings::new(),
        };

        if !record.metadata_file.exists() {
            return Ok(record);
        }

        let file = read_layer_file(&record.metadata_file).await?;
        record.types = file.types;
        record.metadata = file.metadata;
        record.checksum = record.metadata.remove(CHECKSUM_KEY);
        record.launch_env = EnvironmentBindings::read(&record.path.join("env.launch")).await?;
        Ok(record)
    }
}

async fn read_layer_file(path: &Path) -> StarknetResult<LayerFile> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| StarknetError::io(format!("reading {}", path.display()), e))?;
    toml::from_str(&content).map_err(|e| {
        StarknetError::from(e).context(format!("unable to parse layer metadata {}", path.display()))
    })
}
