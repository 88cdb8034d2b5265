//! Build configuration
//!
//! `BP_*` values come from the environment (platform `env/` files take
//! precedence over the buildpack's own environment) and fall back to the
//! defaults declared in `buildpack.toml`.

pub mod schema;

pub use schema::{BuildpackDescriptor, Configuration};

use crate::error::{StarknetError, StarknetResult};
use crate::ui;
use std::collections::HashMap;
use std::path::Path;

/// Load and parse `<buildpack_dir>/buildpack.toml`
pub async fn load_descriptor(buildpack_dir: &Path) -> StarknetResult<BuildpackDescriptor> {
    let path = buildpack_dir.join("buildpack.toml");
    let content = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| StarknetError::io(format!("reading {}", path.display()), e))?;

    toml::from_str(&content).map_err(|e| StarknetError::DescriptorInvalid {
        path: path.clone(),
        reason: e.to_string(),
    })
}

/// Resolves configuration values against the environment
#[derive(Debug, Clone)]
pub struct ConfigurationResolver {
    configurations: Vec<Configuration>,
    environment: HashMap<String, String>,
}

impl ConfigurationResolver {
    pub fn new(configurations: Vec<Configuration>, environment: HashMap<String, String>) -> Self {
        Self {
            configurations,
            environment,
        }
    }

    /// Resolver over the descriptor's declared configurations
    pub fn from_descriptor(
        descriptor: &BuildpackDescriptor,
        environment: HashMap<String, String>,
    ) -> Self {
        Self::new(descriptor.metadata.configurations.clone(), environment)
    }

    /// Value of `name` and whether it was set explicitly. Unknown, unset
    /// names resolve to an empty string.
    pub fn resolve(&self, name: &str) -> (String, bool) {
        if let Some(value) = self.environment.get(name) {
            return (value.clone(), true);
        }
        let default = self
            .configurations
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.default.clone())
            .unwrap_or_default();
        (default, false)
    }

    /// Value of `name`, ignoring whether it was set
    pub fn value(&self, name: &str) -> String {
        self.resolve(name).0
    }

    /// Boolean value of `name`; anything unparseable is `false`
    pub fn resolve_bool(&self, name: &str) -> bool {
        let (value, _) = self.resolve(name);
        match parse_bool(&value) {
            Some(b) => b,
            None => {
                if !value.is_empty() {
                    ui::warn(&format!("{}={:?} is not a boolean, treating as false", name, value));
                }
                false
            }
        }
    }

    /// Print the build-time configuration table
    pub fn log_configuration(&self) {
        let build: Vec<&Configuration> = self.configurations.iter().filter(|c| c.build).collect();
        if build.is_empty() {
            return;
        }

        ui::header("Build Configuration:");
        let width = build.iter().map(|c| c.name.len()).max().unwrap_or(0) + 1;
        for configuration in build {
            let (value, set) = self.resolve(&configuration.name);
            let shown = if configuration.name.ends_with("PRIVATE_KEY") && !value.is_empty() {
                "<redacted>".to_string()
            } else {
                value
            };
            let marker = if set { "" } else { " (default)" };
            ui::body(&format!(
                "${:<width$} {:<20} {}{}",
                configuration.name,
                shown,
                configuration.description,
                marker,
                width = width
            ));
        }
    }
}

/// Parse the boolean spellings accepted by `BP_*` flags
pub fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}
