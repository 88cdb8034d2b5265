//! Environment handling for layers and child processes
//!
//! [`EnvironmentBindings`] is what a layer exports to later phases, written
//! in the `env.launch/` file convention (`NAME.append` + `NAME.delim`,
//! `NAME.default`). [`ProcessEnv`] is the environment the installer hands to
//! each child process.

use crate::error::{StarknetError, StarknetResult};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::Path;
use tracing::debug;

/// How a binding combines with an existing value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvBinding {
    /// Concatenate after any existing value, separated by `delimiter`
    Append { value: String, delimiter: String },
    /// Set only when the variable is unset
    Default(String),
}

/// Ordered set of environment bindings exported by a layer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentBindings {
    bindings: BTreeMap<String, EnvBinding>,
}

impl EnvironmentBindings {
    /// Create an empty set of bindings
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `value` to `name`, joined by `delimiter`
    pub fn append(
        &mut self,
        name: impl Into<String>,
        delimiter: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.bindings.insert(
            name.into(),
            EnvBinding::Append {
                value: value.into(),
                delimiter: delimiter.into(),
            },
        );
    }

    /// Set `name` to `value` unless something already set it
    pub fn set_default(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.bindings
            .insert(name.into(), EnvBinding::Default(value.into()));
    }

    /// Look up a binding by variable name
    pub fn get(&self, name: &str) -> Option<&EnvBinding> {
        self.bindings.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &EnvBinding)> {
        self.bindings.iter()
    }

    /// Write the bindings into `dir` (usually `<layer>/env.launch`)
    pub async fn write(&self, dir: &Path) -> StarknetResult<()> {
        if self.bindings.is_empty() {
            return Ok(());
        }

        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| StarknetError::io(format!("creating {}", dir.display()), e))?;

        for (name, binding) in &self.bindings {
            match binding {
                EnvBinding::Append { value, delimiter } => {
                    write_file(&dir.join(format!("{name}.append")), value).await?;
                    write_file(&dir.join(format!("{name}.delim")), delimiter).await?;
                }
                EnvBinding::Default(value) => {
                    write_file(&dir.join(format!("{name}.default")), value).await?;
                }
            }
        }
        Ok(())
    }

    /// Read bindings previously written by [`write`](Self::write).
    /// A missing directory yields no bindings.
    pub async fn read(dir: &Path) -> StarknetResult<Self> {
        let mut bindings = Self::new();

        let mut entries = match tokio::fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(bindings),
            Err(e) => return Err(StarknetError::io(format!("reading {}", dir.display()), e)),
        };

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StarknetError::io(format!("reading {}", dir.display()), e))?
        {
            let file_name = entry.file_name().to_string_lossy().into_owned();
            let Some((name, suffix)) = file_name.rsplit_once('.') else {
                continue;
            };
            match suffix {
                "append" => {
                    let value = read_file(&entry.path()).await?;
                    let delim_path = dir.join(format!("{name}.delim"));
                    let delimiter = if delim_path.exists() {
                        read_file(&delim_path).await?
                    } else {
                        String::new()
                    };
                    bindings.append(name, delimiter, value);
                }
                "default" => {
                    let value = read_file(&entry.path()).await?;
                    bindings.set_default(name, value);
                }
                _ => {}
            }
        }

        Ok(bindings)
    }
}

async fn write_file(path: &Path, contents: &str) -> StarknetResult<()> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|e| StarknetError::io(format!("writing {}", path.display()), e))
}

async fn read_file(path: &Path) -> StarknetResult<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| StarknetError::io(format!("reading {}", path.display()), e))
}

/// Environment of child processes spawned during one build
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessEnv {
    vars: BTreeMap<String, String>,
}

impl ProcessEnv {
    /// Create an empty environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the buildpack's own environment
    pub fn from_current() -> Self {
        Self::from_os_vars(std::env::vars_os())
    }

    /// Build from raw OS pairs. Entries whose name or value is not valid
    /// Unicode are skipped.
    pub fn from_os_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        let vars = vars
            .into_iter()
            .filter_map(|(name, value)| match (name.into_string(), value.into_string()) {
                (Ok(name), Ok(value)) => Some((name, value)),
                (name, _) => {
                    debug!(
                        "Skipping non-unicode environment variable {}",
                        name.unwrap_or_else(|raw| raw.to_string_lossy().into_owned())
                    );
                    None
                }
            })
            .collect();
        Self { vars }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Append `value` to `name`, inserting `delimiter` when a value exists
    pub fn append(&mut self, name: &str, delimiter: &str, value: &str) {
        let joined = match self.vars.get(name) {
            Some(existing) if !existing.is_empty() => format!("{existing}{delimiter}{value}"),
            _ => value.to_string(),
        };
        self.vars.insert(name.to_string(), joined);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.vars.iter()
    }
}

impl FromIterator<(String, String)> for ProcessEnv {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().collect(),
        }
    }
}
