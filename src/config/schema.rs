//! Buildpack descriptor schema
//!
//! The descriptor is the buildpack's `buildpack.toml`.

use crate::cache::DependencyDescriptor;
use serde::{Deserialize, Serialize};

/// Root of `buildpack.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildpackDescriptor {
    /// Buildpack API version
    #[serde(default)]
    pub api: String,

    /// Identity of the buildpack
    pub buildpack: BuildpackInfo,

    /// Stacks the buildpack supports
    #[serde(default)]
    pub stacks: Vec<Stack>,

    /// Configuration and dependency metadata
    #[serde(default)]
    pub metadata: BuildpackMetadata,
}

/// `[buildpack]` table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildpackInfo {
    pub id: String,

    #[serde(default)]
    pub name: String,

    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// `[[stacks]]` entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stack {
    pub id: String,
}

/// `[metadata]` table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildpackMetadata {
    /// Recognised `BP_*` configuration
    pub configurations: Vec<Configuration>,

    /// Dependencies this buildpack can install
    pub dependencies: Vec<DependencyDescriptor>,
}

/// `[[metadata.configurations]]` entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Configuration {
    /// Environment variable name
    pub name: String,

    /// Value used when the variable is unset
    #[serde(default)]
    pub default: String,

    #[serde(default)]
    pub description: String,

    /// Read during the build phase
    #[serde(default)]
    pub build: bool,

    /// Read at launch time
    #[serde(default)]
    pub launch: bool,
}
