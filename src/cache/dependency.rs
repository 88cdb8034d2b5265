//! Dependency descriptors and version resolution
//!
//! Descriptors come from `[[metadata.dependencies]]` in `buildpack.toml`.
//! Resolution filters by id, stack and version constraint and picks the
//! highest matching version.

use crate::error::{StarknetError, StarknetResult};
use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// A downloadable artifact with a known content hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyDescriptor {
    /// Logical id, e.g. `starkli-gnu`
    pub id: String,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub version: String,
    pub uri: String,
    /// Lowercase hex SHA-256 of the artifact
    pub sha256: String,
    /// Stacks the artifact runs on (`*` for any)
    #[serde(default)]
    pub stacks: Vec<String>,
}

impl DependencyDescriptor {
    /// Name for display, falling back to the id
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    fn supports_stack(&self, stack: &str) -> bool {
        self.stacks.is_empty() || self.stacks.iter().any(|s| s == "*" || s == stack)
    }
}

impl fmt::Display for DependencyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.id, self.version)
    }
}

/// A parsed version constraint
#[derive(Debug, Clone)]
enum VersionMatcher {
    Any,
    Exact(Version),
    Requirement(VersionReq),
}

impl VersionMatcher {
    fn parse(constraint: &str) -> StarknetResult<Self> {
        let constraint = constraint.trim();
        if constraint.is_empty() || constraint == "*" {
            return Ok(Self::Any);
        }
        if let Ok(version) = Version::parse(constraint) {
            return Ok(Self::Exact(version));
        }
        VersionReq::parse(constraint)
            .map(Self::Requirement)
            .map_err(|e| StarknetError::VersionConstraint {
                constraint: constraint.to_string(),
                reason: e.to_string(),
            })
    }

    fn matches(&self, version: &Version) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(exact) => exact == version,
            Self::Requirement(req) => req.matches(version),
        }
    }
}

/// Resolves `(id, constraint)` pairs against the declared dependencies
#[derive(Debug, Clone)]
pub struct DependencyResolver {
    dependencies: Vec<DependencyDescriptor>,
    stack: Option<String>,
}

impl DependencyResolver {
    /// Create a resolver. With no stack every descriptor is eligible.
    pub fn new(dependencies: Vec<DependencyDescriptor>, stack: Option<String>) -> Self {
        Self {
            dependencies,
            stack,
        }
    }

    /// Find the highest version of `id` satisfying `constraint`
    pub fn resolve(&self, id: &str, constraint: &str) -> StarknetResult<DependencyDescriptor> {
        let matcher = VersionMatcher::parse(constraint)?;

        let mut best: Option<(Version, &DependencyDescriptor)> = None;
        for candidate in &self.dependencies {
            if candidate.id != id {
                continue;
            }
            if let Some(ref stack) = self.stack {
                if !candidate.supports_stack(stack) {
                    continue;
                }
            }
            let version = match Version::parse(&candidate.version) {
                Ok(v) => v,
                Err(e) => {
                    debug!("Skipping {}: invalid version: {}", candidate, e);
                    continue;
                }
            };
            if !matcher.matches(&version) {
                continue;
            }
            if best.as_ref().map_or(true, |(b, _)| version > *b) {
                best = Some((version, candidate));
            }
        }

        match best {
            Some((_, dependency)) => {
                debug!("Resolved {} {} to {}", id, constraint, dependency);
                Ok(dependency.clone())
            }
            None => Err(StarknetError::DependencyNotFound {
                id: id.to_string(),
                constraint: constraint.to_string(),
                stack: self.stack.clone().unwrap_or_else(|| "*".to_string()),
                candidates: self
                    .dependencies
                    .iter()
                    .map(|d| d.to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    }
}
