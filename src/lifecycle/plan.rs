//! Build plan written by detect and read by build

use crate::error::{StarknetError, StarknetResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A capability this buildpack provides
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildPlanProvide {
    pub name: String,
}

/// A capability this buildpack requires
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildPlanRequire {
    pub name: String,
    #[serde(default, skip_serializing_if = "toml::Table::is_empty")]
    pub metadata: toml::Table,
}

impl BuildPlanRequire {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metadata: toml::Table::new(),
        }
    }
}

/// One provides/requires alternative
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildPlan {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub provides: Vec<BuildPlanProvide>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<BuildPlanRequire>,
}

/// Outcome of the detect phase
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectResult {
    pub pass: bool,
    pub plans: Vec<BuildPlan>,
}

#[derive(Serialize)]
struct PlanFile<'a> {
    #[serde(flatten)]
    primary: &'a BuildPlan,
    #[serde(rename = "or", skip_serializing_if = "no_alternatives")]
    alternatives: &'a [BuildPlan],
}

fn no_alternatives(plans: &&[BuildPlan]) -> bool {
    plans.is_empty()
}

impl DetectResult {
    /// A non-matching, successful detection
    pub fn fail() -> Self {
        Self::default()
    }

    /// Write the plan file: the first plan at top level, the rest as `[[or]]`
    pub async fn write(&self, path: &Path) -> StarknetResult<()> {
        let Some((primary, alternatives)) = self.plans.split_first() else {
            return Ok(());
        };
        let content = toml::to_string(&PlanFile {
            primary,
            alternatives,
        })?;
        tokio::fs::write(path, content)
            .await
            .map_err(|e| StarknetError::io(format!("writing {}", path.display()), e))
    }
}

/// An entry of the plan handed to the build phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildpackPlanEntry {
    pub name: String,
    #[serde(default)]
    pub metadata: toml::Table,
}

/// The plan handed to the build phase
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildpackPlan {
    #[serde(default)]
    pub entries: Vec<BuildpackPlanEntry>,
}

impl BuildpackPlan {
    /// Read a plan file; a missing file is an empty plan
    pub async fn read(path: &Path) -> StarknetResult<Self> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(StarknetError::io(format!("reading {}", path.display()), e)),
        };
        toml::from_str(&content).map_err(|e| StarknetError::PlanInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

/// Looks up plan entries by name, merging duplicates
pub struct PlanEntryResolver<'a> {
    plan: &'a BuildpackPlan,
}

impl<'a> PlanEntryResolver<'a> {
    pub fn new(plan: &'a BuildpackPlan) -> Self {
        Self { plan }
    }

    /// Merged entry for `name`; later entries win on conflicting keys
    pub fn resolve(&self, name: &str) -> Option<BuildpackPlanEntry> {
        let mut found = self.plan.entries.iter().filter(|e| e.name == name).peekable();
        found.peek()?;

        let mut merged = BuildpackPlanEntry {
            name: name.to_string(),
            metadata: toml::Table::new(),
        };
        for entry in found {
            for (key, value) in &entry.metadata {
                merged.metadata.insert(key.clone(), value.clone());
            }
        }
        Some(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn plan() -> BuildPlan {
        BuildPlan {
            provides: vec![BuildPlanProvide {
                name: "starkli".to_string(),
            }],
            requires: vec![
                BuildPlanRequire::named("scarb"),
                BuildPlanRequire::named("starkli"),
            ],
        }
    }

    #[tokio::test]
    async fn writes_single_plan_at_top_level() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("plan.toml");
        DetectResult {
            pass: true,
            plans: vec![plan()],
        }
        .write(&path)
        .await
        .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("[[provides]]"));
        assert!(content.contains("[[requires]]"));
        assert!(!content.contains("[[or]]"));

        let parsed: BuildPlan = toml::from_str(&content).unwrap();
        assert_eq!(parsed, plan());
    }

    #[tokio::test]
    async fn writes_alternatives_under_or() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("plan.toml");
        DetectResult {
            pass: true,
            plans: vec![plan(), plan()],
        }
        .write(&path)
        .await
        .unwrap();

        #[derive(Deserialize)]
        struct WithAlternatives {
            provides: Vec<BuildPlanProvide>,
            or: Vec<BuildPlan>,
        }
        let parsed: WithAlternatives =
            toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.provides.len(), 1);
        assert_eq!(parsed.or, vec![plan()]);
    }

    #[tokio::test]
    async fn reads_and_resolves_entries() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("plan.toml");
        std::fs::write(
            &path,
            r#"
[[entries]]
name = "scarb"

[[entries]]
name = "starkli"
[entries.metadata]
launch = true

[[entries]]
name = "starkli"
[entries.metadata]
build = true
"#,
        )
        .unwrap();

        let plan = BuildpackPlan::read(&path).await.unwrap();
        let resolver = PlanEntryResolver::new(&plan);
        let entry = resolver.resolve("starkli").unwrap();

        assert_eq!(entry.metadata.get("launch"), Some(&toml::Value::Boolean(true)));
        assert_eq!(entry.metadata.get("build"), Some(&toml::Value::Boolean(true)));
        assert!(resolver.resolve("cairo").is_none());
    }

    #[tokio::test]
    async fn missing_plan_is_empty() {
        let temp = TempDir::new().unwrap();
        let plan = BuildpackPlan::read(&temp.path().join("plan.toml"))
            .await
            .unwrap();
        assert!(plan.entries.is_empty());
    }
}
