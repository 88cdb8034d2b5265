//! Dependency-backed layer contribution
//!
//! A layer built from a dependency is reused as long as its persisted
//! checksum matches the resolved dependency. Otherwise the layer is wiped,
//! the verified artifact is handed to a [`Materializer`] once, and the
//! result is persisted.

use crate::cache::{DependencyCache, DependencyDescriptor};
use crate::error::StarknetResult;
use crate::layer::record::{LayerRecord, LayerTypes};
use crate::ui;
use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, info};

/// Turns a verified artifact into layer contents
#[async_trait]
pub trait Materializer: Send {
    /// Populate `layer` from `artifact` and return it. The layer directory
    /// exists and is empty when this is called.
    async fn materialize(
        &mut self,
        artifact: &Path,
        layer: LayerRecord,
    ) -> StarknetResult<LayerRecord>;
}

/// Contributes a layer from a single dependency
#[derive(Debug, Clone)]
pub struct DependencyLayerContributor {
    dependency: DependencyDescriptor,
    cache: DependencyCache,
    types: LayerTypes,
}

impl DependencyLayerContributor {
    pub fn new(dependency: DependencyDescriptor, cache: DependencyCache, types: LayerTypes) -> Self {
        Self {
            dependency,
            cache,
            types,
        }
    }

    /// Layer name derived from the dependency id
    pub fn layer_name(&self) -> &str {
        &self.dependency.id
    }

    /// Reuse `layer` when its checksum matches the dependency, otherwise
    /// rebuild it with `materializer` and persist the result.
    pub async fn contribute(
        &self,
        mut layer: LayerRecord,
        materializer: &mut dyn Materializer,
    ) -> StarknetResult<LayerRecord> {
        ui::header(&format!(
            "{} {}",
            self.dependency.display_name(),
            self.dependency.version
        ));

        if layer.checksum.as_deref() == Some(self.dependency.sha256.as_str()) {
            ui::body(&format!("Reusing cached layer {}", layer.path.display()));
            debug!(
                "Layer {} checksum {} unchanged",
                layer.name, self.dependency.sha256
            );
            // restored metadata may carry stale types
            if layer.types != self.types {
                layer.types = self.types;
                layer.persist().await?;
            }
            return Ok(layer);
        }

        debug!(
            "Layer {} checksum {:?} differs from {}, contributing",
            layer.name, layer.checksum, self.dependency.sha256
        );
        ui::body(&format!("Contributing to layer {}", layer.path.display()));
        layer.reset().await?;

        let artifact = self.cache.artifact(&self.dependency).await?;
        let mut layer = materializer.materialize(&artifact, layer).await?;

        layer.types = self.types;
        layer.checksum = Some(self.dependency.sha256.clone());
        layer
            .metadata
            .insert("id".to_string(), self.dependency.id.clone());
        layer
            .metadata
            .insert("name".to_string(), self.dependency.display_name().to_string());
        layer
            .metadata
            .insert("version".to_string(), self.dependency.version.clone());
        layer
            .metadata
            .insert("uri".to_string(), self.dependency.uri.clone());
        layer.persist().await?;

        info!("Contributed layer {} from {}", layer.name, self.dependency.uri);
        Ok(layer)
    }
}
