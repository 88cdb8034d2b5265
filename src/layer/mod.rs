//! Layer contribution
//!
//! Layers are cacheable directories contributed to the build, each with a
//! metadata file and the environment bindings it exports to later phases.

pub mod contributor;
pub mod env;
pub mod record;

pub use contributor::{DependencyLayerContributor, Materializer};
pub use env::{EnvBinding, EnvironmentBindings, ProcessEnv};
pub use record::{LayerRecord, LayerTypes, Layers};
