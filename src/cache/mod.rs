//! Dependency resolution and artifact caching
//!
//! Descriptors are resolved from the buildpack's declared dependencies,
//! then fetched into a content-addressed cache keyed by SHA-256.
//!
//! # Cache States
//!
//! | State | Source | Description |
//! |-------|--------|-------------|
//! | Packaged | `<buildpack>/dependencies/<sha256>/` | Shipped offline, read-only |
//! | Cached | `<download>/<sha256>/` | Downloaded earlier, re-verified |
//! | Miss | network or local file | Downloaded and verified now |

pub mod dependency;
pub mod download;

pub use dependency::{DependencyDescriptor, DependencyResolver};
pub use download::{sha256_file, DependencyCache};
