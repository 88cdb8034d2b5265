//! Artifact download cache
//!
//! Artifacts are stored by checksum, so one checksum is downloaded at most
//! once per cache directory:
//!
//! ```text
//! <root>/<sha256>/<file name>
//! <root>/<sha256>.toml          descriptor of the artifact
//! ```
//!
//! Two roots are consulted: a read-only one shipped with the buildpack
//! (offline packaging) and a writable download cache.

use crate::cache::dependency::DependencyDescriptor;
use crate::error::{StarknetError, StarknetResult};
use crate::ui;
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Locates or downloads verified dependency artifacts
#[derive(Debug, Clone)]
pub struct DependencyCache {
    /// Pre-populated artifacts, never written
    cache_path: PathBuf,
    /// Writable download location
    download_path: PathBuf,
}

impl DependencyCache {
    pub fn new(cache_path: impl Into<PathBuf>, download_path: impl Into<PathBuf>) -> Self {
        Self {
            cache_path: cache_path.into(),
            download_path: download_path.into(),
        }
    }

    /// Return a local path to the artifact of `dependency`, downloading it
    /// if needed. The file's SHA-256 always equals `dependency.sha256`.
    pub async fn artifact(&self, dependency: &DependencyDescriptor) -> StarknetResult<PathBuf> {
        let cache = self.clone();
        let dependency = dependency.clone();
        tokio::task::spawn_blocking(move || cache.artifact_blocking(&dependency))
            .await
            .map_err(|e| StarknetError::Internal(format!("download task failed: {e}")))?
    }

    fn artifact_blocking(&self, dependency: &DependencyDescriptor) -> StarknetResult<PathBuf> {
        let sha256 = dependency.sha256.to_lowercase();

        if let Some(path) = first_file(&self.cache_path.join(&sha256))? {
            ui::body(&format!("Reusing cached download from buildpack: {}", path.display()));
            return Ok(path);
        }

        let dir = self.download_path.join(&sha256);
        let path = dir.join(artifact_file_name(&dependency.uri));

        if path.exists() {
            match sha256_file(&path) {
                Ok(actual) if actual == sha256 => {
                    ui::body(&format!("Reusing cached download: {}", path.display()));
                    return Ok(path);
                }
                Ok(actual) => debug!(
                    "Cached {} has sha256 {}, expected {}, downloading again",
                    path.display(),
                    actual,
                    sha256
                ),
                Err(e) => debug!("Unable to hash cached {}: {}", path.display(), e),
            }
        }

        fs::create_dir_all(&dir)
            .map_err(|e| StarknetError::io(format!("creating {}", dir.display()), e))?;

        ui::body(&format!("Downloading from {}", dependency.uri));
        let partial = dir.join(format!(
            "{}.partial",
            path.file_name().and_then(|n| n.to_str()).unwrap_or("artifact")
        ));
        fetch(&dependency.uri, &partial)?;

        ui::body("Verifying checksum");
        let actual = sha256_file(&partial)
            .map_err(|e| StarknetError::io(format!("hashing {}", partial.display()), e))?;
        if actual != sha256 {
            let _ = fs::remove_file(&partial);
            return Err(StarknetError::ChecksumMismatch {
                uri: dependency.uri.clone(),
                expected: sha256,
                actual,
            });
        }

        fs::rename(&partial, &path)
            .map_err(|e| StarknetError::io(format!("moving {}", partial.display()), e))?;

        let descriptor = self.download_path.join(format!("{sha256}.toml"));
        let content = toml::to_string(dependency)?;
        fs::write(&descriptor, content)
            .map_err(|e| StarknetError::io(format!("writing {}", descriptor.display()), e))?;

        info!("Cached {} at {}", dependency, path.display());
        Ok(path)
    }
}

/// First regular file in `dir` by name, `None` when the directory is absent
fn first_file(dir: &Path) -> StarknetResult<Option<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StarknetError::io(format!("reading {}", dir.display()), e)),
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| StarknetError::io(format!("reading {}", dir.display()), e))?;
        if entry.path().is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files.into_iter().next())
}

/// Copy or download `uri` into `dest`
fn fetch(uri: &str, dest: &Path) -> StarknetResult<()> {
    if uri.starts_with("http://") || uri.starts_with("https://") {
        let response = ureq::get(uri).call().map_err(|e| StarknetError::Download {
            uri: uri.to_string(),
            reason: e.to_string(),
        })?;
        let mut reader = response.into_body().into_reader();
        let mut file = File::create(dest)
            .map_err(|e| StarknetError::io(format!("creating {}", dest.display()), e))?;
        io::copy(&mut reader, &mut file).map_err(|e| StarknetError::Download {
            uri: uri.to_string(),
            reason: e.to_string(),
        })?;
        return Ok(());
    }

    let source = uri.strip_prefix("file://").unwrap_or(uri);
    fs::copy(source, dest).map_err(|e| StarknetError::Download {
        uri: uri.to_string(),
        reason: e.to_string(),
    })?;
    Ok(())
}

/// Lowercase hex SHA-256 of a file's contents
pub fn sha256_file(path: &Path) -> io::Result<String> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut hasher = Sha256::new();
    io::copy(&mut reader, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

/// Derive a safe file name from the last path segment of a URI
fn artifact_file_name(uri: &str) -> String {
    let last = uri.rsplit('/').next().unwrap_or_default();
    let last = last.split(['?', '#']).next().unwrap_or_default();

    let sanitized: String = last
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.is_empty() || sanitized == "." || sanitized == ".." {
        "artifact".to_string()
    } else {
        sanitized
    }
}
