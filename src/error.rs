//! Error types for the Starknet buildpack
//!
//! All modules use `StarknetResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for buildpack operations
pub type StarknetResult<T> = Result<T, StarknetError>;

/// Broad failure category, used for exit codes and diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Filesystem walk or stat failure while detecting the project
    Detection,
    /// Missing configuration, descriptor or required value
    Resolution,
    /// A toolchain command failed to launch or exited non-zero
    ExternalProcess,
    /// Unpack, permission, download or layer persistence failure
    Installation,
    /// An expected build artifact is absent
    Discovery,
    /// Bug or runtime failure inside the buildpack itself
    Internal,
}

/// All errors that can occur while detecting or building
#[derive(Error, Debug)]
pub enum StarknetError {
    // Detection errors
    #[error("no files with extension '.{extension}' found in {path}")]
    SourceFilesMissing { extension: String, path: PathBuf },

    #[error("unable to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    // Configuration and resolution errors
    #[error("invalid buildpack descriptor at {path}: {reason}")]
    DescriptorInvalid { path: PathBuf, reason: String },

    #[error("{0} must be specified")]
    ConfigMissing(String),

    #[error("unable to parse {name}={value:?}: unbalanced quotes or trailing escape")]
    ConfigArgs { name: String, value: String },

    #[error("invalid version constraint {constraint:?}: {reason}")]
    VersionConstraint { constraint: String, reason: String },

    #[error("no valid dependencies for {id}, {constraint}, and {stack} in [{candidates}]")]
    DependencyNotFound {
        id: String,
        constraint: String,
        stack: String,
        candidates: String,
    },

    #[error("invalid build plan at {path}: {reason}")]
    PlanInvalid { path: PathBuf, reason: String },

    // Download and cache errors
    #[error("unable to download {uri}: {reason}")]
    Download { uri: String, reason: String },

    #[error("sha256 mismatch for {uri}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        uri: String,
        expected: String,
        actual: String,
    },

    #[error("unsupported archive format: {0}")]
    UnsupportedArchive(PathBuf),

    #[error("archive entry escapes destination: {0}")]
    ArchiveEntryUnsafe(String),

    // Process errors
    #[error("unable to run {command}: {source}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} exited with {status}:\n{output}")]
    CommandExecution {
        command: String,
        status: String,
        output: String,
    },

    #[error("unable to initialize deploy wallet: {0}")]
    WalletInit(#[source] Box<StarknetError>),

    // Discovery errors
    #[error("no contract class found in {0}")]
    ContractClassNotFound(PathBuf),

    #[error("found {} contract classes in {dir}, expected one: {}", .candidates.len(), .candidates.join(", "))]
    ContractClassAmbiguous {
        dir: PathBuf,
        candidates: Vec<String>,
    },

    // Build result errors
    #[error("process {new} cannot be default, {existing} already is")]
    DuplicateDefaultProcess { existing: String, new: String },

    // IO errors
    #[error("IO error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<StarknetError>,
    },

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StarknetError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed (launch) error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Create a command execution (non-zero exit) error
    pub fn command_exec(
        command: impl Into<String>,
        status: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Self::CommandExecution {
            command: command.into(),
            status: status.into(),
            output: output.into(),
        }
    }

    /// Wrap this error with a description of the operation that failed
    pub fn context(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Failure category, looking through context wrappers
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Context { source, .. } | Self::WalletInit(source) => source.kind(),
            Self::SourceFilesMissing { .. } | Self::Walk { .. } => ErrorKind::Detection,
            Self::DescriptorInvalid { .. }
            | Self::ConfigMissing(_)
            | Self::ConfigArgs { .. }
            | Self::VersionConstraint { .. }
            | Self::DependencyNotFound { .. }
            | Self::PlanInvalid { .. }
            | Self::TomlParse(_) => ErrorKind::Resolution,
            Self::CommandFailed { .. } | Self::CommandExecution { .. } => {
                ErrorKind::ExternalProcess
            }
            Self::Download { .. }
            | Self::ChecksumMismatch { .. }
            | Self::UnsupportedArchive(_)
            | Self::ArchiveEntryUnsafe(_)
            | Self::Io { .. }
            | Self::TomlSerialize(_) => ErrorKind::Installation,
            Self::ContractClassNotFound(_) | Self::ContractClassAmbiguous { .. } => {
                ErrorKind::Discovery
            }
            Self::DuplicateDefaultProcess { .. } | Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Context { source, .. } | Self::WalletInit(source) => source.hint(),
            Self::SourceFilesMissing { .. } => {
                Some("Scarb projects need at least one .cairo source file")
            }
            Self::ConfigMissing(_) => {
                Some("Set the variable in the platform environment or unset BP_ENABLE_STARKNET_DEPLOY")
            }
            Self::ContractClassNotFound(_) => {
                Some("Run `scarb build` with a [[target.starknet-contract]] section in Scarb.toml")
            }
            Self::ChecksumMismatch { .. } => Some("Remove the cached artifact and rebuild"),
            _ => None,
        }
    }
}
