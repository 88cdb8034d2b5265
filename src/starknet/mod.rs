//! Starknet contract toolchain
//!
//! Detection of Scarb projects and the build that provisions `starkli`,
//! declares the compiled contract class and optionally adds a deploy
//! process.

pub mod build;
pub mod declare;
pub mod detect;
pub mod installer;
pub mod process;
pub mod wallet;

pub use build::{build, BuildContext};
pub use declare::ContractDeclarer;
pub use detect::detect;
pub use installer::StarkliInstaller;
pub use process::build_process_types;
pub use wallet::initialize_deploy_wallet;

/// Plan entry and binary name of the contract toolchain
pub const PLAN_ENTRY_STARKLI: &str = "starkli";
/// Plan entry of the Cairo package manager
pub const PLAN_ENTRY_SCARB: &str = "scarb";

/// Project manifest that marks a Scarb project
pub const MANIFEST_FILE: &str = "Scarb.toml";
/// Extension of Cairo sources
pub const SOURCE_EXTENSION: &str = "cairo";
/// Suffix of compiled Sierra contract classes
pub const CONTRACT_CLASS_SUFFIX: &str = ".contract_class.json";
/// Scarb output directory, relative to the application
pub const COMPILE_DIR: &str = "target/dev";
/// Declared class hash, relative to the application
pub const CLASS_HASH_FILE: &str = "class_hash.txt";

pub const BP_STARKNET_VERSION: &str = "BP_STARKNET_VERSION";
pub const BP_STARKNET_LIBC: &str = "BP_STARKNET_LIBC";
pub const BP_ENABLE_STARKNET_DEPLOY: &str = "BP_ENABLE_STARKNET_DEPLOY";
pub const BP_STARKNET_DEPLOY_PRIVATE_KEY: &str = "BP_STARKNET_DEPLOY_PRIVATE_KEY";
pub const BP_STARKNET_DEPLOY_ACCOUNT: &str = "BP_STARKNET_DEPLOY_ACCOUNT";
pub const BP_STARKNET_DEPLOY_RPC: &str = "BP_STARKNET_DEPLOY_RPC";
pub const BP_STARKNET_DEPLOY_WALLET_ADDRESS: &str = "BP_STARKNET_DEPLOY_WALLET_ADDRESS";
pub const BP_STARKNET_DEPLOY_ARGS: &str = "BP_STARKNET_DEPLOY_ARGS";

/// Launch variables read by `starkli`
pub const STARKNET_PRIVATE_KEY: &str = "STARKNET_PRIVATE_KEY";
pub const STARKNET_ACCOUNT: &str = "STARKNET_ACCOUNT";
pub const STARKNET_RPC: &str = "STARKNET_RPC";
pub const STARKNET_CLASS_HASH: &str = "STARKNET_CLASS_HASH";
