//! `starkli` layer materialization
//!
//! Unpacks the toolchain, puts it on `PATH`, checks it runs, initializes the
//! deploy wallet and declares the compiled contract. Every child process
//! sees the environment accumulated so far, and the same values are bound
//! into the layer's launch environment.

use super::declare::ContractDeclarer;
use super::wallet::initialize_deploy_wallet;
use super::{
    BP_STARKNET_DEPLOY_ACCOUNT, BP_STARKNET_DEPLOY_PRIVATE_KEY, BP_STARKNET_DEPLOY_RPC,
    PLAN_ENTRY_STARKLI, STARKNET_ACCOUNT, STARKNET_CLASS_HASH, STARKNET_PRIVATE_KEY,
    STARKNET_RPC,
};
use crate::archive;
use crate::config::ConfigurationResolver;
use crate::error::{StarknetError, StarknetResult};
use crate::exec::{Execution, Executor};
use crate::layer::{LayerRecord, Materializer, ProcessEnv};
use crate::ui;
use async_trait::async_trait;
use std::path::Path;
use tracing::debug;

/// Layer metadata key of the probed toolchain version
pub const VERSION_KEY: &str = "starkli-version";
/// Layer metadata key of the declared class hash
pub const CLASS_HASH_KEY: &str = "class-hash";

pub struct StarkliInstaller<'a> {
    config: &'a ConfigurationResolver,
    executor: &'a dyn Executor,
    declarer: ContractDeclarer,
    env: ProcessEnv,
}

impl<'a> StarkliInstaller<'a> {
    pub fn new(
        config: &'a ConfigurationResolver,
        executor: &'a dyn Executor,
        declarer: ContractDeclarer,
        env: ProcessEnv,
    ) -> Self {
        Self {
            config,
            executor,
            declarer,
            env,
        }
    }

    async fn probe_version(&self) -> StarknetResult<String> {
        let execution = Execution::new(PLAN_ENTRY_STARKLI, ["--version"], &self.env);
        let output = self
            .executor
            .execute(&execution)
            .await
            .map_err(|e| e.context(format!("unable to get {PLAN_ENTRY_STARKLI} version")))?;
        Ok(output.trim().to_string())
    }
}

#[async_trait]
impl<'a> Materializer for StarkliInstaller<'a> {
    async fn materialize(
        &mut self,
        artifact: &Path,
        mut layer: LayerRecord,
    ) -> StarknetResult<LayerRecord> {
        let bin = layer.path.join("bin");

        ui::body(&format!(
            "Expanding {} to {}",
            artifact.display(),
            bin.display()
        ));
        archive::extract(artifact, &bin, 0)
            .await
            .map_err(|e| e.context(format!("unable to expand {}", artifact.display())))?;

        let executable = bin.join(PLAN_ENTRY_STARKLI);
        ui::body(&format!("Setting {} as executable", executable.display()));
        make_executable(&executable).await?;

        let bin_str = bin.display().to_string();
        ui::body(&format!("Setting {} in PATH", bin_str));
        self.env.append("PATH", ":", &bin_str);

        let version = self.probe_version().await?;
        ui::body(&format!("Checking {PLAN_ENTRY_STARKLI} version: {version}"));
        layer
            .metadata
            .insert(VERSION_KEY.to_string(), version);

        initialize_deploy_wallet(self.config, self.executor, &self.env).await?;

        layer.launch_env.append("PATH", ":", &bin_str);
        for (config_name, launch_name) in [
            (BP_STARKNET_DEPLOY_PRIVATE_KEY, STARKNET_PRIVATE_KEY),
            (BP_STARKNET_DEPLOY_ACCOUNT, STARKNET_ACCOUNT),
            (BP_STARKNET_DEPLOY_RPC, STARKNET_RPC),
        ] {
            let value = self.config.value(config_name);
            layer.launch_env.set_default(launch_name, value.clone());
            self.env.set(launch_name, value);
        }

        let class_hash = self.declarer.declare(self.executor, &self.env).await?;
        debug!("Declared class hash {}", class_hash);
        layer
            .launch_env
            .set_default(STARKNET_CLASS_HASH, class_hash.clone());
        self.env.set(STARKNET_CLASS_HASH, class_hash.clone());
        layer
            .metadata
            .insert(CLASS_HASH_KEY.to_string(), class_hash);

        Ok(layer)
    }
}

#[cfg(unix)]
async fn make_executable(path: &Path) -> StarknetResult<()> {
    use std::os::unix::fs::PermissionsExt;

    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .await
        .map_err(|e| StarknetError::io(format!("unable to chmod {}", path.display()), e))
}

#[cfg(not(unix))]
async fn make_executable(path: &Path) -> StarknetResult<()> {
    tokio::fs::metadata(path)
        .await
        .map(|_| ())
        .map_err(|e| StarknetError::io(format!("unable to chmod {}", path.display()), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildpackDescriptor;
    use crate::error::ErrorKind;
    use crate::exec::testing::StubExecutor;
    use crate::layer::{EnvBinding, Layers};
    use crate::starknet::{
        BP_ENABLE_STARKNET_DEPLOY, BP_STARKNET_DEPLOY_WALLET_ADDRESS, CLASS_HASH_FILE, COMPILE_DIR,
    };
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::fs::{self, File};
    use tempfile::TempDir;

    struct Fixture {
        temp: TempDir,
        app: std::path::PathBuf,
        artifact: std::path::PathBuf,
        layers: Layers,
    }

    impl Fixture {
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            let app = temp.path().join("workspace");
            fs::create_dir_all(app.join(COMPILE_DIR)).unwrap();
            fs::write(
                app.join(COMPILE_DIR).join("hello_Counter.contract_class.json"),
                "{}",
            )
            .unwrap();

            let artifact = temp.path().join("starkli.tar.gz");
            let encoder = GzEncoder::new(File::create(&artifact).unwrap(), Compression::default());
            let mut builder = tar::Builder::new(encoder);
            let data = b"#!/bin/sh\n";
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, "starkli", &data[..]).unwrap();
            builder.into_inner().unwrap().finish().unwrap();

            let layers = temp.path().join("layers");
            fs::create_dir_all(&layers).unwrap();

            Self {
                app,
                artifact,
                layers: Layers::new(layers),
                temp,
            }
        }

        fn config(&self, env: &[(&str, &str)]) -> ConfigurationResolver {
            let descriptor: BuildpackDescriptor =
                toml::from_str(include_str!("../../buildpack.toml")).unwrap();
            ConfigurationResolver::from_descriptor(
                &descriptor,
                env.iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            )
        }

        async fn layer(&self) -> LayerRecord {
            let mut layer = self.layers.layer("starkli-gnu").await.unwrap();
            layer.reset().await.unwrap();
            layer
        }
    }

    fn base_env() -> ProcessEnv {
        let mut env = ProcessEnv::new();
        env.set("PATH", "/usr/bin");
        env
    }

    #[tokio::test]
    async fn installs_and_declares() {
        let fixture = Fixture::new();
        let config = fixture.config(&[]);
        let executor = StubExecutor::new()
            .respond(&["--version"], "0.3.5 (abcdef0)\n")
            .respond(&["class-hash"], "0xabc123\n");
        let mut installer = StarkliInstaller::new(
            &config,
            &executor,
            ContractDeclarer::for_application(&fixture.app),
            base_env(),
        );

        let layer = fixture.layer().await;
        let bin = layer.path.join("bin");
        let layer = installer
            .materialize(&fixture.artifact, layer)
            .await
            .unwrap();

        assert!(bin.join("starkli").is_file());
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(bin.join("starkli")).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }

        let calls = executor.call_args();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], vec!["--version"]);
        assert_eq!(calls[1][0], "class-hash");

        let expected_path = format!("/usr/bin:{}", bin.display());
        for call in executor.calls() {
            assert_eq!(call.env.get("PATH"), Some(expected_path.as_str()));
        }

        assert_eq!(layer.metadata[VERSION_KEY], "0.3.5 (abcdef0)");
        assert_eq!(layer.metadata[CLASS_HASH_KEY], "0xabc123");
        assert_eq!(
            fs::read_to_string(fixture.app.join(CLASS_HASH_FILE)).unwrap(),
            "0xabc123"
        );

        assert_eq!(
            layer.launch_env.get("PATH"),
            Some(&EnvBinding::Append {
                value: bin.display().to_string(),
                delimiter: ":".to_string(),
            })
        );
        assert_eq!(
            layer.launch_env.get(STARKNET_CLASS_HASH),
            Some(&EnvBinding::Default("0xabc123".to_string()))
        );
        assert_eq!(
            layer.launch_env.get(STARKNET_RPC),
            Some(&EnvBinding::Default(String::new()))
        );
    }

    #[tokio::test]
    async fn deploy_wallet_runs_between_probe_and_declare() {
        let fixture = Fixture::new();
        let account = fixture.temp.path().join("wallets").join("account.json");
        let config = fixture.config(&[
            (BP_ENABLE_STARKNET_DEPLOY, "true"),
            (BP_STARKNET_DEPLOY_PRIVATE_KEY, "0xkey"),
            (BP_STARKNET_DEPLOY_WALLET_ADDRESS, "0x0123"),
            (BP_STARKNET_DEPLOY_ACCOUNT, account.to_str().unwrap()),
            (BP_STARKNET_DEPLOY_RPC, "https://rpc.example.com"),
        ]);
        let executor = StubExecutor::new()
            .respond(&["--version"], "0.3.5")
            .respond(&["class-hash"], "0xabc123");
        let mut installer = StarkliInstaller::new(
            &config,
            &executor,
            ContractDeclarer::for_application(&fixture.app),
            base_env(),
        );

        let layer = installer
            .materialize(&fixture.artifact, fixture.layer().await)
            .await
            .unwrap();

        let calls = executor.calls();
        let subcommands: Vec<&str> = calls.iter().map(|c| c.args[0].as_str()).collect();
        assert_eq!(subcommands, vec!["--version", "account", "class-hash"]);

        // the wallet fetch runs before the deploy values are exported
        assert_eq!(calls[1].env.get(STARKNET_RPC), None);
        assert_eq!(calls[2].env.get(STARKNET_RPC), Some("https://rpc.example.com"));
        assert_eq!(calls[2].env.get(STARKNET_PRIVATE_KEY), Some("0xkey"));

        assert_eq!(
            layer.launch_env.get(STARKNET_ACCOUNT),
            Some(&EnvBinding::Default(account.display().to_string()))
        );
    }

    #[tokio::test]
    async fn version_failure_stops_the_sequence() {
        let fixture = Fixture::new();
        let config = fixture.config(&[]);
        let executor = StubExecutor::new().fail(&["--version"], "exec format error");
        let mut installer = StarkliInstaller::new(
            &config,
            &executor,
            ContractDeclarer::for_application(&fixture.app),
            base_env(),
        );

        let err = installer
            .materialize(&fixture.artifact, fixture.layer().await)
            .await
            .unwrap_err();

        assert!(err.to_string().starts_with("unable to get starkli version"));
        assert!(err.to_string().contains("exec format error"));
        assert_eq!(err.kind(), ErrorKind::ExternalProcess);
        assert_eq!(executor.calls().len(), 1);
        assert!(!fixture.app.join(CLASS_HASH_FILE).exists());
    }

    #[tokio::test]
    async fn corrupt_artifact_fails_to_expand() {
        let fixture = Fixture::new();
        fs::write(&fixture.artifact, b"not an archive").unwrap();
        let config = fixture.config(&[]);
        let executor = StubExecutor::new();
        let mut installer = StarkliInstaller::new(
            &config,
            &executor,
            ContractDeclarer::for_application(&fixture.app),
            base_env(),
        );

        let err = installer
            .materialize(&fixture.artifact, fixture.layer().await)
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("unable to expand"));
        assert!(executor.calls().is_empty());
    }
}
