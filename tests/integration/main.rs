//! Integration tests for the Starknet buildpack

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;

    fn buildpack() -> Command {
        cargo_bin_cmd!("starknet-buildpack")
    }

    #[test]
    fn help_displays() {
        buildpack()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("detect").and(predicate::str::contains("build")));
    }

    #[test]
    fn version_displays() {
        buildpack()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("starknet-buildpack"));
    }

    #[test]
    fn build_requires_directories() {
        buildpack().arg("build").assert().failure();
    }
}

mod detect_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use tempfile::TempDir;

    fn detect(app: &std::path::Path, temp: &TempDir) -> Command {
        let mut cmd = cargo_bin_cmd!("starknet-buildpack");
        cmd.arg("detect")
            .arg(temp.path().join("platform"))
            .arg(temp.path().join("plan.toml"))
            .arg("--app-dir")
            .arg(app);
        cmd
    }

    #[test]
    fn empty_application_does_not_apply() {
        let temp = TempDir::new().unwrap();
        let app = temp.path().join("workspace");
        fs::create_dir_all(&app).unwrap();

        detect(&app, &temp).assert().code(100);
        assert!(!temp.path().join("plan.toml").exists());
    }

    #[test]
    fn scarb_project_passes_and_writes_plan() {
        let temp = TempDir::new().unwrap();
        let app = temp.path().join("workspace");
        fs::create_dir_all(app.join("src")).unwrap();
        fs::write(app.join("Scarb.toml"), "[package]\nname = \"hello\"\n").unwrap();
        fs::write(app.join("src").join("lib.cairo"), "mod counter;").unwrap();

        detect(&app, &temp).assert().code(0);

        let plan = fs::read_to_string(temp.path().join("plan.toml")).unwrap();
        assert!(plan.contains("[[provides]]"));
        assert!(plan.contains("name = \"scarb\""));
        assert!(plan.contains("name = \"starkli\""));
    }

    #[test]
    fn manifest_without_sources_errors() {
        let temp = TempDir::new().unwrap();
        let app = temp.path().join("workspace");
        fs::create_dir_all(&app).unwrap();
        fs::write(app.join("Scarb.toml"), "[package]\nname = \"hello\"\n").unwrap();

        detect(&app, &temp)
            .assert()
            .code(1)
            .stderr(predicate::str::contains(
                "no files with extension '.cairo' found",
            ));
    }
}

#[cfg(unix)]
mod build_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use predicates::prelude::*;
    use sha2::{Digest, Sha256};
    use std::fs::{self, File};
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    const STARKLI: &str = r#"#!/bin/sh
case "$1" in
  --version) echo "0.3.5 (stub)" ;;
  class-hash) echo "0xabc123" ;;
  account) echo "Downloaded account to $5" ;;
  *) echo "unexpected arguments: $*" >&2; exit 1 ;;
esac
"#;

    const BROKEN_STARKLI: &str = r#"#!/bin/sh
case "$1" in
  --version) echo "0.3.5 (stub)" ;;
  *) echo "invalid sierra" >&2; exit 1 ;;
esac
"#;

    struct Project {
        temp: TempDir,
    }

    impl Project {
        fn new(script: &str) -> Self {
            let temp = TempDir::new().unwrap();
            let root = temp.path();

            let app = root.join("workspace");
            fs::create_dir_all(app.join("src")).unwrap();
            fs::create_dir_all(app.join("target").join("dev")).unwrap();
            fs::write(app.join("Scarb.toml"), "[package]\nname = \"hello\"\n").unwrap();
            fs::write(app.join("src").join("lib.cairo"), "mod counter;").unwrap();
            fs::write(
                app.join("target")
                    .join("dev")
                    .join("hello_Counter.contract_class.json"),
                "{}",
            )
            .unwrap();

            let artifact = root.join("starkli-x86_64-unknown-linux-gnu.tar.gz");
            let encoder = GzEncoder::new(File::create(&artifact).unwrap(), Compression::default());
            let mut builder = tar::Builder::new(encoder);
            let mut header = tar::Header::new_gnu();
            header.set_size(script.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append_data(&mut header, "starkli", script.as_bytes())
                .unwrap();
            builder.into_inner().unwrap().finish().unwrap();
            let sha256 = hex::encode(Sha256::digest(fs::read(&artifact).unwrap()));

            let buildpack = root.join("buildpack");
            fs::create_dir_all(&buildpack).unwrap();
            fs::write(
                buildpack.join("buildpack.toml"),
                format!(
                    "{}\n[[metadata.dependencies]]\nid = \"starkli-gnu\"\nname = \"Starkli\"\nversion = \"0.3.5\"\nuri = \"file://{}\"\nsha256 = \"{}\"\nstacks = [\"*\"]\n",
                    include_str!("../../buildpack.toml"),
                    artifact.display(),
                    sha256
                ),
            )
            .unwrap();

            fs::create_dir_all(root.join("platform").join("env")).unwrap();
            fs::create_dir_all(root.join("layers")).unwrap();
            fs::write(
                root.join("plan.toml"),
                "[[entries]]\nname = \"starkli\"\n",
            )
            .unwrap();

            Self { temp }
        }

        fn path(&self, relative: &str) -> PathBuf {
            self.temp.path().join(relative)
        }

        fn platform_env(&self, name: &str, value: &str) {
            fs::write(self.path("platform/env").join(name), value).unwrap();
        }

        fn build(&self) -> Command {
            let mut cmd = cargo_bin_cmd!("starknet-buildpack");
            cmd.arg("build")
                .arg(self.path("layers"))
                .arg(self.path("platform"))
                .arg(self.path("plan.toml"))
                .arg("--app-dir")
                .arg(self.path("workspace"))
                .arg("--buildpack-dir")
                .arg(self.path("buildpack"))
                .arg("--cache-dir")
                .arg(self.path("cache"))
                .arg("--stack-id")
                .arg("io.buildpacks.stacks.jammy");
            cmd
        }
    }

    fn read(path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }

    #[test]
    fn build_installs_and_declares() {
        let project = Project::new(STARKLI);

        project
            .build()
            .assert()
            .success()
            .stdout(predicate::str::contains("Checking starkli version: 0.3.5 (stub)"));

        assert_eq!(read(&project.path("workspace/class_hash.txt")), "0xabc123");

        let layer = project.path("layers/starkli-gnu");
        assert!(layer.join("bin").join("starkli").is_file());

        let metadata = read(&project.path("layers/starkli-gnu.toml"));
        assert!(metadata.contains("class-hash = \"0xabc123\""));
        assert!(metadata.contains("starkli-version = \"0.3.5 (stub)\""));
        assert!(metadata.contains("launch = true"));

        let env = layer.join("env.launch");
        assert_eq!(read(&env.join("STARKNET_CLASS_HASH.default")), "0xabc123");
        assert_eq!(read(&env.join("PATH.delim")), ":");
        assert_eq!(
            read(&env.join("PATH.append")),
            layer.join("bin").display().to_string()
        );
        assert!(!project.path("layers/launch.toml").exists());
    }

    #[test]
    fn rebuild_reuses_layer() {
        let project = Project::new(STARKLI);
        project.build().assert().success();
        let first = read(&project.path("layers/starkli-gnu.toml"));

        project
            .build()
            .assert()
            .success()
            .stdout(predicate::str::contains("Reusing cached layer"));
        assert_eq!(read(&project.path("layers/starkli-gnu.toml")), first);
    }

    #[test]
    fn deploy_contributes_launch_process() {
        let project = Project::new(STARKLI);
        let account = project.path("wallets/deployer/account.json");
        project.platform_env("BP_ENABLE_STARKNET_DEPLOY", "true");
        project.platform_env("BP_STARKNET_DEPLOY_PRIVATE_KEY", "0xkey");
        project.platform_env("BP_STARKNET_DEPLOY_WALLET_ADDRESS", "0x0123");
        project.platform_env("BP_STARKNET_DEPLOY_ACCOUNT", account.to_str().unwrap());
        project.platform_env("BP_STARKNET_DEPLOY_RPC", "https://rpc.example.com");
        project.platform_env("BP_STARKNET_DEPLOY_ARGS", "--watch");

        project
            .build()
            .assert()
            .success()
            .stdout(predicate::str::contains("<redacted>"))
            .stdout(predicate::str::contains("0xkey").not());

        assert!(project.path("wallets/deployer").is_dir());

        let launch = read(&project.path("layers/launch.toml"));
        assert!(launch.contains("type = \"starkli\""));
        assert!(launch.contains("$STARKNET_CLASS_HASH"));
        assert!(launch.contains("--watch"));
        assert!(launch.contains("default = true"));

        let env = project.path("layers/starkli-gnu/env.launch");
        assert_eq!(read(&env.join("STARKNET_PRIVATE_KEY.default")), "0xkey");
        assert_eq!(
            read(&env.join("STARKNET_RPC.default")),
            "https://rpc.example.com"
        );
    }

    #[test]
    fn deploy_without_private_key_fails() {
        let project = Project::new(STARKLI);
        project.platform_env("BP_ENABLE_STARKNET_DEPLOY", "true");

        project
            .build()
            .assert()
            .code(1)
            .stderr(predicate::str::contains(
                "BP_STARKNET_DEPLOY_PRIVATE_KEY must be specified",
            ));
        assert!(!project.path("layers/starkli-gnu.toml").exists());
    }

    #[test]
    fn failed_declaration_leaves_no_layer() {
        let project = Project::new(BROKEN_STARKLI);

        project
            .build()
            .assert()
            .code(1)
            .stderr(predicate::str::contains("invalid sierra"));
        assert!(!project.path("layers/starkli-gnu.toml").exists());
        assert!(!project.path("workspace/class_hash.txt").exists());
    }
}
