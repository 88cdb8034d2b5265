//! Contract class declaration

use super::{CLASS_HASH_FILE, COMPILE_DIR, CONTRACT_CLASS_SUFFIX, PLAN_ENTRY_STARKLI};
use crate::error::{StarknetError, StarknetResult};
use crate::exec::{Execution, Executor};
use crate::layer::ProcessEnv;
use crate::ui;
use std::path::{Path, PathBuf};

/// Computes the class hash of the single compiled contract class
#[derive(Debug, Clone)]
pub struct ContractDeclarer {
    compile_dir: PathBuf,
    class_hash_file: PathBuf,
}

impl ContractDeclarer {
    pub fn new(compile_dir: impl Into<PathBuf>, class_hash_file: impl Into<PathBuf>) -> Self {
        Self {
            compile_dir: compile_dir.into(),
            class_hash_file: class_hash_file.into(),
        }
    }

    /// Declarer for the Scarb output of the application at `app`
    pub fn for_application(app: &Path) -> Self {
        Self::new(app.join(COMPILE_DIR), app.join(CLASS_HASH_FILE))
    }

    /// The one `*.contract_class.json` file in the compile directory
    pub async fn find_contract_class(&self) -> StarknetResult<PathBuf> {
        let io_err = |e| {
            StarknetError::io(format!("reading {}", self.compile_dir.display()), e)
                .context("unable to read contract class")
        };
        let mut entries = tokio::fs::read_dir(&self.compile_dir).await.map_err(io_err)?;

        let mut candidates = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
            if !entry.file_type().await.map_err(io_err)?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(CONTRACT_CLASS_SUFFIX) {
                candidates.push(name);
            }
        }
        candidates.sort();

        match candidates.len() {
            0 => Err(StarknetError::ContractClassNotFound(self.compile_dir.clone())),
            1 => Ok(self.compile_dir.join(&candidates[0])),
            _ => Err(StarknetError::ContractClassAmbiguous {
                dir: self.compile_dir.clone(),
                candidates,
            }),
        }
    }

    /// Run `starkli class-hash` on the contract class and write the result
    /// to the class hash file.
    pub async fn declare(&self, executor: &dyn Executor, env: &ProcessEnv) -> StarknetResult<String> {
        let class = self.find_contract_class().await?;

        let execution = Execution::new(
            PLAN_ENTRY_STARKLI,
            ["class-hash".to_string(), class.display().to_string()],
            env,
        );
        let output = executor
            .execute(&execution)
            .await
            .map_err(|e| e.context("unable to declare contract"))?;
        let class_hash = output.trim().to_string();

        ui::body(&format!(
            "Writing class hash {} to {}",
            class_hash,
            self.class_hash_file.display()
        ));
        tokio::fs::write(&self.class_hash_file, &class_hash)
            .await
            .map_err(|e| {
                StarknetError::io(format!("writing {}", self.class_hash_file.display()), e)
            })?;

        Ok(class_hash)
    }
}
