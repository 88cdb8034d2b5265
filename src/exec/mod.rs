//! External process execution
//!
//! Every toolchain invocation goes through the [`Executor`] trait so the
//! installer sequence can run against a stub in tests. Executions carry
//! their full environment explicitly; nothing mutates the buildpack's own
//! process environment.

mod command;

pub use command::CommandExecutor;

use crate::error::StarknetResult;
use crate::layer::ProcessEnv;
use async_trait::async_trait;

/// A single command invocation
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    /// Program name, looked up on `PATH` from `env`
    pub command: String,
    /// Arguments passed verbatim
    pub args: Vec<String>,
    /// Complete environment of the child process
    pub env: ProcessEnv,
}

impl Execution {
    /// Create an execution of `command` with `args` under `env`
    pub fn new<I, S>(command: impl Into<String>, args: I, env: &ProcessEnv) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            command: command.into(),
            args: args.into_iter().map(Into::into).collect(),
            env: env.clone(),
        }
    }

    /// Human-readable command line for logs and errors
    pub fn display(&self) -> String {
        if self.args.is_empty() {
            self.command.clone()
        } else {
            format!("{} {}", self.command, self.args.join(" "))
        }
    }
}

/// Runs external commands and returns their combined stdout/stderr
#[async_trait]
pub trait Executor: Send + Sync {
    /// Run to completion. A launch failure or non-zero exit is an error
    /// that carries the captured output.
    async fn execute(&self, execution: &Execution) -> StarknetResult<String>;
}
