//! Executor backed by real child processes

use crate::error::{StarknetError, StarknetResult};
use crate::exec::{Execution, Executor};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::debug;

/// Runs executions with `tokio::process`, merging stdout and stderr
#[derive(Debug, Default, Clone)]
pub struct CommandExecutor;

impl CommandExecutor {
    /// Create a new command executor
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Executor for CommandExecutor {
    async fn execute(&self, execution: &Execution) -> StarknetResult<String> {
        let command_line = execution.display();
        debug!("Executing: {}", command_line);

        let mut cmd = Command::new(&execution.command);
        cmd.args(&execution.args)
            .env_clear()
            .envs(execution.env.iter())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd
            .spawn()
            .map_err(|e| StarknetError::command_failed(&command_line, e))?;

        let output = collect_child_output(&mut child).await?;
        let status = child
            .wait()
            .await
            .map_err(|e| StarknetError::command_failed(&command_line, e))?;

        if status.success() {
            Ok(output)
        } else {
            Err(StarknetError::command_exec(command_line, status.to_string(), output))
        }
    }
}

/// Read stdout and stderr of a child concurrently, interleaving lines in
/// arrival order. Both pipes are drained to EOF; bytes that are not UTF-8
/// are replaced rather than ending the read.
async fn collect_child_output(child: &mut tokio::process::Child) -> StarknetResult<String> {
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| StarknetError::Internal("child stdout not piped".to_string()))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| StarknetError::Internal("child stderr not piped".to_string()))?;

    let mut stdout_reader = BufReader::new(stdout);
    let mut stderr_reader = BufReader::new(stderr);
    let mut stdout_buf = Vec::new();
    let mut stderr_buf = Vec::new();

    let mut lines = Vec::new();
    let mut stdout_done = false;
    let mut stderr_done = false;

    while !stdout_done || !stderr_done {
        tokio::select! {
            read = stdout_reader.read_until(b'\n', &mut stdout_buf), if !stdout_done => {
                match read {
                    Ok(0) => stdout_done = true,
                    Ok(_) => lines.push(take_line(&mut stdout_buf)),
                    Err(e) => return Err(StarknetError::io("reading child stdout", e)),
                }
            }
            read = stderr_reader.read_until(b'\n', &mut stderr_buf), if !stderr_done => {
                match read {
                    Ok(0) => stderr_done = true,
                    Ok(_) => lines.push(take_line(&mut stderr_buf)),
                    Err(e) => return Err(StarknetError::io("reading child stderr", e)),
                }
            }
        }
    }

    Ok(lines.join("\n"))
}

/// Drain one line from `buf`, without its terminator
fn take_line(buf: &mut Vec<u8>) -> String {
    let mut end = buf.len();
    if buf[..end].ends_with(b"\n") {
        end -= 1;
    }
    if buf[..end].ends_with(b"\r") {
        end -= 1;
    }
    let line = String::from_utf8_lossy(&buf[..end]).into_owned();
    buf.clear();
    debug!("  {}", line);
    line
}
