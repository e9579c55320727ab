//! Job body that runs an external command.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use taskherd_protocols::JobBody;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

/// Lines of stderr kept in the error of a failed run.
const STDERR_TAIL_LINES: usize = 20;

/// Runs `program args...` once per fire. A non-zero exit, a spawn failure or
/// an expired timeout is reported as an error.
#[derive(Debug, Clone)]
pub struct CommandJob {
    program: String,
    args: Vec<String>,
    workdir: Option<PathBuf>,
    env: HashMap<String, String>,
    timeout: Option<Duration>,
}

impl CommandJob {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            workdir: None,
            env: HashMap::new(),
            timeout: None,
        }
    }

    pub fn with_workdir(mut self, dir: PathBuf) -> Self {
        self.workdir = Some(dir);
        self
    }

    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = env;
        self
    }

    pub fn with_timeout(mut self, limit: Duration) -> Self {
        self.timeout = Some(limit);
        self
    }
}

#[async_trait]
impl JobBody for CommandJob {
    async fn run(&self) -> anyhow::Result<()> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .envs(&self.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.workdir {
            cmd.current_dir(dir);
        }

        let output = match self.timeout {
            Some(limit) => timeout(limit, cmd.output()).await.map_err(|_| {
                anyhow::anyhow!(
                    "{} timed out after {}s",
                    self.program,
                    limit.as_secs_f64()
                )
            })?,
            None => cmd.output().await,
        }
        .map_err(|e| anyhow::anyhow!("failed to start {}: {}", self.program, e))?;

        if !output.status.success() {
            let code = output
                .status
                .code()
                .map_or_else(|| "signal".to_string(), |c| c.to_string());
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!(
                "{} exited with {}\n{}",
                self.program,
                code,
                stderr_tail(&stderr)
            );
        }

        debug!(
            program = %self.program,
            stdout_bytes = output.stdout.len(),
            "Command finished"
        );
        Ok(())
    }
}

fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
