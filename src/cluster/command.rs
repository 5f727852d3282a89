use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use super::FetchError;

/// Captured result of a CLI invocation. Stderr is folded into `text` so
/// callers see the same combined stream `oc` prints interactively.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub text: String,
    pub code: i32,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// Runs external commands with an explicit, minimal environment.
///
/// Only KUBECONFIG and PATH are forwarded from the harness process; the
/// child sees nothing else, so a test run cannot pick up stray cluster
/// credentials from the invoking shell.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    cwd: PathBuf,
    env: HashMap<String, String>,
}

impl CommandRunner {
    pub fn new() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::with_cwd(cwd)
    }

    pub fn with_cwd(cwd: PathBuf) -> Self {
        let mut env = HashMap::new();
        for key in ["KUBECONFIG", "PATH"] {
            if let Ok(value) = std::env::var(key) {
                env.insert(key.to_string(), value);
            }
        }
        Self { cwd, env }
    }

    pub fn set_env(&mut self, key: &str, value: &str) {
        self.env.insert(key.to_string(), value.to_string());
    }

    pub async fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, FetchError> {
        self.run_inner(program, args, None).await
    }

    /// Like [`run`](Self::run) but feeds `stdin` to the child, for
    /// `oc create -f -` style pipelines.
    pub async fn run_with_stdin(
        &self,
        program: &str,
        args: &[&str],
        stdin: &str,
    ) -> Result<CommandOutput, FetchError> {
        self.run_inner(program, args, Some(stdin)).await
    }

    async fn run_inner(
        &self,
        program: &str,
        args: &[&str],
        stdin: Option<&str>,
    ) -> Result<CommandOutput, FetchError> {
        debug!(program, ?args, "running command");

        let mut command = Command::new(program);
        command
            .args(args)
            .current_dir(&self.cwd)
            .env_clear()
            .envs(&self.env)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if stdin.is_some() {
            command.stdin(Stdio::piped());
        }

        let mut child = command.spawn().map_err(|source| FetchError::Spawn {
            program: program.to_string(),
            source,
        })?;

        if let Some(input) = stdin {
            if let Some(mut handle) = child.stdin.take() {
                handle
                    .write_all(input.as_bytes())
                    .await
                    .map_err(|source| FetchError::Spawn {
                        program: program.to_string(),
                        source,
                    })?;
            }
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|source| FetchError::Spawn {
                program: program.to_string(),
                source,
            })?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.is_empty() {
            text.push_str(&stderr);
        }
        let code = output.status.code().unwrap_or(-1);

        if code != 0 {
            warn!(program, ?args, code, output = %text.trim(), "command failed");
        }

        Ok(CommandOutput { text, code })
    }
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self::new()
    }
}
