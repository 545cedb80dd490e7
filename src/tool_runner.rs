//! # External Tool Runner
//!
//! Esegue l'encoder esterno come sottoprocesso con timeout.
//!
//! ## Garanzie:
//! - stdout e stderr vengono catturati, stdin è chiuso
//! - allo scadere del timeout il processo figlio viene terminato
//! - ogni causa di fallimento diventa una variante distinta di `ToolError`;
//!   nessun errore esce da qui in altra forma

use crate::error::ToolError;
use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};

/// Longest stderr excerpt kept in a failure message
const STDERR_EXCERPT: usize = 200;

/// Output captured from a tool execution
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

/// Runs one external program with a deadline
#[derive(Debug, Clone)]
pub struct ToolRunner {
    program: PathBuf,
    timeout: Duration,
    verbose: bool,
}

impl ToolRunner {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
            verbose: false,
        }
    }

    /// Log the full command line before each run
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn tool_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.display().to_string())
    }

    /// Run the program and wait for it, at most `timeout`
    pub async fn run(&self, args: &[String]) -> Result<ToolOutput, ToolError> {
        let tool = self.tool_name();

        if self.verbose {
            info!("Running: {} {}", self.program.display(), args.join(" "));
        }

        let child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| match source.kind() {
                io::ErrorKind::NotFound => ToolError::NotFound { tool: tool.clone() },
                _ => ToolError::Spawn { tool: tool.clone(), source },
            })?;

        let start_time = std::time::Instant::now();

        // Dropping the wait future on timeout drops the child, which kills it.
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(source)) => return Err(ToolError::Spawn { tool, source }),
            Err(_) => {
                return Err(ToolError::Timeout {
                    tool,
                    timeout: self.timeout,
                })
            }
        };

        debug!("{} finished in {:.1}s", tool, start_time.elapsed().as_secs_f64());

        let tool_output = ToolOutput {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if !tool_output.status.success() {
            return Err(ToolError::NonZeroExit {
                tool,
                status: tool_output.status.to_string(),
                stderr: stderr_excerpt(&tool_output.stderr),
            });
        }

        Ok(tool_output)
    }
}

/// Tail of stderr: encoders print the actual error last
fn stderr_excerpt(stderr: &str) -> String {
    let trimmed = stderr.trim();
    let count = trimmed.chars().count();
    if count <= STDERR_EXCERPT {
        return trimmed.to_string();
    }
    trimmed.chars().skip(count - STDERR_EXCERPT).collect()
}
