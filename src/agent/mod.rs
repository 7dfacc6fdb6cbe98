//! Agents reached as external programs: one JSON request on stdin, one reply
//! on stdout.

mod parse;

use anyhow::{Context, Result, anyhow, bail};
use serde::Serialize;
use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::filters::{FilterApplier, FilterKind, FilterRequest};
use crate::repair::{CommandRepairer, RepairRequest};

pub use parse::{AgentReply, parse_reply};

pub const DEFAULT_AGENT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Serialize)]
#[serde(tag = "task", rename_all = "snake_case")]
enum AgentTask<'a> {
    Repair(&'a RepairRequest),
    Filter(&'a FilterRequest),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalAgent {
    pub program: String,
    pub args: Vec<String>,
    pub timeout: Duration,
}

impl ExternalAgent {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: DEFAULT_AGENT_TIMEOUT,
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The same program acting as the filter applier for `kind`.
    pub fn filter(&self, kind: FilterKind) -> AgentFilter {
        AgentFilter {
            agent: self.clone(),
            kind,
        }
    }

    async fn ask(&self, task: &AgentTask<'_>) -> Result<String> {
        let body = serde_json::to_vec(task).context("failed to encode agent request")?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn agent {}", self.program))?;

        {
            let mut stdin = child
                .stdin
                .take()
                .ok_or_else(|| anyhow!("failed to open agent stdin"))?;
            stdin
                .write_all(&body)
                .await
                .context("failed to write agent request")?;
            stdin
                .write_all(b"\n")
                .await
                .context("failed to write agent request")?;
        }

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.context("failed to collect agent output")?,
            Err(_) => bail!(
                "agent {} timed out after {} seconds",
                self.program,
                self.timeout.as_secs_f64()
            ),
        };

        if !output.status.success() {
            let status = output
                .status
                .code()
                .map(|code| code.to_string())
                .unwrap_or_else(|| "terminated_by_signal".to_string());
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "agent {} exited with status {}: {}",
                self.program,
                status,
                stderr.trim()
            );
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let reply = parse_reply(&stdout)
            .with_context(|| format!("agent {} returned an unusable reply", self.program))?;
        debug!(agent = %self.program, reason = %reply.reason, "agent replied");
        Ok(reply.command)
    }
}

impl CommandRepairer for ExternalAgent {
    fn name(&self) -> &str {
        &self.program
    }

    fn repair<'a>(
        &'a self,
        request: &'a RepairRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(async move { self.ask(&AgentTask::Repair(request)).await })
    }
}

#[derive(Debug, Clone)]
pub struct AgentFilter {
    agent: ExternalAgent,
    kind: FilterKind,
}

impl FilterApplier for AgentFilter {
    fn kind(&self) -> FilterKind {
        self.kind
    }

    fn apply<'a>(
        &'a self,
        request: &'a FilterRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(async move { self.agent.ask(&AgentTask::Filter(request)).await })
    }
}
