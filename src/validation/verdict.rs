use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::executor::ExecutionOutcome;
use super::policy::TimeoutPolicy;

/// Shell exit codes for "found but not executable" and "not found".
const SHELL_NOT_EXECUTABLE: i32 = 126;
const SHELL_NOT_FOUND: i32 = 127;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Rejected by the static shape checks; nothing was run.
    Structural,
    /// The dry run exited nonzero or was killed by a signal.
    Execution,
    Timeout,
    /// The tool or shell could not be started. Retrying cannot help.
    Spawn,
    Lint,
    /// The validator itself failed.
    Internal,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::Structural => "structural",
            FailureKind::Execution => "execution",
            FailureKind::Timeout => "timeout",
            FailureKind::Spawn => "spawn",
            FailureKind::Lint => "lint",
            FailureKind::Internal => "internal",
        }
    }

    pub fn is_retryable(self) -> bool {
        !matches!(self, FailureKind::Spawn)
    }
}

/// Result of one validation call. Built once, read through accessors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationVerdict {
    is_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error_message: Option<String>,
    normalized_command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    failure: Option<FailureKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dry_run_command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exit_code: Option<i32>,
    #[serde(default)]
    elapsed_ms: u64,
}

impl ValidationVerdict {
    pub fn valid(normalized_command: impl Into<String>) -> Self {
        Self {
            is_valid: true,
            error_message: None,
            normalized_command: normalized_command.into(),
            failure: None,
            dry_run_command: None,
            note: None,
            exit_code: None,
            elapsed_ms: 0,
        }
    }

    pub fn invalid(
        failure: FailureKind,
        message: impl Into<String>,
        normalized_command: impl Into<String>,
    ) -> Self {
        Self {
            is_valid: false,
            error_message: Some(message.into()),
            normalized_command: normalized_command.into(),
            failure: Some(failure),
            dry_run_command: None,
            note: None,
            exit_code: None,
            elapsed_ms: 0,
        }
    }

    pub fn with_dry_run_command(mut self, dry_run_command: impl Into<String>) -> Self {
        self.dry_run_command = Some(dry_run_command.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_exit_code(mut self, code: i32) -> Self {
        self.exit_code = Some(code);
        self
    }

    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// The command as the caller should keep it: trimmed, `-y` ensured, no
    /// dry-run rewriting.
    pub fn normalized_command(&self) -> &str {
        &self.normalized_command
    }

    pub fn failure(&self) -> Option<FailureKind> {
        self.failure
    }

    pub fn dry_run_command(&self) -> Option<&str> {
        self.dry_run_command.as_deref()
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    /// Whether asking for a corrected command could change the outcome.
    pub fn is_retryable(&self) -> bool {
        !self.is_valid && self.failure.is_none_or(FailureKind::is_retryable)
    }

    pub fn to_feedback_text(&self) -> String {
        match (&self.error_message, self.failure) {
            (Some(message), _) => message.clone(),
            (None, Some(kind)) => format!("validation failed ({})", kind.as_str()),
            (None, None) if self.is_valid => "command is valid".to_string(),
            (None, None) => "validation failed for an unknown reason".to_string(),
        }
    }
}

/// Turns a finished dry run into a verdict.
pub(crate) fn classify(
    outcome: ExecutionOutcome,
    policy: TimeoutPolicy,
    timeout: Duration,
    normalized_command: String,
    dry_run_command: String,
) -> ValidationVerdict {
    let verdict = match outcome {
        ExecutionOutcome::Exited { code: 0, .. } => ValidationVerdict::valid(normalized_command),
        ExecutionOutcome::Exited { code, stderr, .. }
            if code == SHELL_NOT_FOUND || code == SHELL_NOT_EXECUTABLE =>
        {
            let stderr = stderr.trim();
            let message = if stderr.is_empty() {
                format!("command could not be started (exit status {code})")
            } else {
                format!("command could not be started (exit status {code}): {stderr}")
            };
            ValidationVerdict::invalid(FailureKind::Spawn, message, normalized_command)
                .with_exit_code(code)
        }
        ExecutionOutcome::Exited { code, stderr, .. } => {
            let stderr = stderr.trim();
            let message = if stderr.is_empty() {
                format!("command exited with status {code}")
            } else {
                stderr.to_string()
            };
            ValidationVerdict::invalid(FailureKind::Execution, message, normalized_command)
                .with_exit_code(code)
        }
        ExecutionOutcome::Signalled { signal, stderr } => {
            let stderr = stderr.trim();
            let message = match (stderr.is_empty(), signal) {
                (false, _) => stderr.to_string(),
                (true, Some(signal)) => format!("command terminated by signal {signal}"),
                (true, None) => "command terminated by signal".to_string(),
            };
            ValidationVerdict::invalid(FailureKind::Execution, message, normalized_command)
        }
        ExecutionOutcome::TimedOut { elapsed, stderr } => {
            let seconds = timeout.as_secs_f64();
            let stderr = stderr.trim();
            match policy {
                TimeoutPolicy::Strict => ValidationVerdict::invalid(
                    FailureKind::Timeout,
                    format!("command timed out after {seconds} seconds"),
                    normalized_command,
                ),
                // Dry runs log at error level, so anything on stderr is an error.
                TimeoutPolicy::Lenient if !stderr.is_empty() => {
                    ValidationVerdict::invalid(FailureKind::Execution, stderr, normalized_command)
                }
                TimeoutPolicy::Lenient => ValidationVerdict::valid(normalized_command).with_note(
                    format!(
                        "command was still running after {:.1} seconds without errors; accepted without a full run",
                        elapsed.as_secs_f64()
                    ),
                ),
            }
        }
        ExecutionOutcome::SpawnFailed { reason } => {
            ValidationVerdict::invalid(FailureKind::Spawn, reason, normalized_command)
        }
        ExecutionOutcome::WaitFailed { reason } => {
            ValidationVerdict::invalid(FailureKind::Internal, reason, normalized_command)
        }
    };
    verdict.with_dry_run_command(dry_run_command)
}
