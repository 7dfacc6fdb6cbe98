use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::time::now_unix;
use crate::repair::AttemptRecord;
use crate::validation::ValidationVerdict;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionAttempt {
    pub timestamp: i64,
    pub command: String,
    pub verdict: ValidationVerdict,
}

/// One validate-or-repair run as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairSession {
    pub uuid: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub tool: String,
    #[serde(default)]
    pub intent: String,
    #[serde(default)]
    pub attempts: Vec<SessionAttempt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_command: Option<String>,
}

impl RepairSession {
    pub fn new(tool: impl Into<String>, intent: impl Into<String>) -> Self {
        let now = now_unix();
        Self {
            uuid: Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
            tool: tool.into(),
            intent: intent.into(),
            attempts: Vec::new(),
            final_command: None,
        }
    }

    pub fn push_attempt(&mut self, command: impl Into<String>, verdict: ValidationVerdict) {
        let now = now_unix();
        self.updated_at = now;
        self.attempts.push(SessionAttempt {
            timestamp: now,
            command: command.into(),
            verdict,
        });
    }

    pub fn extend_history(&mut self, history: &[AttemptRecord]) {
        for record in history {
            self.push_attempt(record.command.clone(), record.verdict.clone());
        }
    }

    pub fn finish(&mut self, command: impl Into<String>) {
        self.updated_at = now_unix();
        self.final_command = Some(command.into());
    }
}
