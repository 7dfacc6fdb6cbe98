use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validation::ValidationVerdict;

/// One validated candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub command: String,
    pub verdict: ValidationVerdict,
}

#[derive(Debug, Clone)]
pub struct RepairOutcome {
    /// Normalized form of the accepted candidate.
    pub command: String,
    pub attempts: usize,
    pub verdict: ValidationVerdict,
    pub history: Vec<AttemptRecord>,
}

#[derive(Debug, Error)]
pub enum RepairError {
    #[error("no valid command after {attempts} attempt(s): {}", .last.to_feedback_text())]
    Exhausted {
        attempts: usize,
        last: ValidationVerdict,
        history: Vec<AttemptRecord>,
    },
    #[error("command cannot be validated here: {}", .verdict.to_feedback_text())]
    Environment {
        verdict: ValidationVerdict,
        history: Vec<AttemptRecord>,
    },
    #[error("{name} failed to produce a command")]
    Repairer {
        name: String,
        #[source]
        source: anyhow::Error,
        history: Vec<AttemptRecord>,
    },
}

impl RepairError {
    pub fn history(&self) -> &[AttemptRecord] {
        match self {
            RepairError::Exhausted { history, .. }
            | RepairError::Environment { history, .. }
            | RepairError::Repairer { history, .. } => history,
        }
    }

    /// Verdict of the last validated candidate, if any was validated.
    pub fn last_verdict(&self) -> Option<&ValidationVerdict> {
        match self {
            RepairError::Exhausted { last, .. } => Some(last),
            RepairError::Environment { verdict, .. } => Some(verdict),
            RepairError::Repairer { history, .. } => history.last().map(|record| &record.verdict),
        }
    }
}
