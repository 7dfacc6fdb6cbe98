use crate::validation::ValidationVerdict;

use super::types::{AttemptRecord, RepairError, RepairOutcome};

/// What a loop does after validating a candidate.
pub enum Next {
    Done(RepairOutcome),
    Retry { feedback: String },
}

/// Attempt budget and history of one repair or filter loop.
pub struct RepairState {
    max_attempts: usize,
    attempt_count: usize,
    history: Vec<AttemptRecord>,
}

impl RepairState {
    pub fn new(max_attempts: usize) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            attempt_count: 0,
            history: Vec::new(),
        }
    }

    pub fn can_attempt(&self) -> bool {
        self.attempt_count < self.max_attempts
    }

    /// Starts the next attempt and returns its 1-based number.
    pub fn mark_attempt(&mut self) -> usize {
        self.attempt_count += 1;
        self.attempt_count
    }

    pub fn record(&mut self, command: String, verdict: ValidationVerdict) {
        self.history.push(AttemptRecord { command, verdict });
    }

    pub fn take_history(&mut self) -> Vec<AttemptRecord> {
        std::mem::take(&mut self.history)
    }

    /// Records a validated candidate and decides whether the loop ends.
    /// Spawn failures end it at once; other failures retry while budget is
    /// left.
    pub fn settle(
        &mut self,
        command: String,
        verdict: ValidationVerdict,
    ) -> Result<Next, RepairError> {
        self.record(command, verdict.clone());
        if verdict.is_valid() {
            return Ok(Next::Done(RepairOutcome {
                command: verdict.normalized_command().to_string(),
                attempts: self.attempt_count,
                verdict,
                history: self.take_history(),
            }));
        }
        if !verdict.is_retryable() {
            return Err(RepairError::Environment {
                verdict,
                history: self.take_history(),
            });
        }
        if !self.can_attempt() {
            return Err(RepairError::Exhausted {
                attempts: self.attempt_count,
                last: verdict,
                history: self.take_history(),
            });
        }
        Ok(Next::Retry {
            feedback: verdict.to_feedback_text(),
        })
    }
}
