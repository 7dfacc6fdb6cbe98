use tracing::{info, warn};

use crate::command_validation::CommandValidator;

use super::gateway::{CommandRepairer, RepairRequest};
use super::state::{Next, RepairState};
use super::types::{RepairError, RepairOutcome};

/// Validate, and on failure ask the repairer for a fix, up to
/// `max_attempts` validations.
pub struct RepairLoop<'a> {
    validator: &'a dyn CommandValidator,
    repairer: &'a dyn CommandRepairer,
    max_attempts: usize,
}

impl<'a> RepairLoop<'a> {
    pub fn new(
        validator: &'a dyn CommandValidator,
        repairer: &'a dyn CommandRepairer,
        max_attempts: usize,
    ) -> Self {
        Self {
            validator,
            repairer,
            max_attempts: max_attempts.max(1),
        }
    }

    pub async fn run(&self, intent: &str, command: &str) -> Result<RepairOutcome, RepairError> {
        let mut state = RepairState::new(self.max_attempts);
        let mut candidate = command.trim().to_string();

        loop {
            let attempt = state.mark_attempt();
            let verdict = self.validator.validate(&candidate);
            let error_message = verdict.error_message().map(str::to_string);

            let feedback = match state.settle(candidate.clone(), verdict)? {
                Next::Done(outcome) => {
                    info!(attempt, "command validated");
                    return Ok(outcome);
                }
                Next::Retry { feedback } => feedback,
            };
            warn!(
                attempt,
                repairer = self.repairer.name(),
                error = %feedback,
                "command failed validation, requesting a repair"
            );

            let request = RepairRequest {
                intent: intent.to_string(),
                failing_command: candidate,
                error_message,
            };
            candidate = match self.repairer.repair(&request).await {
                Ok(repaired) => repaired.trim().to_string(),
                Err(source) => {
                    return Err(RepairError::Repairer {
                        name: self.repairer.name().to_string(),
                        source,
                        history: state.take_history(),
                    });
                }
            };
        }
    }
}
