use tracing::{info, warn};

use crate::command_validation::CommandValidator;
use crate::filters::{FilterApplier, FilterRequest};

use super::state::{Next, RepairState};
use super::types::{RepairError, RepairOutcome};

/// Asks `applier` for a command and validates it; a failed candidate is sent
/// back with the validation error as feedback until the budget runs out.
pub async fn apply_validated(
    applier: &dyn FilterApplier,
    request: FilterRequest,
    validator: &dyn CommandValidator,
    max_attempts: usize,
) -> Result<RepairOutcome, RepairError> {
    let mut state = RepairState::new(max_attempts);
    let mut request = request;
    let kind = applier.kind();

    loop {
        let attempt = state.mark_attempt();
        let candidate = match applier.apply(&request).await {
            Ok(candidate) => candidate.trim().to_string(),
            Err(source) => {
                return Err(RepairError::Repairer {
                    name: format!("{} filter", kind.as_str()),
                    source,
                    history: state.take_history(),
                });
            }
        };

        let verdict = validator.validate(&candidate);
        match state.settle(candidate, verdict)? {
            Next::Done(outcome) => {
                info!(filter = kind.as_str(), attempt, "filter applied");
                return Ok(outcome);
            }
            Next::Retry { feedback } => {
                warn!(
                    filter = kind.as_str(),
                    attempt,
                    error = %feedback,
                    "filter output failed validation"
                );
                request.feedback = Some(feedback);
            }
        }
    }
}
