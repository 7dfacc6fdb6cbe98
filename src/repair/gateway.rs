use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;

/// What a repairer is told about a command that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairRequest {
    pub intent: String,
    pub failing_command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Produces a corrected command from a failing one.
pub trait CommandRepairer: Send + Sync {
    fn name(&self) -> &str;

    fn repair<'a>(
        &'a self,
        request: &'a RepairRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;
}
