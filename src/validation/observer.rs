use std::sync::Arc;

use tracing::{error, info};

use super::verdict::ValidationVerdict;

#[derive(Debug, Clone, Copy)]
pub enum ValidationEvent<'a> {
    Started { command: &'a str },
    Succeeded { verdict: &'a ValidationVerdict },
    Failed { verdict: &'a ValidationVerdict },
}

/// Receives progress notifications from a `Validator`.
pub trait ValidationObserver: Send + Sync {
    fn on_event(&self, event: &ValidationEvent<'_>);
}

/// Reports validation progress as structured log events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ValidationObserver for TracingObserver {
    fn on_event(&self, event: &ValidationEvent<'_>) {
        match event {
            ValidationEvent::Started { command } => {
                info!(command = %command, "validating command");
            }
            ValidationEvent::Succeeded { verdict } => {
                info!(
                    elapsed_ms = verdict.elapsed_ms(),
                    note = verdict.note().unwrap_or_default(),
                    "command is valid"
                );
            }
            ValidationEvent::Failed { verdict } => {
                error!(
                    failure = verdict.failure().map(|kind| kind.as_str()).unwrap_or("unknown"),
                    elapsed_ms = verdict.elapsed_ms(),
                    error = verdict.error_message().unwrap_or_default(),
                    "command failed validation"
                );
            }
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ValidationObserver for NoopObserver {
    fn on_event(&self, _event: &ValidationEvent<'_>) {}
}

/// Forwards every event to each inner observer in order.
pub struct CompositeObserver {
    observers: Vec<Arc<dyn ValidationObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn ValidationObserver>>) -> Self {
        Self { observers }
    }
}

impl ValidationObserver for CompositeObserver {
    fn on_event(&self, event: &ValidationEvent<'_>) {
        for observer in &self.observers {
            observer.on_event(event);
        }
    }
}

pub fn default_observer() -> Arc<dyn ValidationObserver> {
    Arc::new(TracingObserver)
}
