use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::command::{
    ensure_overwrite_flag, ensure_quiet_flags, program_token, to_dry_run_form, validate_structure,
};

use super::executor::execute_in;
use super::lint::lint_filter_graph;
use super::observer::{ValidationEvent, ValidationObserver, default_observer};
use super::settings::ValidatorSettings;
use super::verdict::{FailureKind, ValidationVerdict, classify};

/// Validates commands by running their dry-run form. Holds no mutable state;
/// one instance can serve any number of threads.
#[derive(Clone)]
pub struct Validator {
    settings: ValidatorSettings,
    observer: Arc<dyn ValidationObserver>,
}

impl Validator {
    pub fn new(settings: ValidatorSettings) -> Self {
        Self {
            settings,
            observer: default_observer(),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ValidationObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn settings(&self) -> &ValidatorSettings {
        &self.settings
    }

    pub fn validate(&self, command: &str) -> ValidationVerdict {
        self.validate_with_timeout(command, self.settings.timeout)
    }

    pub fn validate_with_timeout(&self, command: &str, timeout: Duration) -> ValidationVerdict {
        self.observer.on_event(&ValidationEvent::Started { command });
        let started = Instant::now();

        let verdict = panic::catch_unwind(AssertUnwindSafe(|| self.run(command, timeout)))
            .unwrap_or_else(|payload| {
                ValidationVerdict::invalid(
                    FailureKind::Internal,
                    format!("internal validation error: {}", panic_message(payload.as_ref())),
                    command.trim(),
                )
            })
            .with_elapsed(started.elapsed());

        let event = if verdict.is_valid() {
            ValidationEvent::Succeeded { verdict: &verdict }
        } else {
            ValidationEvent::Failed { verdict: &verdict }
        };
        self.observer.on_event(&event);
        verdict
    }

    /// The exact command a validation of `command` would run.
    pub fn dry_run_form(&self, command: &str) -> String {
        self.dry_run_of(&ensure_overwrite_flag(command.trim(), &self.settings.tool))
    }

    fn dry_run_of(&self, cleaned: &str) -> String {
        let source = if self.settings.quiet_flags {
            ensure_quiet_flags(cleaned, &self.settings.tool)
        } else {
            cleaned.to_string()
        };
        to_dry_run_form(&source, self.settings.null_sink)
    }

    fn run(&self, command: &str, timeout: Duration) -> ValidationVerdict {
        let settings = &self.settings;
        let tool = settings.tool.as_str();
        let trimmed = command.trim();

        if let Err(err) = validate_structure(trimmed, tool) {
            return ValidationVerdict::invalid(FailureKind::Structural, err.to_string(), trimmed);
        }

        let cleaned = ensure_overwrite_flag(trimmed, tool);

        if let Some(program) = program_token(&cleaned)
            && let Err(err) = which::which(&program)
        {
            return ValidationVerdict::invalid(
                FailureKind::Spawn,
                format!("{program} executable not found: {err}"),
                cleaned,
            );
        }

        let dry_run = self.dry_run_of(&cleaned);
        debug!(dry_run = %dry_run, "running dry run");

        let outcome = execute_in(
            &dry_run,
            timeout,
            &settings.shell,
            settings.working_dir.as_deref(),
        );
        let verdict = classify(
            outcome,
            settings.timeout_policy,
            timeout,
            cleaned.clone(),
            dry_run.clone(),
        );

        if settings.lint_filter_graph
            && verdict.is_valid()
            && let Some(message) = lint_filter_graph(&cleaned)
        {
            return ValidationVerdict::invalid(FailureKind::Lint, message, cleaned)
                .with_dry_run_command(dry_run);
        }
        verdict
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
