//! Dry-run validation: runs the null-output form of a command under a
//! wall-clock limit and classifies what happened into a verdict.

mod executor;
mod lint;
mod observer;
mod policy;
mod settings;
mod validator;
mod verdict;
mod workspace;

#[cfg(test)]
mod tests;

pub use executor::{ExecutionOutcome, execute, execute_in};
pub use lint::{FILTER_COMPLEX_MESSAGE, lint_filter_graph};
pub use observer::{
    CompositeObserver, NoopObserver, TracingObserver, ValidationEvent, ValidationObserver,
    default_observer,
};
pub use policy::TimeoutPolicy;
pub use settings::{DEFAULT_SHELL, DEFAULT_TIMEOUT, ValidatorSettings};
pub use validator::Validator;
pub use verdict::{FailureKind, ValidationVerdict};
