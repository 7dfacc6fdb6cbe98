//! Validates shell commands for a media tool by running a side-effect-free
//! dry run, and drives repair loops that feed failures back to an agent.

pub mod agent;
pub mod analysis;
pub mod app;
pub mod cli;
pub mod command;
pub mod command_validation;
pub mod config;
pub mod filters;
pub mod handler;
pub mod interactive;
pub mod logging;
pub mod output;
pub mod paths;
pub mod postprocess;
pub mod progress;
pub mod repair;
pub mod session;
pub mod validation;

pub use command_validation::CommandValidator;
pub use validation::{FailureKind, TimeoutPolicy, ValidationVerdict, Validator, ValidatorSettings};
