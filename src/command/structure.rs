use std::fmt;

use thiserror::Error;

use super::tokens::{INPUT_FLAG, is_flag, is_null_sentinel, is_tool_token, split_lossy};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("The command is empty")]
    Empty,
    #[error("The command must start with \"{tool}\"")]
    MissingToolPrefix { tool: String },
    #[error("Missing input file after -i flag ({cause}). Please specify a valid input file path.")]
    MissingInput { cause: MissingInputCause },
}

/// What was found where the input path of `-i` should have been.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingInputCause {
    EndOfCommand,
    Flag(String),
    NullSink(String),
}

impl fmt::Display for MissingInputCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingInputCause::EndOfCommand => write!(f, "command ends after -i"),
            MissingInputCause::Flag(flag) => write!(f, "followed by flag {flag}"),
            MissingInputCause::NullSink(sink) => write!(f, "followed by null device {sink}"),
        }
    }
}

/// Static shape checks run before anything is spawned.
pub fn validate_structure(command: &str, tool: &str) -> Result<(), StructuralError> {
    let tokens = split_lossy(command.trim());
    let Some(first) = tokens.first() else {
        return Err(StructuralError::Empty);
    };
    if !is_tool_token(first, tool) {
        return Err(StructuralError::MissingToolPrefix {
            tool: tool.trim().to_string(),
        });
    }

    for (index, token) in tokens.iter().enumerate() {
        if token != INPUT_FLAG {
            continue;
        }
        let cause = match tokens.get(index + 1) {
            None => Some(MissingInputCause::EndOfCommand),
            Some(next) if is_flag(next) => Some(MissingInputCause::Flag(next.clone())),
            Some(next) if is_null_sentinel(next) => Some(MissingInputCause::NullSink(next.clone())),
            Some(_) => None,
        };
        if let Some(cause) = cause {
            return Err(StructuralError::MissingInput { cause });
        }
    }
    Ok(())
}
