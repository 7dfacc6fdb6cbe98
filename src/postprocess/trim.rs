use anyhow::Result;

use crate::postprocess::CommandPostProcessor;

/// Trims the command and folds backslash-newline continuations into one line.
pub struct TrimStage;

impl CommandPostProcessor for TrimStage {
    fn process(&self, _tool: &str, command: String) -> Result<String> {
        Ok(join_continuations(command.trim()))
    }
}

fn join_continuations(command: &str) -> String {
    if !command.contains('\n') {
        return command.to_string();
    }
    command
        .lines()
        .map(|line| line.trim().trim_end_matches('\\').trim_end())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
