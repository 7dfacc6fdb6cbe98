use anyhow::Result;

use crate::command::null_output_suffix_start;
use crate::postprocess::CommandPostProcessor;

/// Drops a trailing `-f null <sink>` left over from a dry run; a final
/// command has to write a real file.
pub struct StripNullSinkStage;

impl CommandPostProcessor for StripNullSinkStage {
    fn process(&self, _tool: &str, command: String) -> Result<String> {
        match null_output_suffix_start(&command) {
            Some(start) => Ok(command[..start].trim_end().to_string()),
            None => Ok(command),
        }
    }
}
