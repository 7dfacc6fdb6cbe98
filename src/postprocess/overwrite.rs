use anyhow::Result;

use crate::command::ensure_overwrite_flag;
use crate::postprocess::CommandPostProcessor;

pub struct OverwriteFlagStage;

impl CommandPostProcessor for OverwriteFlagStage {
    fn process(&self, tool: &str, command: String) -> Result<String> {
        Ok(ensure_overwrite_flag(&command, tool))
    }
}
