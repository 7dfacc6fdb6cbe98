use std::path::PathBuf;
use std::time::Duration;

use crate::command::{DEFAULT_TOOL, NullSink};

use super::policy::TimeoutPolicy;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_SHELL: &str = "sh";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorSettings {
    /// Program every command must start with.
    pub tool: String,
    pub timeout: Duration,
    pub timeout_policy: TimeoutPolicy,
    pub null_sink: NullSink,
    /// Shell used to run the dry-run script.
    pub shell: String,
    /// Add `-hide_banner -loglevel error` to the dry run.
    pub quiet_flags: bool,
    pub lint_filter_graph: bool,
    /// Directory the dry run starts in; the caller's when unset, so relative
    /// input paths resolve as they would for a real run.
    pub working_dir: Option<PathBuf>,
}

impl ValidatorSettings {
    /// Defaults for everything except the timeout policy, which every call
    /// site picks for itself.
    pub fn new(timeout_policy: TimeoutPolicy) -> Self {
        Self {
            tool: DEFAULT_TOOL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            timeout_policy,
            null_sink: NullSink::default(),
            shell: DEFAULT_SHELL.to_string(),
            quiet_flags: true,
            lint_filter_graph: false,
            working_dir: None,
        }
    }

    pub fn with_timeout_policy(mut self, timeout_policy: TimeoutPolicy) -> Self {
        self.timeout_policy = timeout_policy;
        self
    }
}
