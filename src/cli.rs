use clap::Parser;

use crate::command::NullSink;
use crate::config::ConfigLayer;
use crate::filters::FilterKind;
use crate::validation::TimeoutPolicy;

#[derive(Debug, Parser)]
#[command(
    name = "kortar",
    version,
    about = "Validate FFmpeg commands with a dry run and repair the ones that fail"
)]
pub struct Cli {
    /// Command to validate (omit for interactive mode)
    #[arg(value_name = "COMMAND", conflicts_with = "show_session")]
    pub command: Option<String>,

    /// Dry-run timeout in seconds [default: 10]
    #[arg(long = "timeout", value_name = "SECS")]
    pub timeout: Option<f64>,

    /// How a dry run that outlives the timeout is judged [default: strict]
    #[arg(long = "timeout-policy", value_enum)]
    pub timeout_policy: Option<TimeoutPolicy>,

    /// Program every command must start with [default: ffmpeg]
    #[arg(long = "tool", value_name = "NAME")]
    pub tool: Option<String>,

    /// Sink written by the null muxer [default: dash]
    #[arg(long = "null-sink", value_enum)]
    pub null_sink: Option<NullSink>,

    /// Shell that runs the dry-run script [default: sh]
    #[arg(long = "shell", value_name = "SHELL")]
    pub shell: Option<String>,

    /// Do not add -hide_banner -loglevel error to dry runs
    #[arg(long = "no-quiet-flags")]
    pub no_quiet_flags: bool,

    /// Reject graph-only filters passed through -vf
    #[arg(long = "lint-filter-graph")]
    pub lint_filter_graph: bool,

    /// Print the dry-run form of COMMAND and exit
    #[arg(long = "dry-run-form", conflicts_with = "clean")]
    pub dry_run_form: bool,

    /// Print COMMAND cleaned for execution and exit
    #[arg(long = "clean")]
    pub clean: bool,

    /// Agent program asked to repair failing commands
    #[arg(long = "repair-with", value_name = "PROGRAM")]
    pub repair_with: Option<String>,

    /// Argument passed to the agent program (repeatable)
    #[arg(
        long = "repair-arg",
        value_name = "ARG",
        allow_hyphen_values = true,
        requires = "repair_with"
    )]
    pub repair_args: Vec<String>,

    /// What the command is meant to do, sent to the agent
    #[arg(long = "intent", value_name = "TEXT")]
    pub intent: Option<String>,

    /// Validation attempts per repair loop [default: 3]
    #[arg(long = "max-attempts", value_name = "N")]
    pub max_attempts: Option<usize>,

    /// Agent reply timeout in seconds [default: 120]
    #[arg(long = "agent-timeout", value_name = "SECS")]
    pub agent_timeout: Option<f64>,

    /// Filter step applied by the agent, e.g. text:"add a title" (repeatable)
    #[arg(
        long = "apply",
        value_name = "KIND:REQUEST",
        value_parser = parse_filter_step,
        requires = "repair_with"
    )]
    pub apply: Vec<FilterStepArg>,

    /// Source video the filter steps refer to
    #[arg(long = "video", value_name = "PATH")]
    pub video: Option<String>,

    /// Print results as JSON
    #[arg(long = "json")]
    pub json: bool,

    /// Hide the dry-run spinner
    #[arg(long = "no-progress")]
    pub no_progress: bool,

    /// Store the attempts of this run as a session
    #[arg(long = "save-session")]
    pub save_session: bool,

    /// Print a stored session by UUID and exit
    #[arg(long = "show-session", value_name = "UUID")]
    pub show_session: Option<String>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Settings given on the command line, as the topmost config layer.
    pub fn config_layer(&self) -> ConfigLayer {
        ConfigLayer {
            tool: self.tool.clone(),
            timeout_secs: self.timeout,
            timeout_policy: self.timeout_policy,
            null_sink: self.null_sink,
            shell: self.shell.clone(),
            quiet_flags: self.no_quiet_flags.then_some(false),
            lint_filter_graph: self.lint_filter_graph.then_some(true),
            working_dir: None,
            max_attempts: self.max_attempts,
            agent_timeout_secs: self.agent_timeout,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterStepArg {
    pub kind: FilterKind,
    pub request: String,
}

fn parse_filter_step(raw: &str) -> Result<FilterStepArg, String> {
    let (kind, request) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected KIND:REQUEST, got {raw}"))?;
    let kind = FilterKind::parse(kind).ok_or_else(|| {
        let known = FilterKind::ALL.map(FilterKind::as_str).join(", ");
        format!("unknown filter kind {kind:?} (expected one of: {known})")
    })?;
    let request = request.trim();
    if request.is_empty() {
        return Err("filter request must not be empty".to_string());
    }
    Ok(FilterStepArg {
        kind,
        request: request.to_string(),
    })
}
