//! Layered settings: built-in defaults, then `config.json` in the base
//! directory, then `KORTAR_*` environment variables, then command-line flags.

use anyhow::{Context, Result, anyhow, bail};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::agent::DEFAULT_AGENT_TIMEOUT;
use crate::command::NullSink;
use crate::validation::{TimeoutPolicy, ValidatorSettings};

pub const DEFAULT_MAX_ATTEMPTS: usize = 3;

const ENV_TOOL: &str = "KORTAR_TOOL";
const ENV_TIMEOUT_SECS: &str = "KORTAR_TIMEOUT_SECS";
const ENV_TIMEOUT_POLICY: &str = "KORTAR_TIMEOUT_POLICY";
const ENV_SHELL: &str = "KORTAR_SHELL";

/// One configuration layer. Unset fields fall through to the layer below.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigLayer {
    pub tool: Option<String>,
    pub timeout_secs: Option<f64>,
    pub timeout_policy: Option<TimeoutPolicy>,
    pub null_sink: Option<NullSink>,
    pub shell: Option<String>,
    pub quiet_flags: Option<bool>,
    pub lint_filter_graph: Option<bool>,
    pub working_dir: Option<PathBuf>,
    pub max_attempts: Option<usize>,
    pub agent_timeout_secs: Option<f64>,
}

impl ConfigLayer {
    /// Reads a JSON config file; a missing file is an empty layer.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let timeout_secs = get(ENV_TIMEOUT_SECS)
            .map(|raw| {
                raw.parse::<f64>()
                    .with_context(|| format!("{ENV_TIMEOUT_SECS} is not a number: {raw}"))
            })
            .transpose()?;
        let timeout_policy = get(ENV_TIMEOUT_POLICY)
            .map(|raw| {
                TimeoutPolicy::from_str(&raw, true).map_err(|_| {
                    anyhow!("{ENV_TIMEOUT_POLICY} must be strict or lenient, got {raw}")
                })
            })
            .transpose()?;

        Ok(Self {
            tool: get(ENV_TOOL),
            timeout_secs,
            timeout_policy,
            shell: get(ENV_SHELL),
            ..Self::default()
        })
    }

    /// `self` with every field set in `upper` replaced.
    pub fn overlay(self, upper: ConfigLayer) -> ConfigLayer {
        ConfigLayer {
            tool: upper.tool.or(self.tool),
            timeout_secs: upper.timeout_secs.or(self.timeout_secs),
            timeout_policy: upper.timeout_policy.or(self.timeout_policy),
            null_sink: upper.null_sink.or(self.null_sink),
            shell: upper.shell.or(self.shell),
            quiet_flags: upper.quiet_flags.or(self.quiet_flags),
            lint_filter_graph: upper.lint_filter_graph.or(self.lint_filter_graph),
            working_dir: upper.working_dir.or(self.working_dir),
            max_attempts: upper.max_attempts.or(self.max_attempts),
            agent_timeout_secs: upper.agent_timeout_secs.or(self.agent_timeout_secs),
        }
    }

    pub fn resolve(self) -> Result<ResolvedConfig> {
        let defaults = ValidatorSettings::new(TimeoutPolicy::Strict);
        let timeout = match self.timeout_secs {
            Some(secs) => seconds("timeout", secs)?,
            None => defaults.timeout,
        };
        let agent_timeout = match self.agent_timeout_secs {
            Some(secs) => seconds("agent timeout", secs)?,
            None => DEFAULT_AGENT_TIMEOUT,
        };
        let tool = self.tool.unwrap_or(defaults.tool);
        if tool.trim().is_empty() {
            bail!("tool name must not be empty");
        }

        Ok(ResolvedConfig {
            validator: ValidatorSettings {
                tool,
                timeout,
                timeout_policy: self.timeout_policy.unwrap_or(defaults.timeout_policy),
                null_sink: self.null_sink.unwrap_or(defaults.null_sink),
                shell: self.shell.unwrap_or(defaults.shell),
                quiet_flags: self.quiet_flags.unwrap_or(defaults.quiet_flags),
                lint_filter_graph: self.lint_filter_graph.unwrap_or(defaults.lint_filter_graph),
                working_dir: self.working_dir.or(defaults.working_dir),
            },
            max_attempts: self.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS).max(1),
            agent_timeout,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub validator: ValidatorSettings,
    pub max_attempts: usize,
    pub agent_timeout: Duration,
}

/// Stacks the file and environment layers under `cli` and resolves them.
pub fn load(config_path: &Path, cli: ConfigLayer) -> Result<ResolvedConfig> {
    ConfigLayer::load(config_path)?
        .overlay(ConfigLayer::from_env()?)
        .overlay(cli)
        .resolve()
}

fn seconds(name: &str, secs: f64) -> Result<Duration> {
    if !secs.is_finite() || secs <= 0.0 {
        bail!("{name} must be a positive number of seconds, got {secs}");
    }
    Duration::try_from_secs_f64(secs).with_context(|| format!("{name} is out of range: {secs}"))
}
