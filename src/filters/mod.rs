//! Filter appliers: strategies that rewrite a command to add one kind of
//! effect, and a chain that applies several of them in order.

use anyhow::Result;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use tracing::error;

use crate::analysis::VideoInfo;
use crate::command_validation::CommandValidator;
use crate::repair::{RepairError, RepairOutcome, apply_validated};
use crate::validation::{TimeoutPolicy, ValidatorSettings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    Overlay,
    Audio,
    Text,
    Transition,
    Sync,
    Compress,
    /// Free-form visual effects built from filter graphs.
    Effects,
}

impl FilterKind {
    pub const ALL: [FilterKind; 7] = [
        FilterKind::Overlay,
        FilterKind::Audio,
        FilterKind::Text,
        FilterKind::Transition,
        FilterKind::Sync,
        FilterKind::Compress,
        FilterKind::Effects,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FilterKind::Overlay => "overlay",
            FilterKind::Audio => "audio",
            FilterKind::Text => "text",
            FilterKind::Transition => "transition",
            FilterKind::Sync => "sync",
            FilterKind::Compress => "compress",
            FilterKind::Effects => "effects",
        }
    }

    /// Compression runs are long; one that encodes the whole window without
    /// an error is accepted.
    pub fn timeout_policy(self) -> TimeoutPolicy {
        match self {
            FilterKind::Compress => TimeoutPolicy::Lenient,
            _ => TimeoutPolicy::Strict,
        }
    }

    /// Effect graphs must go through `-filter_complex`.
    pub fn lints_filter_graph(self) -> bool {
        self == FilterKind::Effects
    }

    /// Settings for validating this kind's commands, starting from `base`.
    pub fn validator_settings(self, base: &ValidatorSettings) -> ValidatorSettings {
        let mut settings = base.clone();
        if self.timeout_policy() == TimeoutPolicy::Lenient {
            settings = settings.with_timeout_policy(TimeoutPolicy::Lenient);
        }
        if self.lints_filter_graph() {
            settings.lint_filter_graph = true;
        }
        settings
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(raw))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterRequest {
    pub kind: FilterKind,
    pub current_command: String,
    /// What the user asked for, in their words.
    pub request: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_info: Option<VideoInfo>,
    /// Validation error of the previous candidate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

impl FilterRequest {
    pub fn new(
        kind: FilterKind,
        current_command: impl Into<String>,
        request: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            current_command: current_command.into(),
            request: request.into(),
            video_path: None,
            video_info: None,
            feedback: None,
        }
    }
}

pub trait FilterApplier: Send + Sync {
    fn kind(&self) -> FilterKind;

    fn apply<'a>(
        &'a self,
        request: &'a FilterRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;
}

pub struct FilterStep<'a> {
    pub applier: &'a dyn FilterApplier,
    pub request: String,
}

#[derive(Debug, Clone)]
pub struct ChainOutcome {
    pub command: String,
    pub steps: Vec<RepairOutcome>,
}

/// Applies filter steps one after another, each validated before its result
/// becomes the next step's input.
pub struct FilterChain<'a> {
    validator: &'a dyn CommandValidator,
    overrides: HashMap<FilterKind, &'a dyn CommandValidator>,
    max_attempts: usize,
    video_path: Option<String>,
    video_info: Option<VideoInfo>,
}

impl<'a> FilterChain<'a> {
    pub fn new(validator: &'a dyn CommandValidator, max_attempts: usize) -> Self {
        Self {
            validator,
            overrides: HashMap::new(),
            max_attempts,
            video_path: None,
            video_info: None,
        }
    }

    /// Validate steps of `kind` with `validator` instead of the default one.
    pub fn with_validator_for(
        mut self,
        kind: FilterKind,
        validator: &'a dyn CommandValidator,
    ) -> Self {
        self.overrides.insert(kind, validator);
        self
    }

    pub fn with_video_path(mut self, video_path: impl Into<String>) -> Self {
        self.video_path = Some(video_path.into());
        self
    }

    pub fn with_video_info(mut self, video_info: VideoInfo) -> Self {
        self.video_info = Some(video_info);
        self
    }

    fn validator_for(&self, kind: FilterKind) -> &'a dyn CommandValidator {
        self.overrides.get(&kind).copied().unwrap_or(self.validator)
    }

    pub async fn run(
        &self,
        base_command: &str,
        steps: &[FilterStep<'_>],
    ) -> Result<ChainOutcome, RepairError> {
        let mut command = base_command.trim().to_string();
        let mut outcomes = Vec::with_capacity(steps.len());

        for (index, step) in steps.iter().enumerate() {
            let kind = step.applier.kind();
            let mut request = FilterRequest::new(kind, command.clone(), step.request.clone());
            request.video_path = self.video_path.clone();
            request.video_info = self.video_info.clone();

            let outcome = apply_validated(
                step.applier,
                request,
                self.validator_for(kind),
                self.max_attempts,
            )
            .await
            .inspect_err(|err| {
                error!(
                    step = index + 1,
                    filter = kind.as_str(),
                    error = %err,
                    "filter step failed"
                );
            })?;
            command = outcome.command.clone();
            outcomes.push(outcome);
        }

        Ok(ChainOutcome {
            command,
            steps: outcomes,
        })
    }
}
