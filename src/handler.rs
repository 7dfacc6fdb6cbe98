use anyhow::Result;
use std::io::{self, IsTerminal};
use std::sync::Arc;
use tracing::{info, warn};

use crate::agent::{AgentFilter, ExternalAgent};
use crate::analysis::{self, DEFAULT_ANALYSIS_TIMEOUT, DEFAULT_FFPROBE};
use crate::cli::Cli;
use crate::config::ResolvedConfig;
use crate::filters::{FilterChain, FilterKind, FilterStep};
use crate::output;
use crate::postprocess::{CommandPostProcessor, default_post_processor};
use crate::progress::SpinnerObserver;
use crate::repair::{AttemptRecord, RepairLoop};
use crate::session::{self, RepairSession};
use crate::validation::{
    CompositeObserver, TracingObserver, ValidationObserver, Validator, default_observer,
};

const DEFAULT_INTENT: &str = "make this command run without errors";

/// Runs one command through whichever mode the flags select. Shared by the
/// one-shot and interactive front ends.
pub struct CommandHandler<'a> {
    cli: &'a Cli,
    validator: Validator,
    observer: Arc<dyn ValidationObserver>,
    post_processor: Box<dyn CommandPostProcessor>,
    agent: Option<ExternalAgent>,
    max_attempts: usize,
}

impl<'a> CommandHandler<'a> {
    pub fn new(cli: &'a Cli, config: ResolvedConfig) -> Self {
        let observer = build_observer(cli);
        let validator = Validator::new(config.validator).with_observer(observer.clone());
        let agent = cli.repair_with.as_ref().map(|program| {
            ExternalAgent::new(program.clone())
                .with_args(cli.repair_args.clone())
                .with_timeout(config.agent_timeout)
        });

        Self {
            cli,
            validator,
            observer,
            post_processor: default_post_processor(),
            agent,
            max_attempts: config.max_attempts,
        }
    }

    /// Returns whether the command ended up valid.
    pub async fn handle(&self, command: &str) -> Result<bool> {
        let command = command.trim();

        if self.cli.dry_run_form {
            println!("{}", self.validator.dry_run_form(command));
            return Ok(true);
        }
        if self.cli.clean {
            println!("{}", self.clean(command.to_string())?);
            return Ok(true);
        }

        match &self.agent {
            Some(agent) if !self.cli.apply.is_empty() => self.apply_filters(agent, command).await,
            Some(agent) => self.repair(agent, command).await,
            None => self.validate(command),
        }
    }

    fn tool(&self) -> &str {
        &self.validator.settings().tool
    }

    fn intent(&self) -> &str {
        self.cli.intent.as_deref().unwrap_or(DEFAULT_INTENT)
    }

    fn clean(&self, command: String) -> Result<String> {
        self.post_processor.process(self.tool(), command)
    }

    fn validate(&self, command: &str) -> Result<bool> {
        let verdict = self.validator.validate(command);
        if self.cli.save_session {
            let mut record = RepairSession::new(self.tool(), self.intent());
            record.push_attempt(command, verdict.clone());
            if verdict.is_valid() {
                record.finish(verdict.normalized_command());
            }
            self.store(&record)?;
        }
        output::print_verdict(&verdict, self.cli.json)?;
        Ok(verdict.is_valid())
    }

    async fn repair(&self, agent: &ExternalAgent, command: &str) -> Result<bool> {
        let repair_loop = RepairLoop::new(&self.validator, agent, self.max_attempts);
        match repair_loop.run(self.intent(), command).await {
            Ok(mut outcome) => {
                outcome.command = self.clean(outcome.command)?;
                self.save(&outcome.history, Some(&outcome.command))?;
                output::print_repair_outcome(&outcome, self.cli.json)?;
                Ok(true)
            }
            Err(err) => {
                self.save(err.history(), None)?;
                output::print_repair_failure(&err, self.cli.json)?;
                Ok(false)
            }
        }
    }

    async fn apply_filters(&self, agent: &ExternalAgent, command: &str) -> Result<bool> {
        let appliers = self
            .cli
            .apply
            .iter()
            .map(|step| agent.filter(step.kind))
            .collect::<Vec<AgentFilter>>();
        let steps = self
            .cli
            .apply
            .iter()
            .zip(&appliers)
            .map(|(step, applier)| FilterStep {
                applier,
                request: step.request.clone(),
            })
            .collect::<Vec<_>>();

        let base = self.validator.settings();
        let kind_validators = FilterKind::ALL
            .into_iter()
            .filter_map(|kind| {
                let settings = kind.validator_settings(base);
                (settings != *base).then(|| {
                    let validator = Validator::new(settings).with_observer(self.observer.clone());
                    (kind, validator)
                })
            })
            .collect::<Vec<_>>();

        let mut chain = FilterChain::new(&self.validator, self.max_attempts);
        for (kind, validator) in &kind_validators {
            chain = chain.with_validator_for(*kind, validator);
        }
        if let Some(video) = &self.cli.video {
            chain = chain.with_video_path(video.clone());
            match analysis::analyze_video(DEFAULT_FFPROBE, video, DEFAULT_ANALYSIS_TIMEOUT).await {
                Ok(info) => chain = chain.with_video_info(info),
                Err(err) => warn!(
                    video = %video,
                    error = %format!("{err:#}"),
                    "video analysis failed, continuing without stream metadata"
                ),
            }
        }

        match chain.run(command, &steps).await {
            Ok(mut outcome) => {
                outcome.command = self.clean(outcome.command)?;
                let history = outcome
                    .steps
                    .iter()
                    .flat_map(|step| step.history.iter().cloned())
                    .collect::<Vec<_>>();
                self.save(&history, Some(&outcome.command))?;
                output::print_chain_outcome(&outcome, self.cli.json)?;
                Ok(true)
            }
            Err(err) => {
                self.save(err.history(), None)?;
                output::print_repair_failure(&err, self.cli.json)?;
                Ok(false)
            }
        }
    }

    fn save(&self, history: &[AttemptRecord], final_command: Option<&str>) -> Result<()> {
        if !self.cli.save_session {
            return Ok(());
        }
        let mut record = RepairSession::new(self.tool(), self.intent());
        record.extend_history(history);
        if let Some(command) = final_command {
            record.finish(command);
        }
        self.store(&record)
    }

    fn store(&self, record: &RepairSession) -> Result<()> {
        session::save_session(record)?;
        info!(session = %record.uuid, "session saved");
        eprintln!(
            "Session UUID: {} (show with: kortar --show-session {})",
            record.uuid, record.uuid
        );
        Ok(())
    }
}

fn build_observer(cli: &Cli) -> Arc<dyn ValidationObserver> {
    if cli.no_progress || cli.json || !io::stderr().is_terminal() {
        return default_observer();
    }
    Arc::new(CompositeObserver::new(vec![
        Arc::new(TracingObserver),
        Arc::new(SpinnerObserver::default()),
    ]))
}
