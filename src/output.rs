use anyhow::Result;
use serde::Serialize;

use crate::filters::ChainOutcome;
use crate::repair::{AttemptRecord, RepairError, RepairOutcome};
use crate::session::RepairSession;
use crate::validation::ValidationVerdict;

#[derive(Debug, Serialize)]
struct RepairReport<'a> {
    is_valid: bool,
    command: Option<&'a str>,
    attempts: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    history: &'a [AttemptRecord],
}

#[derive(Debug, Serialize)]
struct ChainReport<'a> {
    command: &'a str,
    steps: Vec<RepairReport<'a>>,
}

pub fn print_verdict(verdict: &ValidationVerdict, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(verdict)?);
        return Ok(());
    }
    if verdict.is_valid() {
        println!("{}", verdict.normalized_command());
        if let Some(note) = verdict.note() {
            eprintln!("note: {note}");
        }
    } else {
        eprintln!("{}", describe_failure(verdict));
    }
    Ok(())
}

pub fn print_repair_outcome(outcome: &RepairOutcome, json: bool) -> Result<()> {
    if json {
        let report = repair_report(outcome);
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    println!("{}", outcome.command);
    if outcome.attempts > 1 {
        eprintln!("repaired after {} attempt(s)", outcome.attempts);
    }
    if let Some(note) = outcome.verdict.note() {
        eprintln!("note: {note}");
    }
    Ok(())
}

pub fn print_repair_failure(err: &RepairError, json: bool) -> Result<()> {
    if json {
        let report = RepairReport {
            is_valid: false,
            command: None,
            attempts: err.history().len(),
            error: Some(error_chain(err)),
            history: err.history(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    for (index, record) in err.history().iter().enumerate() {
        eprintln!("attempt {}: {}", index + 1, record.command);
        if !record.verdict.is_valid() {
            eprintln!("  {}", describe_failure(&record.verdict));
        }
    }
    eprintln!("error: {}", error_chain(err));
    Ok(())
}

pub fn print_chain_outcome(outcome: &ChainOutcome, json: bool) -> Result<()> {
    if json {
        let report = ChainReport {
            command: &outcome.command,
            steps: outcome.steps.iter().map(repair_report).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    println!("{}", outcome.command);
    Ok(())
}

pub fn print_session(session: &RepairSession) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(session)?);
    Ok(())
}

fn repair_report(outcome: &RepairOutcome) -> RepairReport<'_> {
    RepairReport {
        is_valid: true,
        command: Some(&outcome.command),
        attempts: outcome.attempts,
        error: None,
        history: &outcome.history,
    }
}

fn describe_failure(verdict: &ValidationVerdict) -> String {
    match verdict.failure() {
        Some(kind) => format!("error ({}): {}", kind.as_str(), verdict.to_feedback_text()),
        None => format!("error: {}", verdict.to_feedback_text()),
    }
}

/// `err` followed by each of its sources, joined with `: `.
fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
