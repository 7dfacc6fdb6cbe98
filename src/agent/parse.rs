use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentReply {
    pub command: String,
    #[serde(default)]
    pub reason: String,
}

/// Reads an agent's stdout: a `{"command": ..., "reason": ...}` object,
/// optionally fenced, or a single bare command line.
pub fn parse_reply(raw: &str) -> Result<AgentReply> {
    let text = strip_fences(raw.trim());
    if text.is_empty() {
        return Err(anyhow!("agent reply is empty"));
    }

    if let Ok(reply) = serde_json::from_str::<AgentReply>(&text) {
        return normalize(reply);
    }

    if let Some(fragment) = extract_first_json_object(&text) {
        let parsed: Value =
            serde_json::from_str(&fragment).with_context(|| "failed to parse JSON fragment")?;
        let reply: AgentReply = serde_json::from_value(parsed)
            .with_context(|| "agent reply object has no command field")?;
        return normalize(reply);
    }

    plain_command_line(&text)
}

fn normalize(mut reply: AgentReply) -> Result<AgentReply> {
    reply.command = reply.command.trim().to_string();
    reply.reason = reply.reason.trim().to_string();
    if reply.command.is_empty() {
        return Err(anyhow!("agent returned an empty command"));
    }
    Ok(reply)
}

fn plain_command_line(text: &str) -> Result<AgentReply> {
    let mut lines = text.lines().map(str::trim).filter(|line| !line.is_empty());
    let Some(first) = lines.next() else {
        return Err(anyhow!("agent reply is empty"));
    };
    if lines.next().is_some() {
        return Err(anyhow!("agent reply is neither JSON nor a single command line"));
    }
    let command = first.strip_prefix("$ ").unwrap_or(first);
    normalize(AgentReply {
        command: command.to_string(),
        reason: String::new(),
    })
}

fn strip_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    if !(trimmed.starts_with("```") && trimmed.ends_with("```")) {
        return trimmed.to_string();
    }

    let mut lines = trimmed.lines();
    let _ = lines.next();
    let mut out = String::new();
    for line in lines {
        if line.trim() == "```" {
            break;
        }
        out.push_str(line);
        out.push('\n');
    }
    out.trim().to_string()
}

fn extract_first_json_object(raw: &str) -> Option<String> {
    let mut start = None;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (idx, ch) in raw.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            _ if in_string => {}
            '{' => {
                if depth == 0 {
                    start = Some(idx);
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0
                    && let Some(begin) = start
                {
                    return Some(raw[begin..=idx].to_string());
                }
            }
            _ => {}
        }
    }
    None
}
