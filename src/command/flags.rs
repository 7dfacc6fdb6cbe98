use super::tokens::{OVERWRITE_FLAG, has_token, raw_tokens, split_lossy, starts_with_tool};

const HIDE_BANNER_FLAG: &str = "-hide_banner";
const LOGLEVEL_FLAGS: &[&str] = &["-loglevel", "-v"];

/// Makes sure the command carries `-y` so a real run never blocks on an
/// overwrite prompt. The flag goes right after the tool token and the rest of
/// the text is kept as written.
pub fn ensure_overwrite_flag(command: &str, tool: &str) -> String {
    let trimmed = command.trim();
    if !starts_with_tool(trimmed, tool) {
        return trimmed.to_string();
    }
    if has_token(&split_lossy(trimmed), OVERWRITE_FLAG) {
        return trimmed.to_string();
    }
    insert_after_tool(trimmed, &[OVERWRITE_FLAG])
}

/// Adds `-hide_banner` and `-loglevel error` when missing, so a dry run only
/// reports errors on stderr.
pub fn ensure_quiet_flags(command: &str, tool: &str) -> String {
    let trimmed = command.trim();
    if !starts_with_tool(trimmed, tool) {
        return trimmed.to_string();
    }
    let tokens = split_lossy(trimmed);
    let mut missing = Vec::new();
    if !has_token(&tokens, HIDE_BANNER_FLAG) {
        missing.push(HIDE_BANNER_FLAG);
    }
    if !LOGLEVEL_FLAGS.iter().any(|flag| has_token(&tokens, flag)) {
        missing.extend(["-loglevel", "error"]);
    }
    if missing.is_empty() {
        return trimmed.to_string();
    }
    insert_after_tool(trimmed, &missing)
}

fn insert_after_tool(command: &str, flags: &[&str]) -> String {
    let Some(tool_token) = raw_tokens(command).into_iter().next() else {
        return command.to_string();
    };
    let split_at = tool_token.end();
    let mut out = String::with_capacity(command.len() + 32);
    out.push_str(&command[..split_at]);
    for flag in flags {
        out.push(' ');
        out.push_str(flag);
    }
    out.push_str(&command[split_at..]);
    out
}
