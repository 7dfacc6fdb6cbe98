use std::path::Path;

pub(crate) const OVERWRITE_FLAG: &str = "-y";
pub(crate) const INPUT_FLAG: &str = "-i";

/// Flags whose value is an input path or a stream specifier. Their value is
/// never an output sink.
const NON_OUTPUT_VALUE_FLAGS: &[&str] = &["-i", "-map"];

/// FFmpeg flags that take no value, so the token following them can still be
/// the output file. Every flag not listed here is assumed to consume the next
/// token as its value.
const BOOLEAN_FLAGS: &[&str] = &[
    "-y",
    "-n",
    "-an",
    "-vn",
    "-sn",
    "-dn",
    "-re",
    "-shortest",
    "-hide_banner",
    "-nostdin",
    "-stats",
    "-nostats",
    "-copyts",
    "-start_at_zero",
    "-accurate_seek",
    "-noaccurate_seek",
    "-autorotate",
    "-noautorotate",
    "-ignore_unknown",
    "-copy_unknown",
    "-benchmark",
    "-benchmark_all",
    "-xerror",
    "-report",
    "-dump",
    "-hex",
];

const NULL_SENTINELS: &[&str] = &["/dev/null", "nul"];

/// A token as written in the command (`raw`, quotes kept) and as the shell
/// would pass it (`cooked`), with its byte offset in the source string.
#[derive(Debug, Clone)]
pub(crate) struct RawToken {
    pub(crate) raw: String,
    pub(crate) cooked: String,
    pub(crate) start: usize,
}

impl RawToken {
    pub(crate) fn end(&self) -> usize {
        self.start + self.raw.len()
    }
}

/// Quote-aware tokenizer that never fails: an unterminated quote simply runs
/// to the end of the input. Used where byte offsets into the original text
/// matter and as the fallback when strict shell splitting rejects a command.
///
/// Follows the shell where it drops text: an unquoted `\<newline>` is a line
/// continuation and an unquoted `#` at the start of a word comments out the
/// rest of the line.
pub(crate) fn raw_tokens(command: &str) -> Vec<RawToken> {
    let mut tokens = Vec::new();
    let mut raw = String::new();
    let mut cooked = String::new();
    let mut in_token = false;
    let mut token_start = 0usize;
    let mut in_single = false;
    let mut in_double = false;
    let mut escaped = false;
    let mut chars = command.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if ch == '\\'
            && !in_single
            && !escaped
            && chars.peek().is_some_and(|&(_, next)| next == '\n')
        {
            chars.next();
            if in_token {
                raw.push_str("\\\n");
            }
            continue;
        }

        if !in_token {
            if ch.is_whitespace() {
                continue;
            }
            if ch == '#' {
                while chars.next_if(|&(_, next)| next != '\n').is_some() {}
                continue;
            }
            in_token = true;
            token_start = idx;
        }

        if escaped {
            raw.push(ch);
            cooked.push(ch);
            escaped = false;
            continue;
        }

        if ch == '\\' && !in_single {
            raw.push(ch);
            escaped = true;
            continue;
        }

        if ch == '\'' && !in_double {
            raw.push(ch);
            in_single = !in_single;
            continue;
        }

        if ch == '"' && !in_single {
            raw.push(ch);
            in_double = !in_double;
            continue;
        }

        if !in_single && !in_double && starts_control_operator(ch, &raw, chars.peek()) {
            if in_token && !raw.is_empty() {
                tokens.push(RawToken {
                    raw: std::mem::take(&mut raw),
                    cooked: std::mem::take(&mut cooked),
                    start: token_start,
                });
            }
            let mut operator = String::from(ch);
            if let Some((_, next)) = chars.next_if(|&(_, next)| is_operator_pair(ch, next)) {
                operator.push(next);
            }
            tokens.push(RawToken {
                raw: operator.clone(),
                cooked: operator,
                start: idx,
            });
            in_token = false;
            continue;
        }

        if !in_single && !in_double && ch.is_whitespace() {
            tokens.push(RawToken {
                raw: std::mem::take(&mut raw),
                cooked: std::mem::take(&mut cooked),
                start: token_start,
            });
            in_token = false;
            continue;
        }

        raw.push(ch);
        cooked.push(ch);
    }

    if in_token {
        tokens.push(RawToken {
            raw,
            cooked,
            start: token_start,
        });
    }

    tokens
}

/// Whether an unquoted `ch` begins `;`, `|`, `||`, `|&`, `&` or `&&`. The `&`
/// of `2>&1` and `&>` belongs to a redirection instead.
fn starts_control_operator(ch: char, word: &str, next: Option<&(usize, char)>) -> bool {
    match ch {
        ';' | '|' => true,
        '&' => {
            !(word.ends_with('>') || word.ends_with('<'))
                && !next.is_some_and(|&(_, next)| next == '>')
        }
        _ => false,
    }
}

fn is_operator_pair(first: char, second: char) -> bool {
    matches!((first, second), ('|', '|') | ('|', '&') | ('&', '&'))
}

/// Strict shell splitting; `None` when quoting is unbalanced.
pub(crate) fn split_strict(command: &str) -> Option<Vec<String>> {
    shell_words::split(command).ok()
}

pub(crate) fn split_lossy(command: &str) -> Vec<String> {
    split_strict(command).unwrap_or_else(|| {
        raw_tokens(command)
            .into_iter()
            .map(|token| token.cooked)
            .collect()
    })
}

/// A shell word plus whether it was an unquoted operator or redirection
/// (`|`, `&&`, `2>`, `>log.txt`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ShellToken {
    pub(crate) value: String,
    pub(crate) operator: bool,
}

impl ShellToken {
    pub(crate) fn word(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            operator: false,
        }
    }
}

/// Shell words with operators marked. Words come from `shell_words`; when its
/// split does not line up with the raw tokens the raw tokens are used, so an
/// operator is never mistaken for a plain argument.
pub(crate) fn split_shell(command: &str) -> Option<Vec<ShellToken>> {
    let words = split_strict(command)?;
    let raw = raw_tokens(command);
    if raw.len() != words.len() {
        return Some(raw.into_iter().map(shell_token).collect());
    }
    let tokens = words
        .into_iter()
        .zip(raw)
        .map(|(value, raw)| {
            let operator = raw.raw == value && is_shell_operator(&value);
            ShellToken { value, operator }
        })
        .collect();
    Some(tokens)
}

fn shell_token(token: RawToken) -> ShellToken {
    let operator = token.raw == token.cooked && is_shell_operator(&token.cooked);
    ShellToken {
        value: token.cooked,
        operator,
    }
}

fn is_shell_operator(token: &str) -> bool {
    is_control_operator(token) || is_redirection(token)
}

/// Operators that end one command and start the next.
fn is_control_operator(token: &str) -> bool {
    matches!(token, "|" | "||" | "|&" | "&&" | "&" | ";")
}

/// Length of the first command in `tokens`: everything before the first
/// unquoted `|`, `||`, `&&`, `;` or `&`. Redirections stay in the command.
pub(crate) fn first_command_len(tokens: &[ShellToken]) -> usize {
    tokens
        .iter()
        .position(|token| token.operator && is_control_operator(&token.value))
        .unwrap_or(tokens.len())
}

fn is_redirection(token: &str) -> bool {
    let rest = token.trim_start_matches(|ch: char| ch.is_ascii_digit());
    let rest = rest.strip_prefix('&').unwrap_or(rest);
    rest.starts_with('>') || rest.starts_with('<')
}

/// `2>`, `>>` and friends whose target is the next word.
fn is_bare_redirection(token: &ShellToken) -> bool {
    token.operator && (token.value.ends_with('>') || token.value.ends_with('<'))
}

pub(crate) fn join_quoted(tokens: &[ShellToken]) -> String {
    tokens
        .iter()
        .map(|token| {
            if token.operator {
                token.value.clone()
            } else {
                shell_words::quote(&token.value).into_owned()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// A flag is `-` followed by at least one character; the lone `-` is the
/// stdin/stdout placeholder.
pub(crate) fn is_flag(token: &str) -> bool {
    token.len() > 1 && token.starts_with('-')
}

pub(crate) fn is_null_sentinel(token: &str) -> bool {
    NULL_SENTINELS
        .iter()
        .any(|sentinel| token.eq_ignore_ascii_case(sentinel))
}

pub(crate) fn is_tool_token(token: &str, tool: &str) -> bool {
    let tool = tool.trim();
    if tool.is_empty() {
        return false;
    }
    if token.eq_ignore_ascii_case(tool) {
        return true;
    }
    let Some(name) = Path::new(token).file_name().and_then(|name| name.to_str()) else {
        return false;
    };
    let tool_name = Path::new(tool)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(tool);
    let stem = strip_exe_suffix(name);
    stem.eq_ignore_ascii_case(strip_exe_suffix(tool_name))
}

fn strip_exe_suffix(name: &str) -> &str {
    let cut = name.len().saturating_sub(4);
    match name.get(cut..) {
        Some(suffix) if cut > 0 && suffix.eq_ignore_ascii_case(".exe") => &name[..cut],
        _ => name,
    }
}

pub(crate) fn starts_with_tool(command: &str, tool: &str) -> bool {
    raw_tokens(command)
        .first()
        .is_some_and(|token| is_tool_token(&token.cooked, tool))
}

fn takes_value(flag: &str) -> bool {
    NON_OUTPUT_VALUE_FLAGS.contains(&flag) || !BOOLEAN_FLAGS.contains(&flag)
}

fn is_output_candidate(tokens: &[ShellToken], index: usize) -> bool {
    if index == 0 {
        return false;
    }
    let token = &tokens[index];
    if token.operator || is_flag(&token.value) || is_null_sentinel(&token.value) {
        return false;
    }
    let previous = &tokens[index - 1];
    if is_bare_redirection(previous) {
        return false;
    }
    !(!previous.operator && is_flag(&previous.value) && takes_value(&previous.value))
}

/// Index of the token naming the output file, scanning from the end.
///
/// This is a heuristic rather than an FFmpeg grammar: a token is the output
/// when it is positional, not a null device, not a shell operator or
/// redirection target, and not the value of the flag in front of it. A lone
/// `-` after a value-less position is stdout and counts as an output.
/// Callers pass a single command, not a whole pipeline.
pub(crate) fn find_output_index(tokens: &[ShellToken]) -> Option<usize> {
    (1..tokens.len())
        .rev()
        .find(|&index| is_output_candidate(tokens, index))
}

pub(crate) fn has_token(tokens: &[String], flag: &str) -> bool {
    tokens.iter().any(|token| token == flag)
}

/// The program word of a command as the shell would see it.
pub(crate) fn program_token(command: &str) -> Option<String> {
    raw_tokens(command.trim())
        .into_iter()
        .next()
        .map(|token| token.cooked)
}
