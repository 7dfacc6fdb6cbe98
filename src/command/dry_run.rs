use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::tokens::{
    ShellToken, find_output_index, first_command_len, is_null_sentinel, join_quoted, raw_tokens,
    split_shell,
};

/// Text every dry-run command is guaranteed to contain.
pub const NULL_FORMAT_MARKER: &str = "-f null";

/// Where the dry run sends its encoded output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum NullSink {
    /// `-`, understood by FFmpeg on every platform.
    #[default]
    Dash,
    /// The platform null device (`/dev/null`, `NUL` on Windows).
    DevNull,
}

impl NullSink {
    pub fn token(self) -> &'static str {
        match self {
            NullSink::Dash => "-",
            NullSink::DevNull if cfg!(windows) => "NUL",
            NullSink::DevNull => "/dev/null",
        }
    }

    pub fn output_spec(self) -> [&'static str; 3] {
        ["-f", "null", self.token()]
    }

    fn output_spec_text(self) -> String {
        self.output_spec().join(" ")
    }
}

/// Rewrites a command so it encodes into the null muxer instead of its real
/// output file.
///
/// Only the first command of a pipeline or `&&` chain is rewritten. Its last
/// output-looking token and everything after it up to the next control
/// operator are replaced by `-f null <sink>`; when no output token can be
/// located the spec is added at the end of that command. A command that
/// already ends in a null output is left as is, and whatever follows the
/// control operator is kept unchanged. Unparseable quoting degrades to plain
/// concatenation; this function never fails.
pub fn to_dry_run_form(command: &str, sink: NullSink) -> String {
    let trimmed = command.trim();
    let Some(mut tokens) = split_shell(trimmed) else {
        return append_output_spec(trimmed, sink);
    };
    let rest = tokens.split_off(first_command_len(&tokens));

    if !ends_with_null_output(&tokens) {
        if let Some(index) = find_output_index(&tokens) {
            tokens.truncate(index);
        }
        if !ends_with_null_output(&tokens) {
            tokens.extend(sink.output_spec().into_iter().map(ShellToken::word));
        }
    }
    tokens.extend(rest);

    let rebuilt = join_quoted(&tokens);
    if rebuilt.contains(NULL_FORMAT_MARKER) {
        rebuilt
    } else {
        append_output_spec(&rebuilt, sink)
    }
}

fn ends_with_null_output(tokens: &[ShellToken]) -> bool {
    let [.., format_flag, format, sink] = tokens else {
        return false;
    };
    format_flag.value == "-f"
        && format.value == "null"
        && (sink.value == "-" || is_null_sentinel(&sink.value))
}

/// Byte offset where a trailing `-f null <sink>` starts, if the command ends
/// with one.
pub(crate) fn null_output_suffix_start(command: &str) -> Option<usize> {
    let tokens = split_shell(command)?;
    if !ends_with_null_output(&tokens) {
        return None;
    }
    let raw = raw_tokens(command);
    if raw.len() != tokens.len() {
        return None;
    }
    raw.get(raw.len() - 3).map(|token| token.start)
}

fn append_output_spec(command: &str, sink: NullSink) -> String {
    let spec = sink.output_spec_text();
    let trimmed = command.trim_end();
    if trimmed.ends_with(&spec) {
        return trimmed.to_string();
    }
    if trimmed.is_empty() {
        return spec;
    }
    format!("{trimmed} {spec}")
}
