//! Command normalizer: shape checks and rewrites applied to FFmpeg command
//! strings before they are run for real or as a dry run.

mod dry_run;
mod flags;
mod structure;
mod tokens;

#[cfg(test)]
mod tests;

pub use dry_run::{NULL_FORMAT_MARKER, NullSink, to_dry_run_form};
pub use flags::{ensure_overwrite_flag, ensure_quiet_flags};
pub use structure::{MissingInputCause, StructuralError, validate_structure};

pub(crate) use dry_run::null_output_suffix_start;
pub(crate) use tokens::program_token;

pub const DEFAULT_TOOL: &str = "ffmpeg";
