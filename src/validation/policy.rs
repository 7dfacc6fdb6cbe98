use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// How a dry run that is still going when the wall-clock limit hits is judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TimeoutPolicy {
    /// The timeout is a failure.
    #[default]
    Strict,
    /// A run that produced no error before the limit is accepted, with a note.
    Lenient,
}

impl TimeoutPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeoutPolicy::Strict => "strict",
            TimeoutPolicy::Lenient => "lenient",
        }
    }
}
