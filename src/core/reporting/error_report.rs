// Formats an error for the operator webhook.

use std::error::Error as StdError;

/// Discord rejects embed descriptions longer than this.
pub const MAX_DESCRIPTION_LEN: usize = 4096;

const CODE_FENCE_OPEN: &str = "```\n";
const CODE_FENCE_CLOSE: &str = "\n```";
const TRUNCATION_MARKER: &str = "\n...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    /// Where the error happened, e.g. "command `kick`".
    pub title: String,
    /// The error and its source chain, fenced as a code block.
    pub body: String,
}

impl ErrorReport {
    pub fn new(context: &str, err: &dyn StdError) -> Self {
        let mut trace = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            trace.push_str("\ncaused by: ");
            trace.push_str(&cause.to_string());
            source = cause.source();
        }

        Self {
            title: context.to_string(),
            body: fence(&trace),
        }
    }
}

fn fence(trace: &str) -> String {
    let budget = MAX_DESCRIPTION_LEN
        - CODE_FENCE_OPEN.len()
        - CODE_FENCE_CLOSE.len()
        - TRUNCATION_MARKER.len();

    let mut text = trace.to_string();
    if text.len() > budget {
        let mut cut = budget;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        text.truncate(cut);
        text.push_str(TRUNCATION_MARKER);
    }

    format!("{CODE_FENCE_OPEN}{text}{CODE_FENCE_CLOSE}")
}
