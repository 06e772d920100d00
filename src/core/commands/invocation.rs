// Turns raw message content into a command name, positional args and flags.

use std::collections::HashMap;

/// Marker that turns a token into a boolean flag instead of an argument.
pub const FLAG_MARKER: &str = "--";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub raw_command: String,
    pub args: Vec<String>,
    pub flags: HashMap<String, bool>,
}

impl Invocation {
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.get(flag).copied().unwrap_or(false)
    }
}

/// Parse `content` as a prefixed command.
///
/// Returns `None` when the content does not start with `prefix` or nothing
/// follows the prefix. Tokens are split on runs of spaces; any token starting
/// with `--` becomes a flag and is removed from the argument list.
pub fn parse_invocation(prefix: &str, content: &str) -> Option<Invocation> {
    let rest = content.strip_prefix(prefix)?;
    let mut tokens = rest.trim().split(' ').filter(|t| !t.is_empty());

    let raw_command = tokens.next()?.to_string();

    let mut args = Vec::new();
    let mut flags = HashMap::new();
    for token in tokens {
        match token.strip_prefix(FLAG_MARKER) {
            Some(flag) => {
                flags.insert(flag.to_string(), true);
            }
            None => args.push(token.to_string()),
        }
    }

    Some(Invocation {
        raw_command,
        args,
        flags,
    })
}
