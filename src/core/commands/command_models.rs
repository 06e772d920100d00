// Declarative description of a prefix command.
//
// These types carry no Discord types: permissions are raw Discord permission
// bits and users are plain u64 ids, so the gate can be tested without a
// gateway connection.

use std::collections::HashSet;
use std::time::Duration;

/// Discord's SEND_MESSAGES permission bit.
pub const SEND_MESSAGES: u64 = 1 << 11;

/// One positional argument a command accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentSpec {
    pub name: String,
    pub required: bool,
}

/// Everything the gate needs to know about a command before running it.
///
/// Built with [`CommandOptions::new`] and the chained setters below. A command
/// that never declares permissions still requires SEND_MESSAGES for both the
/// bot and the invoking member.
#[derive(Debug, Clone)]
pub struct CommandOptions {
    pub name: String,
    pub aliases: Vec<String>,
    pub description: String,
    pub usage: String,
    pub args: Vec<ArgumentSpec>,
    pub bot_permissions: u64,
    pub user_permissions: u64,
    pub cooldown: Option<Duration>,
    pub dev_only: bool,
    /// Where the command was registered from. Used as the unload key.
    pub source: &'static str,
}

impl CommandOptions {
    pub fn new(name: impl Into<String>, source: &'static str) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            description: String::new(),
            usage: String::new(),
            args: Vec::new(),
            bot_permissions: SEND_MESSAGES,
            user_permissions: SEND_MESSAGES,
            cooldown: None,
            dev_only: false,
            source,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    pub fn required_arg(mut self, name: impl Into<String>) -> Self {
        self.args.push(ArgumentSpec {
            name: name.into(),
            required: true,
        });
        self
    }

    pub fn optional_arg(mut self, name: impl Into<String>) -> Self {
        self.args.push(ArgumentSpec {
            name: name.into(),
            required: false,
        });
        self
    }

    pub fn bot_permissions(mut self, bits: u64) -> Self {
        self.bot_permissions = bits;
        self
    }

    pub fn user_permissions(mut self, bits: u64) -> Self {
        self.user_permissions = bits;
        self
    }

    pub fn cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = Some(cooldown);
        self
    }

    pub fn dev_only(mut self) -> Self {
        self.dev_only = true;
        self
    }
}

/// What a command body reports back to the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandResult {
    /// The command did its work; start the cooldown and emit a run event.
    Done,
    /// The command bailed out early (bad input it reported itself, etc).
    Incomplete,
}

/// User ids allowed to run developer-only commands.
#[derive(Debug, Clone, Default)]
pub struct DeveloperSet {
    ids: HashSet<u64>,
}

impl DeveloperSet {
    pub fn new(ids: impl IntoIterator<Item = u64>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    pub fn contains(&self, user_id: u64) -> bool {
        self.ids.contains(&user_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }
}
