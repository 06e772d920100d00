// The execution gate decides whether a parsed invocation may run.
//
// Order matters and every check short-circuits:
//   developer lock -> permissions -> arguments -> cooldown
// The Discord layer turns a `GateRejection` into a single warning reply.

use super::command_models::{CommandOptions, DeveloperSet, SEND_MESSAGES};
use super::cooldown::{remaining_cooldown, CooldownStore};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// One member's permission bits, guild-wide and in the message channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GrantedPermissions {
    pub guild: u64,
    pub channel: u64,
}

impl GrantedPermissions {
    /// The same bits guild-wide and in the channel.
    pub fn everywhere(bits: u64) -> Self {
        Self {
            guild: bits,
            channel: bits,
        }
    }

    /// Granted guild-wide or in the channel; either one is enough.
    pub fn covers(&self, required: u64) -> bool {
        covers(self.guild, required) || covers(self.channel, required)
    }
}

/// Permissions of the bot and of the invoking member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PermissionSnapshot {
    pub bot: GrantedPermissions,
    pub user: GrantedPermissions,
}

impl PermissionSnapshot {
    /// The bot may post in the channel only with SEND_MESSAGES on both levels.
    pub fn bot_can_send(&self) -> bool {
        covers(self.bot.guild, SEND_MESSAGES) && covers(self.bot.channel, SEND_MESSAGES)
    }
}

/// Everything about a single invocation the gate looks at.
#[derive(Debug, Clone, Copy)]
pub struct GateRequest<'a> {
    pub user_id: u64,
    pub options: &'a CommandOptions,
    pub args: &'a [String],
    pub permissions: PermissionSnapshot,
}

/// Why the gate refused to run a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateRejection {
    DeveloperOnly,
    MissingBotPermissions {
        required: u64,
        /// When false the warning has to go to the author's DMs.
        can_send: bool,
    },
    MissingUserPermissions {
        required: u64,
    },
    MissingArgument {
        name: String,
    },
    OnCooldown {
        remaining: Duration,
    },
}

/// Published after a command body reports `CommandResult::Done`.
#[derive(Debug, Clone)]
pub struct CommandRunEvent {
    pub command: String,
    pub user_id: u64,
    pub guild_id: u64,
    pub args: Vec<String>,
    pub flags: HashMap<String, bool>,
}

fn covers(granted: u64, required: u64) -> bool {
    granted & required == required
}

pub struct CommandGate<C: CooldownStore> {
    cooldowns: C,
    developers: DeveloperSet,
}

impl<C: CooldownStore> CommandGate<C> {
    pub fn new(cooldowns: C, developers: DeveloperSet) -> Self {
        Self {
            cooldowns,
            developers,
        }
    }

    pub fn is_developer(&self, user_id: u64) -> bool {
        self.developers.contains(user_id)
    }

    /// Run every check in order and stop at the first failure.
    pub async fn evaluate(
        &self,
        request: &GateRequest<'_>,
        now: Instant,
    ) -> Result<(), GateRejection> {
        self.check_developer(request.options, request.user_id)?;
        Self::check_permissions(request.options, request.permissions)?;
        Self::check_arguments(request.options, request.args)?;
        self.check_cooldown(request.options, request.user_id, now)
            .await
    }

    pub fn check_developer(
        &self,
        options: &CommandOptions,
        user_id: u64,
    ) -> Result<(), GateRejection> {
        if options.dev_only && !self.is_developer(user_id) {
            return Err(GateRejection::DeveloperOnly);
        }
        Ok(())
    }

    /// Bot permissions are checked before the member's.
    pub fn check_permissions(
        options: &CommandOptions,
        permissions: PermissionSnapshot,
    ) -> Result<(), GateRejection> {
        if !permissions.bot.covers(options.bot_permissions) {
            return Err(GateRejection::MissingBotPermissions {
                required: options.bot_permissions,
                can_send: permissions.bot_can_send(),
            });
        }

        if !permissions.user.covers(options.user_permissions) {
            return Err(GateRejection::MissingUserPermissions {
                required: options.user_permissions,
            });
        }

        Ok(())
    }

    /// Fails on the first required argument position with no token.
    pub fn check_arguments(options: &CommandOptions, args: &[String]) -> Result<(), GateRejection> {
        for (position, spec) in options.args.iter().enumerate() {
            if spec.required && args.get(position).is_none() {
                return Err(GateRejection::MissingArgument {
                    name: spec.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Rejects while the user's last run is younger than the command's
    /// cooldown. An expired entry is removed.
    pub async fn check_cooldown(
        &self,
        options: &CommandOptions,
        user_id: u64,
        now: Instant,
    ) -> Result<(), GateRejection> {
        let Some(cooldown) = options.cooldown else {
            return Ok(());
        };
        let Some(last) = self.cooldowns.last_invocation(&options.name, user_id).await else {
            return Ok(());
        };

        match remaining_cooldown(last, cooldown, now) {
            Some(remaining) => Err(GateRejection::OnCooldown { remaining }),
            None => {
                self.cooldowns.clear(&options.name, user_id).await;
                Ok(())
            }
        }
    }

    /// Start the cooldown window for a successful run.
    pub async fn record_invocation(&self, options: &CommandOptions, user_id: u64, now: Instant) {
        if options.cooldown.is_some() {
            self.cooldowns.record(&options.name, user_id, now).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dashmap::DashMap;

    const KICK_MEMBERS: u64 = 1 << 1;
    const DEV: u64 = 42;
    const USER: u64 = 7;

    #[derive(Default)]
    struct MockCooldowns {
        entries: DashMap<(String, u64), Instant>,
    }

    #[async_trait]
    impl CooldownStore for MockCooldowns {
        async fn last_invocation(&self, command: &str, user_id: u64) -> Option<Instant> {
            self.entries
                .get(&(command.to_string(), user_id))
                .map(|e| *e)
        }

        async fn record(&self, command: &str, user_id: u64, at: Instant) {
            self.entries.insert((command.to_string(), user_id), at);
        }

        async fn clear(&self, command: &str, user_id: u64) {
            self.entries.remove(&(command.to_string(), user_id));
        }
    }

    fn make_gate() -> CommandGate<MockCooldowns> {
        CommandGate::new(MockCooldowns::default(), DeveloperSet::new([DEV]))
    }

    fn everything() -> PermissionSnapshot {
        PermissionSnapshot {
            bot: GrantedPermissions::everywhere(u64::MAX),
            user: GrantedPermissions::everywhere(u64::MAX),
        }
    }

    fn args(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[tokio::test]
    async fn dev_only_rejects_non_developers_even_when_everything_else_passes() {
        let gate = make_gate();
        let options = CommandOptions::new("eval", "eval.rs").dev_only();
        let request = GateRequest {
            user_id: USER,
            options: &options,
            args: &[],
            permissions: everything(),
        };

        let result = gate.evaluate(&request, Instant::now()).await;
        assert_eq!(result, Err(GateRejection::DeveloperOnly));

        let dev_request = GateRequest {
            user_id: DEV,
            ..request
        };
        assert!(gate.evaluate(&dev_request, Instant::now()).await.is_ok());
    }

    #[test]
    fn bot_permissions_are_checked_first() {
        let options = CommandOptions::new("kick", "kick.rs")
            .bot_permissions(SEND_MESSAGES | KICK_MEMBERS)
            .user_permissions(KICK_MEMBERS);

        let result = CommandGate::<MockCooldowns>::check_permissions(
            &options,
            PermissionSnapshot::default(),
        );
        assert_eq!(
            result,
            Err(GateRejection::MissingBotPermissions {
                required: SEND_MESSAGES | KICK_MEMBERS,
                can_send: false,
            })
        );

        let result = CommandGate::<MockCooldowns>::check_permissions(
            &options,
            PermissionSnapshot {
                bot: GrantedPermissions::everywhere(SEND_MESSAGES),
                user: GrantedPermissions::everywhere(KICK_MEMBERS),
            },
        );
        assert_eq!(
            result,
            Err(GateRejection::MissingBotPermissions {
                required: SEND_MESSAGES | KICK_MEMBERS,
                can_send: true,
            })
        );
    }

    #[test]
    fn user_permissions_must_be_covered() {
        let options = CommandOptions::new("kick", "kick.rs").user_permissions(KICK_MEMBERS);

        let result = CommandGate::<MockCooldowns>::check_permissions(
            &options,
            PermissionSnapshot {
                bot: GrantedPermissions::everywhere(SEND_MESSAGES),
                user: GrantedPermissions::everywhere(SEND_MESSAGES),
            },
        );
        assert_eq!(
            result,
            Err(GateRejection::MissingUserPermissions {
                required: KICK_MEMBERS
            })
        );

        let result = CommandGate::<MockCooldowns>::check_permissions(
            &options,
            PermissionSnapshot {
                bot: GrantedPermissions::everywhere(SEND_MESSAGES),
                user: GrantedPermissions::everywhere(KICK_MEMBERS | SEND_MESSAGES),
            },
        );
        assert!(result.is_ok());
    }

    #[test]
    fn guild_or_channel_grant_is_enough() {
        let options = CommandOptions::new("kick", "kick.rs")
            .user_permissions(SEND_MESSAGES | KICK_MEMBERS);
        let bot = GrantedPermissions::everywhere(SEND_MESSAGES);

        let guild_only = PermissionSnapshot {
            bot,
            user: GrantedPermissions {
                guild: SEND_MESSAGES | KICK_MEMBERS,
                channel: 0,
            },
        };
        assert!(CommandGate::<MockCooldowns>::check_permissions(&options, guild_only).is_ok());

        let channel_only = PermissionSnapshot {
            bot,
            user: GrantedPermissions {
                guild: 0,
                channel: SEND_MESSAGES | KICK_MEMBERS,
            },
        };
        assert!(CommandGate::<MockCooldowns>::check_permissions(&options, channel_only).is_ok());

        // Half the bits on each level is not a grant.
        let split = PermissionSnapshot {
            bot,
            user: GrantedPermissions {
                guild: SEND_MESSAGES,
                channel: KICK_MEMBERS,
            },
        };
        assert!(CommandGate::<MockCooldowns>::check_permissions(&options, split).is_err());
    }

    #[test]
    fn bot_muted_in_channel_must_answer_by_dm() {
        let options =
            CommandOptions::new("kick", "kick.rs").bot_permissions(SEND_MESSAGES | KICK_MEMBERS);
        let snapshot = PermissionSnapshot {
            bot: GrantedPermissions {
                guild: SEND_MESSAGES,
                channel: 0,
            },
            user: GrantedPermissions::everywhere(u64::MAX),
        };

        assert!(!snapshot.bot_can_send());
        assert_eq!(
            CommandGate::<MockCooldowns>::check_permissions(&options, snapshot),
            Err(GateRejection::MissingBotPermissions {
                required: SEND_MESSAGES | KICK_MEMBERS,
                can_send: false,
            })
        );
    }

    #[test]
    fn names_first_missing_required_argument() {
        let options = CommandOptions::new("give", "give.rs")
            .required_arg("member")
            .required_arg("amount")
            .optional_arg("note");

        let missing_all = CommandGate::<MockCooldowns>::check_arguments(&options, &[]);
        assert_eq!(
            missing_all,
            Err(GateRejection::MissingArgument {
                name: "member".to_string()
            })
        );

        let missing_one = CommandGate::<MockCooldowns>::check_arguments(&options, &args(&["@a"]));
        assert_eq!(
            missing_one,
            Err(GateRejection::MissingArgument {
                name: "amount".to_string()
            })
        );

        let optional_skipped =
            CommandGate::<MockCooldowns>::check_arguments(&options, &args(&["@a", "5"]));
        assert!(optional_skipped.is_ok());
    }

    #[tokio::test]
    async fn cooldown_rejects_inside_window_and_clears_after() {
        let gate = make_gate();
        let options = CommandOptions::new("daily", "daily.rs").cooldown(Duration::from_secs(60));
        let start = Instant::now();

        assert!(gate.check_cooldown(&options, USER, start).await.is_ok());
        gate.record_invocation(&options, USER, start).await;

        let early = gate
            .check_cooldown(&options, USER, start + Duration::from_secs(59))
            .await;
        assert_eq!(
            early,
            Err(GateRejection::OnCooldown {
                remaining: Duration::from_secs(1)
            })
        );

        let on_time = gate
            .check_cooldown(&options, USER, start + Duration::from_secs(60))
            .await;
        assert!(on_time.is_ok());
        assert!(gate.cooldowns.last_invocation("daily", USER).await.is_none());
    }

    #[tokio::test]
    async fn cooldowns_are_per_user_and_per_command() {
        let gate = make_gate();
        let daily = CommandOptions::new("daily", "daily.rs").cooldown(Duration::from_secs(60));
        let weekly = CommandOptions::new("weekly", "weekly.rs").cooldown(Duration::from_secs(60));
        let now = Instant::now();

        gate.record_invocation(&daily, USER, now).await;

        assert!(gate.check_cooldown(&daily, USER, now).await.is_err());
        assert!(gate.check_cooldown(&daily, DEV, now).await.is_ok());
        assert!(gate.check_cooldown(&weekly, USER, now).await.is_ok());
    }

    #[tokio::test]
    async fn commands_without_cooldown_never_record() {
        let gate = make_gate();
        let options = CommandOptions::new("ping", "ping.rs");
        let now = Instant::now();

        gate.record_invocation(&options, USER, now).await;
        assert!(gate.cooldowns.last_invocation("ping", USER).await.is_none());
        assert!(gate.check_cooldown(&options, USER, now).await.is_ok());
    }

    #[tokio::test]
    async fn permission_failure_wins_over_missing_args() {
        let gate = make_gate();
        let options = CommandOptions::new("kick", "kick.rs")
            .user_permissions(KICK_MEMBERS)
            .required_arg("member");
        let request = GateRequest {
            user_id: USER,
            options: &options,
            args: &[],
            permissions: PermissionSnapshot {
                bot: GrantedPermissions::everywhere(u64::MAX),
                user: GrantedPermissions::everywhere(SEND_MESSAGES),
            },
        };

        let result = gate.evaluate(&request, Instant::now()).await;
        assert!(matches!(
            result,
            Err(GateRejection::MissingUserPermissions { .. })
        ));
    }
}
