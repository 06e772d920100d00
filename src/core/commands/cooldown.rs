// Cooldown tracking for prefix commands.
//
// The core only defines the port; infra provides the in-memory map.

use async_trait::async_trait;
use std::time::{Duration, Instant};

/// Per-command, per-user record of the last successful invocation.
///
/// Implementations hold at most one entry per (command, user) pair.
#[async_trait]
pub trait CooldownStore: Send + Sync {
    async fn last_invocation(&self, command: &str, user_id: u64) -> Option<Instant>;

    /// Overwrites any previous entry for the pair.
    async fn record(&self, command: &str, user_id: u64, at: Instant);

    async fn clear(&self, command: &str, user_id: u64);
}

/// Time left before `cooldown` has elapsed since `last`, or `None` if it
/// already has.
pub fn remaining_cooldown(last: Instant, cooldown: Duration, now: Instant) -> Option<Duration> {
    let elapsed = now.saturating_duration_since(last);
    cooldown.checked_sub(elapsed).filter(|d| !d.is_zero())
}

/// Render a duration the way users read it: "1 minute 5 seconds".
///
/// Partial seconds round up so a user never sees "0 seconds".
pub fn format_remaining(remaining: Duration) -> String {
    let mut total = remaining.as_secs();
    if remaining.subsec_nanos() > 0 {
        total += 1;
    }

    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    let mut parts = Vec::new();
    for (value, unit) in [(hours, "hour"), (minutes, "minute"), (seconds, "second")] {
        if value > 0 {
            let plural = if value == 1 { "" } else { "s" };
            parts.push(format!("{value} {unit}{plural}"));
        }
    }

    if parts.is_empty() {
        "0 seconds".to_string()
    } else {
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaining_is_none_once_elapsed() {
        let start = Instant::now();
        let cooldown = Duration::from_secs(10);

        assert_eq!(
            remaining_cooldown(start, cooldown, start + Duration::from_secs(4)),
            Some(Duration::from_secs(6))
        );
        assert_eq!(
            remaining_cooldown(start, cooldown, start + Duration::from_secs(10)),
            None
        );
        assert_eq!(
            remaining_cooldown(start, cooldown, start + Duration::from_secs(30)),
            None
        );
    }

    #[test]
    fn formats_mixed_units() {
        assert_eq!(format_remaining(Duration::from_secs(65)), "1 minute 5 seconds");
        assert_eq!(format_remaining(Duration::from_secs(3600)), "1 hour");
        assert_eq!(
            format_remaining(Duration::from_secs(7322)),
            "2 hours 2 minutes 2 seconds"
        );
    }

    #[test]
    fn partial_seconds_round_up() {
        assert_eq!(format_remaining(Duration::from_millis(200)), "1 second");
        assert_eq!(format_remaining(Duration::from_millis(1500)), "2 seconds");
        assert_eq!(format_remaining(Duration::ZERO), "0 seconds");
    }
}
