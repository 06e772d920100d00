// In-memory implementation of CooldownStore.
//
// Cooldowns live in memory only and are lost on restart.

use crate::core::commands::CooldownStore;
use async_trait::async_trait;
use dashmap::DashMap;
use std::time::Instant;

/// Composite key: one entry per command per user.
#[derive(Hash, Eq, PartialEq, Clone, Debug)]
struct CooldownKey {
    command: String,
    user_id: u64,
}

impl CooldownKey {
    fn new(command: &str, user_id: u64) -> Self {
        Self {
            command: command.to_string(),
            user_id,
        }
    }
}

pub struct InMemoryCooldownStore {
    entries: DashMap<CooldownKey, Instant>,
}

impl InMemoryCooldownStore {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl Default for InMemoryCooldownStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CooldownStore for InMemoryCooldownStore {
    async fn last_invocation(&self, command: &str, user_id: u64) -> Option<Instant> {
        self.entries
            .get(&CooldownKey::new(command, user_id))
            .map(|entry| *entry.value())
    }

    async fn record(&self, command: &str, user_id: u64, at: Instant) {
        self.entries.insert(CooldownKey::new(command, user_id), at);
    }

    async fn clear(&self, command: &str, user_id: u64) {
        self.entries.remove(&CooldownKey::new(command, user_id));
    }
}
