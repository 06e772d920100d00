// Leveling: every non-command message earns a small random amount of XP.
// Levels are flat 100 XP steps, and level roles are granted from a
// threshold table managed by server admins.
//
// XP is global per user. Level roles belong to the guild that configured
// them and are only ever considered for messages in that guild.
//
// Like the rest of core, this works on plain ids. The discord layer decides
// what to do with the returned role.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::Rng;
use thiserror::Error;

/// XP needed per level.
pub const XP_PER_LEVEL: u64 = 100;

/// Upper bound (inclusive) of the XP roll for a single message.
pub const MAX_XP_PER_MESSAGE: u64 = 10;

// ============================================================================
// DOMAIN MODELS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelRecord {
    pub user_id: u64,
    pub xp: u64,
    pub level: u32,
    pub last_message_at: Option<DateTime<Utc>>,
}

impl LevelRecord {
    /// A user who has never earned XP.
    pub fn empty(user_id: u64) -> Self {
        Self {
            user_id,
            xp: 0,
            level: 0,
            last_message_at: None,
        }
    }
}

/// A role granted once a user reaches `level` in the role's guild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelRole {
    pub guild_id: u64,
    pub role_id: u64,
    pub level: u32,
}

/// Result of handing out XP for one message.
#[derive(Debug, Clone)]
pub struct XpAward {
    pub record: LevelRecord,
    pub amount: u64,
    pub old_level: u32,
    /// The level role the user qualifies for now, if any.
    pub role: Option<LevelRole>,
}

impl XpAward {
    pub fn leveled_up(&self) -> bool {
        self.record.level > self.old_level
    }
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum LevelingError {
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Invalid ID")]
    InvalidId,
}

// ============================================================================
// STORAGE TRAIT (PORT)
// ============================================================================

#[async_trait]
pub trait LevelStore: Send + Sync {
    async fn get_record(&self, user_id: u64) -> Result<Option<LevelRecord>, LevelingError>;

    /// Add `amount` to the user's XP and return the updated record.
    ///
    /// Must be a single atomic increment-and-fetch that also recomputes the
    /// level, creating the record if needed. Two concurrent calls for the same
    /// user must both be reflected in the final total.
    async fn add_xp(&self, user_id: u64, amount: u64) -> Result<LevelRecord, LevelingError>;

    async fn get_top(&self, limit: usize) -> Result<Vec<LevelRecord>, LevelingError>;

    /// Level roles configured in one guild.
    async fn get_level_roles(&self, guild_id: u64) -> Result<Vec<LevelRole>, LevelingError>;

    /// Insert or update the threshold for a role.
    async fn save_level_role(&self, role: LevelRole) -> Result<(), LevelingError>;

    /// Returns whether the role was configured in that guild.
    async fn delete_level_role(&self, guild_id: u64, role_id: u64)
        -> Result<bool, LevelingError>;
}

/// Level for a total XP amount: `floor(xp / 100)`.
pub fn level_for_xp(xp: u64) -> u32 {
    u32::try_from(xp / XP_PER_LEVEL).unwrap_or(u32::MAX)
}

/// The role of `guild_id` with the highest threshold not above `level`.
///
/// When two roles share a threshold the lower role id wins, so the choice
/// never depends on storage order.
pub fn select_level_role(roles: &[LevelRole], guild_id: u64, level: u32) -> Option<LevelRole> {
    roles
        .iter()
        .filter(|role| role.guild_id == guild_id && role.level <= level)
        .max_by(|a, b| a.level.cmp(&b.level).then(b.role_id.cmp(&a.role_id)))
        .copied()
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct LevelingService<S: LevelStore> {
    store: S,
    max_xp_per_message: u64,
}

impl<S: LevelStore> LevelingService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            max_xp_per_message: MAX_XP_PER_MESSAGE,
        }
    }

    fn validate_id(id: u64) -> Result<(), LevelingError> {
        if id == 0 {
            Err(LevelingError::InvalidId)
        } else {
            Ok(())
        }
    }

    /// Award a random `0..=10` XP for a message sent in `guild_id` that was
    /// not a command.
    pub async fn process_message(
        &self,
        user_id: u64,
        guild_id: u64,
    ) -> Result<XpAward, LevelingError> {
        let amount = rand::thread_rng().gen_range(0..=self.max_xp_per_message);
        self.award_xp(user_id, guild_id, amount).await
    }

    /// Add a fixed amount of XP and work out which of the guild's level
    /// roles applies.
    pub async fn award_xp(
        &self,
        user_id: u64,
        guild_id: u64,
        amount: u64,
    ) -> Result<XpAward, LevelingError> {
        Self::validate_id(user_id)?;
        Self::validate_id(guild_id)?;

        let record = self.store.add_xp(user_id, amount).await?;
        let old_level = level_for_xp(record.xp.saturating_sub(amount));

        let roles = self.store.get_level_roles(guild_id).await?;
        let role = select_level_role(&roles, guild_id, record.level);

        Ok(XpAward {
            record,
            amount,
            old_level,
            role,
        })
    }

    /// A user's record, or an empty one if they never earned XP.
    pub async fn get_record(&self, user_id: u64) -> Result<LevelRecord, LevelingError> {
        Self::validate_id(user_id)?;

        Ok(self
            .store
            .get_record(user_id)
            .await?
            .unwrap_or_else(|| LevelRecord::empty(user_id)))
    }

    pub async fn leaderboard(&self, limit: usize) -> Result<Vec<LevelRecord>, LevelingError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        self.store.get_top(limit).await
    }

    /// A guild's level roles sorted by threshold, then role id.
    pub async fn level_roles(&self, guild_id: u64) -> Result<Vec<LevelRole>, LevelingError> {
        let mut roles = self.store.get_level_roles(guild_id).await?;
        roles.sort_by(|a, b| a.level.cmp(&b.level).then(a.role_id.cmp(&b.role_id)));
        Ok(roles)
    }

    pub async fn set_level_role(
        &self,
        guild_id: u64,
        role_id: u64,
        level: u32,
    ) -> Result<(), LevelingError> {
        Self::validate_id(guild_id)?;
        Self::validate_id(role_id)?;
        self.store
            .save_level_role(LevelRole {
                guild_id,
                role_id,
                level,
            })
            .await
    }

    pub async fn remove_level_role(
        &self,
        guild_id: u64,
        role_id: u64,
    ) -> Result<bool, LevelingError> {
        self.store.delete_level_role(guild_id, role_id).await
    }

    /// XP still needed to reach the next level.
    pub fn xp_to_next_level(&self, xp: u64) -> u64 {
        let next = (u64::from(level_for_xp(xp)) + 1) * XP_PER_LEVEL;
        next.saturating_sub(xp)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use dashmap::DashMap;

    const GUILD_A: u64 = 1000;
    const GUILD_B: u64 = 2000;

    #[derive(Default)]
    struct MockStore {
        records: DashMap<u64, LevelRecord>,
        roles: DashMap<u64, LevelRole>,
    }

    #[async_trait]
    impl LevelStore for MockStore {
        async fn get_record(&self, user_id: u64) -> Result<Option<LevelRecord>, LevelingError> {
            Ok(self.records.get(&user_id).map(|r| r.value().clone()))
        }

        async fn add_xp(&self, user_id: u64, amount: u64) -> Result<LevelRecord, LevelingError> {
            let mut entry = self
                .records
                .entry(user_id)
                .or_insert_with(|| LevelRecord::empty(user_id));
            entry.xp = entry.xp.saturating_add(amount);
            entry.level = level_for_xp(entry.xp);
            Ok(entry.clone())
        }

        async fn get_top(&self, limit: usize) -> Result<Vec<LevelRecord>, LevelingError> {
            let mut all: Vec<_> = self.records.iter().map(|r| r.value().clone()).collect();
            all.sort_by(|a, b| b.xp.cmp(&a.xp));
            all.truncate(limit);
            Ok(all)
        }

        async fn get_level_roles(&self, guild_id: u64) -> Result<Vec<LevelRole>, LevelingError> {
            Ok(self
                .roles
                .iter()
                .map(|r| *r.value())
                .filter(|r| r.guild_id == guild_id)
                .collect())
        }

        async fn save_level_role(&self, role: LevelRole) -> Result<(), LevelingError> {
            self.roles.insert(role.role_id, role);
            Ok(())
        }

        async fn delete_level_role(
            &self,
            guild_id: u64,
            role_id: u64,
        ) -> Result<bool, LevelingError> {
            Ok(self
                .roles
                .remove_if(&role_id, |_, role| role.guild_id == guild_id)
                .is_some())
        }
    }

    fn make_service() -> LevelingService<MockStore> {
        LevelingService::new(MockStore::default())
    }

    fn role(guild_id: u64, role_id: u64, level: u32) -> LevelRole {
        LevelRole {
            guild_id,
            role_id,
            level,
        }
    }

    #[test]
    fn level_is_floor_of_hundreds() {
        assert_eq!(level_for_xp(0), 0);
        assert_eq!(level_for_xp(99), 0);
        assert_eq!(level_for_xp(100), 1);
        assert_eq!(level_for_xp(250), 2);
        assert_eq!(level_for_xp(1_000), 10);
    }

    #[test]
    fn picks_highest_threshold_not_above_level() {
        let roles = [
            role(GUILD_A, 10, 5),
            role(GUILD_A, 11, 1),
            role(GUILD_A, 12, 20),
        ];

        assert_eq!(select_level_role(&roles, GUILD_A, 0), None);
        assert_eq!(select_level_role(&roles, GUILD_A, 1).map(|r| r.role_id), Some(11));
        assert_eq!(select_level_role(&roles, GUILD_A, 19).map(|r| r.role_id), Some(10));
        assert_eq!(select_level_role(&roles, GUILD_A, 20).map(|r| r.role_id), Some(12));
    }

    #[test]
    fn other_guilds_roles_are_never_selected() {
        let roles = [role(GUILD_A, 10, 0), role(GUILD_B, 20, 1)];

        assert_eq!(select_level_role(&roles, GUILD_A, 1), Some(role(GUILD_A, 10, 0)));
        assert_eq!(select_level_role(&roles, GUILD_B, 1), Some(role(GUILD_B, 20, 1)));
        assert_eq!(select_level_role(&roles, 3000, 50), None);
    }

    #[test]
    fn threshold_ties_resolve_to_lowest_role_id() {
        let forward = [role(GUILD_A, 30, 5), role(GUILD_A, 20, 5)];
        let backward = [forward[1], forward[0]];

        assert_eq!(select_level_role(&forward, GUILD_A, 5).map(|r| r.role_id), Some(20));
        assert_eq!(select_level_role(&backward, GUILD_A, 5).map(|r| r.role_id), Some(20));
    }

    #[tokio::test]
    async fn message_xp_is_bounded_and_monotonic() {
        let service = make_service();
        let mut previous = 0;

        for _ in 0..200 {
            let award = service.process_message(1, GUILD_A).await.unwrap();
            assert!(award.amount <= MAX_XP_PER_MESSAGE);
            assert!(award.record.xp >= previous);
            assert_eq!(award.record.xp, previous + award.amount);
            assert_eq!(award.record.level, level_for_xp(award.record.xp));
            previous = award.record.xp;
        }
    }

    #[tokio::test]
    async fn award_reports_level_up_and_role() {
        let service = make_service();
        service.set_level_role(GUILD_A, 500, 1).await.unwrap();

        let first = service.award_xp(1, GUILD_A, 95).await.unwrap();
        assert!(!first.leveled_up());
        assert_eq!(first.role, None);

        let second = service.award_xp(1, GUILD_A, 10).await.unwrap();
        assert!(second.leveled_up());
        assert_eq!(second.old_level, 0);
        assert_eq!(second.record.level, 1);
        assert_eq!(second.role, Some(role(GUILD_A, 500, 1)));
    }

    #[tokio::test]
    async fn xp_is_shared_but_roles_follow_the_message_guild() {
        let service = make_service();
        service.set_level_role(GUILD_A, 10, 0).await.unwrap();
        service.set_level_role(GUILD_B, 20, 1).await.unwrap();

        let in_a = service.award_xp(1, GUILD_A, 150).await.unwrap();
        assert_eq!(in_a.role.map(|r| r.role_id), Some(10));

        let in_b = service.award_xp(1, GUILD_B, 0).await.unwrap();
        assert_eq!(in_b.record.xp, 150);
        assert_eq!(in_b.role.map(|r| r.role_id), Some(20));
    }

    #[tokio::test]
    async fn unknown_user_has_empty_record() {
        let service = make_service();
        let record = service.get_record(9).await.unwrap();
        assert_eq!(record, LevelRecord::empty(9));
    }

    #[tokio::test]
    async fn rejects_zero_ids() {
        let service = make_service();
        assert!(matches!(
            service.award_xp(0, GUILD_A, 5).await,
            Err(LevelingError::InvalidId)
        ));
        assert!(matches!(
            service.award_xp(1, 0, 5).await,
            Err(LevelingError::InvalidId)
        ));
        assert!(matches!(
            service.set_level_role(GUILD_A, 0, 5).await,
            Err(LevelingError::InvalidId)
        ));
    }

    #[tokio::test]
    async fn level_roles_are_sorted_and_scoped() {
        let service = make_service();
        service.set_level_role(GUILD_A, 3, 10).await.unwrap();
        service.set_level_role(GUILD_A, 2, 1).await.unwrap();
        service.set_level_role(GUILD_A, 1, 10).await.unwrap();
        service.set_level_role(GUILD_B, 4, 0).await.unwrap();

        let roles = service.level_roles(GUILD_A).await.unwrap();
        let ids: Vec<_> = roles.iter().map(|r| r.role_id).collect();
        assert_eq!(ids, vec![2, 1, 3]);

        assert!(!service.remove_level_role(GUILD_A, 4).await.unwrap());
        assert!(service.remove_level_role(GUILD_A, 2).await.unwrap());
        assert!(!service.remove_level_role(GUILD_A, 2).await.unwrap());
        assert_eq!(service.level_roles(GUILD_B).await.unwrap().len(), 1);
    }

    #[test]
    fn xp_to_next_level_counts_down() {
        let service = make_service();
        assert_eq!(service.xp_to_next_level(0), 100);
        assert_eq!(service.xp_to_next_level(150), 50);
        assert_eq!(service.xp_to_next_level(200), 100);
    }
}
