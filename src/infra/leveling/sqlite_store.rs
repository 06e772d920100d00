use crate::core::leveling::{level_for_xp, LevelRecord, LevelRole, LevelStore, LevelingError};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};
use std::path::Path;
use std::str::FromStr;

pub struct SqliteLevelStore {
    pool: Pool<Sqlite>,
}

fn storage_error(e: sqlx::Error) -> LevelingError {
    LevelingError::StorageError(e.to_string())
}

impl SqliteLevelStore {
    /// Open (creating if needed) the database at `database_url`, which may be
    /// a plain file path or a `sqlite:` URL.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let conn_str = if database_url.starts_with("sqlite:") {
            database_url.to_string()
        } else {
            format!("sqlite://{}", database_url)
        };

        let path_str = conn_str
            .trim_start_matches("sqlite://")
            .trim_start_matches("sqlite:");
        if !path_str.contains(":memory:") {
            if let Some(parent) = Path::new(path_str).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
        }

        let options = SqliteConnectOptions::from_str(&conn_str)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS levels (
                user_id INTEGER PRIMARY KEY,
                xp INTEGER NOT NULL DEFAULT 0,
                level INTEGER NOT NULL DEFAULT 0,
                last_message_at TEXT
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS level_roles (
                role_id INTEGER PRIMARY KEY,
                guild_id INTEGER NOT NULL,
                level INTEGER NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Databases created before level roles were scoped to a guild.
        let has_guild_column: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM pragma_table_info('level_roles') WHERE name = 'guild_id'",
        )
        .fetch_one(&self.pool)
        .await?;
        if has_guild_column == 0 {
            tracing::warn!("Adding guild_id to level_roles; existing level roles must be set again");
            sqlx::query("ALTER TABLE level_roles ADD COLUMN guild_id INTEGER NOT NULL DEFAULT 0")
                .execute(&self.pool)
                .await?;
        }

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_level_roles_guild ON level_roles (guild_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl LevelStore for SqliteLevelStore {
    async fn get_record(&self, user_id: u64) -> Result<Option<LevelRecord>, LevelingError> {
        let row = sqlx::query("SELECT * FROM levels WHERE user_id = ?")
            .bind(user_id as i64)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(row.as_ref().map(row_to_record))
    }

    async fn add_xp(&self, user_id: u64, amount: u64) -> Result<LevelRecord, LevelingError> {
        // One UPSERT so concurrent messages from the same user can't lose
        // increments. SET expressions all see the pre-update row.
        let row = sqlx::query(
            r#"
            INSERT INTO levels (user_id, xp, level, last_message_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                xp = levels.xp + excluded.xp,
                level = (levels.xp + excluded.xp) / 100,
                last_message_at = excluded.last_message_at
            RETURNING user_id, xp, level, last_message_at
            "#,
        )
        .bind(user_id as i64)
        .bind(amount as i64)
        .bind(level_for_xp(amount) as i64)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(row_to_record(&row))
    }

    async fn get_top(&self, limit: usize) -> Result<Vec<LevelRecord>, LevelingError> {
        let rows = sqlx::query("SELECT * FROM levels ORDER BY xp DESC, user_id ASC LIMIT ?")
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(rows.iter().map(row_to_record).collect())
    }

    async fn get_level_roles(&self, guild_id: u64) -> Result<Vec<LevelRole>, LevelingError> {
        let rows = sqlx::query("SELECT guild_id, role_id, level FROM level_roles WHERE guild_id = ?")
            .bind(guild_id as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(rows
            .iter()
            .map(|row| LevelRole {
                guild_id: row.get::<i64, _>("guild_id") as u64,
                role_id: row.get::<i64, _>("role_id") as u64,
                level: row.get::<i64, _>("level") as u32,
            })
            .collect())
    }

    async fn save_level_role(&self, role: LevelRole) -> Result<(), LevelingError> {
        sqlx::query(
            r#"
            INSERT INTO level_roles (role_id, guild_id, level)
            VALUES (?, ?, ?)
            ON CONFLICT(role_id) DO UPDATE SET
                guild_id = excluded.guild_id,
                level = excluded.level
            "#,
        )
        .bind(role.role_id as i64)
        .bind(role.guild_id as i64)
        .bind(role.level as i64)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(())
    }

    async fn delete_level_role(
        &self,
        guild_id: u64,
        role_id: u64,
    ) -> Result<bool, LevelingError> {
        let result = sqlx::query("DELETE FROM level_roles WHERE role_id = ? AND guild_id = ?")
            .bind(role_id as i64)
            .bind(guild_id as i64)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_record(row: &SqliteRow) -> LevelRecord {
    LevelRecord {
        user_id: row.get::<i64, _>("user_id") as u64,
        xp: row.get::<i64, _>("xp") as u64,
        level: row.get::<i64, _>("level") as u32,
        last_message_at: row.get("last_message_at"),
    }
}
