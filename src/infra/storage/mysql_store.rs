use crate::core::afk::{AfkError, AfkRecord, AfkStore};
use crate::core::settings::{
    AllowlistKind, GuildSettings, LogChannelKind, RoleAllowlist, SettingsError, SettingsStore,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::{MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::Row;
use std::future::Future;

impl From<sqlx::Error> for SettingsError {
    fn from(e: sqlx::Error) -> Self {
        SettingsError::StorageError(e.to_string())
    }
}

impl From<sqlx::Error> for AfkError {
    fn from(e: sqlx::Error) -> Self {
        AfkError::StorageError(e.to_string())
    }
}

/// MySQL-backed store for guild settings, AFK records and the blacklists.
/// Cloning shares the pool.
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = MySqlPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS guilds (
                guild_id BIGINT UNSIGNED NOT NULL PRIMARY KEY,
                mod_log_channel BIGINT UNSIGNED NULL,
                member_log_channel BIGINT UNSIGNED NULL,
                welcome_message TEXT NULL,
                automod BOOLEAN NOT NULL DEFAULT FALSE,
                automod_link_send_roles TEXT NULL,
                automod_link_embed_roles TEXT NULL,
                case_number BIGINT UNSIGNED NOT NULL DEFAULT 1
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS afk (
                user_id BIGINT UNSIGNED NOT NULL,
                guild_id BIGINT UNSIGNED NOT NULL,
                start DATETIME NOT NULL,
                reason VARCHAR(100) NULL,
                PRIMARY KEY (user_id, guild_id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS user_blacklist (
                user_id BIGINT UNSIGNED NOT NULL PRIMARY KEY
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS guild_blacklist (
                guild_id BIGINT UNSIGNED NOT NULL PRIMARY KEY
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        tracing::info!("Database migrations applied");
        Ok(())
    }

    fn settings_from_row(row: &MySqlRow) -> Result<GuildSettings, sqlx::Error> {
        Ok(GuildSettings {
            guild_id: row.try_get("guild_id")?,
            mod_log_channel: row.try_get("mod_log_channel")?,
            member_log_channel: row.try_get("member_log_channel")?,
            welcome_message: row.try_get("welcome_message")?,
            automod_enabled: row.try_get("automod")?,
            link_send_roles: RoleAllowlist::parse(
                row.try_get::<Option<String>, _>("automod_link_send_roles")?
                    .as_deref(),
            ),
            link_embed_roles: RoleAllowlist::parse(
                row.try_get::<Option<String>, _>("automod_link_embed_roles")?
                    .as_deref(),
            ),
            case_number: row.try_get("case_number")?,
        })
    }

    fn afk_from_row(row: &MySqlRow) -> Result<AfkRecord, sqlx::Error> {
        Ok(AfkRecord {
            user_id: row.try_get("user_id")?,
            guild_id: row.try_get("guild_id")?,
            start: row.try_get::<DateTime<Utc>, _>("start")?,
            reason: row.try_get("reason")?,
        })
    }

    fn log_channel_column(kind: LogChannelKind) -> &'static str {
        match kind {
            LogChannelKind::Moderation => "mod_log_channel",
            LogChannelKind::Member => "member_log_channel",
        }
    }

    fn allowlist_column(kind: AllowlistKind) -> &'static str {
        match kind {
            AllowlistKind::LinkSend => "automod_link_send_roles",
            AllowlistKind::LinkEmbed => "automod_link_embed_roles",
        }
    }
}

#[async_trait]
impl SettingsStore for MySqlStore {
    async fn ensure_guild(&self, guild_id: u64) -> Result<(), SettingsError> {
        sqlx::query("INSERT IGNORE INTO guilds (guild_id) VALUES (?)")
            .bind(guild_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_settings(&self, guild_id: u64) -> Result<GuildSettings, SettingsError> {
        let row = sqlx::query("SELECT * FROM guilds WHERE guild_id = ?")
            .bind(guild_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Self::settings_from_row(&row)?),
            None => Ok(GuildSettings::new(guild_id)),
        }
    }

    async fn set_log_channel(
        &self,
        guild_id: u64,
        kind: LogChannelKind,
        channel_id: Option<u64>,
    ) -> Result<(), SettingsError> {
        let column = Self::log_channel_column(kind);
        let query = format!(
            "INSERT INTO guilds (guild_id, {column}) VALUES (?, ?) \
             ON DUPLICATE KEY UPDATE {column} = VALUES({column})"
        );
        sqlx::query(&query)
            .bind(guild_id)
            .bind(channel_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_welcome_message(
        &self,
        guild_id: u64,
        message: Option<&str>,
    ) -> Result<(), SettingsError> {
        sqlx::query(
            r#"
            INSERT INTO guilds (guild_id, welcome_message) VALUES (?, ?)
            ON DUPLICATE KEY UPDATE welcome_message = VALUES(welcome_message)
            "#,
        )
        .bind(guild_id)
        .bind(message)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn set_automod_enabled(&self, guild_id: u64, enabled: bool) -> Result<(), SettingsError> {
        sqlx::query(
            r#"
            INSERT INTO guilds (guild_id, automod) VALUES (?, ?)
            ON DUPLICATE KEY UPDATE automod = VALUES(automod)
            "#,
        )
        .bind(guild_id)
        .bind(enabled)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn set_allowlist(
        &self,
        guild_id: u64,
        kind: AllowlistKind,
        roles: &RoleAllowlist,
    ) -> Result<(), SettingsError> {
        let column = Self::allowlist_column(kind);
        let query = format!(
            "INSERT INTO guilds (guild_id, {column}) VALUES (?, ?) \
             ON DUPLICATE KEY UPDATE {column} = VALUES({column})"
        );
        sqlx::query(&query)
            .bind(guild_id)
            .bind(roles.to_stored())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn log_next_case<F, Fut>(
        &self,
        guild_id: u64,
        dispatch: F,
    ) -> Result<Option<u64>, SettingsError>
    where
        F: FnOnce(u64) -> Fut + Send,
        Fut: Future<Output = bool> + Send,
    {
        // Row lock held across the dispatch so concurrent cases serialize.
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT IGNORE INTO guilds (guild_id) VALUES (?)")
            .bind(guild_id)
            .execute(&mut *tx)
            .await?;

        let current: u64 =
            sqlx::query_scalar("SELECT case_number FROM guilds WHERE guild_id = ? FOR UPDATE")
                .bind(guild_id)
                .fetch_one(&mut *tx)
                .await?;

        if !dispatch(current).await {
            tx.rollback().await?;
            return Ok(None);
        }

        sqlx::query("UPDATE guilds SET case_number = case_number + 1 WHERE guild_id = ?")
            .bind(guild_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(current))
    }

    async fn is_blacklisted_user(&self, user_id: u64) -> Result<bool, SettingsError> {
        let row = sqlx::query("SELECT 1 FROM user_blacklist WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    async fn is_blacklisted_guild(&self, guild_id: u64) -> Result<bool, SettingsError> {
        let row = sqlx::query("SELECT 1 FROM guild_blacklist WHERE guild_id = ?")
            .bind(guild_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }
}

#[async_trait]
impl AfkStore for MySqlStore {
    async fn get_afk(&self, user_id: u64, guild_id: u64) -> Result<Option<AfkRecord>, AfkError> {
        let row = sqlx::query("SELECT * FROM afk WHERE user_id = ? AND guild_id = ?")
            .bind(user_id)
            .bind(guild_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(Self::afk_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn insert_afk(&self, record: &AfkRecord) -> Result<bool, AfkError> {
        let result = sqlx::query(
            "INSERT IGNORE INTO afk (user_id, guild_id, start, reason) VALUES (?, ?, ?, ?)",
        )
        .bind(record.user_id)
        .bind(record.guild_id)
        .bind(record.start)
        .bind(record.reason.as_deref())
        .execute(&self.pool)
        .await?;
        // An existing row for (user, guild) leaves nothing inserted.
        Ok(result.rows_affected() > 0)
    }

    async fn remove_afk(&self, user_id: u64, guild_id: u64) -> Result<bool, AfkError> {
        let result = sqlx::query("DELETE FROM afk WHERE user_id = ? AND guild_id = ?")
            .bind(user_id)
            .bind(guild_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_afk(&self, guild_id: u64) -> Result<Vec<AfkRecord>, AfkError> {
        let rows = sqlx::query("SELECT * FROM afk WHERE guild_id = ? ORDER BY start")
            .bind(guild_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| Self::afk_from_row(row).map_err(AfkError::from))
            .collect()
    }
}
