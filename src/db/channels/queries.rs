//! Channel repository for database queries.

use super::models::{Channel, NewChannel};
use crate::db::{DbError, now};
use sqlx::SqlitePool;
use std::collections::BTreeSet;

type ChannelRow = (String, String, String, String, String, i64, i64);

/// Repository for channel operations.
pub struct ChannelRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ChannelRepository<'a> {
    /// Create a new channel repository.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Register a new channel.
    pub async fn create(&self, channel: NewChannel) -> Result<Channel, DbError> {
        let now = now();

        sqlx::query(
            r#"
            INSERT INTO channels (channel_id, name, topic, purpose, owner_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&channel.channel_id)
        .bind(&channel.name)
        .bind(&channel.topic)
        .bind(&channel.purpose)
        .bind(&channel.owner_id)
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return DbError::ChannelExists(channel.channel_id.clone());
            }
            DbError::from(e)
        })?;

        Ok(Channel {
            channel_id: channel.channel_id,
            name: channel.name,
            topic: channel.topic,
            purpose: channel.purpose,
            owner_id: channel.owner_id,
            created_at: now,
            updated_at: now,
            ops: BTreeSet::new(),
            bans: BTreeSet::new(),
            warnings: BTreeSet::new(),
        })
    }

    /// Find a registered channel by id, with its derived member sets.
    pub async fn find_one(&self, channel_id: &str) -> Result<Option<Channel>, DbError> {
        let row = sqlx::query_as::<_, ChannelRow>(
            r#"
            SELECT channel_id, name, topic, purpose, owner_id, created_at, updated_at
            FROM channels
            WHERE channel_id = ?
            "#,
        )
        .bind(channel_id)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    /// Load all registered channels.
    pub async fn find(&self) -> Result<Vec<Channel>, DbError> {
        let rows = sqlx::query_as::<_, ChannelRow>(
            r#"
            SELECT channel_id, name, topic, purpose, owner_id, created_at, updated_at
            FROM channels
            ORDER BY created_at, channel_id
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        let mut channels = Vec::with_capacity(rows.len());
        for row in rows {
            channels.push(self.hydrate(row).await?);
        }
        Ok(channels)
    }

    /// Persist name, topic, purpose and owner of a channel.
    ///
    /// Returns false when no such channel is registered.
    pub async fn update(&self, channel: &Channel) -> Result<bool, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE channels
            SET name = ?, topic = ?, purpose = ?, owner_id = ?, updated_at = ?
            WHERE channel_id = ?
            "#,
        )
        .bind(&channel.name)
        .bind(&channel.topic)
        .bind(&channel.purpose)
        .bind(&channel.owner_id)
        .bind(now())
        .bind(&channel.channel_id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn hydrate(&self, row: ChannelRow) -> Result<Channel, DbError> {
        let (channel_id, name, topic, purpose, owner_id, created_at, updated_at) = row;
        let now = now();

        let ops = self
            .user_ids("SELECT DISTINCT user_id FROM ops WHERE channel_id = ?", &channel_id, None)
            .await?;
        let bans = self
            .user_ids(
                "SELECT DISTINCT user_id FROM bans WHERE channel_id = ? AND expires_at > ?",
                &channel_id,
                Some(now),
            )
            .await?;
        let warnings = self
            .user_ids(
                "SELECT DISTINCT user_id FROM warnings WHERE channel_id = ? AND expires_at > ?",
                &channel_id,
                Some(now),
            )
            .await?;

        Ok(Channel {
            channel_id,
            name,
            topic,
            purpose,
            owner_id,
            created_at,
            updated_at,
            ops,
            bans,
            warnings,
        })
    }

    async fn user_ids(
        &self,
        query: &str,
        channel_id: &str,
        active_at: Option<i64>,
    ) -> Result<BTreeSet<String>, DbError> {
        let mut q = sqlx::query_scalar::<_, String>(query).bind(channel_id);
        if let Some(ts) = active_at {
            q = q.bind(ts);
        }
        Ok(q.fetch_all(self.pool).await?.into_iter().collect())
    }
}
