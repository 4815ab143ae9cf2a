//! Generic sanction query operations.
//!
//! One implementation serves both `bans` and `warnings`; the table name
//! comes from the [`Sanction`] implementor.

use super::models::{NewSanction, Sanction, SanctionPatch};
use crate::db::{DbError, RecordFilter, now};
use sqlx::SqlitePool;
use std::marker::PhantomData;

const COLUMNS: &str = "id, channel_id, user_id, reason, expires_at, created_at, updated_at";
const FILTER: &str = "(? IS NULL OR channel_id = ?) AND (? IS NULL OR user_id = ?)";

/// Repository for ban or warning operations.
pub struct SanctionRepository<'a, T> {
    pool: &'a SqlitePool,
    _kind: PhantomData<T>,
}

impl<'a, T: Sanction> SanctionRepository<'a, T> {
    /// Create a new sanction repository.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self {
            pool,
            _kind: PhantomData,
        }
    }

    /// All active records matching the filter, oldest first.
    pub async fn find(&self, filter: &RecordFilter) -> Result<Vec<T>, DbError> {
        let query = format!(
            "SELECT {COLUMNS} FROM {} WHERE {FILTER} AND expires_at > ? ORDER BY created_at, id",
            T::TABLE
        );

        let rows = sqlx::query_as::<_, T>(&query)
            .bind(filter.channel_id.as_deref())
            .bind(filter.channel_id.as_deref())
            .bind(filter.user_id.as_deref())
            .bind(filter.user_id.as_deref())
            .bind(now())
            .fetch_all(self.pool)
            .await?;

        Ok(rows)
    }

    /// The most recently updated active record matching the filter.
    pub async fn find_one(&self, filter: &RecordFilter) -> Result<Option<T>, DbError> {
        let query = format!(
            "SELECT {COLUMNS} FROM {} WHERE {FILTER} AND expires_at > ? ORDER BY updated_at DESC, id DESC LIMIT 1",
            T::TABLE
        );

        let row = sqlx::query_as::<_, T>(&query)
            .bind(filter.channel_id.as_deref())
            .bind(filter.channel_id.as_deref())
            .bind(filter.user_id.as_deref())
            .bind(filter.user_id.as_deref())
            .bind(now())
            .fetch_optional(self.pool)
            .await?;

        Ok(row)
    }

    /// Insert a new record.
    pub async fn create(&self, sanction: NewSanction) -> Result<T, DbError> {
        let now = now();
        let query = format!(
            r#"
            INSERT INTO {} (channel_id, user_id, reason, expires_at, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING {COLUMNS}
            "#,
            T::TABLE
        );

        let row = sqlx::query_as::<_, T>(&query)
            .bind(&sanction.channel_id)
            .bind(&sanction.user_id)
            .bind(&sanction.reason)
            .bind(sanction.expires_at)
            .bind(now)
            .bind(now)
            .fetch_one(self.pool)
            .await?;

        Ok(row)
    }

    /// Apply a patch to every active record matching the filter.
    ///
    /// Returns the updated rows; an empty vector means nothing was active.
    pub async fn update(
        &self,
        filter: &RecordFilter,
        patch: &SanctionPatch,
    ) -> Result<Vec<T>, DbError> {
        let now = now();
        let query = format!(
            r#"
            UPDATE {}
            SET expires_at = COALESCE(?, expires_at),
                updated_at = ?
            WHERE {FILTER} AND expires_at > ?
            RETURNING {COLUMNS}
            "#,
            T::TABLE
        );

        let rows = sqlx::query_as::<_, T>(&query)
            .bind(patch.expires_at)
            .bind(now)
            .bind(filter.channel_id.as_deref())
            .bind(filter.channel_id.as_deref())
            .bind(filter.user_id.as_deref())
            .bind(filter.user_id.as_deref())
            .bind(now)
            .fetch_all(self.pool)
            .await?;

        Ok(rows)
    }
}
