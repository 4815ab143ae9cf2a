//! Operator grant repository.
//!
//! Operator status is presence-based: a row exists or it does not.
//! Grants carry no expiry and are removed outright on deop.

use super::{DbError, RecordFilter, now};
use sqlx::{FromRow, SqlitePool};

const FILTER: &str = "(? IS NULL OR channel_id = ?) AND (? IS NULL OR user_id = ?)";

/// A stored operator grant.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Operator {
    pub id: i64,
    pub channel_id: String,
    pub user_id: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Input for creating an operator grant.
#[derive(Debug, Clone)]
pub struct NewOperator {
    pub channel_id: String,
    pub user_id: String,
}

impl NewOperator {
    pub fn new(channel_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            user_id: user_id.into(),
        }
    }
}

/// Repository for operator grants.
pub struct OperatorRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OperatorRepository<'a> {
    /// Create a new operator repository.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// All grants matching the filter.
    pub async fn find(&self, filter: &RecordFilter) -> Result<Vec<Operator>, DbError> {
        let query = format!(
            "SELECT id, channel_id, user_id, created_at, updated_at FROM ops WHERE {FILTER} ORDER BY created_at, id"
        );

        let rows = sqlx::query_as::<_, Operator>(&query)
            .bind(filter.channel_id.as_deref())
            .bind(filter.channel_id.as_deref())
            .bind(filter.user_id.as_deref())
            .bind(filter.user_id.as_deref())
            .fetch_all(self.pool)
            .await?;

        Ok(rows)
    }

    /// Grant operator status.
    pub async fn create(&self, operator: NewOperator) -> Result<Operator, DbError> {
        let now = now();

        let row = sqlx::query_as::<_, Operator>(
            r#"
            INSERT INTO ops (channel_id, user_id, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, channel_id, user_id, created_at, updated_at
            "#,
        )
        .bind(&operator.channel_id)
        .bind(&operator.user_id)
        .bind(now)
        .bind(now)
        .fetch_one(self.pool)
        .await?;

        Ok(row)
    }

    /// Remove every grant matching the filter, returning how many were removed.
    ///
    /// An empty filter would wipe the table and is refused.
    pub async fn delete(&self, filter: &RecordFilter) -> Result<u64, DbError> {
        if filter.is_empty() {
            return Err(DbError::EmptyFilter("ops"));
        }

        let query = format!("DELETE FROM ops WHERE {FILTER}");
        let result = sqlx::query(&query)
            .bind(filter.channel_id.as_deref())
            .bind(filter.channel_id.as_deref())
            .bind(filter.user_id.as_deref())
            .bind(filter.user_id.as_deref())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
