//! Database module for persistent storage.
//!
//! Provides async SQLite database access using SQLx for:
//! - Registered channels (the channel read-model)
//! - Operator grants
//! - Bans and warnings with expiry
//!
//! Records are never cached in-process; every lookup goes to the pool.

mod channels;
mod operators;
mod sanctions;

pub use channels::{Channel, ChannelRepository, NewChannel};
pub use operators::{NewOperator, Operator, OperatorRepository};
pub use sanctions::{Ban, NewSanction, Sanction, SanctionPatch, SanctionRepository, Warning};

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

static MEMDB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(sqlx::Error),
    #[error("migration error: {0}")]
    Migration(sqlx::migrate::MigrateError),
    #[error("refusing to delete from {0} without a filter")]
    EmptyFilter(&'static str),
    #[error("channel already registered: {0}")]
    ChannelExists(String),
}

/// Row filter shared by the operator, ban and warning repositories.
///
/// Unset fields match every row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub channel_id: Option<String>,
    pub user_id: Option<String>,
}

impl RecordFilter {
    /// Match every row of a channel.
    pub fn channel(channel_id: impl Into<String>) -> Self {
        Self {
            channel_id: Some(channel_id.into()),
            user_id: None,
        }
    }

    /// Match every row of a user, across channels.
    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            channel_id: None,
            user_id: Some(user_id.into()),
        }
    }

    /// Match one (channel, user) pair.
    pub fn pair(channel_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            channel_id: Some(channel_id.into()),
            user_id: Some(user_id.into()),
        }
    }

    /// True when no field constrains the query.
    pub fn is_empty(&self) -> bool {
        self.channel_id.is_none() && self.user_id.is_none()
    }
}

/// Database handle with connection pool.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connection acquire timeout - prevents connection storms from blocking indefinitely.
    const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

    /// Maximum time a connection can remain idle before being closed.
    const IDLE_TIMEOUT: Duration = Duration::from_secs(60);

    /// Create a new database connection, running migrations if needed.
    pub async fn new(path: &str) -> Result<Self, DbError> {
        let pool = if path == ":memory:" {
            // A uniquely named shared-cache database per call, so parallel
            // tests never see each other's rows.
            let id = MEMDB_COUNTER.fetch_add(1, Ordering::Relaxed);
            let memdb_uri = format!(
                "file:chanserv-memdb-{}-{}?mode=memory&cache=shared",
                std::process::id(),
                id
            );

            let options = SqliteConnectOptions::new()
                .filename(&memdb_uri)
                .shared_cache(true)
                .foreign_keys(true)
                .create_if_missing(true);

            SqlitePoolOptions::new()
                .max_connections(1)
                .acquire_timeout(Self::ACQUIRE_TIMEOUT)
                .idle_timeout(Some(Self::IDLE_TIMEOUT))
                .test_before_acquire(true)
                .connect_with(options)
                .await?
        } else {
            if let Some(parent) = Path::new(path).parent()
                && !parent.as_os_str().is_empty()
                && let Err(e) = std::fs::create_dir_all(parent)
            {
                tracing::warn!(path = %parent.display(), error = %e, "Failed to create database directory");
            }

            let options = SqliteConnectOptions::new()
                .filename(path)
                .foreign_keys(true)
                .journal_mode(SqliteJournalMode::Wal)
                .create_if_missing(true);

            SqlitePoolOptions::new()
                .max_connections(5)
                .acquire_timeout(Self::ACQUIRE_TIMEOUT)
                .idle_timeout(Some(Self::IDLE_TIMEOUT))
                .test_before_acquire(true)
                .connect_with(options)
                .await?
        };

        info!(path = %path, "Database connected");

        Self::run_migrations(&pool).await?;

        Ok(Self { pool })
    }

    /// Run embedded migrations.
    async fn run_migrations(pool: &SqlitePool) -> Result<(), DbError> {
        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .map_err(DbError::Migration)?;

        info!("Database migrations checked/applied");
        Ok(())
    }

    /// Get channel repository.
    pub fn channels(&self) -> ChannelRepository<'_> {
        ChannelRepository::new(&self.pool)
    }

    /// Get operator repository.
    pub fn operators(&self) -> OperatorRepository<'_> {
        OperatorRepository::new(&self.pool)
    }

    /// Get ban repository.
    pub fn bans(&self) -> SanctionRepository<'_, Ban> {
        SanctionRepository::new(&self.pool)
    }

    /// Get warning repository.
    pub fn warnings(&self) -> SanctionRepository<'_, Warning> {
        SanctionRepository::new(&self.pool)
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        DbError::Sqlx(err)
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::Migration(err)
    }
}

/// Current Unix timestamp in seconds.
pub(crate) fn now() -> i64 {
    chrono::Utc::now().timestamp()
}
