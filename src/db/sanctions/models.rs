//! Sanction models and data structures.

use sqlx::FromRow;
use sqlx::sqlite::SqliteRow;

/// Common behaviour of ban and warning rows.
pub trait Sanction: for<'r> FromRow<'r, SqliteRow> + Send + Unpin {
    /// The database table name.
    const TABLE: &'static str;
}

macro_rules! sanction_model {
    ($(#[$meta:meta])* $name:ident => $table:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, FromRow)]
        pub struct $name {
            pub id: i64,
            pub channel_id: String,
            pub user_id: String,
            pub reason: String,
            /// Unix timestamp after which the record no longer applies.
            pub expires_at: i64,
            pub created_at: i64,
            pub updated_at: i64,
        }

        impl Sanction for $name {
            const TABLE: &'static str = $table;
        }
    };
}

sanction_model!(
    /// A channel ban. Enforced on every join while active.
    Ban => "bans"
);

sanction_model!(
    /// A channel warning. Informational; expires after thirty days.
    Warning => "warnings"
);

/// Fields supplied when creating a ban or warning.
#[derive(Debug, Clone)]
pub struct NewSanction {
    pub channel_id: String,
    pub user_id: String,
    pub reason: String,
    pub expires_at: i64,
}

impl NewSanction {
    pub fn new(
        channel_id: impl Into<String>,
        user_id: impl Into<String>,
        reason: impl Into<String>,
        expires_at: i64,
    ) -> Self {
        Self {
            channel_id: channel_id.into(),
            user_id: user_id.into(),
            reason: reason.into(),
            expires_at,
        }
    }
}

/// Partial update applied to matching active sanctions.
#[derive(Debug, Clone, Default)]
pub struct SanctionPatch {
    pub expires_at: Option<i64>,
}

impl SanctionPatch {
    /// Lift a sanction while keeping its row as history.
    pub fn expire_now() -> Self {
        Self {
            expires_at: Some(crate::db::now()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expire_now_only_touches_expiry() {
        let before = crate::db::now();
        let patch = SanctionPatch::expire_now();
        assert!(patch.expires_at.is_some_and(|at| at >= before));
    }

    #[test]
    fn table_names() {
        assert_eq!(Ban::TABLE, "bans");
        assert_eq!(Warning::TABLE, "warnings");
    }
}
