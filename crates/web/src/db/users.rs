//! Profile lookups for the user page.

use chrono::{DateTime, Datelike, Utc};
use sqlx::MySqlPool;

use nijitter_core::Handle;

use super::RepositoryError;

/// Profile columns rendered into the user page shell.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ProfileRow {
    pub username: String,
    pub user_id: Handle,
    pub icon_path: Option<String>,
    pub bio: Option<String>,
    pub status_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ProfileRow {
    /// Join month as shown on profiles, e.g. `2024年3月`.
    #[must_use]
    pub fn joined(&self) -> String {
        format!("{}年{}月", self.created_at.year(), self.created_at.month())
    }
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a MySqlPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a MySqlPool) -> Self {
        Self { pool }
    }

    /// Get a profile by handle.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no user has this handle.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_profile(&self, handle: &Handle) -> Result<ProfileRow, RepositoryError> {
        sqlx::query_as::<_, ProfileRow>(
            r"
            SELECT username, user_id, icon_path, bio, status_message, created_at
            FROM users
            WHERE user_id = ?
            ",
        )
        .bind(handle)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_joined_month_has_no_padding() {
        let row = ProfileRow {
            username: "Usagi".to_string(),
            user_id: Handle::parse("usagi").unwrap(),
            icon_path: None,
            bio: None,
            status_message: None,
            created_at: Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap(),
        };
        assert_eq!(row.joined(), "2024年3月");
    }
}
