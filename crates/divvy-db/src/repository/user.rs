//! # User Repository
//!
//! Database operations for users.
//!
//! ## Key Operations
//! - Registration with field validation and unique email
//! - Lookup by id, listing
//! - Bulk existence checks for the Split Engine

use std::collections::HashSet;

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use divvy_core::validation::validate_new_user;
use divvy_core::{CoreError, NewUser, User, UserId};

/// Row shape of the `users` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct UserRecord {
    id: String,
    name: String,
    email: String,
    mobile: String,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        User {
            id: record.id,
            name: record.name,
            email: record.email,
            mobile: record.mobile,
        }
    }
}

/// Repository for user database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = UserRepository::new(pool);
///
/// let alice = repo.create(&new_user).await?;
/// let same = repo.get_required(&alice.id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Registers a user.
    ///
    /// ## Errors
    /// * `Core(Validation(..))` - name, email or mobile is malformed
    /// * `UniqueViolation` - the email is already registered
    pub async fn create(&self, new: &NewUser) -> DbResult<User> {
        let clean = validate_new_user(new).map_err(CoreError::from)?;
        let user = User {
            id: Uuid::new_v4().to_string(),
            name: clean.name,
            email: clean.email,
            mobile: clean.mobile,
        };

        debug!(id = %user.id, email = %user.email, "Creating user");

        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, mobile, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.mobile)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("email", &user.email),
            other => other,
        })?;

        info!(id = %user.id, "User created");
        Ok(user)
    }

    /// Gets a user by id.
    ///
    /// ## Returns
    /// * `Ok(Some(User))` - User found
    /// * `Ok(None)` - No such user
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, name, email, mobile
            FROM users
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(User::from))
    }

    /// Gets a user by id, failing with `NotFound` when absent.
    pub async fn get_required(&self, id: &str) -> DbResult<User> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("User", id))
    }

    /// Lists every user in registration order.
    pub async fn list(&self) -> DbResult<Vec<User>> {
        let records = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, name, email, mobile
            FROM users
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = records.len(), "Listed users");
        Ok(records.into_iter().map(User::from).collect())
    }

    /// Counts registered users.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Returns the subset of `ids` that exist.
    pub async fn find_existing(&self, ids: &[&str]) -> DbResult<HashSet<UserId>> {
        if ids.is_empty() {
            return Ok(HashSet::new());
        }

        let placeholders = (1..=ids.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("SELECT id FROM users WHERE id IN ({placeholders})");

        let mut query = sqlx::query_scalar::<_, String>(&sql);
        for id in ids {
            query = query.bind(*id);
        }

        let found: HashSet<UserId> = query.fetch_all(&self.pool).await?.into_iter().collect();
        debug!(requested = ids.len(), found = found.len(), "Resolved user ids");
        Ok(found)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DbConfig;
    use crate::pool::Database;
    use divvy_core::ValidationError;

    fn new_user(name: &str) -> NewUser {
        NewUser {
            name: name.to_string(),
            email: format!("{}@test.com", name.to_lowercase()),
            mobile: "1234567890".to_string(),
        }
    }

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let db = db().await;
        let alice = db.users().create(&new_user("Alice")).await.unwrap();

        let fetched = db.users().get_by_id(&alice.id).await.unwrap();
        assert_eq!(fetched, Some(alice.clone()));
        assert_eq!(db.users().get_required(&alice.id).await.unwrap(), alice);
        assert_eq!(db.users().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_missing_user() {
        let db = db().await;
        assert!(db.users().get_by_id("ghost").await.unwrap().is_none());
        assert!(matches!(
            db.users().get_required("ghost").await,
            Err(DbError::NotFound { id, .. }) if id == "ghost"
        ));
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let db = db().await;
        db.users().create(&new_user("Alice")).await.unwrap();

        let mut again = new_user("Alicia");
        again.email = "Alice@Test.com".to_string();
        match db.users().create(&again).await {
            Err(DbError::UniqueViolation { field, value }) => {
                assert_eq!(field, "email");
                assert_eq!(value, "alice@test.com");
            }
            other => panic!("expected UniqueViolation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_user_is_rejected() {
        let db = db().await;
        let mut bad = new_user("Alice");
        bad.email = "alice".to_string();

        assert!(matches!(
            db.users().create(&bad).await,
            Err(DbError::Core(CoreError::Validation(ValidationError::InvalidFormat { .. })))
        ));
        assert_eq!(db.users().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_and_find_existing() {
        let db = db().await;
        let alice = db.users().create(&new_user("Alice")).await.unwrap();
        let bob = db.users().create(&new_user("Bob")).await.unwrap();

        assert_eq!(db.users().list().await.unwrap().len(), 2);

        let found = db
            .users()
            .find_existing(&[alice.id.as_str(), "ghost", bob.id.as_str()])
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.contains(&alice.id));
        assert!(!found.contains("ghost"));

        assert!(db.users().find_existing(&[]).await.unwrap().is_empty());
    }
}
