/// User model and database operations
///
/// This module provides the User model and CRUD operations for managing user
/// accounts. Registration and login build on top of these; admin routes use
/// the activation/balance mutators and the task-count listing.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email CITEXT NOT NULL UNIQUE,
///     username VARCHAR(50) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     is_active BOOLEAN NOT NULL DEFAULT TRUE,
///     is_admin BOOLEAN NOT NULL DEFAULT FALSE,
///     balance BIGINT NOT NULL DEFAULT 0 CHECK (balance >= 0),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use voxgate_shared::models::user::{User, CreateUser};
/// use voxgate_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let new_user = CreateUser {
///     email: "user@example.com".to_string(),
///     username: "user".to_string(),
///     password_hash: "$argon2id$...".to_string(),
/// };
///
/// let user = User::create(&pool, new_user).await?;
/// println!("Created user: {}", user.id);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// User model representing a user account
///
/// Passwords are stored as Argon2id hashes, never in plaintext. The
/// `balance` column is an operator-managed ledger; the live balance shown
/// to users comes from the speech provider.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Email address (case-insensitive via CITEXT)
    ///
    /// Must be unique across all users
    pub email: String,

    /// Display/login name, unique across all users
    pub username: String,

    /// Argon2id password hash
    ///
    /// Never store plaintext passwords! Skipped on serialization so the
    /// hash can never reach an API response.
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Whether the account may log in and use the API
    ///
    /// Deactivated accounts fail authentication uniformly
    pub is_active: bool,

    /// Whether the account may use the admin surface
    pub is_admin: bool,

    /// Operator-managed balance ledger (never negative)
    pub balance: i64,

    /// When the user account was created
    pub created_at: DateTime<Utc>,

    /// When the user account was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
///
/// All three fields are required; the hash must already be computed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Email address (stored case-insensitively via CITEXT)
    pub email: String,

    /// Unique username
    pub username: String,

    /// Argon2id password hash (NOT plaintext password!)
    pub password_hash: String,
}

/// User row joined with its task count, for the admin listing
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserWithTaskCount {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub is_active: bool,
    pub is_admin: bool,
    pub balance: i64,
    pub created_at: DateTime<Utc>,

    /// Number of tasks owned by this user
    pub task_count: i64,
}

impl User {
    /// Creates a new user in the database
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    /// * `data` - User creation data
    ///
    /// # Returns
    ///
    /// The newly created user with generated ID and timestamps
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Email or username already exists (unique constraint violation)
    /// - Database connection fails
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, username, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, email, username, password_hash, is_active, is_admin,
                      balance, created_at, updated_at
            "#,
        )
        .bind(data.email)
        .bind(data.username)
        .bind(data.password_hash)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    ///
    /// # Returns
    ///
    /// The user if found, None otherwise
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, username, password_hash, is_active, is_admin,
                   balance, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by email address
    ///
    /// Email lookup is case-insensitive (via CITEXT column type).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, username, password_hash, is_active, is_admin,
                   balance, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Sets the active flag on an account
    ///
    /// Deactivated accounts cannot log in; existing tokens keep working
    /// until they expire, but route handlers re-check the flag on load.
    ///
    /// # Returns
    ///
    /// The updated user if found, None if the ID is unknown
    pub async fn set_active(
        pool: &PgPool,
        id: Uuid,
        is_active: bool,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET is_active = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, email, username, password_hash, is_active, is_admin,
                      balance, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(is_active)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Sets the operator-managed balance ledger for an account
    ///
    /// The value replaces the stored balance outright; callers must have
    /// validated it as non-negative (the CHECK constraint backstops this).
    ///
    /// # Returns
    ///
    /// The updated user if found, None if the ID is unknown
    pub async fn set_balance(
        pool: &PgPool,
        id: Uuid,
        balance: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET balance = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, email, username, password_hash, is_active, is_admin,
                      balance, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(balance)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Lists all users with their task counts, newest first
    ///
    /// Backs the admin user table.
    pub async fn list_with_task_counts(
        pool: &PgPool,
    ) -> Result<Vec<UserWithTaskCount>, sqlx::Error> {
        let users = sqlx::query_as::<_, UserWithTaskCount>(
            r#"
            SELECT u.id, u.email, u.username, u.is_active, u.is_admin,
                   u.balance, u.created_at,
                   COUNT(t.id) AS task_count
            FROM users u
            LEFT JOIN tasks t ON t.user_id = u.id
            GROUP BY u.id
            ORDER BY u.created_at DESC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Counts total number of users
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Counts users with is_active = true
    pub async fn count_active(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM users WHERE is_active = TRUE")
                .fetch_one(pool)
                .await?;

        Ok(count)
    }

    /// Sums the operator-managed balance ledger across all users
    pub async fn sum_balance(pool: &PgPool) -> Result<i64, sqlx::Error> {
        // SUM(bigint) comes back as NUMERIC, so cast before decoding
        let (total,): (i64,) =
            sqlx::query_as("SELECT COALESCE(SUM(balance), 0)::BIGINT FROM users")
                .fetch_one(pool)
                .await?;

        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_user_struct() {
        let create_user = CreateUser {
            email: "test@example.com".to_string(),
            username: "test".to_string(),
            password_hash: "hash".to_string(),
        };

        assert_eq!(create_user.email, "test@example.com");
        assert_eq!(create_user.username, "test");
        assert_eq!(create_user.password_hash, "hash");
    }

    // Integration tests for database operations are in voxgate-api/tests/
}
