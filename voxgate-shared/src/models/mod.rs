/// Database models for VoxGate
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: User accounts, admin flags, and the balance ledger
/// - `task`: Speech synthesis jobs and their status machine
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
/// # Ok(())
/// # }
/// ```

pub mod task;
pub mod user;
