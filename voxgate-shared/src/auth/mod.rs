/// Authentication primitives for VoxGate
///
/// This module contains everything needed to authenticate users:
///
/// - `password`: Argon2id password hashing and verification
/// - `jwt`: JSON Web Token creation and validation (HS256, 7-day lifetime)
/// - `middleware`: request identity (`AuthContext`) and auth error responses
///
/// # Security Properties
///
/// - Passwords are hashed with Argon2id (64 MiB memory, 3 iterations)
/// - Tokens are signed with HMAC-SHA256 and carry an issuer claim
/// - Token validation fails closed: any malformed, tampered, or expired
///   token is rejected before a request reaches a handler
/// - Identity is re-checked against the database on every request, so
///   deactivating a user takes effect immediately rather than when their
///   token expires
///
/// # Example
///
/// ```no_run
/// use voxgate_shared::auth::password::{hash_password, verify_password};
/// use voxgate_shared::auth::jwt::{create_token, validate_token, Claims};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("correct horse battery staple")?;
/// assert!(verify_password("correct horse battery staple", &hash)?);
///
/// let claims = Claims::new(
///     Uuid::new_v4(),
///     "user@example.com".to_string(),
///     "user".to_string(),
/// );
/// let token = create_token(&claims, "secret-at-least-32-characters-long")?;
/// let decoded = validate_token(&token, "secret-at-least-32-characters-long")?;
/// assert_eq!(decoded.email, "user@example.com");
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod middleware;
pub mod password;
