/// Authentication and authorization utilities
///
/// This module provides the account-security primitives for MovieHub:
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and password policy
/// - [`jwt`]: Session token generation and validation
/// - [`middleware`]: Bearer-token extraction and the per-request `AuthContext`
/// - [`authorization`]: Role and ownership checks for mutations
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id with 64 MB memory, 3 iterations
/// - **Session Tokens**: HS256-signed JWTs carrying user id and role
/// - **Constant-time Comparison**: Password verification is constant-time
///
/// # Example
///
/// ```no_run
/// use moviehub_shared::auth::password::{hash_password, verify_password};
/// use moviehub_shared::auth::jwt::{create_token, validate_token, Claims};
/// use moviehub_shared::models::user::UserRole;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// // Password authentication
/// let hash = hash_password("user_password1")?;
/// assert!(verify_password("user_password1", &hash)?);
///
/// // Session token generation
/// let claims = Claims::new(Uuid::new_v4(), UserRole::User);
/// let token = create_token(&claims, "secret-key")?;
/// let verified = validate_token(&token, "secret-key")?;
/// assert_eq!(verified.role, UserRole::User);
/// # Ok(())
/// # }
/// ```

pub mod password;
pub mod jwt;
pub mod middleware;
pub mod authorization;
