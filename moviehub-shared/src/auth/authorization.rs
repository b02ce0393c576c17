/// Authorization rules for mutations
///
/// MovieHub has two roles. Any authenticated user may create movies, vote
/// and comment; deleting a comment needs authorship or the admin role; movie
/// deletion and the admin dashboard need the admin role.
///
/// These checks run before any mutation begins.
///
/// # Example
///
/// ```
/// use moviehub_shared::auth::authorization::{can_delete_comment, require_admin};
/// use moviehub_shared::auth::middleware::AuthContext;
/// use moviehub_shared::models::user::UserRole;
/// use uuid::Uuid;
///
/// let author = Uuid::new_v4();
/// let reader = AuthContext { user_id: Uuid::new_v4(), role: UserRole::User };
///
/// assert!(require_admin(&reader).is_err());
/// assert!(can_delete_comment(&reader, author).is_err());
/// ```

use uuid::Uuid;

use super::middleware::AuthContext;
use crate::models::user::UserRole;

/// Error type for authorization checks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// Caller lacks the required role
    #[error("Insufficient permissions: requires {required:?}, has {actual:?}")]
    InsufficientRole { required: UserRole, actual: UserRole },

    /// Caller neither owns the resource nor is an admin
    #[error("Not authorized to modify this resource")]
    NotOwner,
}

/// Requires the admin role
pub fn require_admin(auth: &AuthContext) -> Result<(), AuthzError> {
    if auth.is_admin() {
        Ok(())
    } else {
        Err(AuthzError::InsufficientRole {
            required: UserRole::Admin,
            actual: auth.role,
        })
    }
}

/// Allows the comment's author or any admin
pub fn can_delete_comment(auth: &AuthContext, comment_author: Uuid) -> Result<(), AuthzError> {
    if auth.user_id == comment_author || auth.is_admin() {
        Ok(())
    } else {
        Err(AuthzError::NotOwner)
    }
}
