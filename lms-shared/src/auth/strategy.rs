/// Token strategies for route guards
///
/// A strategy decides which roles may pass a guard. Token decoding and the
/// user lookup are shared by every strategy through [`Strategy::validate`];
/// implementations only supply [`Strategy::accepts`].
///
/// | Strategy     | Accepts        |
/// |--------------|----------------|
/// | [`AdminOnly`] | `ADMIN`        |
/// | [`UserOnly`]  | `USER`         |
/// | [`Combined`]  | `ADMIN`, `USER` |
///
/// # Example
///
/// ```no_run
/// use lms_shared::auth::strategy::{bearer_token, AdminOnly, Strategy};
/// use lms_shared::store::MemoryStore;
///
/// # async fn example() -> Result<(), lms_shared::auth::strategy::AuthError> {
/// let store = MemoryStore::new();
/// let token = bearer_token(Some("Bearer eyJhbGciOi..."))?;
/// let admin = AdminOnly.validate(token, "secret", &store).await?;
/// println!("admin {}", admin.email);
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;

use super::jwt::{validate_token, JwtError};
use crate::models::user::{Role, User};
use crate::store::{Store, StoreError};

/// Error type for guard checks
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No Authorization header
    #[error("Missing credentials")]
    MissingCredentials,

    /// Header present but not `Bearer <token>`
    #[error("{0}")]
    InvalidFormat(String),

    /// Signature, format or expiry check failed
    #[error("{0}")]
    InvalidToken(String),

    /// Token subject no longer exists
    #[error("User not found")]
    UserNotFound,

    /// Role not accepted by this strategy
    #[error("Access denied for role {0}")]
    RoleNotAllowed(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Extracts the token from an `Authorization` header value
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.ok_or(AuthError::MissingCredentials)?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))
}

/// Role policy applied by a guard
#[async_trait]
pub trait Strategy: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &'static str;

    /// Whether a user with `role` passes this guard
    fn accepts(&self, role: Role) -> bool;

    /// Decodes `token`, loads its subject and applies [`Strategy::accepts`]
    async fn validate(&self, token: &str, secret: &str, store: &dyn Store) -> Result<User, AuthError> {
        let claims = validate_token(token, secret).map_err(|e| match e {
            JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
            _ => AuthError::InvalidToken("Invalid token".to_string()),
        })?;

        let user = store
            .find_user(claims.sub)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !self.accepts(user.role) {
            return Err(AuthError::RoleNotAllowed(user.role.as_str()));
        }

        Ok(user)
    }
}

/// Admins only
#[derive(Debug, Clone, Copy, Default)]
pub struct AdminOnly;

/// Learners only
#[derive(Debug, Clone, Copy, Default)]
pub struct UserOnly;

/// Any authenticated user
#[derive(Debug, Clone, Copy, Default)]
pub struct Combined;

#[async_trait]
impl Strategy for AdminOnly {
    fn name(&self) -> &'static str {
        "admin"
    }

    fn accepts(&self, role: Role) -> bool {
        role == Role::Admin
    }
}

#[async_trait]
impl Strategy for UserOnly {
    fn name(&self) -> &'static str {
        "user"
    }

    fn accepts(&self, role: Role) -> bool {
        role == Role::User
    }
}

#[async_trait]
impl Strategy for Combined {
    fn name(&self) -> &'static str {
        "combined"
    }

    fn accepts(&self, _role: Role) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{create_token, Claims};
    use crate::models::user::CreateUser;
    use crate::store::{MemoryStore, UserStore};
    use chrono::Duration;
    use uuid::Uuid;

    const SECRET: &str = "strategy-test-secret";

    async fn seed(store: &MemoryStore, email: &str, role: Role) -> (User, String) {
        let user = store
            .create_user(CreateUser {
                first_name: "Test".to_string(),
                last_name: "User".to_string(),
                email: email.to_string(),
                password_hash: "unused".to_string(),
                phone: "000".to_string(),
                role,
                photo: None,
            })
            .await
            .unwrap();
        let token = create_token(&Claims::new(user.id, &user.email, Duration::hours(1)).unwrap(), SECRET).unwrap();
        (user, token)
    }

    #[test]
    fn test_accepts_matrix() {
        assert!(AdminOnly.accepts(Role::Admin));
        assert!(!AdminOnly.accepts(Role::User));
        assert!(UserOnly.accepts(Role::User));
        assert!(!UserOnly.accepts(Role::Admin));
        assert!(Combined.accepts(Role::Admin));
        assert!(Combined.accepts(Role::User));
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token(Some("Bearer abc")).unwrap(), "abc");
        assert!(matches!(bearer_token(None), Err(AuthError::MissingCredentials)));
        assert!(matches!(bearer_token(Some("Basic abc")), Err(AuthError::InvalidFormat(_))));
        assert!(matches!(bearer_token(Some("Bearer ")), Err(AuthError::InvalidFormat(_))));
    }

    #[tokio::test]
    async fn test_validate_returns_user() {
        let store = MemoryStore::new();
        let (admin, token) = seed(&store, "admin@example.com", Role::Admin).await;

        let user = AdminOnly.validate(&token, SECRET, &store).await.unwrap();
        assert_eq!(user.id, admin.id);
    }

    #[tokio::test]
    async fn test_validate_rejects_role() {
        let store = MemoryStore::new();
        let (_, token) = seed(&store, "learner@example.com", Role::User).await;

        let err = AdminOnly.validate(&token, SECRET, &store).await.unwrap_err();
        assert!(matches!(err, AuthError::RoleNotAllowed("USER")));
        assert!(Combined.validate(&token, SECRET, &store).await.is_ok());
    }

    #[tokio::test]
    async fn test_validate_unknown_subject() {
        let store = MemoryStore::new();
        let token = create_token(&Claims::new(Uuid::new_v4(), "ghost@example.com", Duration::hours(1)).unwrap(), SECRET).unwrap();

        let err = Combined.validate(&token, SECRET, &store).await.unwrap_err();
        assert!(matches!(err, AuthError::UserNotFound));
    }

    #[tokio::test]
    async fn test_validate_bad_signature() {
        let store = MemoryStore::new();
        let (_, token) = seed(&store, "learner@example.com", Role::User).await;

        let err = Combined.validate(&token, "other-secret", &store).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(_)));
    }
}
