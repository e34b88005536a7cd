/// Login and token issuing
///
/// # Example
///
/// ```no_run
/// use lms_api::services::auth::{AuthService, LoginRequest};
/// use lms_shared::store::MemoryStore;
/// use chrono::Duration;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), lms_api::services::ServiceError> {
/// let service = AuthService::new(Arc::new(MemoryStore::new()), "secret", Duration::days(1));
/// let envelope = service
///     .login(LoginRequest {
///         email: "ada@example.com".to_string(),
///         password: "secret-password".to_string(),
///     })
///     .await?;
/// println!("token: {}", envelope.data.jwt);
/// # Ok(())
/// # }
/// ```

use chrono::Duration;
use lms_shared::auth::{
    jwt::{create_token, Claims},
    password::verify_password,
};
use lms_shared::models::user::User;
use lms_shared::store::Store;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::{ServiceError, ServiceResult};
use crate::envelope::Envelope;

/// Login request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login response payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub jwt: String,
    pub user: User,
}

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn Store>,
    secret: String,
    ttl: Duration,
}

impl AuthService {
    pub fn new(store: Arc<dyn Store>, secret: impl Into<String>, ttl: Duration) -> Self {
        Self {
            store,
            secret: secret.into(),
            ttl,
        }
    }

    /// Checks credentials and returns a signed token with the user
    ///
    /// # Errors
    ///
    /// - `NotFound("User not found")` for an unknown email
    /// - `Forbidden("Credentials incorrect")` for a wrong password
    pub async fn login(&self, req: LoginRequest) -> ServiceResult<Envelope<LoginResponse>> {
        let user = self
            .store
            .find_user_by_email(&req.email)
            .await?
            .ok_or_else(|| ServiceError::not_found("User not found"))?;

        if !verify_password(&req.password, &user.password_hash)? {
            return Err(ServiceError::Forbidden("Credentials incorrect".to_string()));
        }

        let jwt = self.issue_token(user.id, &user.email)?;
        tracing::info!(user_id = %user.id, "User logged in");

        Ok(Envelope::ok("Successfully logged in", LoginResponse { jwt, user }))
    }

    /// Signs `{sub, email}` with the configured secret and lifetime
    pub fn issue_token(&self, user_id: Uuid, email: &str) -> ServiceResult<String> {
        let claims = Claims::new(user_id, email, self.ttl)?;
        Ok(create_token(&claims, &self.secret)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lms_shared::auth::jwt::validate_token;
    use lms_shared::auth::password::hash_password;
    use lms_shared::models::user::{CreateUser, Role};
    use lms_shared::store::{MemoryStore, UserStore};

    const SECRET: &str = "auth-service-secret";

    async fn service_with_user(password: &str) -> (AuthService, User) {
        let store = Arc::new(MemoryStore::new());
        let user = store
            .create_user(CreateUser {
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                email: "ada@example.com".to_string(),
                password_hash: hash_password(password).unwrap(),
                phone: "555-0100".to_string(),
                role: Role::User,
                photo: None,
            })
            .await
            .unwrap();

        (AuthService::new(store, SECRET, Duration::hours(1)), user)
    }

    fn login(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_token_subject_is_user() {
        let (service, user) = service_with_user("right-password").await;

        let envelope = service.login(login("ada@example.com", "right-password")).await.unwrap();
        assert_eq!(envelope.message, "Successfully logged in");
        assert_eq!(envelope.data.user.id, user.id);

        let claims = validate_token(&envelope.data.jwt, SECRET).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, "ada@example.com");
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let (service, _) = service_with_user("right-password").await;

        let err = service.login(login("ada@example.com", "wrong")).await.unwrap_err();
        assert_eq!(err.public_message(), "Credentials incorrect");
    }

    #[tokio::test]
    async fn test_login_unknown_email() {
        let (service, _) = service_with_user("right-password").await;

        let err = service.login(login("nobody@example.com", "x")).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(ref m) if m == "User not found"));
    }

    #[test]
    fn test_login_request_validation() {
        assert!(login("not-an-email", "pw").validate().is_err());
        assert!(login("ada@example.com", "").validate().is_err());
        assert!(login("ada@example.com", "pw").validate().is_ok());
    }
}
