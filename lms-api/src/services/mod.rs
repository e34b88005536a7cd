/// Domain services
///
/// Each service owns an `Arc<dyn Store>`, checks the preconditions of one use
/// case, performs the persistence calls and returns an [`Envelope`]. Services
/// know nothing about HTTP; [`crate::error::ApiError`] turns a
/// [`ServiceError`] into the 403 response.
///
/// - [`auth::AuthService`]: login and token issuing
/// - [`user::UserService`]: account management
/// - [`course::CourseService`]: course tree, assignments and reports
/// - [`progress::ProgressService`]: chapter progress and last-seen markers
/// - [`board::BoardService`]: posts, comments and policies
///
/// [`Envelope`]: crate::envelope::Envelope

use lms_shared::auth::{jwt::JwtError, password::PasswordError};
use lms_shared::store::StoreError;

pub mod auth;
pub mod board;
pub mod course;
pub mod progress;
pub mod user;

pub use auth::AuthService;
pub use board::BoardService;
pub use course::CourseService;
pub use progress::ProgressService;
pub use user::UserService;

/// Message returned when an update payload carries no known keys
pub const WRONG_KEYS: &str = "wrong keys";

/// Error type for service operations
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Forbidden(String),

    /// Payload rejected by the use case (e.g. empty update)
    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Jwt(#[from] JwtError),
}

/// Result alias for service calls
pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn not_found(message: impl Into<String>) -> Self {
        ServiceError::NotFound(message.into())
    }

    pub fn wrong_keys() -> Self {
        ServiceError::Invalid(WRONG_KEYS.to_string())
    }

    /// Message placed in the `error` field of the response body
    ///
    /// Constraint failures are reported by name; raw database faults are not.
    pub fn public_message(&self) -> String {
        match self {
            ServiceError::Store(StoreError::Database(_)) => "Something went wrong".to_string(),
            ServiceError::Password(_) => "Something went wrong".to_string(),
            other => other.to_string(),
        }
    }

    /// Emits the failure at the level its kind deserves
    pub fn log(&self) {
        match self {
            ServiceError::Store(StoreError::Database(e)) => {
                tracing::error!(error = %e, "Store failure");
            }
            ServiceError::Password(e) => tracing::error!(error = %e, "Password hashing failure"),
            ServiceError::Jwt(e) => tracing::error!(error = %e, "Token signing failure"),
            other => tracing::warn!(error = %other, "Service call failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_pass_through() {
        assert_eq!(ServiceError::not_found("course not found").public_message(), "course not found");
        assert_eq!(ServiceError::wrong_keys().public_message(), "wrong keys");
        assert_eq!(
            ServiceError::Forbidden("Credentials incorrect".to_string()).public_message(),
            "Credentials incorrect"
        );
    }

    #[test]
    fn test_constraint_names_surface() {
        let err = ServiceError::from(StoreError::ForeignKeyViolation("modules_course_id_fkey".to_string()));
        assert_eq!(err.public_message(), "Foreign key constraint failed: modules_course_id_fkey");
    }

    #[test]
    fn test_database_faults_are_masked() {
        let err = ServiceError::from(StoreError::Database(sqlx::Error::PoolTimedOut));
        assert_eq!(err.public_message(), "Something went wrong");
    }
}
