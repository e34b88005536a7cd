/// Error handling for the API server
///
/// Every handler returns `ApiResult<T>`. The error body always carries the
/// HTTP status next to a message:
///
/// | Variant             | Status | Body                                              |
/// |---------------------|--------|---------------------------------------------------|
/// | `Service`           | 403    | `{status: 403, error}`                            |
/// | `Unauthorized`      | 401    | `{status: 401, error}`                            |
/// | `ValidationError`   | 400    | `{status: 400, error: "Validation failed", details}` |
/// | `ServiceUnavailable`| 503    | `{status: 503, error}`                            |
/// | `InternalError`     | 500    | `{status: 500, error: "Internal server error"}`   |
///
/// # Example
///
/// ```
/// use lms_api::error::{ApiError, ApiResult};
/// use lms_api::services::ServiceError;
///
/// fn lookup(found: bool) -> ApiResult<&'static str> {
///     if !found {
///         return Err(ServiceError::NotFound("course not found".to_string()).into());
///     }
///     Ok("course")
/// }
///
/// assert!(matches!(lookup(false), Err(ApiError::Service(_))));
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use lms_shared::auth::strategy::AuthError;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::services::ServiceError;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Use-case failure (403)
    Service(ServiceError),

    /// Guard rejected the request (401)
    Unauthorized(String),

    /// Request shape rejected (400)
    ValidationError(Vec<ValidationErrorDetail>),

    /// Dependency down (503)
    ServiceUnavailable(String),

    /// Unexpected failure (500)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field or request part that failed
    pub field: String,

    pub message: String,
}

impl ValidationErrorDetail {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: u16,
    pub error: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Service(_) => StatusCode::FORBIDDEN,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Single-field validation failure
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::ValidationError(vec![ValidationErrorDetail::new(field, message)])
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Service(err) => write!(f, "Service error: {}", err),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let (error, details) = match self {
            ApiError::Service(err) => {
                err.log();
                (err.public_message(), None)
            }
            ApiError::Unauthorized(msg) => {
                tracing::debug!(reason = %msg, "Request rejected by guard");
                (msg, None)
            }
            ApiError::ValidationError(errors) => ("Validation failed".to_string(), Some(errors)),
            ApiError::ServiceUnavailable(msg) => (msg, None),
            ApiError::InternalError(msg) => {
                // Details stay in the log
                tracing::error!("Internal error: {}", msg);
                ("Internal server error".to_string(), None)
            }
        };

        let body = Json(ErrorResponse {
            status: status.as_u16(),
            error,
            details,
        });

        (status, body).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError::Service(err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Store(store_err) => {
                ApiError::InternalError(format!("Guard lookup failed: {}", store_err))
            }
            other => ApiError::Unauthorized(other.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<ValidationErrorDetail> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid {}", field));
                    ValidationErrorDetail::new(field.to_string(), message)
                })
            })
            .collect();
        details.sort_by(|a, b| a.field.cmp(&b.field));

        ApiError::ValidationError(details)
    }
}
