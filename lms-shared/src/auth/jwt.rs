/// JWT token generation and validation module
///
/// Access tokens are signed with HS256 and carry the user id as `sub` plus the
/// user's email. There is no refresh flow; a client logs in again once the
/// token expires.
///
/// # Expiry
///
/// The lifetime comes from `JWT_EXPIRY`, parsed by [`parse_expiry`]: a bare
/// number of seconds or a number with an `s`, `m`, `h` or `d` suffix, at most
/// [`MAX_EXPIRY_DAYS`] days.
///
/// # Example
///
/// ```
/// use lms_shared::auth::jwt::{create_token, validate_token, Claims};
/// use chrono::Duration;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let user_id = Uuid::new_v4();
/// let claims = Claims::new(user_id, "ada@example.com", Duration::hours(1))?;
/// let token = create_token(&claims, "your-secret-key")?;
///
/// let validated = validate_token(&token, "your-secret-key")?;
/// assert_eq!(validated.sub, user_id);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Longest accepted token lifetime
pub const MAX_EXPIRY_DAYS: i64 = 365;

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Signature, format or claim check failed
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// `JWT_EXPIRY` couldn't be parsed
    #[error("Invalid token expiry: {0}")]
    InvalidExpiry(String),
}

/// JWT claims
///
/// - `sub`: user id
/// - `email`: user email at signing time
/// - `iat` / `exp`: issued-at and expiration (Unix seconds)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// Creates claims expiring `ttl` from now
    ///
    /// # Errors
    ///
    /// Returns `JwtError::InvalidExpiry` when `now + ttl` is not a representable time
    pub fn new(user_id: Uuid, email: impl Into<String>, ttl: Duration) -> Result<Self, JwtError> {
        let now = Utc::now();
        let exp = now
            .checked_add_signed(ttl)
            .ok_or_else(|| JwtError::InvalidExpiry(format!("{} seconds", ttl.num_seconds())))?;

        Ok(Self {
            sub: user_id,
            email: email.into(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        })
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Signs `claims` with HS256
///
/// # Errors
///
/// Returns `JwtError::CreateError` if encoding fails
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Verifies the signature and expiry of `token` and returns its claims
///
/// # Errors
///
/// - `JwtError::Expired` when `exp` is in the past
/// - `JwtError::ValidationError` for a bad signature or malformed token
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

/// Parses a token lifetime such as `3600`, `90s`, `15m`, `12h` or `1d`
///
/// # Example
///
/// ```
/// use lms_shared::auth::jwt::parse_expiry;
/// use chrono::Duration;
///
/// assert_eq!(parse_expiry("1d").unwrap(), Duration::days(1));
/// assert_eq!(parse_expiry("3600").unwrap(), Duration::seconds(3600));
/// ```
pub fn parse_expiry(value: &str) -> Result<Duration, JwtError> {
    let value = value.trim();
    let invalid = || JwtError::InvalidExpiry(value.to_string());

    let (digits, unit) = match value.char_indices().last() {
        Some((idx, c)) if c.is_ascii_alphabetic() => (&value[..idx], Some(c)),
        Some(_) => (value, None),
        None => return Err(invalid()),
    };

    let amount: i64 = digits.parse().map_err(|_| invalid())?;
    if amount <= 0 {
        return Err(invalid());
    }

    let ttl = match unit {
        None | Some('s') => Duration::try_seconds(amount),
        Some('m') => Duration::try_minutes(amount),
        Some('h') => Duration::try_hours(amount),
        Some('d') => Duration::try_days(amount),
        Some(_) => None,
    }
    .ok_or_else(invalid)?;

    if ttl > Duration::days(MAX_EXPIRY_DAYS) {
        return Err(invalid());
    }
    Ok(ttl)
}
