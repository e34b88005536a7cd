/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing
/// - [`jwt`]: HS256 token issuing and validation
/// - [`strategy`]: role strategies applied by route guards
///
/// # Example
///
/// ```
/// use lms_shared::auth::jwt::{create_token, validate_token, Claims};
/// use lms_shared::auth::password::{hash_password, verify_password};
/// use chrono::Duration;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("learner-password")?;
/// assert!(verify_password("learner-password", &hash)?);
///
/// let claims = Claims::new(Uuid::new_v4(), "ada@example.com", Duration::days(1))?;
/// let token = create_token(&claims, "secret-key")?;
/// assert_eq!(validate_token(&token, "secret-key")?.email, "ada@example.com");
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod password;
pub mod strategy;
