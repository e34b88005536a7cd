/// User account management
///
/// Unknown keys in request bodies are ignored, so an update naming only
/// unknown keys is reported as `"wrong keys"`.

use lms_shared::auth::password::hash_password;
use lms_shared::models::user::{CreateUser, Role, UpdateUser, User};
use lms_shared::store::{Store, StoreError};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::{ServiceError, ServiceResult};
use crate::envelope::Envelope;

const EMAIL_TAKEN: &str = "User already exist with specified email";

/// New account
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,

    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    #[validate(length(min = 1, message = "Phone is required"))]
    pub phone: String,

    pub role: Role,

    pub photo: Option<String>,
}

/// Profile changes; absent keys keep their value
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    pub phone: Option<String>,
    pub photo: Option<String>,
}

impl From<UpdateUserRequest> for UpdateUser {
    fn from(req: UpdateUserRequest) -> Self {
        UpdateUser {
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            phone: req.phone,
            photo: req.photo,
            password_hash: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn Store>,
}

fn email_conflict(err: StoreError) -> ServiceError {
    match err {
        StoreError::UniqueViolation(_) => ServiceError::Conflict(EMAIL_TAKEN.to_string()),
        other => other.into(),
    }
}

impl UserService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    async fn require(&self, id: Uuid) -> ServiceResult<User> {
        self.store
            .find_user(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User not found"))
    }

    pub async fn get_all_users(&self) -> ServiceResult<Envelope<Vec<User>>> {
        let users = self.store.list_users().await?;
        if users.is_empty() {
            return Err(ServiceError::not_found("No Users found"));
        }

        Ok(Envelope::ok("Successfully fetch all Users info", users))
    }

    pub async fn get_user(&self, id: Uuid) -> ServiceResult<Envelope<User>> {
        let user = self.require(id).await?;
        Ok(Envelope::ok("Successfully fetch user info", user))
    }

    /// Creates an account with an argon2id-hashed password
    pub async fn create_user(&self, req: CreateUserRequest) -> ServiceResult<Envelope<User>> {
        if self.store.find_user_by_email(&req.email).await?.is_some() {
            return Err(ServiceError::Conflict(EMAIL_TAKEN.to_string()));
        }

        let password_hash = hash_password(&req.password)?;
        let user = self
            .store
            .create_user(CreateUser {
                first_name: req.first_name,
                last_name: req.last_name,
                email: req.email,
                password_hash,
                phone: req.phone,
                role: req.role,
                photo: req.photo,
            })
            .await
            .map_err(email_conflict)?;

        tracing::info!(user_id = %user.id, role = user.role.as_str(), "User created");
        Ok(Envelope::ok("Successfully create user record", user))
    }

    pub async fn update_user(&self, id: Uuid, req: UpdateUserRequest) -> ServiceResult<Envelope<User>> {
        let changes = UpdateUser::from(req);
        self.require(id).await?;
        if changes.is_empty() {
            return Err(ServiceError::wrong_keys());
        }

        let user = self
            .store
            .update_user(id, changes)
            .await
            .map_err(email_conflict)?
            .ok_or_else(|| ServiceError::not_found("User not found"))?;

        Ok(Envelope::ok("Successfully updated user record", user))
    }

    pub async fn change_password(&self, id: Uuid, req: ChangePasswordRequest) -> ServiceResult<Envelope<User>> {
        self.require(id).await?;

        let changes = UpdateUser {
            password_hash: Some(hash_password(&req.password)?),
            ..Default::default()
        };
        let user = self
            .store
            .update_user(id, changes)
            .await?
            .ok_or_else(|| ServiceError::not_found("User not found"))?;

        tracing::info!(user_id = %id, "Password changed");
        Ok(Envelope::ok("Successfully changed password", user))
    }

    /// Deletes the account and returns its last state
    pub async fn delete_user(&self, id: Uuid) -> ServiceResult<Envelope<User>> {
        let user = self.require(id).await?;
        self.store.delete_user(id).await?;

        tracing::info!(user_id = %id, "User deleted");
        Ok(Envelope::ok("Successfully deleted user record", user))
    }
}
