/// User endpoints, all behind the combined guard

use crate::{
    app::AppState,
    envelope::Envelope,
    error::ApiResult,
    extract::{ValidJson, ValidPath},
    services::user::{ChangePasswordRequest, CreateUserRequest, UpdateUserRequest},
};
use axum::extract::State;
use lms_shared::models::user::User;
use uuid::Uuid;

pub async fn get_all_users(State(state): State<AppState>) -> ApiResult<Envelope<Vec<User>>> {
    Ok(state.users.get_all_users().await?)
}

pub async fn get_user(State(state): State<AppState>, ValidPath(id): ValidPath<Uuid>) -> ApiResult<Envelope<User>> {
    Ok(state.users.get_user(id).await?)
}

pub async fn create_user(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<CreateUserRequest>,
) -> ApiResult<Envelope<User>> {
    Ok(state.users.create_user(req).await?)
}

pub async fn update_user(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
    ValidJson(req): ValidJson<UpdateUserRequest>,
) -> ApiResult<Envelope<User>> {
    Ok(state.users.update_user(id, req).await?)
}

pub async fn change_password(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
    ValidJson(req): ValidJson<ChangePasswordRequest>,
) -> ApiResult<Envelope<User>> {
    Ok(state.users.change_password(id, req).await?)
}

pub async fn delete_user(State(state): State<AppState>, ValidPath(id): ValidPath<Uuid>) -> ApiResult<Envelope<User>> {
    Ok(state.users.delete_user(id).await?)
}
