/// Course board endpoints: posts, comments and policy acceptances

use crate::{
    app::AppState,
    envelope::Envelope,
    error::ApiResult,
    extract::{CurrentUser, ValidJson, ValidPath},
    services::board::{CommentRequest, Deleted, PoliciesRequest, PostRequest, PostUpdateRequest},
};
use axum::extract::State;
use lms_shared::models::{comment::Comment, policy::Policy, post::Post};
use uuid::Uuid;

pub async fn get_all_posts(
    State(state): State<AppState>,
    ValidPath(course_id): ValidPath<Uuid>,
) -> ApiResult<Envelope<Vec<Post>>> {
    Ok(state.board.get_all_posts(course_id).await?)
}

pub async fn create_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidPath(course_id): ValidPath<Uuid>,
    ValidJson(req): ValidJson<PostRequest>,
) -> ApiResult<Envelope<Post>> {
    Ok(state.board.create_post(course_id, &user, req).await?)
}

pub async fn get_post(State(state): State<AppState>, ValidPath(id): ValidPath<Uuid>) -> ApiResult<Envelope<Post>> {
    Ok(state.board.get_post(id).await?)
}

pub async fn update_post(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
    ValidJson(req): ValidJson<PostUpdateRequest>,
) -> ApiResult<Envelope<Post>> {
    Ok(state.board.update_post(id, req).await?)
}

pub async fn delete_post(State(state): State<AppState>, ValidPath(id): ValidPath<Uuid>) -> ApiResult<Envelope<Post>> {
    Ok(state.board.delete_post(id).await?)
}

pub async fn get_post_comments(
    State(state): State<AppState>,
    ValidPath(post_id): ValidPath<Uuid>,
) -> ApiResult<Envelope<Vec<Comment>>> {
    Ok(state.board.get_post_comments(post_id).await?)
}

pub async fn create_post_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidPath(post_id): ValidPath<Uuid>,
    ValidJson(req): ValidJson<CommentRequest>,
) -> ApiResult<Envelope<Comment>> {
    Ok(state.board.create_post_comment(post_id, &user, req).await?)
}

pub async fn update_post_comment(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
    ValidJson(req): ValidJson<CommentRequest>,
) -> ApiResult<Envelope<Comment>> {
    Ok(state.board.update_post_comment(id, req).await?)
}

pub async fn delete_post_comment(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
) -> ApiResult<Envelope<Comment>> {
    Ok(state.board.delete_post_comment(id).await?)
}

pub async fn get_user_policies(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Envelope<Vec<Policy>>> {
    Ok(state.board.get_user_policies(&user).await?)
}

pub async fn create_policies(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidJson(req): ValidJson<PoliciesRequest>,
) -> ApiResult<Envelope<Vec<Policy>>> {
    Ok(state.board.create_policies(&user, req).await?)
}

/// Admin reset of every acceptance record
pub async fn delete_policies(State(state): State<AppState>) -> ApiResult<Envelope<Deleted>> {
    Ok(state.board.delete_policies().await?)
}
