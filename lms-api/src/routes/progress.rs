/// Learner progress endpoints
///
/// Writes are behind the user-only guard and act on the caller. Reads take
/// `/:user_id/:course_id` from the path.

use crate::{
    app::AppState,
    envelope::Envelope,
    error::ApiResult,
    extract::{CurrentUser, ValidJson, ValidPath},
    services::progress::{ChapterProgressRequest, LastSeenRequest},
};
use axum::extract::State;
use lms_shared::models::progress::{ChapterProgress, LastSeen};
use uuid::Uuid;

pub async fn update_user_chapter_progress(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidJson(req): ValidJson<ChapterProgressRequest>,
) -> ApiResult<Envelope<ChapterProgress>> {
    Ok(state.progress.update_user_chapter_progress(req, &user).await?)
}

pub async fn get_user_chapter_progress(
    State(state): State<AppState>,
    ValidPath((user_id, course_id)): ValidPath<(Uuid, Uuid)>,
) -> ApiResult<Envelope<Vec<ChapterProgress>>> {
    Ok(state.progress.get_user_chapter_progress(user_id, course_id).await?)
}

pub async fn get_last_seen(
    State(state): State<AppState>,
    ValidPath((user_id, course_id)): ValidPath<(Uuid, Uuid)>,
) -> ApiResult<Envelope<LastSeen>> {
    Ok(state.progress.get_last_seen(user_id, course_id).await?)
}

pub async fn update_last_seen(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidJson(req): ValidJson<LastSeenRequest>,
) -> ApiResult<Envelope<LastSeen>> {
    Ok(state.progress.update_last_seen(req, &user).await?)
}
