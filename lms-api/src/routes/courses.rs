/// Course tree endpoints
///
/// Courses, modules, chapters and sections share one shape: `GET` by id,
/// `GET` all children of a parent, `POST` with the parent id in the body,
/// `PUT` to merge title/description and `DELETE` returning the removed row.
/// Learner views (`user-modules`, `user-sections`), assignment and the
/// admin report live here too.

use crate::{
    app::AppState,
    envelope::Envelope,
    error::ApiResult,
    extract::{CurrentUser, ValidJson, ValidPath},
    services::course::{
        AssignCourseRequest, ChildRequest, ContentUpdateRequest, CourseReport, CourseRequest, Empty, ModuleOutline,
        UserSections,
    },
};
use axum::extract::State;
use lms_shared::models::{chapter::Chapter, course::Course, module::Module, section::Section};
use uuid::Uuid;

// Courses

pub async fn get_all_courses(State(state): State<AppState>) -> ApiResult<Envelope<Vec<Course>>> {
    Ok(state.courses.get_all_courses().await?)
}

pub async fn get_course(State(state): State<AppState>, ValidPath(id): ValidPath<Uuid>) -> ApiResult<Envelope<Course>> {
    Ok(state.courses.get_course(id).await?)
}

pub async fn create_course(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<CourseRequest>,
) -> ApiResult<Envelope<Course>> {
    Ok(state.courses.create_course(req).await?)
}

pub async fn update_course(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
    ValidJson(req): ValidJson<ContentUpdateRequest>,
) -> ApiResult<Envelope<Course>> {
    Ok(state.courses.update_course(id, req).await?)
}

pub async fn delete_course(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
) -> ApiResult<Envelope<Course>> {
    Ok(state.courses.delete_course(id).await?)
}

pub async fn assign_course(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<AssignCourseRequest>,
) -> ApiResult<Envelope<Empty>> {
    Ok(state.courses.assign_course(req).await?)
}

/// Courses assigned to the user in the path
pub async fn get_all_assigned_courses(
    State(state): State<AppState>,
    ValidPath(user_id): ValidPath<Uuid>,
) -> ApiResult<Envelope<Vec<Course>>> {
    Ok(state.courses.get_all_assigned_courses(user_id).await?)
}

pub async fn get_course_report(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
) -> ApiResult<Envelope<CourseReport>> {
    Ok(state.courses.get_course_report(id).await?)
}

// Modules

pub async fn get_all_modules(
    State(state): State<AppState>,
    ValidPath(course_id): ValidPath<Uuid>,
) -> ApiResult<Envelope<Vec<Module>>> {
    Ok(state.courses.get_all_modules(course_id).await?)
}

pub async fn get_all_user_modules(
    State(state): State<AppState>,
    ValidPath(course_id): ValidPath<Uuid>,
) -> ApiResult<Envelope<Vec<ModuleOutline>>> {
    Ok(state.courses.get_all_user_modules(course_id).await?)
}

pub async fn get_module(State(state): State<AppState>, ValidPath(id): ValidPath<Uuid>) -> ApiResult<Envelope<Module>> {
    Ok(state.courses.get_module(id).await?)
}

pub async fn create_module(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<ChildRequest>,
) -> ApiResult<Envelope<Module>> {
    Ok(state.courses.create_module(req).await?)
}

pub async fn update_module(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
    ValidJson(req): ValidJson<ContentUpdateRequest>,
) -> ApiResult<Envelope<Module>> {
    Ok(state.courses.update_module(id, req).await?)
}

pub async fn delete_module(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
) -> ApiResult<Envelope<Module>> {
    Ok(state.courses.delete_module(id).await?)
}

// Chapters

pub async fn get_all_chapters(
    State(state): State<AppState>,
    ValidPath(module_id): ValidPath<Uuid>,
) -> ApiResult<Envelope<Vec<Chapter>>> {
    Ok(state.courses.get_all_chapters(module_id).await?)
}

pub async fn get_chapter(State(state): State<AppState>, ValidPath(id): ValidPath<Uuid>) -> ApiResult<Envelope<Chapter>> {
    Ok(state.courses.get_chapter(id).await?)
}

pub async fn create_chapter(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<ChildRequest>,
) -> ApiResult<Envelope<Chapter>> {
    Ok(state.courses.create_chapter(req).await?)
}

pub async fn update_chapter(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
    ValidJson(req): ValidJson<ContentUpdateRequest>,
) -> ApiResult<Envelope<Chapter>> {
    Ok(state.courses.update_chapter(id, req).await?)
}

pub async fn delete_chapter(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
) -> ApiResult<Envelope<Chapter>> {
    Ok(state.courses.delete_chapter(id).await?)
}

// Sections

pub async fn get_all_sections(
    State(state): State<AppState>,
    ValidPath(chapter_id): ValidPath<Uuid>,
) -> ApiResult<Envelope<Vec<Section>>> {
    Ok(state.courses.get_all_sections(chapter_id).await?)
}

/// Sections with the caller's completion flag for the chapter
pub async fn get_all_user_sections(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidPath(chapter_id): ValidPath<Uuid>,
) -> ApiResult<Envelope<UserSections>> {
    Ok(state.courses.get_all_user_sections(chapter_id, &user).await?)
}

pub async fn get_section(State(state): State<AppState>, ValidPath(id): ValidPath<Uuid>) -> ApiResult<Envelope<Section>> {
    Ok(state.courses.get_section(id).await?)
}

pub async fn create_section(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<ChildRequest>,
) -> ApiResult<Envelope<Section>> {
    Ok(state.courses.create_section(req).await?)
}

pub async fn update_section(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
    ValidJson(req): ValidJson<ContentUpdateRequest>,
) -> ApiResult<Envelope<Section>> {
    Ok(state.courses.update_section(id, req).await?)
}

pub async fn delete_section(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
) -> ApiResult<Envelope<Section>> {
    Ok(state.courses.delete_section(id).await?)
}
