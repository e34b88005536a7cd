/// PostgreSQL gateway
///
/// Thin adapter from the store traits to the model functions in
/// [`crate::models`]. sqlx errors are classified into [`StoreError`] on the way out.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{BoardStore, CourseStore, ProgressStore, Store, StoreResult, UserStore};
use crate::db::pool::health_check;
use crate::models::{
    chapter::{Chapter, CreateChapter},
    comment::{Comment, CreateComment},
    course::{Course, CreateCourse},
    module::{CreateModule, Module},
    policy::Policy,
    post::{CreatePost, Post, PostChanges},
    progress::{ChapterProgress, LastSeen, UpsertChapterProgress},
    section::{CreateSection, Section},
    user::{CreateUser, UpdateUser, User},
    ContentChanges,
};

/// Store backed by a PostgreSQL connection pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying pool, for migrations and shutdown
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(User::list(&self.pool).await?)
    }

    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        Ok(User::create(&self.pool, data).await?)
    }

    async fn update_user(&self, id: Uuid, data: UpdateUser) -> StoreResult<Option<User>> {
        Ok(User::update(&self.pool, id, data).await?)
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        Ok(User::delete(&self.pool, id).await?)
    }
}

#[async_trait]
impl CourseStore for PgStore {
    async fn find_course(&self, id: Uuid) -> StoreResult<Option<Course>> {
        Ok(Course::find_by_id(&self.pool, id).await?)
    }

    async fn find_course_by_title(&self, title: &str) -> StoreResult<Option<Course>> {
        Ok(Course::find_by_title(&self.pool, title).await?)
    }

    async fn list_courses(&self) -> StoreResult<Vec<Course>> {
        Ok(Course::list(&self.pool).await?)
    }

    async fn create_course(&self, data: CreateCourse) -> StoreResult<Course> {
        Ok(Course::create(&self.pool, data).await?)
    }

    async fn update_course(&self, id: Uuid, changes: ContentChanges) -> StoreResult<Option<Course>> {
        Ok(Course::update(&self.pool, id, changes).await?)
    }

    async fn delete_course(&self, id: Uuid) -> StoreResult<bool> {
        Ok(Course::delete(&self.pool, id).await?)
    }

    async fn assign_course(&self, user_id: Uuid, course_id: Uuid) -> StoreResult<()> {
        Ok(Course::assign(&self.pool, user_id, course_id).await?)
    }

    async fn list_assigned_courses(&self, user_id: Uuid) -> StoreResult<Vec<Course>> {
        Ok(Course::list_assigned(&self.pool, user_id).await?)
    }

    async fn count_course_assignees(&self, course_id: Uuid) -> StoreResult<i64> {
        Ok(Course::count_assignees(&self.pool, course_id).await?)
    }

    async fn find_module(&self, id: Uuid) -> StoreResult<Option<Module>> {
        Ok(Module::find_by_id(&self.pool, id).await?)
    }

    async fn list_modules(&self, course_id: Uuid) -> StoreResult<Vec<Module>> {
        Ok(Module::list_by_course(&self.pool, course_id).await?)
    }

    async fn create_module(&self, data: CreateModule) -> StoreResult<Module> {
        Ok(Module::create(&self.pool, data).await?)
    }

    async fn update_module(&self, id: Uuid, changes: ContentChanges) -> StoreResult<Option<Module>> {
        Ok(Module::update(&self.pool, id, changes).await?)
    }

    async fn delete_module(&self, id: Uuid) -> StoreResult<bool> {
        Ok(Module::delete(&self.pool, id).await?)
    }

    async fn find_chapter(&self, id: Uuid) -> StoreResult<Option<Chapter>> {
        Ok(Chapter::find_by_id(&self.pool, id).await?)
    }

    async fn list_chapters(&self, module_id: Uuid) -> StoreResult<Vec<Chapter>> {
        Ok(Chapter::list_by_module(&self.pool, module_id).await?)
    }

    async fn create_chapter(&self, data: CreateChapter) -> StoreResult<Chapter> {
        Ok(Chapter::create(&self.pool, data).await?)
    }

    async fn update_chapter(&self, id: Uuid, changes: ContentChanges) -> StoreResult<Option<Chapter>> {
        Ok(Chapter::update(&self.pool, id, changes).await?)
    }

    async fn delete_chapter(&self, id: Uuid) -> StoreResult<bool> {
        Ok(Chapter::delete(&self.pool, id).await?)
    }

    async fn find_section(&self, id: Uuid) -> StoreResult<Option<Section>> {
        Ok(Section::find_by_id(&self.pool, id).await?)
    }

    async fn list_sections(&self, chapter_id: Uuid) -> StoreResult<Vec<Section>> {
        Ok(Section::list_by_chapter(&self.pool, chapter_id).await?)
    }

    async fn create_section(&self, data: CreateSection) -> StoreResult<Section> {
        Ok(Section::create(&self.pool, data).await?)
    }

    async fn update_section(&self, id: Uuid, changes: ContentChanges) -> StoreResult<Option<Section>> {
        Ok(Section::update(&self.pool, id, changes).await?)
    }

    async fn delete_section(&self, id: Uuid) -> StoreResult<bool> {
        Ok(Section::delete(&self.pool, id).await?)
    }
}

#[async_trait]
impl ProgressStore for PgStore {
    async fn upsert_chapter_progress(&self, data: UpsertChapterProgress) -> StoreResult<ChapterProgress> {
        Ok(ChapterProgress::upsert(&self.pool, data).await?)
    }

    async fn find_chapter_progress(&self, user_id: Uuid, chapter_id: Uuid) -> StoreResult<Option<ChapterProgress>> {
        Ok(ChapterProgress::find(&self.pool, user_id, chapter_id).await?)
    }

    async fn list_chapter_progress(&self, user_id: Uuid, course_id: Uuid) -> StoreResult<Vec<ChapterProgress>> {
        Ok(ChapterProgress::list_by_user_course(&self.pool, user_id, course_id).await?)
    }

    async fn count_completed_chapters(&self, course_id: Uuid) -> StoreResult<i64> {
        Ok(ChapterProgress::count_completed(&self.pool, course_id).await?)
    }

    async fn upsert_last_seen(&self, user_id: Uuid, course_id: Uuid, section_id: Uuid) -> StoreResult<LastSeen> {
        Ok(LastSeen::upsert(&self.pool, user_id, course_id, section_id).await?)
    }

    async fn find_last_seen(&self, user_id: Uuid, course_id: Uuid) -> StoreResult<Option<LastSeen>> {
        Ok(LastSeen::find(&self.pool, user_id, course_id).await?)
    }
}

#[async_trait]
impl BoardStore for PgStore {
    async fn find_post(&self, id: Uuid) -> StoreResult<Option<Post>> {
        Ok(Post::find_by_id(&self.pool, id).await?)
    }

    async fn list_posts(&self, course_id: Uuid) -> StoreResult<Vec<Post>> {
        Ok(Post::list_by_course(&self.pool, course_id).await?)
    }

    async fn create_post(&self, data: CreatePost) -> StoreResult<Post> {
        Ok(Post::create(&self.pool, data).await?)
    }

    async fn update_post(&self, id: Uuid, changes: PostChanges) -> StoreResult<Option<Post>> {
        Ok(Post::update(&self.pool, id, changes).await?)
    }

    async fn delete_post(&self, id: Uuid) -> StoreResult<bool> {
        Ok(Post::delete(&self.pool, id).await?)
    }

    async fn find_comment(&self, id: Uuid) -> StoreResult<Option<Comment>> {
        Ok(Comment::find_by_id(&self.pool, id).await?)
    }

    async fn list_comments(&self, post_id: Uuid) -> StoreResult<Vec<Comment>> {
        Ok(Comment::list_by_post(&self.pool, post_id).await?)
    }

    async fn create_comment(&self, data: CreateComment) -> StoreResult<Comment> {
        Ok(Comment::create(&self.pool, data).await?)
    }

    async fn update_comment(&self, id: Uuid, content: String) -> StoreResult<Option<Comment>> {
        Ok(Comment::update(&self.pool, id, content).await?)
    }

    async fn delete_comment(&self, id: Uuid) -> StoreResult<bool> {
        Ok(Comment::delete(&self.pool, id).await?)
    }

    async fn create_policies(&self, user_id: Uuid, names: Vec<String>) -> StoreResult<Vec<Policy>> {
        Ok(Policy::create_many(&self.pool, user_id, names).await?)
    }

    async fn list_policies(&self, user_id: Uuid) -> StoreResult<Vec<Policy>> {
        Ok(Policy::list_by_user(&self.pool, user_id).await?)
    }

    async fn delete_all_policies(&self) -> StoreResult<u64> {
        Ok(Policy::delete_all(&self.pool).await?)
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(health_check(&self.pool).await?)
    }
}
