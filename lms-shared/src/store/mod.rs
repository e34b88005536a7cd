/// Persistence gateway
///
/// Services talk to storage through the [`Store`] trait object rather than a
/// concrete pool, so the same service code runs against PostgreSQL in
/// production and against an in-process store in tests.
///
/// The gateway is split by concern:
///
/// - [`UserStore`]: user accounts
/// - [`CourseStore`]: course tree (course, module, chapter, section) and assignments
/// - [`ProgressStore`]: chapter progress and last-seen markers
/// - [`BoardStore`]: posts, comments and policy acceptances
///
/// # Implementations
///
/// - [`PgStore`]: sqlx/PostgreSQL, delegating to the model functions
/// - [`MemoryStore`]: `tokio::sync::RwLock` over in-memory tables, enforcing the
///   same unique/foreign-key constraints and cascades as the SQL schema
///
/// # Example
///
/// ```
/// use lms_shared::store::{CourseStore, MemoryStore, Store};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), lms_shared::store::StoreError> {
/// let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
/// store.ping().await?;
/// assert!(store.list_courses().await?.is_empty());
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use uuid::Uuid;

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

mod memory;
mod pg;

pub use memory::MemoryStore;
pub use pg::PgStore;

/// Error type for persistence operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write
    #[error("Unique constraint failed: {0}")]
    UniqueViolation(String),

    /// A referenced parent row doesn't exist
    #[error("Foreign key constraint failed: {0}")]
    ForeignKeyViolation(String),

    /// Any other database failure
    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let constraint = db_err.constraint().unwrap_or("unknown").to_string();
            if db_err.is_unique_violation() {
                return StoreError::UniqueViolation(constraint);
            }
            if db_err.is_foreign_key_violation() {
                return StoreError::ForeignKeyViolation(constraint);
            }
        }
        StoreError::Database(err)
    }
}

/// Result alias for gateway calls
pub type StoreResult<T> = Result<T, StoreError>;

/// User accounts
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn list_users(&self) -> StoreResult<Vec<User>>;
    async fn create_user(&self, data: CreateUser) -> StoreResult<User>;

    /// Returns None when the user doesn't exist
    async fn update_user(&self, id: Uuid, data: UpdateUser) -> StoreResult<Option<User>>;

    /// Returns false when the user doesn't exist
    async fn delete_user(&self, id: Uuid) -> StoreResult<bool>;
}

/// Course tree and user-course assignments
#[async_trait]
pub trait CourseStore: Send + Sync {
    async fn find_course(&self, id: Uuid) -> StoreResult<Option<Course>>;
    async fn find_course_by_title(&self, title: &str) -> StoreResult<Option<Course>>;
    async fn list_courses(&self) -> StoreResult<Vec<Course>>;
    async fn create_course(&self, data: CreateCourse) -> StoreResult<Course>;
    async fn update_course(&self, id: Uuid, changes: ContentChanges) -> StoreResult<Option<Course>>;
    async fn delete_course(&self, id: Uuid) -> StoreResult<bool>;

    async fn assign_course(&self, user_id: Uuid, course_id: Uuid) -> StoreResult<()>;
    async fn list_assigned_courses(&self, user_id: Uuid) -> StoreResult<Vec<Course>>;
    async fn count_course_assignees(&self, course_id: Uuid) -> StoreResult<i64>;

    async fn find_module(&self, id: Uuid) -> StoreResult<Option<Module>>;
    async fn list_modules(&self, course_id: Uuid) -> StoreResult<Vec<Module>>;
    async fn create_module(&self, data: CreateModule) -> StoreResult<Module>;
    async fn update_module(&self, id: Uuid, changes: ContentChanges) -> StoreResult<Option<Module>>;
    async fn delete_module(&self, id: Uuid) -> StoreResult<bool>;

    async fn find_chapter(&self, id: Uuid) -> StoreResult<Option<Chapter>>;
    async fn list_chapters(&self, module_id: Uuid) -> StoreResult<Vec<Chapter>>;
    async fn create_chapter(&self, data: CreateChapter) -> StoreResult<Chapter>;
    async fn update_chapter(&self, id: Uuid, changes: ContentChanges) -> StoreResult<Option<Chapter>>;
    async fn delete_chapter(&self, id: Uuid) -> StoreResult<bool>;

    async fn find_section(&self, id: Uuid) -> StoreResult<Option<Section>>;
    async fn list_sections(&self, chapter_id: Uuid) -> StoreResult<Vec<Section>>;
    async fn create_section(&self, data: CreateSection) -> StoreResult<Section>;
    async fn update_section(&self, id: Uuid, changes: ContentChanges) -> StoreResult<Option<Section>>;
    async fn delete_section(&self, id: Uuid) -> StoreResult<bool>;
}

/// Chapter progress and last-seen markers
#[async_trait]
pub trait ProgressStore: Send + Sync {
    async fn upsert_chapter_progress(&self, data: UpsertChapterProgress) -> StoreResult<ChapterProgress>;
    async fn find_chapter_progress(&self, user_id: Uuid, chapter_id: Uuid) -> StoreResult<Option<ChapterProgress>>;
    async fn list_chapter_progress(&self, user_id: Uuid, course_id: Uuid) -> StoreResult<Vec<ChapterProgress>>;
    async fn count_completed_chapters(&self, course_id: Uuid) -> StoreResult<i64>;

    async fn upsert_last_seen(&self, user_id: Uuid, course_id: Uuid, section_id: Uuid) -> StoreResult<LastSeen>;
    async fn find_last_seen(&self, user_id: Uuid, course_id: Uuid) -> StoreResult<Option<LastSeen>>;
}

/// Posts, comments and policy acceptances
#[async_trait]
pub trait BoardStore: Send + Sync {
    async fn find_post(&self, id: Uuid) -> StoreResult<Option<Post>>;

    /// Newest first
    async fn list_posts(&self, course_id: Uuid) -> StoreResult<Vec<Post>>;
    async fn create_post(&self, data: CreatePost) -> StoreResult<Post>;
    async fn update_post(&self, id: Uuid, changes: PostChanges) -> StoreResult<Option<Post>>;
    async fn delete_post(&self, id: Uuid) -> StoreResult<bool>;

    async fn find_comment(&self, id: Uuid) -> StoreResult<Option<Comment>>;
    async fn list_comments(&self, post_id: Uuid) -> StoreResult<Vec<Comment>>;
    async fn create_comment(&self, data: CreateComment) -> StoreResult<Comment>;
    async fn update_comment(&self, id: Uuid, content: String) -> StoreResult<Option<Comment>>;
    async fn delete_comment(&self, id: Uuid) -> StoreResult<bool>;

    async fn create_policies(&self, user_id: Uuid, names: Vec<String>) -> StoreResult<Vec<Policy>>;
    async fn list_policies(&self, user_id: Uuid) -> StoreResult<Vec<Policy>>;
    async fn delete_all_policies(&self) -> StoreResult<u64>;
}

/// Complete persistence gateway
#[async_trait]
pub trait Store: UserStore + CourseStore + ProgressStore + BoardStore {
    /// Short backend name for health reporting
    fn backend(&self) -> &'static str;

    /// Verifies the backend is reachable
    async fn ping(&self) -> StoreResult<()>;
}
