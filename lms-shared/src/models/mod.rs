/// Database models for the courseware backend
///
/// This module contains all database models and their CRUD operations.
/// Every model exposes associated functions that take a `&PgPool`; the
/// [`crate::store::PgStore`] gateway delegates to them.
///
/// # Models
///
/// - `user`: User accounts, roles and credentials
/// - `course`: Courses and user-course assignments
/// - `module`: Modules belonging to a course
/// - `chapter`: Chapters belonging to a module
/// - `section`: Sections belonging to a chapter
/// - `post`: Course discussion posts
/// - `comment`: Comments on posts
/// - `policy`: Policies accepted by a user
/// - `progress`: Chapter progress and last-seen markers
///
/// # Example
///
/// ```no_run
/// use lms_shared::models::course::{Course, CreateCourse};
/// use lms_shared::db::pool::{create_pool, PoolConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(PoolConfig::default()).await?;
///
/// let course = Course::create(
///     &pool,
///     CreateCourse {
///         title: "Rust 101".to_string(),
///         description: "Ownership and borrowing".to_string(),
///     },
/// )
/// .await?;
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};

pub mod chapter;
pub mod comment;
pub mod course;
pub mod module;
pub mod policy;
pub mod post;
pub mod progress;
pub mod section;
pub mod user;

/// Field-merge input shared by courses, modules, chapters and sections
///
/// Only `Some` fields are written; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentChanges {
    /// New title
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,
}

impl ContentChanges {
    /// True when no field would be written
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_changes_empty() {
        assert!(ContentChanges::default().is_empty());

        let changes = ContentChanges {
            title: Some("New".to_string()),
            description: None,
        };
        assert!(!changes.is_empty());
    }
}
