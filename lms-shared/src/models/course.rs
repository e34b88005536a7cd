/// Course model and database operations
///
/// Courses are the root of the content tree (course → module → chapter →
/// section). Titles are unique. Users are linked to courses through the
/// `course_assignments` join table.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE courses (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT courses_title_key UNIQUE (title)
/// );
///
/// CREATE TABLE course_assignments (
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     course_id UUID NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
///     assigned_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (user_id, course_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::ContentChanges;

/// Course model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: Uuid,

    /// Unique course title
    pub title: String,

    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new course
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCourse {
    pub title: String,
    pub description: String,
}

impl Course {
    /// Creates a new course
    ///
    /// # Errors
    ///
    /// Fails with a unique violation on `courses_title_key` when the title is taken.
    pub async fn create(pool: &PgPool, data: CreateCourse) -> Result<Self, sqlx::Error> {
        let course = sqlx::query_as::<_, Course>(
            r#"
            INSERT INTO courses (title, description)
            VALUES ($1, $2)
            RETURNING id, title, description, created_at, updated_at
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .fetch_one(pool)
        .await?;

        Ok(course)
    }

    /// Finds a course by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let course = sqlx::query_as::<_, Course>(
            r#"
            SELECT id, title, description, created_at, updated_at
            FROM courses
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(course)
    }

    /// Finds a course by its unique title
    pub async fn find_by_title(pool: &PgPool, title: &str) -> Result<Option<Self>, sqlx::Error> {
        let course = sqlx::query_as::<_, Course>(
            r#"
            SELECT id, title, description, created_at, updated_at
            FROM courses
            WHERE title = $1
            "#,
        )
        .bind(title)
        .fetch_optional(pool)
        .await?;

        Ok(course)
    }

    /// Lists all courses, oldest first
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let courses = sqlx::query_as::<_, Course>(
            r#"
            SELECT id, title, description, created_at, updated_at
            FROM courses
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(courses)
    }

    /// Merges `changes` into the course
    ///
    /// # Returns
    ///
    /// The updated course, or None if it doesn't exist
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        changes: ContentChanges,
    ) -> Result<Option<Self>, sqlx::Error> {
        let course = sqlx::query_as::<_, Course>(
            r#"
            UPDATE courses
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, description, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(changes.title)
        .bind(changes.description)
        .fetch_optional(pool)
        .await?;

        Ok(course)
    }

    /// Deletes a course and, by cascade, its whole content tree
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Links a user to a course
    ///
    /// Re-assigning an already assigned course is a no-op.
    pub async fn assign(pool: &PgPool, user_id: Uuid, course_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO course_assignments (user_id, course_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, course_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(course_id)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Lists the courses assigned to a user, in assignment order
    pub async fn list_assigned(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let courses = sqlx::query_as::<_, Course>(
            r#"
            SELECT c.id, c.title, c.description, c.created_at, c.updated_at
            FROM courses c
            INNER JOIN course_assignments a ON a.course_id = c.id
            WHERE a.user_id = $1
            ORDER BY a.assigned_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(courses)
    }

    /// Counts users assigned to a course
    pub async fn count_assignees(pool: &PgPool, course_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM course_assignments WHERE course_id = $1")
                .bind(course_id)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }
}
