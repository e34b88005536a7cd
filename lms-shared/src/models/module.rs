/// Module model and database operations
///
/// A module groups chapters inside a course.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE modules (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL,
///     course_id UUID NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::ContentChanges;

/// Module model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub id: Uuid,
    pub title: String,
    pub description: String,

    /// Owning course
    pub course_id: Uuid,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new module
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateModule {
    pub title: String,
    pub description: String,
    pub course_id: Uuid,
}

impl Module {
    /// Creates a new module under an existing course
    ///
    /// # Errors
    ///
    /// Fails with a foreign key violation when `course_id` doesn't exist.
    pub async fn create(pool: &PgPool, data: CreateModule) -> Result<Self, sqlx::Error> {
        let module = sqlx::query_as::<_, Module>(
            r#"
            INSERT INTO modules (title, description, course_id)
            VALUES ($1, $2, $3)
            RETURNING id, title, description, course_id, created_at, updated_at
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.course_id)
        .fetch_one(pool)
        .await?;

        Ok(module)
    }

    /// Finds a module by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let module = sqlx::query_as::<_, Module>(
            r#"
            SELECT id, title, description, course_id, created_at, updated_at
            FROM modules
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(module)
    }

    /// Lists the modules of a course, oldest first
    pub async fn list_by_course(pool: &PgPool, course_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let modules = sqlx::query_as::<_, Module>(
            r#"
            SELECT id, title, description, course_id, created_at, updated_at
            FROM modules
            WHERE course_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(course_id)
        .fetch_all(pool)
        .await?;

        Ok(modules)
    }

    /// Merges `changes` into the module
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        changes: ContentChanges,
    ) -> Result<Option<Self>, sqlx::Error> {
        let module = sqlx::query_as::<_, Module>(
            r#"
            UPDATE modules
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, description, course_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(changes.title)
        .bind(changes.description)
        .fetch_optional(pool)
        .await?;

        Ok(module)
    }

    /// Deletes a module and its chapters
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM modules WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
