/// Chapter model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE chapters (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL,
///     module_id UUID NOT NULL REFERENCES modules(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::ContentChanges;

/// Chapter model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: Uuid,
    pub title: String,
    pub description: String,

    /// Owning module
    pub module_id: Uuid,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new chapter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateChapter {
    pub title: String,
    pub description: String,
    pub module_id: Uuid,
}

impl Chapter {
    /// Creates a new chapter under an existing module
    pub async fn create(pool: &PgPool, data: CreateChapter) -> Result<Self, sqlx::Error> {
        let chapter = sqlx::query_as::<_, Chapter>(
            r#"
            INSERT INTO chapters (title, description, module_id)
            VALUES ($1, $2, $3)
            RETURNING id, title, description, module_id, created_at, updated_at
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.module_id)
        .fetch_one(pool)
        .await?;

        Ok(chapter)
    }

    /// Finds a chapter by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let chapter = sqlx::query_as::<_, Chapter>(
            r#"
            SELECT id, title, description, module_id, created_at, updated_at
            FROM chapters
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(chapter)
    }

    /// Lists the chapters of a module, oldest first
    pub async fn list_by_module(pool: &PgPool, module_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let chapters = sqlx::query_as::<_, Chapter>(
            r#"
            SELECT id, title, description, module_id, created_at, updated_at
            FROM chapters
            WHERE module_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(module_id)
        .fetch_all(pool)
        .await?;

        Ok(chapters)
    }

    /// Merges `changes` into the chapter
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        changes: ContentChanges,
    ) -> Result<Option<Self>, sqlx::Error> {
        let chapter = sqlx::query_as::<_, Chapter>(
            r#"
            UPDATE chapters
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, description, module_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(changes.title)
        .bind(changes.description)
        .fetch_optional(pool)
        .await?;

        Ok(chapter)
    }

    /// Deletes a chapter and its sections
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM chapters WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
