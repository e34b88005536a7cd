/// Section model and database operations
///
/// Sections are the leaves of the content tree.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE sections (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL,
///     chapter_id UUID NOT NULL REFERENCES chapters(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::ContentChanges;

/// Section model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: Uuid,
    pub title: String,
    pub description: String,

    /// Owning chapter
    pub chapter_id: Uuid,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSection {
    pub title: String,
    pub description: String,
    pub chapter_id: Uuid,
}

impl Section {
    pub async fn create(pool: &PgPool, data: CreateSection) -> Result<Self, sqlx::Error> {
        let section = sqlx::query_as::<_, Section>(
            r#"
            INSERT INTO sections (title, description, chapter_id)
            VALUES ($1, $2, $3)
            RETURNING id, title, description, chapter_id, created_at, updated_at
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.chapter_id)
        .fetch_one(pool)
        .await?;

        Ok(section)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let section = sqlx::query_as::<_, Section>(
            r#"
            SELECT id, title, description, chapter_id, created_at, updated_at
            FROM sections
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(section)
    }

    /// Lists the sections of a chapter, oldest first
    pub async fn list_by_chapter(pool: &PgPool, chapter_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let sections = sqlx::query_as::<_, Section>(
            r#"
            SELECT id, title, description, chapter_id, created_at, updated_at
            FROM sections
            WHERE chapter_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(chapter_id)
        .fetch_all(pool)
        .await?;

        Ok(sections)
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        changes: ContentChanges,
    ) -> Result<Option<Self>, sqlx::Error> {
        let section = sqlx::query_as::<_, Section>(
            r#"
            UPDATE sections
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, description, chapter_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(changes.title)
        .bind(changes.description)
        .fetch_optional(pool)
        .await?;

        Ok(section)
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sections WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
