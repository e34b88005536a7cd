/// Learner progress: chapter completion and last-seen section
///
/// # Schema
///
/// ```sql
/// CREATE TABLE chapter_progress (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     course_id UUID NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
///     chapter_id UUID NOT NULL REFERENCES chapters(id) ON DELETE CASCADE,
///     completed BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT chapter_progress_user_chapter_key UNIQUE (user_id, chapter_id)
/// );
///
/// CREATE TABLE last_seen (
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     course_id UUID NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
///     section_id UUID NOT NULL REFERENCES sections(id) ON DELETE CASCADE,
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (user_id, course_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Completion state of one chapter for one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ChapterProgress {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub chapter_id: Uuid,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for recording chapter progress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertChapterProgress {
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub chapter_id: Uuid,
    pub completed: bool,
}

/// Last section a user opened in a course
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LastSeen {
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub section_id: Uuid,
    pub updated_at: DateTime<Utc>,
}

impl ChapterProgress {
    /// Inserts or overwrites the (user, chapter) progress row
    pub async fn upsert(pool: &PgPool, data: UpsertChapterProgress) -> Result<Self, sqlx::Error> {
        let progress = sqlx::query_as::<_, ChapterProgress>(
            r#"
            INSERT INTO chapter_progress (user_id, course_id, chapter_id, completed)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, chapter_id) DO UPDATE
            SET completed = EXCLUDED.completed,
                course_id = EXCLUDED.course_id,
                updated_at = NOW()
            RETURNING id, user_id, course_id, chapter_id, completed, created_at, updated_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.course_id)
        .bind(data.chapter_id)
        .bind(data.completed)
        .fetch_one(pool)
        .await?;

        Ok(progress)
    }

    /// Finds the progress row of a user for one chapter
    pub async fn find(
        pool: &PgPool,
        user_id: Uuid,
        chapter_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let progress = sqlx::query_as::<_, ChapterProgress>(
            r#"
            SELECT id, user_id, course_id, chapter_id, completed, created_at, updated_at
            FROM chapter_progress
            WHERE user_id = $1 AND chapter_id = $2
            "#,
        )
        .bind(user_id)
        .bind(chapter_id)
        .fetch_optional(pool)
        .await?;

        Ok(progress)
    }

    /// Lists a user's progress rows within a course
    pub async fn list_by_user_course(
        pool: &PgPool,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let rows = sqlx::query_as::<_, ChapterProgress>(
            r#"
            SELECT id, user_id, course_id, chapter_id, completed, created_at, updated_at
            FROM chapter_progress
            WHERE user_id = $1 AND course_id = $2
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    /// Counts completed chapter rows across all users of a course
    pub async fn count_completed(pool: &PgPool, course_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM chapter_progress WHERE course_id = $1 AND completed = TRUE",
        )
        .bind(course_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }
}

impl LastSeen {
    /// Inserts or moves the (user, course) marker
    pub async fn upsert(
        pool: &PgPool,
        user_id: Uuid,
        course_id: Uuid,
        section_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let last_seen = sqlx::query_as::<_, LastSeen>(
            r#"
            INSERT INTO last_seen (user_id, course_id, section_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, course_id) DO UPDATE
            SET section_id = EXCLUDED.section_id, updated_at = NOW()
            RETURNING user_id, course_id, section_id, updated_at
            "#,
        )
        .bind(user_id)
        .bind(course_id)
        .bind(section_id)
        .fetch_one(pool)
        .await?;

        Ok(last_seen)
    }

    pub async fn find(
        pool: &PgPool,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let last_seen = sqlx::query_as::<_, LastSeen>(
            r#"
            SELECT user_id, course_id, section_id, updated_at
            FROM last_seen
            WHERE user_id = $1 AND course_id = $2
            "#,
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_optional(pool)
        .await?;

        Ok(last_seen)
    }
}
