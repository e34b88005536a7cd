/// Policy acceptance records
///
/// One row per policy a user has accepted (terms of use, code of conduct, ...).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE policies (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL,
///     accepted_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Accepted policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub accepted_at: DateTime<Utc>,
}

impl Policy {
    /// Records that `user_id` accepted every policy in `names`
    pub async fn create_many(
        pool: &PgPool,
        user_id: Uuid,
        names: Vec<String>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let policies = sqlx::query_as::<_, Policy>(
            r#"
            INSERT INTO policies (user_id, name)
            SELECT $1, name FROM UNNEST($2::text[]) AS t(name)
            RETURNING id, user_id, name, accepted_at
            "#,
        )
        .bind(user_id)
        .bind(names)
        .fetch_all(pool)
        .await?;

        Ok(policies)
    }

    /// Lists the policies accepted by a user
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let policies = sqlx::query_as::<_, Policy>(
            r#"
            SELECT id, user_id, name, accepted_at
            FROM policies
            WHERE user_id = $1
            ORDER BY accepted_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(policies)
    }

    /// Removes every acceptance record
    ///
    /// # Returns
    ///
    /// Number of rows removed
    pub async fn delete_all(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM policies").execute(pool).await?;

        Ok(result.rows_affected())
    }
}
