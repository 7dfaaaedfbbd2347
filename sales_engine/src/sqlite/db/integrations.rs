use sales_common::Secret;
use sqlx::SqliteConnection;

use super::SqliteDatabaseError;
use crate::db_types::Integration;

pub async fn fetch_integration(
    user_id: i64,
    provider: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Integration>, SqliteDatabaseError> {
    let integration = sqlx::query_as::<_, Integration>(
        r#"
            SELECT id, user_id, integration_type, token_value, created_at, updated_at
            FROM integrations
            WHERE user_id = ? AND integration_type = ?
        "#,
    )
    .bind(user_id)
    .bind(provider)
    .fetch_optional(conn)
    .await?;
    Ok(integration)
}

pub async fn fetch_integrations_for_provider(
    provider: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<Integration>, SqliteDatabaseError> {
    let integrations = sqlx::query_as::<_, Integration>(
        r#"
            SELECT id, user_id, integration_type, token_value, created_at, updated_at
            FROM integrations
            WHERE integration_type = ? AND trim(token_value) <> ''
            ORDER BY user_id
        "#,
    )
    .bind(provider)
    .fetch_all(conn)
    .await?;
    Ok(integrations)
}

pub async fn upsert_integration(
    user_id: i64,
    provider: &str,
    token: &Secret<String>,
    conn: &mut SqliteConnection,
) -> Result<(), SqliteDatabaseError> {
    sqlx::query(
        r#"
            INSERT INTO integrations (user_id, integration_type, token_value) VALUES (?, ?, ?)
            ON CONFLICT (user_id, integration_type) DO UPDATE SET
                token_value = excluded.token_value,
                updated_at = CURRENT_TIMESTAMP;
        "#,
    )
    .bind(user_id)
    .bind(provider)
    .bind(token.reveal())
    .execute(conn)
    .await?;
    Ok(())
}
