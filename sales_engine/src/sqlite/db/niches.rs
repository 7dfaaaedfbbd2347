use sqlx::SqliteConnection;

use super::SqliteDatabaseError;

pub async fn fetch_niche(user_id: i64, sku: &str, conn: &mut SqliteConnection) -> Result<Option<String>, SqliteDatabaseError> {
    let niche = sqlx::query_scalar("SELECT niche FROM sku_niches WHERE user_id = ? AND sku = ?")
        .bind(user_id)
        .bind(sku)
        .fetch_optional(conn)
        .await?;
    Ok(niche)
}

pub async fn upsert_niche(
    user_id: i64,
    sku: &str,
    niche: &str,
    conn: &mut SqliteConnection,
) -> Result<(), SqliteDatabaseError> {
    sqlx::query(
        r#"
            INSERT INTO sku_niches (user_id, sku, niche) VALUES (?, ?, ?)
            ON CONFLICT (user_id, sku) DO UPDATE SET niche = excluded.niche, updated_at = CURRENT_TIMESTAMP;
        "#,
    )
    .bind(user_id)
    .bind(sku)
    .bind(niche)
    .execute(conn)
    .await?;
    Ok(())
}
