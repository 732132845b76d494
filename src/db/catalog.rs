use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

use crate::{error::AppResult, models::CatalogRow};

/// Creates a SQLite connection pool for the catalog store
///
/// The catalog is only read once at startup, so a small pool is enough.
pub async fn create_pool(database_url: &str) -> anyhow::Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(2)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Loads every catalog row in rowid order.
///
/// `appid` is the table's `INTEGER PRIMARY KEY`, so rowid order is appid order.
pub async fn load_catalog(pool: &SqlitePool) -> AppResult<Vec<CatalogRow>> {
    let rows = sqlx::query_as::<_, CatalogRow>(
        r#"
        SELECT appid, name, description, genres
        FROM catalog
        ORDER BY rowid
        "#,
    )
    .fetch_all(pool)
    .await?;

    tracing::info!(rows = rows.len(), "Loaded catalog rows");

    Ok(rows)
}
