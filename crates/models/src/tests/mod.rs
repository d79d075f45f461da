

use anyhow::Result;
use configs::DatabaseConfig;
use sea_orm::DatabaseConnection;

use crate::db::{connect_with_config, init_schema};

/// Fresh in-memory database with the schema applied. A single pooled
/// connection keeps every query on the same in-memory file.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let cfg = DatabaseConfig {
        url: "sqlite::memory:".into(),
        max_connections: 1,
        min_connections: 1,
        ..DatabaseConfig::default()
    };
    let db = connect_with_config(&cfg).await?;
    init_schema(&db).await?;
    Ok(db)
}
