#![cfg(test)]
use configs::DatabaseConfig;
use models::db::{connect_with_config, init_schema};

use crate::session::SessionProvider;

/// Isolated in-memory database per test, schema applied through the same
/// bootstrap the server runs at startup.
pub async fn get_db() -> Result<SessionProvider, anyhow::Error> {
    let cfg = DatabaseConfig {
        url: "sqlite::memory:".into(),
        // one connection, so every statement sees the same in-memory file
        max_connections: 1,
        min_connections: 1,
        ..DatabaseConfig::default()
    };
    let db = connect_with_config(&cfg).await?;
    init_schema(&db).await?;
    Ok(SessionProvider::new(db))
}
