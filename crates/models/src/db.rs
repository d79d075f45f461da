use std::time::Duration;

use configs::DatabaseConfig;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema};
use tracing::info;

use crate::{errors::ModelError, product};

/// Open the pool with the limits and timeouts from `[database]`.
pub async fn connect_with_config(cfg: &DatabaseConfig) -> Result<DatabaseConnection, ModelError> {
    let mut opt = ConnectOptions::new(cfg.url.clone());
    opt.max_connections(cfg.max_connections)
        .min_connections(cfg.min_connections)
        .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(cfg.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(cfg.max_lifetime_secs))
        .sqlx_logging(cfg.sqlx_logging);
    Database::connect(opt).await.map_err(ModelError::from)
}

/// Create every table this service owns if it does not exist yet.
///
/// DDL is generated from the entity definitions for whichever backend the
/// connection speaks, so the column constraints live in exactly one place.
/// Existing tables are left untouched: there is no migration step.
pub async fn init_schema(db: &DatabaseConnection) -> Result<(), ModelError> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    let mut stmt = schema.create_table_from_entity(product::Entity);
    stmt.if_not_exists();
    db.execute(backend.build(&stmt)).await?;
    info!(table = "products", backend = ?backend, "schema ensured");
    Ok(())
}
