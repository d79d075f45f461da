use thiserror::Error;

/// Data-access failures. Absence is not an error here: lookups return
/// `Option` and deletes return `bool`.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("database error: {0}")]
    Db(String),
}

impl From<sea_orm::DbErr> for ServiceError {
    fn from(e: sea_orm::DbErr) -> Self { Self::Db(e.to_string()) }
}
