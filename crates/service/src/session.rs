//! Request-scoped database sessions.
//!
//! A [`Session`] is the unit of work a single request runs against. It holds a
//! handle to the shared pool rather than a checked-out connection: reads borrow
//! a connection per statement, and every mutation runs inside a transaction
//! opened through [`Session::begin`]. A transaction that is dropped before
//! `commit` is rolled back and its connection goes back to the pool, so any
//! early return or error leaves the store unchanged.

use std::time::Instant;

use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use tracing::debug;

use crate::errors::ServiceError;

/// Hands out sessions over one connection pool. Cheap to clone.
#[derive(Clone, Debug)]
pub struct SessionProvider {
    db: DatabaseConnection,
}

impl SessionProvider {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }

    /// Open a session for one request.
    pub fn open(&self) -> Session {
        debug!("session opened");
        Session { db: self.db.clone(), opened_at: Instant::now() }
    }

    pub fn connection(&self) -> &DatabaseConnection { &self.db }
}

#[derive(Debug)]
pub struct Session {
    db: DatabaseConnection,
    opened_at: Instant,
}

impl Session {
    /// Connection used for reads that need no transaction.
    pub fn connection(&self) -> &DatabaseConnection { &self.db }

    /// Start a transaction for a mutation. Callers must `commit` it; dropping
    /// it rolls back.
    pub async fn begin(&self) -> Result<DatabaseTransaction, ServiceError> {
        Ok(self.db.begin().await?)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        debug!(elapsed_ms = self.opened_at.elapsed().as_millis() as u64, "session released");
    }
}
