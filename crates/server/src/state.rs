use axum::extract::FromRef;
use sea_orm::DatabaseConnection;
use service::session::SessionProvider;

#[derive(Clone)]
pub struct ServerState {
    pub sessions: SessionProvider,
}

impl ServerState {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { sessions: SessionProvider::new(db) }
    }
}

impl FromRef<ServerState> for SessionProvider {
    fn from_ref(state: &ServerState) -> Self { state.sessions.clone() }
}
