use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::AppError;
use crate::flow::session::FlowSession;

/// In-memory session table. Sessions live for the lifetime of the process.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, FlowSession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, session: FlowSession) -> Uuid {
        let id = session.id;
        self.sessions.write().await.insert(id, session);
        id
    }

    /// Runs `f` against a shared view of the session.
    pub async fn read<T>(&self, id: Uuid, f: impl FnOnce(&FlowSession) -> T) -> Result<T, AppError> {
        let sessions = self.sessions.read().await;
        let session = sessions.get(&id).ok_or_else(|| not_found(id))?;
        Ok(f(session))
    }

    /// Runs `f` with exclusive access to the session. Never hold this across an await.
    pub async fn update<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut FlowSession) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or_else(|| not_found(id))?;
        f(session)
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("session {id} not found"))
}
