use std::{collections::HashMap, sync::Arc};

use coach_core::SessionController;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;
use uuid::Uuid;

/// Handle to one session. The mutex serializes that session's events.
pub type SessionHandle = Arc<Mutex<SessionController>>;

/// In-memory session table. Sessions live until deleted or process exit.
#[derive(Default)]
pub struct SessionRegistry {
    inner: RwLock<HashMap<Uuid, SessionHandle>>,
}

impl SessionRegistry {
    /// Creates an empty session in `NoProfile` and returns its id.
    pub async fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        let handle = Arc::new(Mutex::new(SessionController::new()));
        let mut map = self.inner.write().await;
        map.insert(id, handle);
        debug!(session_id = %id, live = map.len(), "session created");
        id
    }

    pub async fn get(&self, id: Uuid) -> Option<SessionHandle> {
        self.inner.read().await.get(&id).cloned()
    }

    /// Drops the session; `false` if it did not exist.
    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.inner.write().await.remove(&id).is_some();
        if removed {
            debug!(session_id = %id, "session removed");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}
