use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use uuid::Uuid;

/// Connection registry backing the "online now" counter. The notification
/// gateway registers a connection per socket and unregisters it on
/// disconnect; a user with several open connections counts once. Not part
/// of any feed read path.
#[derive(Clone, Default)]
pub struct PresenceRegistry {
    connections: Arc<Mutex<HashMap<Uuid, Uuid>>>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, Uuid>> {
        match self.connections.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn register(&self, user_id: Uuid) -> Uuid {
        let connection_id = Uuid::new_v4();
        self.lock().insert(connection_id, user_id);
        connection_id
    }

    pub fn unregister(&self, connection_id: Uuid) -> bool {
        self.lock().remove(&connection_id).is_some()
    }

    pub fn online_count(&self) -> usize {
        self.lock().values().collect::<HashSet<_>>().len()
    }
}
