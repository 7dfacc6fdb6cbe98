mod record;
mod store;
mod time;

use anyhow::Result;

use crate::paths;

pub use record::{RepairSession, SessionAttempt};
pub use store::SessionStore;

pub fn default_store() -> SessionStore {
    SessionStore::new(paths::sessions_dir())
}

pub fn load_session(uuid: &str) -> Result<RepairSession> {
    default_store().load(uuid)
}

pub fn save_session(session: &RepairSession) -> Result<()> {
    default_store().save(session).map(|_| ())
}
