use anyhow::{Context, Result, anyhow};
use std::fs;
use std::path::{Path, PathBuf};

use super::record::RepairSession;

/// Directory of `<uuid>.json` session files.
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn load(&self, uuid: &str) -> Result<RepairSession> {
        let uuid = uuid.trim();
        if uuid.is_empty() || uuid.contains(['/', '\\']) || uuid.starts_with('.') {
            return Err(anyhow!("invalid session id '{}'", uuid));
        }
        let path = self.session_path(uuid);
        if !path.exists() {
            return Err(anyhow!("session '{}' not found", uuid));
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read session file: {}", path.display()))?;
        let session: RepairSession = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse session JSON: {}", path.display()))?;
        Ok(session)
    }

    pub fn save(&self, session: &RepairSession) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).with_context(|| {
            format!("failed to create sessions directory: {}", self.dir.display())
        })?;
        let path = self.session_path(&session.uuid);
        let content = serde_json::to_string_pretty(session)?;
        fs::write(&path, content)
            .with_context(|| format!("failed to write session file: {}", path.display()))?;
        Ok(path)
    }

    fn session_path(&self, uuid: &str) -> PathBuf {
        self.dir.join(format!("{}.json", uuid))
    }
}
