use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::domain::entities::Session;
use crate::domain::ports::SessionStore;

// In-memory session store adapter; state is lost when the process exits.
#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    session: Arc<Mutex<Option<Session>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self) -> Result<Option<Session>, String> {
        Ok(self.session.lock().await.clone())
    }

    async fn save(&self, session: Session) -> Result<(), String> {
        *self.session.lock().await = Some(session);
        Ok(())
    }

    async fn clear(&self) -> Result<(), String> {
        *self.session.lock().await = None;
        Ok(())
    }
}

// On-disk layout of the session file. Both keys must be present for a session to exist.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredSession {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    issued_at: u64,
}

// Session store persisted as a small JSON file between CLI invocations.
#[derive(Clone)]
pub struct FileSessionStore {
    path: PathBuf,
    // Serializes writers within this process.
    write_lock: Arc<Mutex<()>>,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<Option<Session>, String> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(format!("read {}: {err}", self.path.display())),
        };

        let stored: StoredSession = match serde_json::from_str(&content) {
            Ok(stored) => stored,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "ignoring unreadable session file");
                return Ok(None);
            }
        };

        match (stored.access_token, stored.refresh_token) {
            (Some(access), Some(refresh)) => Ok(Some(Session::new(access, refresh, stored.issued_at))),
            _ => {
                debug!(path = %self.path.display(), "session file holds an incomplete pair");
                Ok(None)
            }
        }
    }

    async fn save(&self, session: Session) -> Result<(), String> {
        let _guard = self.write_lock.lock().await;

        let stored = StoredSession {
            access_token: Some(session.access().to_string()),
            refresh_token: Some(session.refresh().to_string()),
            issued_at: session.issued_at(),
        };
        let content = serde_json::to_vec_pretty(&stored).map_err(|err| err.to_string())?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| format!("create {}: {err}", parent.display()))?;
        }

        // Write the whole pair to a staging file and rename it into place, so
        // readers never observe one credential without the other.
        let staging = self.staging_path();
        tokio::fs::write(&staging, content)
            .await
            .map_err(|err| format!("write {}: {err}", staging.display()))?;
        tokio::fs::rename(&staging, &self.path)
            .await
            .map_err(|err| format!("rename to {}: {err}", self.path.display()))
    }

    async fn clear(&self) -> Result<(), String> {
        let _guard = self.write_lock.lock().await;

        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(format!("remove {}: {err}", self.path.display())),
        }
    }
}
