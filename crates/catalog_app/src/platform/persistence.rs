use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use catalog_core::{SessionData, SessionGate, SESSION_KEY};
use catalog_engine::{AtomicFileWriter, PersistError};
use catalog_logging::{catalog_info, catalog_warn};

/// Mock session storage: one JSON blob named after the session key.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    writer: AtomicFileWriter,
}

impl FileSessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            writer: AtomicFileWriter::new(dir.into()),
        }
    }

    fn filename() -> String {
        format!("{SESSION_KEY}.json")
    }

    pub fn path(&self) -> PathBuf {
        self.writer.dir().join(Self::filename())
    }

    pub fn save(&self, session: &SessionData) -> Result<PathBuf, PersistError> {
        let content = serde_json::to_string_pretty(session)
            .map_err(|err| PersistError::Io(io::Error::new(io::ErrorKind::InvalidData, err)))?;
        let path = self.writer.write(&Self::filename(), &content)?;
        catalog_info!("session stored for {}", session.email);
        Ok(path)
    }

    pub fn clear(&self) -> Result<(), PersistError> {
        self.writer.remove(&Self::filename())?;
        catalog_info!("session cleared");
        Ok(())
    }
}

impl SessionGate for FileSessionStore {
    /// Unreadable or malformed blobs count as no session.
    fn read_session(&self) -> Option<SessionData> {
        read_blob(&self.path())
    }
}

fn read_blob(path: &Path) -> Option<SessionData> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return None,
        Err(err) => {
            catalog_warn!("Failed to read session from {:?}: {}", path, err);
            return None;
        }
    };
    match serde_json::from_str(&content) {
        Ok(session) => Some(session),
        Err(err) => {
            catalog_warn!("Ignoring malformed session blob {:?}: {}", path, err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::{account_access, AccountAccess};
    use tempfile::TempDir;

    #[test]
    fn login_then_logout_round_trip() {
        let temp = TempDir::new().unwrap();
        let store = FileSessionStore::new(temp.path().join("session"));
        assert!(!store.has_session());
        assert_eq!(account_access(&store), AccountAccess::RedirectToLogin);

        let session = SessionData::for_login("maria.perez@example.cl", None, "2024-03-05T10:00:00Z");
        store.save(&session).unwrap();
        assert!(store.has_session());
        assert_eq!(account_access(&store), AccountAccess::Granted(session));

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"createdAt\""));
        assert!(raw.contains("\"Maria Perez\""));

        store.clear().unwrap();
        assert!(!store.has_session());
    }

    #[test]
    fn malformed_or_emailless_blobs_are_not_sessions() {
        let temp = TempDir::new().unwrap();
        let store = FileSessionStore::new(temp.path());

        fs::write(store.path(), "{not json").unwrap();
        assert!(!store.has_session());

        fs::write(store.path(), r#"{"name": "Ana", "email": "  "}"#).unwrap();
        assert!(store.read_session().is_some());
        assert!(!store.has_session());
    }
}
