//! Whole-file JSON persistence for chat sessions.
//!
//! The store is a single JSON object at `~/.config/kamus/kamus_sessions.json`
//! (unless overridden), read once at startup and rewritten in full after every
//! mutation. There is no locking and no atomic replace: one process, one writer.

use std::path::{Path, PathBuf};

use crate::config::StoreConfig;
use crate::error::{KamusError, Result};
use crate::model::SessionMap;

/// File name used when no explicit path is configured.
pub const DEFAULT_STORE_FILE: &str = "kamus_sessions.json";

#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        match config.path.as_deref() {
            Some(p) if !p.trim().is_empty() => Self::new(p),
            _ => Self::new(Self::default_path()),
        }
    }

    /// `<config dir>/kamus/kamus_sessions.json`, or the working directory when
    /// the platform has no config dir.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|p| p.join("kamus"))
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_STORE_FILE)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every session from disk. A missing (or blank) file is an empty store.
    pub fn load(&self) -> Result<SessionMap> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("store: {} not found, starting empty", self.path.display());
                return Ok(SessionMap::new());
            }
            Err(e) => {
                return Err(KamusError::Storage(format!(
                    "failed to read {}: {e}",
                    self.path.display()
                )));
            }
        };

        if contents.trim().is_empty() {
            return Ok(SessionMap::new());
        }

        let sessions: SessionMap = serde_json::from_str(&contents).map_err(|e| {
            KamusError::Storage(format!("failed to parse {}: {e}", self.path.display()))
        })?;
        tracing::debug!(
            "store: loaded {} session(s) from {}",
            sessions.len(),
            self.path.display()
        );
        Ok(sessions)
    }

    /// Overwrite the file with the full session map.
    pub fn save(&self, sessions: &SessionMap) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    KamusError::Storage(format!(
                        "failed to create {}: {e}",
                        parent.display()
                    ))
                })?;
            }
        }
        let json = serde_json::to_string_pretty(sessions)?;
        std::fs::write(&self.path, json).map_err(|e| {
            KamusError::Storage(format!("failed to write {}: {e}", self.path.display()))
        })?;
        tracing::debug!(
            "store: saved {} session(s) to {}",
            sessions.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Created, Message, Session};

    fn temp_store() -> (tempfile::TempDir, SessionStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("sessions.json"));
        (dir, store)
    }

    fn sample_sessions() -> SessionMap {
        let first = Session::new().with_title("Kamus Sunda").with_messages(vec![
            Message::system("prompt"),
            Message::user("wilujeng enjing"),
            Message::assistant("Selamat pagi", "some/model:free"),
        ]);
        let second = Session::new();
        vec![first, second].into_iter().collect()
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let (_dir, store) = temp_store();
        let sessions = store.load().unwrap();
        assert!(sessions.is_empty());
    }

    #[test]
    fn test_load_blank_file_is_empty() {
        let (_dir, store) = temp_store();
        std::fs::write(store.path(), "  \n").unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let (_dir, store) = temp_store();
        let sessions = sample_sessions();
        store.save(&sessions).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded, sessions);
    }

    #[test]
    fn test_save_uses_two_space_indent_and_keeps_unicode() {
        let (_dir, store) = temp_store();
        let session = Session::new().with_messages(vec![Message::system("Indonesia ➜ Sunda")]);
        let id = session.id.clone();
        let sessions: SessionMap = std::iter::once(session).collect();
        store.save(&sessions).unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.starts_with(&format!("{{\n  \"{id}\": {{\n    \"title\"")));
        assert!(raw.contains("Indonesia ➜ Sunda"));
        assert!(!raw.contains("\\u"));
    }

    #[test]
    fn test_save_overwrites_previous_contents() {
        let (_dir, store) = temp_store();
        store.save(&sample_sessions()).unwrap();
        let only: SessionMap = std::iter::once(Session::new()).collect();
        store.save(&only).unwrap();
        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[test]
    fn test_save_creates_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("nested").join("deeper").join("s.json"));
        store.save(&sample_sessions()).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn test_load_python_style_document() {
        let (_dir, store) = temp_store();
        let doc = r#"{
  "1b4e28ba-2fa1-11d2-883f-0016d3cca427": {
    "title": "Sesi Kamus Baru",
    "created": "2024-03-02 08:15:30.123456",
    "messages": [
      {"role": "system", "content": "prompt"},
      {"role": "user", "content": "cai", "timestamp": "2024-03-02 08:16:00"},
      {"role": "assistant", "content": "air", "timestamp": "2024-03-02 08:16:02", "model": "m"}
    ]
  },
  "other": {"title": "Rusak", "created": "bukan tanggal", "messages": []}
}"#;
        std::fs::write(store.path(), doc).unwrap();

        let sessions = store.load().unwrap();
        assert_eq!(sessions.len(), 2);
        let first = sessions.first().unwrap();
        assert_eq!(first.id, "1b4e28ba-2fa1-11d2-883f-0016d3cca427");
        assert_eq!(first.messages.len(), 3);
        assert!(matches!(first.created, Some(Created::At(_))));
        assert_eq!(
            sessions.get("other").unwrap().created,
            Some(Created::Unparsed("bukan tanggal".to_string()))
        );

        // Unparsed values are written back exactly as they were read.
        store.save(&sessions).unwrap();
        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"created\": \"bukan tanggal\""));
        assert!(raw.contains("\"created\": \"2024-03-02 08:15:30.123456\""));
    }

    #[test]
    fn test_numeric_created_survives_save() {
        let (_dir, store) = temp_store();
        std::fs::write(
            store.path(),
            r#"{"s1": {"title": "Lama", "created": 1700000000, "messages": []}}"#,
        )
        .unwrap();

        let sessions = store.load().unwrap();
        store.save(&sessions).unwrap();
        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"created\": 1700000000"));
    }

    #[test]
    fn test_load_invalid_json_is_error() {
        let (_dir, store) = temp_store();
        std::fs::write(store.path(), "{ not json").unwrap();
        let err = store.load().unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }

    #[test]
    fn test_from_config_override() {
        let config = StoreConfig {
            path: Some("/tmp/kamus-test/custom.json".to_string()),
        };
        let store = SessionStore::from_config(&config);
        assert_eq!(store.path(), Path::new("/tmp/kamus-test/custom.json"));
    }

    #[test]
    fn test_from_config_default() {
        let store = SessionStore::from_config(&StoreConfig::default());
        assert!(store.path().ends_with(DEFAULT_STORE_FILE));
    }
}
