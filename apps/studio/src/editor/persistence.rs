//! Draft persistence.
//!
//! One `Persistence` collaborator is injected into the editor session: restored at startup,
//! saved by the autosaver, flushed at teardown. The stored shape is structural JSON
//! (`resumeDocument`, `templateDescriptor`, `savedAt`).
//!
//! A stored draft that no longer deserializes is rejected with `StaleShape` and never
//! partially applied. One that deserializes but breaks document invariants is repaired by the
//! session after loading.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::models::{ResumeDocument, TemplateDescriptor};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    pub resume_document: ResumeDocument,
    #[serde(default)]
    pub template_descriptor: Option<TemplateDescriptor>,
    pub saved_at: DateTime<Utc>,
}

impl PersistedState {
    pub fn new(document: ResumeDocument, template: Option<TemplateDescriptor>) -> Self {
        Self {
            resume_document: document,
            template_descriptor: template,
            saved_at: Utc::now(),
        }
    }
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("could not serialize draft: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("stored draft has an unrecognised shape: {0}")]
    StaleShape(#[source] serde_json::Error),
}

/// Storage for the single working draft.
#[async_trait]
pub trait Persistence: Send + Sync {
    /// `Ok(None)` when nothing has been saved yet.
    async fn load(&self) -> Result<Option<PersistedState>, PersistenceError>;
    async fn save(&self, state: &PersistedState) -> Result<(), PersistenceError>;
    async fn clear(&self) -> Result<(), PersistenceError>;
}

// ────────────────────────────────────────────────────────────────────────────
// JSON file store
// ────────────────────────────────────────────────────────────────────────────

/// Stores the draft as a JSON file. Saves write a sibling temp file and rename it over the
/// draft, so a crash mid-save leaves the previous draft intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl Persistence for JsonFileStore {
    async fn load(&self) -> Result<Option<PersistedState>, PersistenceError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No draft at {}", self.path.display());
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        let state = serde_json::from_slice(&bytes).map_err(PersistenceError::StaleShape)?;
        Ok(Some(state))
    }

    async fn save(&self, state: &PersistedState) -> Result<(), PersistenceError> {
        let json = serde_json::to_vec_pretty(state).map_err(PersistenceError::Serialize)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let temp = self.temp_path();
        tokio::fs::write(&temp, &json).await?;
        tokio::fs::rename(&temp, &self.path).await?;
        debug!("Saved draft to {} ({} bytes)", self.path.display(), json.len());
        Ok(())
    }

    async fn clear(&self) -> Result<(), PersistenceError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                info!("Cleared draft at {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory store
// ────────────────────────────────────────────────────────────────────────────

/// Keeps the draft in memory. Counts saves, which is what debounce tests look at.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<Option<PersistedState>>,
    saves: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: PersistedState) -> Self {
        Self {
            state: Mutex::new(Some(state)),
            saves: AtomicUsize::new(0),
        }
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub async fn snapshot(&self) -> Option<PersistedState> {
        self.state.lock().await.clone()
    }
}

#[async_trait]
impl Persistence for MemoryStore {
    async fn load(&self) -> Result<Option<PersistedState>, PersistenceError> {
        Ok(self.state.lock().await.clone())
    }

    async fn save(&self, state: &PersistedState) -> Result<(), PersistenceError> {
        *self.state.lock().await = Some(state.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn clear(&self) -> Result<(), PersistenceError> {
        *self.state.lock().await = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{template_catalog, PersonalField};

    fn state() -> PersistedState {
        let mut doc = ResumeDocument::default();
        doc.set_personal(PersonalField::Name, "Jane Doe");
        PersistedState::new(doc, template_catalog().into_iter().next())
    }

    #[tokio::test]
    async fn test_file_store_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("draft.json"));
        assert!(store.load().await.unwrap().is_none());
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_file_store_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested/draft.json"));
        let saved = state();
        store.save(&saved).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(saved));
        assert!(!store.temp_path().exists());

        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_store_uses_camel_case_shape() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("draft.json"));
        store.save(&state()).await.unwrap();
        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(store.path()).unwrap()).unwrap();
        assert!(raw.get("resumeDocument").is_some());
        assert!(raw.get("templateDescriptor").is_some());
        assert!(raw.get("savedAt").is_some());
        assert_eq!(raw["resumeDocument"]["personalInfo"]["name"], "Jane Doe");
        assert_eq!(raw["templateDescriptor"]["primaryColor"], "#0070f3");
    }

    #[tokio::test]
    async fn test_file_store_rejects_stale_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("draft.json");
        std::fs::write(&path, r#"{"resumeDocument": {"experience": "not a list"}}"#).unwrap();
        let err = JsonFileStore::new(&path).load().await.unwrap_err();
        assert!(matches!(err, PersistenceError::StaleShape(_)));
    }

    #[tokio::test]
    async fn test_file_store_accepts_legacy_string_shapes() {
        // drafts written by the browser editor: string ids for templates, "" end dates
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("draft.json");
        let json = r##"{
            "resumeDocument": {
                "personalInfo": {"name": "Jane Doe", "email": "jane@x.com"},
                "summary": "",
                "experience": [{"id": 1, "company": "Acme", "endDate": "", "achievements": [""]}],
                "education": [],
                "skills": ["Go"]
            },
            "templateDescriptor": {"id": "modern", "name": "Modern", "primaryColor": "#38a169"},
            "savedAt": "2024-05-01T12:00:00Z"
        }"##;
        std::fs::write(&path, json).unwrap();
        let loaded = JsonFileStore::new(&path).load().await.unwrap().unwrap();
        assert_eq!(loaded.resume_document.personal_info.name, "Jane Doe");
        assert!(loaded.resume_document.education.is_empty());
        assert_eq!(
            loaded.template_descriptor.unwrap().id,
            crate::models::TemplateId::Slug("modern".into())
        );
    }

    #[tokio::test]
    async fn test_memory_store_counts_saves() {
        let store = MemoryStore::new();
        assert!(store.load().await.unwrap().is_none());
        store.save(&state()).await.unwrap();
        store.save(&state()).await.unwrap();
        assert_eq!(store.save_count(), 2);
        store.clear().await.unwrap();
        assert!(store.snapshot().await.is_none());
    }
}
