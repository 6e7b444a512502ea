//! # Todo Persistence
//!
//! Backends that hold the durable snapshot of the item list. The file
//! backend replaces the whole JSON file atomically (temp file, fsync,
//! rename) on every save so a crash never leaves a half-written list.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use crate::core::PersistenceError;
use crate::features::todos::item::TodoItem;
use async_trait::async_trait;
use log::debug;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::io::AsyncWriteExt;

#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// Read the full list
    async fn load(&self) -> Result<Vec<TodoItem>, PersistenceError>;

    /// Replace the stored list with `items`
    async fn save(&self, items: &[TodoItem]) -> Result<(), PersistenceError>;
}

// ============================================================================
// JSON file
// ============================================================================

/// Stores the list as a JSON array in a single file
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Sibling temp file, so the final rename stays on one filesystem
    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "todos.json".to_string());
        self.path.with_file_name(format!(".{name}.tmp"))
    }

    fn io_error(&self, path: &Path, source: std::io::Error) -> PersistenceError {
        PersistenceError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[async_trait]
impl TodoRepository for JsonFileRepository {
    async fn load(&self) -> Result<Vec<TodoItem>, PersistenceError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| self.io_error(&self.path, e))?;
        serde_json::from_slice(&bytes).map_err(|source| PersistenceError::Malformed {
            path: self.path.clone(),
            source,
        })
    }

    async fn save(&self, items: &[TodoItem]) -> Result<(), PersistenceError> {
        let json = serde_json::to_vec_pretty(items).map_err(PersistenceError::Serialize)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(parent, e))?;
        }

        let tmp_path = self.temp_path();
        let mut file = tokio::fs::File::create(&tmp_path)
            .await
            .map_err(|e| self.io_error(&tmp_path, e))?;
        file.write_all(&json)
            .await
            .map_err(|e| self.io_error(&tmp_path, e))?;
        file.sync_all()
            .await
            .map_err(|e| self.io_error(&tmp_path, e))?;
        drop(file);

        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| self.io_error(&self.path, e))?;

        debug!("💾 Saved {} items to {}", items.len(), self.path.display());
        Ok(())
    }
}

// ============================================================================
// In-memory
// ============================================================================

/// Keeps the snapshot in memory; used for previews and tests
#[derive(Debug, Default)]
pub struct MemoryRepository {
    items: Mutex<Vec<TodoItem>>,
    saves: AtomicUsize,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last saved snapshot
    pub fn snapshot(&self) -> Vec<TodoItem> {
        self.items
            .lock()
            .map(|items| items.clone())
            .unwrap_or_default()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TodoRepository for MemoryRepository {
    async fn load(&self) -> Result<Vec<TodoItem>, PersistenceError> {
        Ok(self.snapshot())
    }

    async fn save(&self, items: &[TodoItem]) -> Result<(), PersistenceError> {
        if let Ok(mut stored) = self.items.lock() {
            *stored = items.to_vec();
        }
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
