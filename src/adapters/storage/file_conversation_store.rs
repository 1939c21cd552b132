//! File-based Conversation Store Adapter
//!
//! Stores each conversation as a pretty-printed JSON file named
//! `<id>.json` inside a single data directory. There is no index file;
//! listing scans the directory.
//!
//! # Atomic Writes
//!
//! Every write replaces the whole record:
//! 1. Write content to a unique `.<id>.json.<nonce>.tmp` sibling
//! 2. Sync to disk
//! 3. Rename over `<id>.json`
//!
//! Readers therefore see either the previous record or the new one.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use super::id_allocation::allocate_with_retry;
use super::keyed_locks::KeyedLocks;
use crate::domain::conversation::{Conversation, MessageRole, ModelConfig};
use crate::domain::foundation::ConversationId;
use crate::ports::{ConversationStore, StoreError};

const RECORD_EXTENSION: &str = "json";

/// File-based storage for conversations
#[derive(Debug)]
pub struct FileConversationStore {
    base_path: PathBuf,
    locks: KeyedLocks<ConversationId>,
}

impl FileConversationStore {
    /// Opens (creating if needed) a store rooted at `base_path`.
    ///
    /// # Example
    /// ```ignore
    /// let store = FileConversationStore::open("./data/conversations").await?;
    /// ```
    pub async fn open<P: AsRef<Path>>(base_path: P) -> Result<Self, StoreError> {
        let base_path = base_path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path).await.map_err(|e| {
            StoreError::io(format!(
                "Failed to create data directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(Self {
            base_path,
            locks: KeyedLocks::new(),
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Get the record path for a conversation
    fn record_path(&self, id: ConversationId) -> PathBuf {
        self.base_path.join(format!("{}.{}", id, RECORD_EXTENSION))
    }

    /// Get a fresh temporary path for an atomic write
    fn temp_path(&self, id: ConversationId) -> PathBuf {
        self.base_path.join(format!(
            ".{}.{}.{}.tmp",
            id,
            RECORD_EXTENSION,
            Uuid::new_v4().simple()
        ))
    }

    /// Parses a conversation id from a record filename.
    ///
    /// Returns `None` for temp files and anything else that is not
    /// `<uuid>.json`.
    fn parse_record_id(filename: &str) -> Option<ConversationId> {
        let stem = filename.strip_suffix(".json")?;
        if stem.starts_with('.') {
            return None;
        }
        ConversationId::from_str(stem).ok()
    }

    async fn read_record(&self, id: ConversationId) -> Result<Conversation, StoreError> {
        let path = self.record_path(id);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::ConversationNotFound(id));
            }
            Err(e) => {
                return Err(StoreError::io(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let conversation: Conversation = serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::corrupted(id, e.to_string()))?;

        if conversation.id() != id {
            return Err(StoreError::corrupted(
                id,
                format!("record holds id {}", conversation.id()),
            ));
        }
        conversation
            .verify_integrity()
            .map_err(|reason| StoreError::corrupted(id, reason))?;

        Ok(conversation)
    }

    async fn write_record(&self, conversation: &Conversation) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(conversation)
            .map_err(|e| StoreError::io(format!("Failed to serialize conversation: {}", e)))?;

        let final_path = self.record_path(conversation.id());
        let temp_path = self.temp_path(conversation.id());

        let result = Self::replace_atomically(&temp_path, &final_path, &json).await;
        if result.is_err() {
            // Best effort; a stray temp file is ignored by listing.
            let _ = fs::remove_file(&temp_path).await;
        }
        result
    }

    async fn replace_atomically(
        temp_path: &Path,
        final_path: &Path,
        content: &[u8],
    ) -> Result<(), StoreError> {
        let mut file = fs::File::create(temp_path).await.map_err(|e| {
            StoreError::io(format!(
                "Failed to create temp file {}: {}",
                temp_path.display(),
                e
            ))
        })?;

        file.write_all(content).await.map_err(|e| {
            StoreError::io(format!(
                "Failed to write temp file {}: {}",
                temp_path.display(),
                e
            ))
        })?;

        file.sync_all().await.map_err(|e| {
            StoreError::io(format!(
                "Failed to sync temp file {}: {}",
                temp_path.display(),
                e
            ))
        })?;
        drop(file);

        fs::rename(temp_path, final_path).await.map_err(|e| {
            StoreError::io(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                final_path.display(),
                e
            ))
        })
    }

    /// Persists an empty conversation under `id`, failing on collision.
    async fn try_create(&self, id: ConversationId) -> Result<ConversationId, StoreError> {
        let _guard = self.locks.lock(id).await;

        let exists = fs::try_exists(self.record_path(id))
            .await
            .map_err(|e| StoreError::io(format!("Failed to probe record {}: {}", id, e)))?;
        if exists {
            return Err(StoreError::StorageConflict(id));
        }

        self.write_record(&Conversation::new(id)).await?;
        Ok(id)
    }
}

#[async_trait]
impl ConversationStore for FileConversationStore {
    async fn create(&self) -> Result<ConversationId, StoreError> {
        let id = allocate_with_retry(|id| self.try_create(id)).await?;
        tracing::info!(conversation_id = %id, "Conversation created");
        Ok(id)
    }

    async fn load(&self, id: ConversationId) -> Result<Conversation, StoreError> {
        self.read_record(id).await
    }

    async fn append(
        &self,
        id: ConversationId,
        role: MessageRole,
        content: &str,
        model_config: Option<ModelConfig>,
    ) -> Result<usize, StoreError> {
        let _guard = self.locks.lock(id).await;

        let mut conversation = self.read_record(id).await?;
        let position = conversation.append(role, content, model_config);
        self.write_record(&conversation).await?;

        tracing::debug!(
            conversation_id = %id,
            role = %role,
            position,
            "Message appended"
        );
        Ok(position)
    }

    async fn list_ids(&self) -> Result<Vec<ConversationId>, StoreError> {
        let mut entries = fs::read_dir(&self.base_path).await.map_err(|e| {
            StoreError::io(format!(
                "Failed to read directory {}: {}",
                self.base_path.display(),
                e
            ))
        })?;

        let mut ids = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::io(format!("Failed to read directory entry: {}", e)))?
        {
            let filename = entry.file_name();
            match filename.to_str().and_then(Self::parse_record_id) {
                Some(id) => ids.push(id),
                None if filename.to_string_lossy().starts_with('.') => {
                    tracing::trace!(file = ?filename, "Skipping temp file");
                }
                None => tracing::warn!(file = ?filename, "Skipping unrecognized file in data directory"),
            }
        }

        ids.sort();
        Ok(ids)
    }

    async fn delete(&self, id: ConversationId) -> Result<bool, StoreError> {
        let _guard = self.locks.lock(id).await;

        match fs::remove_file(self.record_path(id)).await {
            Ok(()) => {
                tracing::info!(conversation_id = %id, "Conversation deleted");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::io(format!(
                "Failed to delete conversation {}: {}",
                id, e
            ))),
        }
    }
}
