use crate::core::errors::BillSplitError;
use crate::core::models::{Pairing, SavedRecipient};
use crate::infrastructure::storage::Storage;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, info};

#[derive(Clone, Default, Serialize, Deserialize)]
struct Snapshot {
    #[serde(default)]
    recipients: HashMap<String, SavedRecipient>,
    #[serde(default)]
    pairings: HashMap<String, BTreeMap<String, Pairing>>,
}

/// Keeps every record in one pretty-printed JSON file, rewritten on each change.
pub struct JsonFileStorage {
    path: PathBuf,
    state: RwLock<Snapshot>,
}

impl JsonFileStorage {
    /// Opens the store at `path`; a missing file starts empty.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, BillSplitError> {
        let path = path.as_ref().to_path_buf();
        let state = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                BillSplitError::StorageError(format!("{} is not a valid store: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No store at {}, starting empty", path.display());
                Snapshot::default()
            }
            Err(e) => {
                return Err(BillSplitError::StorageError(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };
        Ok(JsonFileStorage {
            path,
            state: RwLock::new(state),
        })
    }

    async fn persist(&self, snapshot: &Snapshot) -> Result<(), BillSplitError> {
        let bytes = serde_json::to_vec_pretty(snapshot)
            .map_err(|e| BillSplitError::StorageError(format!("Failed to serialize store: {}", e)))?;
        // Write beside the target and rename so a crash never leaves half a file
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| BillSplitError::StorageError(format!("Failed to write {}: {}", tmp.display(), e)))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| BillSplitError::StorageError(format!("Failed to replace {}: {}", self.path.display(), e)))?;
        debug!("Persisted store to {}", self.path.display());
        Ok(())
    }

    /// Writes `next` to disk and only then makes it the live state.
    async fn commit(&self, state: &mut Snapshot, next: Snapshot) -> Result<(), BillSplitError> {
        self.persist(&next).await?;
        *state = next;
        Ok(())
    }
}

#[async_trait]
impl Storage for JsonFileStorage {
    async fn save_recipient(&self, recipient: SavedRecipient) -> Result<(), BillSplitError> {
        let mut state = self.state.write().await;
        let mut next = state.clone();
        next.recipients.insert(recipient.user_id.clone(), recipient);
        self.commit(&mut state, next).await
    }

    async fn get_recipient(&self, user_id: &str) -> Result<Option<SavedRecipient>, BillSplitError> {
        Ok(self.state.read().await.recipients.get(user_id).cloned())
    }

    async fn delete_recipient(&self, user_id: &str) -> Result<bool, BillSplitError> {
        let mut state = self.state.write().await;
        if !state.recipients.contains_key(user_id) {
            return Ok(false);
        }
        let mut next = state.clone();
        next.recipients.remove(user_id);
        self.commit(&mut state, next).await?;
        Ok(true)
    }

    async fn save_pairing(&self, pairing: Pairing) -> Result<(), BillSplitError> {
        let mut state = self.state.write().await;
        let mut next = state.clone();
        next.pairings
            .entry(pairing.chat_id.clone())
            .or_default()
            .insert(pairing.person_key.clone(), pairing);
        self.commit(&mut state, next).await
    }

    async fn get_pairings(&self, chat_id: &str) -> Result<Vec<Pairing>, BillSplitError> {
        let state = self.state.read().await;
        Ok(state
            .pairings
            .get(chat_id)
            .map(|chat| chat.values().cloned().collect())
            .unwrap_or_default())
    }
}
