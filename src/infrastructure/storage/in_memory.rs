use crate::core::errors::BillSplitError;
use crate::core::models::{Pairing, SavedRecipient};
use crate::infrastructure::storage::Storage;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Default)]
pub struct InMemoryStorage {
    recipients: Arc<RwLock<HashMap<String, SavedRecipient>>>,
    // chat_id -> person_key -> pairing
    pairings: Arc<RwLock<HashMap<String, BTreeMap<String, Pairing>>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        InMemoryStorage {
            recipients: Arc::new(RwLock::new(HashMap::new())),
            pairings: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn save_recipient(&self, recipient: SavedRecipient) -> Result<(), BillSplitError> {
        let mut recipients = self.recipients.write().await;
        recipients.insert(recipient.user_id.clone(), recipient);
        Ok(())
    }

    async fn get_recipient(&self, user_id: &str) -> Result<Option<SavedRecipient>, BillSplitError> {
        Ok(self.recipients.read().await.get(user_id).cloned())
    }

    async fn delete_recipient(&self, user_id: &str) -> Result<bool, BillSplitError> {
        Ok(self.recipients.write().await.remove(user_id).is_some())
    }

    async fn save_pairing(&self, pairing: Pairing) -> Result<(), BillSplitError> {
        let mut pairings = self.pairings.write().await;
        pairings
            .entry(pairing.chat_id.clone())
            .or_default()
            .insert(pairing.person_key.clone(), pairing);
        Ok(())
    }

    async fn get_pairings(&self, chat_id: &str) -> Result<Vec<Pairing>, BillSplitError> {
        let pairings = self.pairings.read().await;
        Ok(pairings
            .get(chat_id)
            .map(|chat| chat.values().cloned().collect())
            .unwrap_or_default())
    }
}
