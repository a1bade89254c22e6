use crate::core::errors::BillSplitError;
use crate::core::models::{Pairing, SavedRecipient};
use async_trait::async_trait;
use std::sync::Arc;

/// Keyed records kept between bills. Writes are last-write-wins.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn save_recipient(&self, recipient: SavedRecipient) -> Result<(), BillSplitError>;
    async fn get_recipient(&self, user_id: &str) -> Result<Option<SavedRecipient>, BillSplitError>;
    /// Returns whether a record was removed.
    async fn delete_recipient(&self, user_id: &str) -> Result<bool, BillSplitError>;
    async fn save_pairing(&self, pairing: Pairing) -> Result<(), BillSplitError>;
    async fn get_pairings(&self, chat_id: &str) -> Result<Vec<Pairing>, BillSplitError>;
}

// Lets the backend be chosen at startup as `Arc<dyn Storage>`
#[async_trait]
impl<T: Storage + ?Sized> Storage for Arc<T> {
    async fn save_recipient(&self, recipient: SavedRecipient) -> Result<(), BillSplitError> {
        (**self).save_recipient(recipient).await
    }

    async fn get_recipient(&self, user_id: &str) -> Result<Option<SavedRecipient>, BillSplitError> {
        (**self).get_recipient(user_id).await
    }

    async fn delete_recipient(&self, user_id: &str) -> Result<bool, BillSplitError> {
        (**self).delete_recipient(user_id).await
    }

    async fn save_pairing(&self, pairing: Pairing) -> Result<(), BillSplitError> {
        (**self).save_pairing(pairing).await
    }

    async fn get_pairings(&self, chat_id: &str) -> Result<Vec<Pairing>, BillSplitError> {
        (**self).get_pairings(chat_id).await
    }
}

pub mod in_memory;
pub mod json_file;
