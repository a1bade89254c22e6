pub mod in_memory;

use crate::core::errors::BillSplitError;
use crate::core::models::AppLog;
use async_trait::async_trait;

/// Audit trail of the actions the service performs.
#[async_trait]
pub trait LoggingService: Send + Sync {
    async fn log_action(
        &self,
        action: &str,
        details: serde_json::Value,
        user_id: Option<&str>,
    ) -> Result<(), BillSplitError>;
    /// Entries in the order they were recorded.
    async fn get_logs(&self) -> Result<Vec<AppLog>, BillSplitError>;
}
