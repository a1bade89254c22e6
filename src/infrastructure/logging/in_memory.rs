use crate::core::errors::BillSplitError;
use crate::core::models::AppLog;
use crate::infrastructure::logging::LoggingService;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct InMemoryLogging {
    logs: Arc<RwLock<Vec<AppLog>>>,
}

impl InMemoryLogging {
    pub fn new() -> Self {
        InMemoryLogging::default()
    }
}

#[async_trait]
impl LoggingService for InMemoryLogging {
    async fn log_action(
        &self,
        action: &str,
        details: serde_json::Value,
        user_id: Option<&str>,
    ) -> Result<(), BillSplitError> {
        let details: HashMap<String, serde_json::Value> = match details {
            serde_json::Value::Null => HashMap::new(),
            other => serde_json::from_value(other)
                .map_err(|e| BillSplitError::LoggingError(format!("Log details must be an object: {}", e)))?,
        };
        self.logs.write().await.push(AppLog {
            id: Uuid::new_v4().to_string(),
            action: action.to_string(),
            user_id: user_id.map(String::from),
            details,
            timestamp: chrono::Utc::now(),
        });
        Ok(())
    }

    async fn get_logs(&self) -> Result<Vec<AppLog>, BillSplitError> {
        Ok(self.logs.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_logs_keep_order() {
        let logging = InMemoryLogging::new();
        logging.log_action("first", json!({"n": 1}), Some("u1")).await.unwrap();
        logging.log_action("second", serde_json::Value::Null, None).await.unwrap();

        let logs = logging.get_logs().await.unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].action, "first");
        assert_eq!(logs[0].details["n"], json!(1));
        assert!(logs[1].details.is_empty());
    }

    #[tokio::test]
    async fn test_non_object_details_are_rejected() {
        let logging = InMemoryLogging::new();
        let err = logging.log_action("bad", json!([1, 2]), None).await.unwrap_err();
        assert!(matches!(err, BillSplitError::LoggingError(_)));
    }
}
