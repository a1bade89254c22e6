use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// PayNow details a user saved so later bills can be paid back to them.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct SavedRecipient {
    pub user_id: String,
    pub phone: String,
    pub name: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Links a detected diner, by stable key, to an external chat user within one chat.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Pairing {
    pub chat_id: String,
    pub person_key: String,
    pub external_user_id: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
