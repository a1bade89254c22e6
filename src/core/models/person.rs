use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// A diner detected in the group photo, with the bill items placed in front of them.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct DetectedPerson {
    pub person_id: u32,
    #[serde(default)]
    pub position: String,
    /// 1-based bill item indices
    #[serde(default)]
    pub items: Vec<usize>,
    /// Fraction of each listed item this person consumed, keyed by 1-based index
    #[serde(default)]
    pub share_ratio: BTreeMap<String, f64>,
    #[serde(default)]
    pub confidence: f64,
}

impl DetectedPerson {
    pub fn label(&self) -> String {
        format!("Person {}", self.person_id)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct PersonMatches {
    pub people: Vec<DetectedPerson>,
    #[serde(default)]
    pub overall_confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
