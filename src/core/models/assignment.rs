use super::bill::Bill;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// One participant's claim on an item. Weights are relative within the item.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ItemShare {
    pub participant: String,
    #[serde(default = "default_weight")]
    pub weight: Decimal,
}

fn default_weight() -> Decimal {
    Decimal::ONE
}

impl ItemShare {
    pub fn new(participant: impl Into<String>) -> Self {
        ItemShare {
            participant: participant.into(),
            weight: Decimal::ONE,
        }
    }

    pub fn weighted(participant: impl Into<String>, weight: Decimal) -> Self {
        ItemShare {
            participant: participant.into(),
            weight,
        }
    }
}

/// Maps bill item indices (0-based) to the participants sharing each item.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Assignment {
    items: BTreeMap<usize, Vec<ItemShare>>,
}

impl Assignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every item of `bill` shared evenly by all `participants`.
    pub fn even<S: AsRef<str>>(bill: &Bill, participants: &[S]) -> Self {
        let mut assignment = Assignment::new();
        for index in 0..bill.items.len() {
            assignment.assign(index, participants);
        }
        assignment
    }

    /// Shares item `index` evenly among `participants`, replacing earlier sharers.
    pub fn assign<S: AsRef<str>>(&mut self, index: usize, participants: &[S]) -> &mut Self {
        let shares = participants.iter().map(|p| ItemShare::new(p.as_ref())).collect();
        self.items.insert(index, shares);
        self
    }

    /// Adds one sharer to item `index`. A participant already on the item has its weight replaced.
    pub fn add_share(&mut self, index: usize, share: ItemShare) -> &mut Self {
        let shares = self.items.entry(index).or_default();
        match shares.iter_mut().find(|s| s.participant == share.participant) {
            Some(existing) => existing.weight = share.weight,
            None => shares.push(share),
        }
        self
    }

    pub fn shares_for(&self, index: usize) -> Option<&[ItemShare]> {
        self.items.get(&index).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &[ItemShare])> {
        self.items.iter().map(|(index, shares)| (*index, shares.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Participants in first-appearance order, walking items by index.
    pub fn participants(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for shares in self.items.values() {
            for share in shares {
                if !seen.iter().any(|p| *p == share.participant) {
                    seen.push(share.participant.clone());
                }
            }
        }
        seen
    }
}
