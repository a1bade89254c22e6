use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ParticipantShare {
    pub participant: String,
    /// Sum of this participant's item allocations before tax and service charge
    pub items_subtotal: Decimal,
    pub surcharge: Decimal,
    pub amount: Decimal,
}

/// The cents a single participant was allocated from one item.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ItemAllocation {
    pub item_index: usize,
    pub participant: String,
    pub amount: Decimal,
    /// This participant's fraction of the item, after normalising weights
    pub ratio: Decimal,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct SplitResult {
    pub shares: Vec<ParticipantShare>,
    pub allocations: Vec<ItemAllocation>,
    pub total: Decimal,
}

impl SplitResult {
    pub fn share_of(&self, participant: &str) -> Option<&ParticipantShare> {
        self.shares.iter().find(|s| s.participant == participant)
    }

    pub fn amount_of(&self, participant: &str) -> Option<Decimal> {
        self.share_of(participant).map(|s| s.amount)
    }

    pub fn allocations_for<'a>(&'a self, participant: &'a str) -> impl Iterator<Item = &'a ItemAllocation> + 'a {
        self.allocations.iter().filter(move |a| a.participant == participant)
    }

    pub fn sum_of_shares(&self) -> Decimal {
        self.shares.iter().map(|s| s.amount).sum()
    }
}
