//! Maps the JSON text returned by the vision model into bills and assignments.
//!
//! Models wrap their answer in Markdown fences or surround it with prose often
//! enough that the object is cut out of the text before parsing.

use crate::core::errors::BillSplitError;
use crate::core::models::{Assignment, Bill, BillItem, ItemShare, PersonMatches};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

#[derive(Deserialize)]
struct RawBill {
    items: Vec<RawItem>,
    subtotal: Option<Decimal>,
    tax: Option<Decimal>,
    service_charge: Option<Decimal>,
    total: Option<Decimal>,
    restaurant: Option<String>,
}

#[derive(Deserialize)]
struct RawItem {
    name: String,
    unit_price: Option<Decimal>,
    /// Price printed on the receipt line, covering every unit on it
    price: Option<Decimal>,
    quantity: Option<u32>,
}

fn upstream_error(message: impl Into<String>) -> BillSplitError {
    BillSplitError::UpstreamParseError(message.into())
}

fn invalid_bill(error: BillSplitError) -> BillSplitError {
    match error {
        BillSplitError::InvalidInput(_, field) => upstream_error(field.description),
        other => other,
    }
}

/// Cuts the JSON object out of a model response.
pub fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();
    let inner = match trimmed.strip_prefix("```") {
        Some(rest) => {
            let rest = rest
                .strip_prefix("json")
                .or_else(|| rest.strip_prefix("JSON"))
                .unwrap_or(rest);
            rest.split("```").next().unwrap_or(rest)
        }
        None => trimmed,
    };
    match (inner.find('{'), inner.rfind('}')) {
        (Some(start), Some(end)) if start < end => &inner[start..=end],
        _ => inner.trim(),
    }
}

/// Parses a bill extraction response.
///
/// Missing tax and service charge count as zero, a missing subtotal is the sum
/// of the item lines and a missing total is subtotal plus charges. An item with
/// `unit_price` is taken as is; an item with only `price` treats it as the line
/// price and divides it by the quantity.
pub fn parse_bill_response(text: &str) -> Result<Bill, BillSplitError> {
    let raw: RawBill =
        serde_json::from_str(extract_json(text)).map_err(|e| upstream_error(format!("bill is not valid JSON: {}", e)))?;

    if raw.items.is_empty() {
        return Err(upstream_error("bill has no items"));
    }

    let mut items = Vec::with_capacity(raw.items.len());
    for (index, item) in raw.items.into_iter().enumerate() {
        let name = item.name.trim().to_string();
        let quantity = item.quantity.unwrap_or(1);
        if quantity == 0 {
            return Err(upstream_error(format!("item {} ({}) has quantity 0", index + 1, name)));
        }
        let unit_price = match (item.unit_price, item.price) {
            (Some(unit_price), _) => unit_price,
            (None, Some(price)) => price / Decimal::from(quantity),
            (None, None) => return Err(upstream_error(format!("item {} ({}) has no price", index + 1, name))),
        };
        items.push(BillItem {
            name,
            unit_price,
            quantity,
        });
    }

    let mut bill = Bill {
        items,
        subtotal: raw.subtotal.unwrap_or_default(),
        tax: raw.tax.unwrap_or_default(),
        service_charge: raw.service_charge.unwrap_or_default(),
        total: raw.total.unwrap_or_default(),
        restaurant: raw
            .restaurant
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty()),
    };
    // Derived totals are only summed once the lines are known to be in range
    bill.validate().map_err(invalid_bill)?;
    if raw.subtotal.is_none() || raw.total.is_none() {
        bill.subtotal = raw.subtotal.unwrap_or_else(|| bill.items_subtotal());
        bill.total = raw.total.unwrap_or_else(|| bill.expected_total());
        bill.validate().map_err(invalid_bill)?;
    }

    debug!("Parsed bill with {} items, total {}", bill.items.len(), bill.total);
    Ok(bill)
}

/// Parses a person-to-dish matching response.
pub fn parse_person_matches(text: &str) -> Result<PersonMatches, BillSplitError> {
    let matches: PersonMatches = serde_json::from_str(extract_json(text))
        .map_err(|e| upstream_error(format!("person matches are not valid JSON: {}", e)))?;

    if matches.people.is_empty() {
        return Err(upstream_error("no people were detected"));
    }
    for person in &matches.people {
        if person.items.contains(&0) {
            return Err(upstream_error(format!("{} lists item 0; items are 1-based", person.label())));
        }
        if let Some((item, ratio)) = person
            .share_ratio
            .iter()
            .find(|(_, ratio)| !ratio.is_finite() || **ratio < 0.0)
        {
            return Err(upstream_error(format!(
                "{} has an invalid share ratio {} for item {}",
                person.label(),
                ratio,
                item
            )));
        }
    }
    Ok(matches)
}

impl PersonMatches {
    /// Builds an assignment from the matches. People are named through `names`
    /// (keyed by `person_id`) and fall back to "Person N". A ratio of zero drops
    /// the person from that item.
    pub fn to_assignment(&self, bill: &Bill, names: &HashMap<u32, String>) -> Result<Assignment, BillSplitError> {
        let mut assignment = Assignment::new();
        for person in &self.people {
            let name = names.get(&person.person_id).cloned().unwrap_or_else(|| person.label());
            for &item in &person.items {
                if item == 0 || item > bill.items.len() {
                    return Err(upstream_error(format!(
                        "{} lists item {}, the bill has {} items",
                        name,
                        item,
                        bill.items.len()
                    )));
                }
                let ratio = person.share_ratio.get(&item.to_string()).copied().unwrap_or(1.0);
                let weight = Decimal::try_from(ratio)
                    .map_err(|_| upstream_error(format!("share ratio {} for {} is not a number", ratio, name)))?;
                if weight.is_zero() {
                    continue;
                }
                assignment.add_share(item - 1, ItemShare::weighted(name.clone(), weight));
            }
        }
        Ok(assignment)
    }
}

/// Stable key for a detected person, used to remember pairings between bills.
pub fn person_key(position: &str) -> String {
    let slug: Vec<String> = position
        .split_whitespace()
        .map(|word| word.to_lowercase())
        .collect();
    format!("person_{}", slug.join("_"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_from_fence() {
        assert_eq!(extract_json("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(extract_json("```\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(extract_json("Sure! {\"a\": 1} Hope that helps"), "{\"a\": 1}");
        assert_eq!(extract_json("  {\"a\": 1}  "), "{\"a\": 1}");
    }

    #[test]
    fn test_person_key() {
        assert_eq!(person_key("Person on Left"), "person_person_on_left");
        assert_eq!(person_key("  center  "), "person_center");
    }
}
