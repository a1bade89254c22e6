use crate::constants::MAX_BILL_AMOUNT;
use crate::core::errors::BillSplitError;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Rounds a currency amount to cents, half away from zero.
pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct BillItem {
    pub name: String,
    pub unit_price: Decimal,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

impl BillItem {
    pub fn new(name: impl Into<String>, unit_price: Decimal, quantity: u32) -> Self {
        BillItem {
            name: name.into(),
            unit_price,
            quantity,
        }
    }

    pub fn line_total(&self) -> Decimal {
        round_cents(self.unit_price * Decimal::from(self.quantity))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Bill {
    pub items: Vec<BillItem>,
    pub subtotal: Decimal,
    #[serde(default)]
    pub tax: Decimal,
    #[serde(default)]
    pub service_charge: Decimal,
    pub total: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restaurant: Option<String>,
}

impl Bill {
    /// Builds a bill whose subtotal and total are derived from the items.
    pub fn from_items(items: Vec<BillItem>, tax: Decimal, service_charge: Decimal) -> Self {
        let subtotal: Decimal = items.iter().map(BillItem::line_total).sum();
        Bill {
            items,
            subtotal,
            tax,
            service_charge,
            total: subtotal + tax + service_charge,
            restaurant: None,
        }
    }

    pub fn items_subtotal(&self) -> Decimal {
        self.items.iter().map(BillItem::line_total).sum()
    }

    pub fn surcharges(&self) -> Decimal {
        self.tax + self.service_charge
    }

    pub fn expected_total(&self) -> Decimal {
        self.subtotal + self.surcharges()
    }

    /// True when `total` matches subtotal plus surcharges within `tolerance`.
    pub fn total_reconciles(&self, tolerance: Decimal) -> bool {
        (self.total - self.expected_total()).abs() <= tolerance
    }

    /// Checks the bill can be split: every item named with a quantity of at least
    /// one, and no price, line or total negative or above `MAX_BILL_AMOUNT`.
    pub fn validate(&self) -> Result<(), BillSplitError> {
        let max = Decimal::from(MAX_BILL_AMOUNT);
        if self.items.is_empty() {
            return Err(bill_error("Empty Bill", "bill has no items"));
        }

        let mut items_total = Decimal::ZERO;
        for (index, item) in self.items.iter().enumerate() {
            let label = format!("item {} ({})", index + 1, item.name);
            if item.name.trim().is_empty() {
                return Err(bill_error("Invalid Item", format!("item {} has no name", index + 1)));
            }
            if item.quantity == 0 {
                return Err(bill_error("Invalid Item", format!("{} has quantity 0", label)));
            }
            if item.unit_price < Decimal::ZERO {
                return Err(bill_error("Invalid Item", format!("{} has a negative price", label)));
            }
            items_total = item
                .unit_price
                .checked_mul(Decimal::from(item.quantity))
                .and_then(|line| items_total.checked_add(line))
                .filter(|total| *total <= max)
                .ok_or_else(|| bill_error("Amount Out Of Range", format!("{} exceeds {}", label, max)))?;
        }

        for (field, value) in [
            ("subtotal", self.subtotal),
            ("tax", self.tax),
            ("service_charge", self.service_charge),
            ("total", self.total),
        ] {
            if value < Decimal::ZERO {
                return Err(bill_error("Invalid Amount", format!("{} is negative ({})", field, value)));
            }
            if value > max {
                return Err(bill_error("Amount Out Of Range", format!("{} exceeds {}", field, max)));
            }
        }
        Ok(())
    }

    /// True when the item line totals add up to `subtotal` within `tolerance`.
    pub fn items_reconcile(&self, tolerance: Decimal) -> bool {
        (self.items_subtotal() - self.subtotal).abs() <= tolerance
    }
}

fn bill_error(title: &str, description: impl Into<String>) -> BillSplitError {
    BillSplitError::invalid_input("bill", title, description)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_line_total_multiplies_quantity() {
        let item = BillItem::new("Chicken Rice", dec!(5.00), 2);
        assert_eq!(item.line_total(), dec!(10.00));
    }

    #[test]
    fn test_line_total_rounds_sub_cent_prices() {
        let item = BillItem::new("Kopi", dec!(1.125), 3);
        assert_eq!(item.line_total(), dec!(3.38));
    }

    #[test]
    fn test_from_items_derives_totals() {
        let bill = Bill::from_items(
            vec![BillItem::new("Chicken Rice", dec!(5.00), 2), BillItem::new("Tea", dec!(1.20), 2)],
            dec!(0),
            dec!(1.24),
        );
        assert_eq!(bill.subtotal, dec!(12.40));
        assert_eq!(bill.total, dec!(13.64));
        assert!(bill.total_reconciles(dec!(0)));
        assert!(bill.items_reconcile(dec!(0)));
    }

    #[test]
    fn test_round_cents_half_away_from_zero() {
        assert_eq!(round_cents(dec!(0.125)), dec!(0.13));
        assert_eq!(round_cents(dec!(-0.125)), dec!(-0.13));
        assert_eq!(round_cents(dec!(0.124)), dec!(0.12));
    }

    #[test]
    fn test_validate_accepts_a_normal_bill() {
        let bill = Bill::from_items(vec![BillItem::new("Laksa", dec!(6.50), 2)], dec!(1.17), dec!(1.30));
        assert!(bill.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_items_and_amounts() {
        let base = Bill::from_items(vec![BillItem::new("Laksa", dec!(6.50), 1)], dec!(0), dec!(0));

        let mut empty = base.clone();
        empty.items.clear();
        let mut no_name = base.clone();
        no_name.items[0].name = "  ".to_string();
        let mut zero_quantity = base.clone();
        zero_quantity.items[0].quantity = 0;
        let mut negative_price = base.clone();
        negative_price.items[0].unit_price = dec!(-1);
        let mut negative_tax = base.clone();
        negative_tax.tax = dec!(-0.50);
        let mut huge_total = base.clone();
        huge_total.total = Decimal::from(MAX_BILL_AMOUNT) + dec!(0.01);

        for bill in [empty, no_name, zero_quantity, negative_price, negative_tax, huge_total] {
            assert!(
                matches!(bill.validate(), Err(BillSplitError::InvalidInput(..))),
                "accepted {:?}",
                bill
            );
        }
    }

    #[test]
    fn test_validate_rejects_overflowing_lines() {
        let bill = Bill {
            items: vec![BillItem::new("Big", Decimal::MAX, 2)],
            subtotal: dec!(1),
            tax: dec!(0),
            service_charge: dec!(0),
            total: dec!(1),
            restaurant: None,
        };
        assert!(matches!(bill.validate(), Err(BillSplitError::InvalidInput(..))));

        let many = Bill {
            items: vec![
                BillItem::new("Gold", dec!(600000000), 1),
                BillItem::new("Gold", dec!(600000000), 1),
            ],
            ..bill
        };
        assert!(matches!(many.validate(), Err(BillSplitError::InvalidInput(..))));
    }
}
