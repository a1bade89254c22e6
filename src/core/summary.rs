use crate::constants::{DEFAULT_BILL_REFERENCE, MAX_REFERENCE_LENGTH};
use crate::core::models::{Bill, ParticipantShare, PaymentRecipient, SplitResult};
use rust_decimal::Decimal;

fn money(amount: Decimal) -> String {
    let mut amount = crate::core::models::round_cents(amount);
    amount.rescale(2);
    format!("${}", amount)
}

/// Markdown overview of a parsed bill.
pub fn format_bill_summary(bill: &Bill) -> String {
    let mut lines = vec!["📄 *Bill Analysis*".to_string()];
    if let Some(restaurant) = &bill.restaurant {
        lines.push(format!("Restaurant: {}", restaurant));
    }

    lines.push(String::new());
    lines.push("*Items:*".to_string());
    for (index, item) in bill.items.iter().enumerate() {
        if item.quantity > 1 {
            lines.push(format!(
                "{}. {} x{} - {}",
                index + 1,
                item.name,
                item.quantity,
                money(item.line_total())
            ));
        } else {
            lines.push(format!("{}. {} - {}", index + 1, item.name, money(item.line_total())));
        }
    }

    lines.push(String::new());
    lines.push("*Summary:*".to_string());
    lines.push(format!("Subtotal: {}", money(bill.subtotal)));
    lines.push(format!("Tax (GST): {}", money(bill.tax)));
    lines.push(format!("Service Charge: {}", money(bill.service_charge)));
    lines.push(format!("*Total: {}*", money(bill.total)));
    lines.join("\n")
}

/// Markdown payment request for one participant, listing what they are paying for.
pub fn format_payment_message(
    share: &ParticipantShare,
    split: &SplitResult,
    bill: &Bill,
    recipient: &PaymentRecipient,
) -> String {
    let mut lines = vec!["💰 *Your Bill Split*".to_string(), String::new()];
    if let Some(restaurant) = &bill.restaurant {
        lines.push(format!("📍 {}", restaurant));
        lines.push(String::new());
    }

    lines.push("*Your items:*".to_string());
    for allocation in split.allocations_for(&share.participant) {
        let name = bill
            .items
            .get(allocation.item_index)
            .map(|item| item.name.as_str())
            .unwrap_or("Unknown item");
        if allocation.ratio < Decimal::ONE {
            let percent = (allocation.ratio * Decimal::ONE_HUNDRED).round();
            lines.push(format!("• {} ({}% share) - {}", name, percent, money(allocation.amount)));
        } else {
            lines.push(format!("• {} - {}", name, money(allocation.amount)));
        }
    }
    if !share.surcharge.is_zero() {
        lines.push(format!("• Tax & service - {}", money(share.surcharge)));
    }

    lines.push(String::new());
    lines.push(format!("*Total Amount: {}*", money(share.amount)));
    lines.push(String::new());
    lines.push("*Pay to:*".to_string());
    lines.push(format!("📱 {}", recipient.proxy_value));
    lines.push(format!("👤 {}", recipient.display_name));
    lines.push(String::new());
    lines.push("Please scan the QR code below to pay via PayNow:".to_string());
    lines.join("\n")
}

/// Payment reference for a participant, e.g. "Tian Tian split - Person 1", cut to 25 characters.
pub fn bill_reference(restaurant: Option<&str>, participant: Option<&str>) -> String {
    let restaurant = restaurant.map(str::trim).filter(|r| !r.is_empty());
    let participant = participant.map(str::trim).filter(|p| !p.is_empty());
    let reference = match (restaurant, participant) {
        (Some(restaurant), Some(participant)) => {
            let short: String = restaurant.chars().take(15).collect();
            format!("{} split - {}", short, participant)
        }
        (Some(restaurant), None) => {
            let short: String = restaurant.chars().take(15).collect();
            format!("{} split", short)
        }
        (None, Some(participant)) => participant.to_string(),
        (None, None) => DEFAULT_BILL_REFERENCE.to_string(),
    };
    reference.chars().take(MAX_REFERENCE_LENGTH).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{Assignment, BillItem};
    use crate::core::split::compute_shares;
    use rust_decimal_macros::dec;

    fn hawker_bill() -> Bill {
        let mut bill = Bill::from_items(
            vec![BillItem::new("Chicken Rice", dec!(5.00), 2), BillItem::new("Tea", dec!(1.20), 1)],
            dec!(0),
            dec!(1.12),
        );
        bill.restaurant = Some("Tian Tian Hainanese".to_string());
        bill
    }

    #[test]
    fn test_bill_summary_lists_items_and_totals() {
        let summary = format_bill_summary(&hawker_bill());
        assert!(summary.contains("Restaurant: Tian Tian Hainanese"));
        assert!(summary.contains("1. Chicken Rice x2 - $10.00"));
        assert!(summary.contains("2. Tea - $1.20"));
        assert!(summary.contains("Service Charge: $1.12"));
        assert!(summary.contains("*Total: $12.32*"));
    }

    #[test]
    fn test_payment_message_marks_shared_items() {
        let bill = hawker_bill();
        let mut assignment = Assignment::new();
        assignment.assign(0, &["alex", "sam"]).assign(1, &["alex"]);
        let split = compute_shares(&bill, &assignment).unwrap();
        let recipient = PaymentRecipient::mobile("91234567", "Alex Tan").unwrap();
        let share = split.share_of("sam").unwrap();

        let message = format_payment_message(share, &split, &bill, &recipient);
        assert!(message.contains("• Chicken Rice (50% share) - $5.00"));
        assert!(!message.contains("Tea"));
        assert!(message.contains("📱 +6591234567"));
    }

    #[test]
    fn test_bill_reference() {
        assert_eq!(bill_reference(None, None), "Bill Split");
        assert_eq!(bill_reference(Some("Tian Tian"), None), "Tian Tian split");
        assert_eq!(
            bill_reference(Some("Tian Tian Hainanese Chicken Rice"), Some("Person 1")),
            "Tian Tian Haina split - P"
        );
        assert_eq!(bill_reference(None, Some("Person 2")), "Person 2");
    }
}
