use crate::constants::{BILL_SPLIT, PAIRING_SAVED, PAYMENT_REQUESTS_CREATED, RECIPIENT_DELETED, RECIPIENT_SAVED};
use crate::core::errors::BillSplitError;
use crate::core::models::{Assignment, Bill, BillItem};
use crate::core::paynow::decode_payload;
use crate::core::services::ServiceSettings;
use crate::core::split::{InconsistencyPolicy, SplitOptions};
use crate::tests::{alex, create_test_service, create_test_service_with};
use rust_decimal_macros::dec;

fn dinner() -> Bill {
    let mut bill = Bill::from_items(
        vec![BillItem::new("Chicken Rice", dec!(5.00), 2), BillItem::new("Tea", dec!(1.20), 2)],
        dec!(0),
        dec!(1.24),
    );
    bill.restaurant = Some("Tian Tian".to_string());
    bill
}

#[tokio::test]
async fn test_split_bill_is_logged() {
    let service = create_test_service();
    let bill = dinner();
    let split = service
        .split_bill(&bill, &Assignment::even(&bill, &["A", "B"]), Some("u1"))
        .await
        .unwrap();
    assert_eq!(split.sum_of_shares(), dec!(13.64));

    let logs = service.get_app_logs().await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].action, BILL_SPLIT);
    assert_eq!(logs[0].user_id.as_deref(), Some("u1"));
}

#[tokio::test]
async fn test_split_even_needs_participants() {
    let service = create_test_service();
    let result = service.split_even(&dinner(), &[], None).await;
    assert!(matches!(result, Err(BillSplitError::InvalidAssignment(_))));

    let split = service
        .split_even(&dinner(), &["A".to_string(), "B".to_string()], None)
        .await
        .unwrap();
    assert_eq!(split.amount_of("A"), Some(dec!(6.82)));
}

#[tokio::test]
async fn test_submitted_bills_are_validated() {
    let service = create_test_service();
    let participants = vec!["A".to_string(), "B".to_string()];

    let mut no_quantity = dinner();
    no_quantity.items[1].quantity = 0;
    let mut negative = dinner();
    negative.items[0].unit_price = dec!(-5.00);
    let mut huge = dinner();
    huge.items[0].unit_price = rust_decimal::Decimal::MAX;

    for bill in [no_quantity, negative, huge] {
        let result = service.split_even(&bill, &participants, None).await;
        assert!(matches!(result, Err(BillSplitError::InvalidInput(..))), "accepted {:?}", bill);
    }
    assert!(service.get_app_logs().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_configured_policy_applies() {
    let service = create_test_service_with(ServiceSettings {
        split: SplitOptions {
            policy: InconsistencyPolicy::Reject,
            ..SplitOptions::default()
        },
        ..ServiceSettings::default()
    });
    let mut bill = dinner();
    bill.total = dec!(20.00);
    let result = service
        .split_bill(&bill, &Assignment::even(&bill, &["A"]), None)
        .await;
    assert!(matches!(result, Err(BillSplitError::InconsistentBill { .. })));
    assert!(service.get_app_logs().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_payment_requests_skip_payer_and_zero_shares() {
    let service = create_test_service();
    let mut bill = dinner();
    bill.items.push(BillItem::new("Water", dec!(0), 1));
    let mut assignment = Assignment::even(&bill, &["A", "B"]);
    assignment.assign(2, &["C"]);
    let split = service.split_bill(&bill, &assignment, None).await.unwrap();

    let requests = service
        .payment_requests(&bill, &split, &alex(), Some("A"), Some("u1"))
        .await
        .unwrap();
    assert_eq!(requests.len(), 1);

    let request = &requests[0];
    assert_eq!(request.participant.as_deref(), Some("B"));
    assert_eq!(request.amount, dec!(6.82));
    assert_eq!(request.reference.as_deref(), Some("Tian Tian split - B"));
    assert!(request.message.as_deref().unwrap().contains("*Total Amount: $6.82*"));

    let decoded = decode_payload(&request.payload).unwrap();
    assert_eq!(decoded.amount, Some(dec!(6.82)));
    assert_eq!(decoded.reference.as_deref(), Some("Tian Tian split - B"));

    let logs = service.get_app_logs().await.unwrap();
    assert_eq!(logs.last().unwrap().action, PAYMENT_REQUESTS_CREATED);
}

#[tokio::test]
async fn test_single_payment_request() {
    let service = create_test_service();
    let request = service
        .payment_request(&alex(), dec!(12.50), None, None)
        .await
        .unwrap();
    assert!(request.payload.ends_with("63048C3F"));
    assert!(request.participant.is_none());

    let decoded = service.verify_payload(&format!("  {}\n", request.payload)).unwrap();
    assert_eq!(decoded.amount, Some(dec!(12.50)));

    let zero = service.payment_request(&alex(), dec!(0), None, None).await;
    assert!(matches!(zero, Err(BillSplitError::InvalidAmount(_))));
}

#[tokio::test]
async fn test_payment_request_reports_the_encoded_amount() {
    let service = create_test_service();
    let request = service
        .payment_request(&alex(), dec!(12.505), None, None)
        .await
        .unwrap();
    assert_eq!(request.amount, dec!(12.51));
    assert_eq!(decode_payload(&request.payload).unwrap().amount, Some(request.amount));
}

#[tokio::test]
async fn test_saved_recipients() {
    let service = create_test_service();
    let saved = service.save_recipient("u1", "8123 4567", " Sam Lee ").await.unwrap();
    assert_eq!(saved.phone, "+6581234567");
    assert_eq!(saved.name, "Sam Lee");
    assert_eq!(service.get_recipient("u1").await.unwrap(), Some(saved));

    let recipient = service.recipient_for(Some("u1")).await.unwrap();
    assert_eq!(recipient.proxy_value, "+6581234567");

    assert!(matches!(
        service.save_recipient("u2", "12345", "Bob").await,
        Err(BillSplitError::InvalidRecipient(_))
    ));

    service.delete_recipient("u1").await.unwrap();
    assert!(service.get_recipient("u1").await.unwrap().is_none());
    assert!(matches!(
        service.delete_recipient("u1").await,
        Err(BillSplitError::RecipientNotFound(_))
    ));

    let actions: Vec<String> = service
        .get_app_logs()
        .await
        .unwrap()
        .into_iter()
        .map(|log| log.action)
        .collect();
    assert_eq!(actions, vec![RECIPIENT_SAVED, RECIPIENT_DELETED]);
}

#[tokio::test]
async fn test_recipient_falls_back_to_default() {
    let service = create_test_service();
    assert!(matches!(
        service.recipient_for(Some("u1")).await,
        Err(BillSplitError::RecipientNotFound(_))
    ));

    let service = create_test_service_with(ServiceSettings {
        default_recipient: Some(alex()),
        ..ServiceSettings::default()
    });
    assert_eq!(service.recipient_for(Some("u1")).await.unwrap(), alex());
    assert_eq!(service.recipient_for(None).await.unwrap(), alex());
}

#[tokio::test]
async fn test_pairings() {
    let service = create_test_service();
    service.save_pairing("chat", "person_left", "u1").await.unwrap();
    service.save_pairing("chat", "person_left", "u2").await.unwrap();

    let pairings = service.get_pairings("chat").await.unwrap();
    assert_eq!(pairings.len(), 1);
    assert_eq!(pairings[0].external_user_id, "u2");

    assert!(matches!(
        service.save_pairing("chat", "  ", "u1").await,
        Err(BillSplitError::InvalidInput(..))
    ));
    let logs = service.get_app_logs().await.unwrap();
    assert!(logs.iter().all(|log| log.action == PAIRING_SAVED));
}

#[tokio::test]
async fn test_parse_bill_through_service() {
    let service = create_test_service();
    let bill = service
        .parse_bill(r#"{"items": [{"name": "Laksa", "price": 6.50}]}"#, None)
        .await
        .unwrap();
    assert_eq!(bill.total, dec!(6.50));
    assert!(matches!(
        service.parse_bill("no bill here", None).await,
        Err(BillSplitError::UpstreamParseError(_))
    ));
}
