use crate::core::errors::BillSplitError;
use crate::core::models::{PaymentRecipient, ProxyType};
use crate::core::paynow::{
    Currency, PayNowOptions, crc16_hex, decode_payload, encode_payment, encode_payment_with, verify_checksum,
};
use crate::tests::alex;
use rust_decimal_macros::dec;

#[test]
fn test_checksum_round_trip() {
    let payload = encode_payment(&alex(), dec!(12.50), Currency::Sgd).unwrap();
    let (body, checksum) = payload.split_at(payload.len() - 4);
    assert!(body.ends_with("6304"));
    assert_eq!(crc16_hex(body), checksum);
    assert!(verify_checksum(&payload).is_ok());
}

#[test]
fn test_decode_reads_fields_in_order() {
    let options = PayNowOptions {
        reference: Some("Tian Tian split - Person 1".to_string()),
        ..PayNowOptions::default()
    };
    let payload = encode_payment_with(&alex(), dec!(6.82), Currency::Sgd, &options).unwrap();
    let decoded = decode_payload(&payload).unwrap();

    let tags: Vec<&str> = decoded.fields.iter().map(|f| f.tag.as_str()).collect();
    assert_eq!(
        tags,
        vec!["00", "01", "26", "52", "53", "54", "58", "59", "60", "62", "63"]
    );
    assert_eq!(decoded.proxy_type, Some(ProxyType::Mobile));
    assert_eq!(decoded.proxy_value.as_deref(), Some("+6591234567"));
    assert!(!decoded.editable);
    assert_eq!(decoded.expiry.as_deref(), Some("20991230"));
    assert_eq!(decoded.amount, Some(dec!(6.82)));
    assert_eq!(decoded.merchant_name.as_deref(), Some("Alex Tan"));
    // References are cut to 25 characters
    assert_eq!(decoded.reference.as_deref(), Some("Tian Tian split - Person "));
}

#[test]
fn test_payload_is_deterministic() {
    let first = encode_payment(&alex(), dec!(3.33), Currency::Sgd).unwrap();
    let second = encode_payment(&alex(), dec!(3.33), Currency::Sgd).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_non_positive_amounts_rejected() {
    for amount in [dec!(0), dec!(-5.00)] {
        assert!(matches!(
            encode_payment(&alex(), amount, Currency::Sgd),
            Err(BillSplitError::InvalidAmount(_))
        ));
    }
}

#[test]
fn test_recipient_validation() {
    assert_eq!(
        PaymentRecipient::mobile("9123-4567", "Alex").unwrap().proxy_value,
        "+6591234567"
    );
    assert_eq!(
        PaymentRecipient::mobile("65 8123 4567", "Alex").unwrap().proxy_value,
        "+6581234567"
    );
    assert!(matches!(
        PaymentRecipient::mobile("61234567", "Alex"),
        Err(BillSplitError::InvalidRecipient(_))
    ));
    assert!(matches!(
        PaymentRecipient::mobile("+6591234567", "   "),
        Err(BillSplitError::InvalidRecipient(_))
    ));

    let long = PaymentRecipient::mobile("91234567", "Alexandria Tan Wei Ling Sophia").unwrap();
    assert_eq!(long.display_name.chars().count(), 25);
}

#[test]
fn test_deserialized_recipient_is_revalidated() {
    let forged = PaymentRecipient {
        proxy_type: ProxyType::Mobile,
        proxy_value: "12345".to_string(),
        display_name: "Mallory".to_string(),
    };
    assert!(matches!(
        encode_payment(&forged, dec!(1.00), Currency::Sgd),
        Err(BillSplitError::InvalidRecipient(_))
    ));
}

#[test]
fn test_uen_payload() {
    let shop = PaymentRecipient::uen("201234567k", "Kopi Shop Pte Ltd").unwrap();
    let options = PayNowOptions {
        editable: true,
        ..PayNowOptions::default()
    };
    let payload = encode_payment_with(&shop, dec!(4.20), Currency::Sgd, &options).unwrap();
    let decoded = decode_payload(&payload).unwrap();
    assert_eq!(decoded.proxy_type, Some(ProxyType::Uen));
    assert_eq!(decoded.proxy_value.as_deref(), Some("201234567K"));
    assert!(decoded.editable);
    assert!(decoded.reference.is_none());
}

#[test]
fn test_max_amount_is_enforced() {
    let options = PayNowOptions {
        max_amount: Some(dec!(100)),
        ..PayNowOptions::default()
    };
    assert!(encode_payment_with(&alex(), dec!(100.00), Currency::Sgd, &options).is_ok());
    assert!(matches!(
        encode_payment_with(&alex(), dec!(100.01), Currency::Sgd, &options),
        Err(BillSplitError::InvalidAmount(_))
    ));
}
