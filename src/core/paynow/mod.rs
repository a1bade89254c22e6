//! PayNow QR payloads (EMVCo merchant-presented mode, Singapore profile).
//!
//! Field order, tag ids and the checksum are fixed by the published scheme;
//! banking apps refuse to scan anything else.

pub mod crc;
pub mod tlv;

pub use crc::{crc16_ccitt, crc16_hex};
pub use tlv::{TlvField, decode_fields, encode_field, encode_fields};

use crate::constants::{
    DEFAULT_PAYNOW_EXPIRY, MAX_REFERENCE_LENGTH, PAYNOW_COUNTRY_CODE, PAYNOW_GUID, PAYNOW_MERCHANT_CATEGORY,
    PAYNOW_MERCHANT_CITY,
};
use crate::core::errors::BillSplitError;
use crate::core::models::{PaymentRecipient, ProxyType, round_cents};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

const TAG_FORMAT_INDICATOR: &str = "00";
const TAG_INITIATION_METHOD: &str = "01";
const TAG_MERCHANT_ACCOUNT: &str = "26";
const TAG_CATEGORY_CODE: &str = "52";
const TAG_CURRENCY: &str = "53";
const TAG_AMOUNT: &str = "54";
const TAG_COUNTRY: &str = "58";
const TAG_MERCHANT_NAME: &str = "59";
const TAG_MERCHANT_CITY: &str = "60";
const TAG_ADDITIONAL_DATA: &str = "62";
const TAG_CRC: &str = "63";

// Sub-tags of the merchant account template (26) and additional data template (62)
const SUB_GUID: &str = "00";
const SUB_PROXY_TYPE: &str = "01";
const SUB_PROXY_VALUE: &str = "02";
const SUB_EDITABLE: &str = "03";
const SUB_EXPIRY: &str = "04";
const SUB_BILL_REFERENCE: &str = "01";

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Sgd,
}

impl Currency {
    /// ISO 4217 numeric code, as carried in field 53.
    pub fn numeric_code(self) -> &'static str {
        match self {
            Currency::Sgd => "702",
        }
    }
}

impl FromStr for Currency {
    type Err = BillSplitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SGD" | "702" => Ok(Currency::Sgd),
            _ => Err(BillSplitError::UnsupportedCurrency(s.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PayNowOptions {
    /// Bill reference shown in the banking app, cut to 25 characters
    pub reference: Option<String>,
    /// Whether the payer may change the amount
    pub editable: bool,
    /// Expiry date as YYYYMMDD
    pub expiry: String,
    pub max_amount: Option<Decimal>,
}

impl Default for PayNowOptions {
    fn default() -> Self {
        PayNowOptions {
            reference: None,
            editable: false,
            expiry: DEFAULT_PAYNOW_EXPIRY.to_string(),
            max_amount: None,
        }
    }
}

/// Encodes a fixed-amount payment request with default options.
pub fn encode_payment(
    recipient: &PaymentRecipient,
    amount: Decimal,
    currency: Currency,
) -> Result<String, BillSplitError> {
    encode_payment_with(recipient, amount, currency, &PayNowOptions::default())
}

pub fn encode_payment_with(
    recipient: &PaymentRecipient,
    amount: Decimal,
    currency: Currency,
    options: &PayNowOptions,
) -> Result<String, BillSplitError> {
    let recipient = recipient.clone().validated()?;
    let amount = format_amount(amount, options.max_amount)?;
    validate_expiry(&options.expiry)?;

    let merchant_account = encode_fields(&[
        TlvField::new(SUB_GUID, PAYNOW_GUID),
        TlvField::new(SUB_PROXY_TYPE, recipient.proxy_type.code()),
        TlvField::new(SUB_PROXY_VALUE, recipient.proxy_value),
        TlvField::new(SUB_EDITABLE, if options.editable { "1" } else { "0" }),
        TlvField::new(SUB_EXPIRY, options.expiry.as_str()),
    ])?;

    let mut fields = vec![
        TlvField::new(TAG_FORMAT_INDICATOR, "01"),
        TlvField::new(TAG_INITIATION_METHOD, "12"),
        TlvField::new(TAG_MERCHANT_ACCOUNT, merchant_account),
        TlvField::new(TAG_CATEGORY_CODE, PAYNOW_MERCHANT_CATEGORY),
        TlvField::new(TAG_CURRENCY, currency.numeric_code()),
        TlvField::new(TAG_AMOUNT, amount),
        TlvField::new(TAG_COUNTRY, PAYNOW_COUNTRY_CODE),
        TlvField::new(TAG_MERCHANT_NAME, recipient.display_name),
        TlvField::new(TAG_MERCHANT_CITY, PAYNOW_MERCHANT_CITY),
    ];
    let reference = options
        .reference
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(|r| r.chars().take(MAX_REFERENCE_LENGTH).collect::<String>());
    if let Some(reference) = reference {
        fields.push(TlvField::new(
            TAG_ADDITIONAL_DATA,
            encode_field(SUB_BILL_REFERENCE, &reference)?,
        ));
    }

    let mut payload = encode_fields(&fields)?;
    payload.push_str(TAG_CRC);
    payload.push_str("04");
    let checksum = crc16_hex(&payload);
    payload.push_str(&checksum);
    Ok(payload)
}

/// Formats an amount for field 54: two decimals, `.` separator, no grouping.
pub fn format_amount(amount: Decimal, max_amount: Option<Decimal>) -> Result<String, BillSplitError> {
    if amount <= Decimal::ZERO {
        return Err(BillSplitError::InvalidAmount(format!(
            "amount must be greater than zero, got {}",
            amount
        )));
    }
    let mut rounded = round_cents(amount);
    if rounded.is_zero() {
        return Err(BillSplitError::InvalidAmount(format!("{} rounds to 0.00", amount)));
    }
    if let Some(max) = max_amount {
        if rounded > max {
            return Err(BillSplitError::InvalidAmount(format!(
                "{} exceeds the maximum of {}",
                rounded, max
            )));
        }
    }
    rounded.rescale(2);
    Ok(rounded.to_string())
}

fn validate_expiry(expiry: &str) -> Result<(), BillSplitError> {
    if expiry.len() != 8 || !expiry.chars().all(|c| c.is_ascii_digit()) {
        return Err(BillSplitError::invalid_input(
            "expiry",
            "Invalid Expiry",
            format!("`{}` is not a YYYYMMDD date", expiry),
        ));
    }
    Ok(())
}

/// Checks that the trailing `6304XXXX` field matches the CRC of everything before it.
pub fn verify_checksum(payload: &str) -> Result<(), BillSplitError> {
    let split = payload.len().checked_sub(4).filter(|at| payload.is_char_boundary(*at));
    let Some(split) = split else {
        return Err(checksum_error("payload is too short to carry a checksum"));
    };
    let (body, checksum) = payload.split_at(split);
    if !body.ends_with("6304") {
        return Err(checksum_error("payload does not end with a checksum field"));
    }
    let expected = crc16_hex(body);
    if !checksum.eq_ignore_ascii_case(&expected) {
        return Err(checksum_error(&format!("checksum {} does not match {}", checksum, expected)));
    }
    Ok(())
}

fn checksum_error(description: &str) -> BillSplitError {
    BillSplitError::invalid_input("payload", "Checksum Mismatch", description)
}

/// A payload read back into its meaningful parts.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct DecodedPayload {
    pub fields: Vec<TlvField>,
    pub proxy_type: Option<ProxyType>,
    pub proxy_value: Option<String>,
    pub editable: bool,
    pub expiry: Option<String>,
    pub amount: Option<Decimal>,
    pub merchant_name: Option<String>,
    pub reference: Option<String>,
    pub checksum: String,
}

/// Verifies the checksum and decodes the fields of a PayNow payload.
pub fn decode_payload(payload: &str) -> Result<DecodedPayload, BillSplitError> {
    verify_checksum(payload)?;
    let fields = decode_fields(payload)?;

    let value_of = |tag: &str| fields.iter().find(|f| f.tag == tag).map(|f| f.value.clone());
    let account = match value_of(TAG_MERCHANT_ACCOUNT) {
        Some(template) => decode_fields(&template)?,
        None => Vec::new(),
    };
    let account_value = |tag: &str| account.iter().find(|f| f.tag == tag).map(|f| f.value.clone());
    let reference = match value_of(TAG_ADDITIONAL_DATA) {
        Some(template) => decode_fields(&template)?
            .into_iter()
            .find(|f| f.tag == SUB_BILL_REFERENCE)
            .map(|f| f.value),
        None => None,
    };
    let amount = value_of(TAG_AMOUNT)
        .map(|text| {
            Decimal::from_str(&text).map_err(|_| {
                BillSplitError::invalid_input("payload", "Malformed Amount", format!("`{}` is not an amount", text))
            })
        })
        .transpose()?;
    let proxy_type = account_value(SUB_PROXY_TYPE).and_then(|code| match code.as_str() {
        "0" => Some(ProxyType::Mobile),
        "2" => Some(ProxyType::Uen),
        _ => None,
    });

    Ok(DecodedPayload {
        proxy_type,
        proxy_value: account_value(SUB_PROXY_VALUE),
        editable: account_value(SUB_EDITABLE).as_deref() == Some("1"),
        expiry: account_value(SUB_EXPIRY),
        amount,
        merchant_name: value_of(TAG_MERCHANT_NAME),
        reference,
        checksum: value_of(TAG_CRC).unwrap_or_default(),
        fields,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn alex() -> PaymentRecipient {
        PaymentRecipient::mobile("+6591234567", "Alex Tan").unwrap()
    }

    #[test]
    fn test_known_payload() {
        let payload = encode_payment(&alex(), dec!(12.50), Currency::Sgd).unwrap();
        assert_eq!(
            payload,
            "00020101021226500009SG.PAYNOW010100211+659123456703010040820991230\
             520400005303702540512.505802SG5908Alex Tan6009Singapore63048C3F"
        );
    }

    #[test]
    fn test_reference_adds_additional_data() {
        let options = PayNowOptions {
            reference: Some("Dinner".to_string()),
            ..PayNowOptions::default()
        };
        let payload = encode_payment_with(&alex(), dec!(12.50), Currency::Sgd, &options).unwrap();
        assert!(payload.ends_with("62100106Dinner63043CB8"));
        assert!(verify_checksum(&payload).is_ok());
    }

    #[test]
    fn test_tampered_payload_fails_checksum() {
        let payload = encode_payment(&alex(), dec!(12.50), Currency::Sgd).unwrap();
        let tampered = payload.replace("12.50", "1.50");
        assert!(verify_checksum(&tampered).is_err());
        assert!(verify_checksum("6304").is_err());
    }

    #[test]
    fn test_amount_formatting() {
        assert_eq!(format_amount(dec!(12.5), None).unwrap(), "12.50");
        assert_eq!(format_amount(dec!(1234567.891), None).unwrap(), "1234567.89");
        assert_eq!(format_amount(dec!(0.005), None).unwrap(), "0.01");
        assert!(matches!(format_amount(dec!(0.004), None), Err(BillSplitError::InvalidAmount(_))));
        assert!(matches!(
            format_amount(dec!(500.01), Some(dec!(500))),
            Err(BillSplitError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_currency_parsing() {
        assert_eq!("sgd".parse::<Currency>().unwrap(), Currency::Sgd);
        assert!(matches!(
            "USD".parse::<Currency>(),
            Err(BillSplitError::UnsupportedCurrency(_))
        ));
    }

    #[test]
    fn test_bad_expiry_rejected() {
        let options = PayNowOptions {
            expiry: "2099-12-30".to_string(),
            ..PayNowOptions::default()
        };
        assert!(encode_payment_with(&alex(), dec!(1), Currency::Sgd, &options).is_err());
    }
}
