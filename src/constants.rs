// Action names recorded through the logging service
pub const BILL_SPLIT: &str = "BILL_SPLIT";
pub const BILL_PARSED: &str = "BILL_PARSED";
pub const PAYMENT_PAYLOAD_CREATED: &str = "PAYMENT_PAYLOAD_CREATED";
pub const PAYMENT_REQUESTS_CREATED: &str = "PAYMENT_REQUESTS_CREATED";
pub const RECIPIENT_SAVED: &str = "RECIPIENT_SAVED";
pub const RECIPIENT_DELETED: &str = "RECIPIENT_DELETED";
pub const PAIRING_SAVED: &str = "PAIRING_SAVED";

// PayNow profile of the EMVCo merchant-presented QR
pub const PAYNOW_GUID: &str = "SG.PAYNOW";
pub const PAYNOW_MERCHANT_CATEGORY: &str = "0000";
pub const PAYNOW_COUNTRY_CODE: &str = "SG";
pub const PAYNOW_MERCHANT_CITY: &str = "Singapore";
pub const DEFAULT_PAYNOW_EXPIRY: &str = "20991230";
pub const MAX_REFERENCE_LENGTH: usize = 25;

pub const DEFAULT_BILL_REFERENCE: &str = "Bill Split";

// Largest amount and share weight a bill may carry; keeps split arithmetic in range
pub const MAX_BILL_AMOUNT: i64 = 1_000_000_000;
pub const MAX_SHARE_WEIGHT: i64 = 1_000_000;
