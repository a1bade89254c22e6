use crate::core::errors::BillSplitError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// SG mobile numbers are 8 digits starting with 8 or 9, optionally prefixed by the country code.
static SG_MOBILE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:\+?65)?([89]\d{7})$").unwrap());
static UEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9A-Z]{9,10}$").unwrap());

pub const MAX_NAME_LENGTH: usize = 25;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProxyType {
    Mobile,
    Uen,
}

impl ProxyType {
    /// Value of the proxy type sub-field in the PayNow merchant account template.
    pub fn code(self) -> &'static str {
        match self {
            ProxyType::Mobile => "0",
            ProxyType::Uen => "2",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct PaymentRecipient {
    pub proxy_type: ProxyType,
    pub proxy_value: String,
    pub display_name: String,
}

impl PaymentRecipient {
    /// A recipient addressed by SG mobile number, normalised to `+65XXXXXXXX`.
    pub fn mobile(phone: &str, display_name: &str) -> Result<Self, BillSplitError> {
        Ok(PaymentRecipient {
            proxy_type: ProxyType::Mobile,
            proxy_value: normalize_sg_mobile(phone)?,
            display_name: validate_display_name(display_name)?,
        })
    }

    /// A recipient addressed by business UEN.
    pub fn uen(uen: &str, display_name: &str) -> Result<Self, BillSplitError> {
        let uen = uen.trim().to_ascii_uppercase();
        if !UEN.is_match(&uen) {
            return Err(BillSplitError::InvalidRecipient(format!("`{}` is not a valid UEN", uen)));
        }
        Ok(PaymentRecipient {
            proxy_type: ProxyType::Uen,
            proxy_value: uen,
            display_name: validate_display_name(display_name)?,
        })
    }

    /// Re-runs validation on a recipient that arrived deserialized.
    pub fn validated(self) -> Result<Self, BillSplitError> {
        match self.proxy_type {
            ProxyType::Mobile => PaymentRecipient::mobile(&self.proxy_value, &self.display_name),
            ProxyType::Uen => PaymentRecipient::uen(&self.proxy_value, &self.display_name),
        }
    }
}

pub fn normalize_sg_mobile(phone: &str) -> Result<String, BillSplitError> {
    let compact: String = phone.chars().filter(|c| !c.is_whitespace() && *c != '-').collect();
    SG_MOBILE
        .captures(&compact)
        .and_then(|caps| caps.get(1))
        .map(|digits| format!("+65{}", digits.as_str()))
        .ok_or_else(|| BillSplitError::InvalidRecipient(format!("`{}` is not a Singapore mobile number", phone)))
}

/// Trims the name and cuts it to the 25 characters the QR name field allows.
fn validate_display_name(name: &str) -> Result<String, BillSplitError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(BillSplitError::InvalidRecipient("display name is empty".to_string()));
    }
    Ok(trimmed.chars().take(MAX_NAME_LENGTH).collect())
}
