use crate::constants::DEFAULT_PAYNOW_EXPIRY;
use crate::core::errors::BillSplitError;
use crate::core::models::PaymentRecipient;
use crate::core::paynow::PayNowOptions;
use crate::core::services::ServiceSettings;
use crate::core::split::{InconsistencyPolicy, SplitOptions};
use dotenv::dotenv;
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use std::env;
use std::path::PathBuf;

pub struct Config {
    pub port: u16,
    pub log_level: String,
    pub split_tolerance: Decimal,
    pub inconsistent_bill_policy: InconsistencyPolicy,
    pub paynow_max_amount: Option<Decimal>,
    pub paynow_expiry: String,
    pub paynow_recipient_phone: Option<String>,
    pub paynow_recipient_name: Option<String>,
    /// JSON store for saved recipients and pairings; in-memory when unset
    pub storage_path: Option<PathBuf>,
}

impl core::fmt::Debug for Config {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("log_level", &self.log_level)
            .field("split_tolerance", &self.split_tolerance)
            .field("inconsistent_bill_policy", &self.inconsistent_bill_policy)
            .field("paynow_max_amount", &self.paynow_max_amount)
            .field("paynow_expiry", &self.paynow_expiry)
            .field(
                "paynow_recipient_phone",
                &self.paynow_recipient_phone.as_ref().map(|_| "<redacted>"),
            )
            .field("paynow_recipient_name", &self.paynow_recipient_name)
            .field("storage_path", &self.storage_path)
            .finish()
    }
}

impl Config {
    fn from_env() -> Self {
        dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds the config from a variable lookup. Unparseable values fall back to their defaults.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| var(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            port: non_empty("PORT").and_then(|v| v.parse().ok()).unwrap_or(3000),
            log_level: non_empty("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            split_tolerance: non_empty("SPLIT_TOLERANCE")
                .and_then(|v| v.parse().ok())
                .filter(|t: &Decimal| *t >= Decimal::ZERO)
                .unwrap_or_else(|| SplitOptions::default().tolerance),
            inconsistent_bill_policy: non_empty("INCONSISTENT_BILL_POLICY")
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
            paynow_max_amount: non_empty("PAYNOW_MAX_AMOUNT").and_then(|v| v.parse().ok()),
            paynow_expiry: non_empty("PAYNOW_EXPIRY").unwrap_or_else(|| DEFAULT_PAYNOW_EXPIRY.to_string()),
            paynow_recipient_phone: non_empty("PAYNOW_RECIPIENT_PHONE"),
            paynow_recipient_name: non_empty("PAYNOW_RECIPIENT_NAME"),
            storage_path: non_empty("STORAGE_PATH").map(PathBuf::from),
        }
    }

    /// Service settings derived from the config. A configured default recipient must be valid.
    pub fn service_settings(&self) -> Result<ServiceSettings, BillSplitError> {
        let default_recipient = match (&self.paynow_recipient_phone, &self.paynow_recipient_name) {
            (Some(phone), Some(name)) => Some(PaymentRecipient::mobile(phone, name)?),
            (Some(_), None) | (None, Some(_)) => {
                return Err(BillSplitError::invalid_input(
                    "PAYNOW_RECIPIENT_PHONE",
                    "Incomplete Recipient",
                    "PAYNOW_RECIPIENT_PHONE and PAYNOW_RECIPIENT_NAME must be set together",
                ));
            }
            (None, None) => None,
        };

        Ok(ServiceSettings {
            split: SplitOptions {
                tolerance: self.split_tolerance,
                policy: self.inconsistent_bill_policy,
            },
            paynow: PayNowOptions {
                expiry: self.paynow_expiry.clone(),
                max_amount: self.paynow_max_amount,
                ..PayNowOptions::default()
            },
            default_recipient,
        })
    }
}

pub static CONFIG: Lazy<Config> = Lazy::new(Config::from_env);
