use crate::constants::{
    BILL_PARSED, BILL_SPLIT, PAIRING_SAVED, PAYMENT_PAYLOAD_CREATED, PAYMENT_REQUESTS_CREATED, RECIPIENT_DELETED,
    RECIPIENT_SAVED,
};
use crate::core::errors::BillSplitError;
use crate::core::models::{
    AppLog, Assignment, Bill, Pairing, PaymentRecipient, SavedRecipient, SplitResult, round_cents,
};
use crate::core::paynow::{self, Currency, DecodedPayload, PayNowOptions};
use crate::core::split::{SplitOptions, compute_shares_with};
use crate::core::summary::{bill_reference, format_payment_message};
use crate::core::upstream::parse_bill_response;
use crate::infrastructure::logging::LoggingService;
use crate::infrastructure::storage::Storage;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};
use utoipa::ToSchema;

/// One participant's amount together with the PayNow payload that pays it.
#[derive(Serialize, Deserialize, Debug, ToSchema, Clone, PartialEq)]
pub struct PaymentRequest {
    pub participant: Option<String>,
    #[schema(value_type = String, example = "12.50")]
    pub amount: Decimal,
    pub reference: Option<String>,
    pub payload: String,
    /// Markdown message listing what the participant is paying for
    pub message: Option<String>,
}

/// Tunables the service applies to every split and payload.
#[derive(Clone, Debug, Default)]
pub struct ServiceSettings {
    pub split: SplitOptions,
    pub paynow: PayNowOptions,
    /// Used when a user has no saved recipient
    pub default_recipient: Option<PaymentRecipient>,
}

pub struct SplitService<L: LoggingService, S: Storage> {
    storage: S,
    logging: L,
    settings: ServiceSettings,
}

impl<L: LoggingService, S: Storage> SplitService<L, S> {
    pub fn new(storage: S, logging: L, settings: ServiceSettings) -> Self {
        SplitService {
            storage,
            logging,
            settings,
        }
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    async fn log_and_audit(
        &self,
        action: &str,
        details: serde_json::Value,
        user_id: Option<&str>,
    ) -> Result<(), BillSplitError> {
        debug!("Recording action {}", action);
        self.logging.log_action(action, details, user_id).await
    }

    fn validate_string_input(&self, field: &str, value: &str, max_length: usize) -> Result<(), BillSplitError> {
        if value.trim().is_empty() {
            return Err(BillSplitError::invalid_input(
                field,
                &format!("Invalid {}", field),
                format!("{} cannot be empty", field),
            ));
        }
        if value.chars().count() > max_length {
            return Err(BillSplitError::invalid_input(
                field,
                &format!("{} Too Long", field),
                format!("{} cannot exceed {} characters", field, max_length),
            ));
        }
        if value.chars().any(char::is_control) {
            return Err(BillSplitError::invalid_input(
                field,
                &format!("Invalid {}", field),
                format!("{} contains invalid characters", field),
            ));
        }
        Ok(())
    }

    pub async fn parse_bill(&self, text: &str, user_id: Option<&str>) -> Result<Bill, BillSplitError> {
        let bill = parse_bill_response(text)?;
        self.log_and_audit(
            BILL_PARSED,
            json!({ "items": bill.items.len(), "total": bill.total, "restaurant": bill.restaurant }),
            user_id,
        )
        .await?;
        Ok(bill)
    }

    /// Splits `bill` by `assignment` with the configured tolerance and policy.
    pub async fn split_bill(
        &self,
        bill: &Bill,
        assignment: &Assignment,
        user_id: Option<&str>,
    ) -> Result<SplitResult, BillSplitError> {
        let split = compute_shares_with(bill, assignment, &self.settings.split)?;
        info!(
            "Split bill of {} among {} participants",
            split.total,
            split.shares.len()
        );
        self.log_and_audit(
            BILL_SPLIT,
            json!({
                "total": split.total,
                "shares": split
                    .shares
                    .iter()
                    .map(|s| json!({ "participant": s.participant, "amount": s.amount }))
                    .collect::<Vec<_>>()
            }),
            user_id,
        )
        .await?;
        Ok(split)
    }

    /// Shares every item of `bill` evenly among `participants`.
    pub async fn split_even(
        &self,
        bill: &Bill,
        participants: &[String],
        user_id: Option<&str>,
    ) -> Result<SplitResult, BillSplitError> {
        if participants.is_empty() {
            return Err(BillSplitError::InvalidAssignment(
                "at least one participant is required".to_string(),
            ));
        }
        for participant in participants {
            self.validate_string_input("participant", participant, 100)?;
        }
        let assignment = Assignment::even(bill, participants);
        self.split_bill(bill, &assignment, user_id).await
    }

    /// Encodes a single payload using the configured PayNow defaults.
    pub async fn payment_request(
        &self,
        recipient: &PaymentRecipient,
        amount: Decimal,
        reference: Option<String>,
        user_id: Option<&str>,
    ) -> Result<PaymentRequest, BillSplitError> {
        let options = PayNowOptions {
            reference: reference.clone(),
            ..self.settings.paynow.clone()
        };
        let payload = paynow::encode_payment_with(recipient, amount, Currency::Sgd, &options)?;
        // The payload carries the amount in cents; report the same figure
        let amount = round_cents(amount);
        self.log_and_audit(
            PAYMENT_PAYLOAD_CREATED,
            json!({ "amount": amount, "reference": reference, "recipient": recipient.display_name }),
            user_id,
        )
        .await?;
        Ok(PaymentRequest {
            participant: None,
            amount,
            reference,
            payload,
            message: None,
        })
    }

    /// One payment request per participant who owes something. The participant
    /// named by `exclude` (usually whoever paid) is skipped.
    pub async fn payment_requests(
        &self,
        bill: &Bill,
        split: &SplitResult,
        recipient: &PaymentRecipient,
        exclude: Option<&str>,
        user_id: Option<&str>,
    ) -> Result<Vec<PaymentRequest>, BillSplitError> {
        let recipient = recipient.clone().validated()?;
        let mut requests = Vec::new();
        for share in &split.shares {
            if Some(share.participant.as_str()) == exclude {
                debug!("Skipping payer {}", share.participant);
                continue;
            }
            if share.amount <= Decimal::ZERO {
                debug!("Skipping {} with nothing to pay", share.participant);
                continue;
            }
            let reference = bill_reference(bill.restaurant.as_deref(), Some(&share.participant));
            let options = PayNowOptions {
                reference: Some(reference.clone()),
                ..self.settings.paynow.clone()
            };
            let payload = paynow::encode_payment_with(&recipient, share.amount, Currency::Sgd, &options)?;
            requests.push(PaymentRequest {
                participant: Some(share.participant.clone()),
                amount: share.amount,
                reference: Some(reference),
                payload,
                message: Some(format_payment_message(share, split, bill, &recipient)),
            });
        }

        self.log_and_audit(
            PAYMENT_REQUESTS_CREATED,
            json!({
                "count": requests.len(),
                "excluded": exclude,
                "participants": requests.iter().map(|r| r.participant.clone()).collect::<Vec<_>>()
            }),
            user_id,
        )
        .await?;
        Ok(requests)
    }

    /// Checks the CRC of `payload` and reads its fields back.
    pub fn verify_payload(&self, payload: &str) -> Result<DecodedPayload, BillSplitError> {
        paynow::decode_payload(payload.trim())
    }

    pub async fn save_recipient(&self, user_id: &str, phone: &str, name: &str) -> Result<SavedRecipient, BillSplitError> {
        self.validate_string_input("user_id", user_id, 100)?;
        let recipient = PaymentRecipient::mobile(phone, name)?;
        let saved = SavedRecipient {
            user_id: user_id.to_string(),
            phone: recipient.proxy_value,
            name: recipient.display_name,
            updated_at: Utc::now(),
        };
        self.storage.save_recipient(saved.clone()).await?;
        self.log_and_audit(RECIPIENT_SAVED, json!({ "name": saved.name }), Some(user_id))
            .await?;
        Ok(saved)
    }

    pub async fn get_recipient(&self, user_id: &str) -> Result<Option<SavedRecipient>, BillSplitError> {
        self.storage.get_recipient(user_id).await
    }

    pub async fn delete_recipient(&self, user_id: &str) -> Result<(), BillSplitError> {
        if !self.storage.delete_recipient(user_id).await? {
            return Err(BillSplitError::RecipientNotFound(user_id.to_string()));
        }
        self.log_and_audit(RECIPIENT_DELETED, json!({}), Some(user_id)).await?;
        Ok(())
    }

    /// The recipient to pay `user_id` back, falling back to the configured default.
    pub async fn recipient_for(&self, user_id: Option<&str>) -> Result<PaymentRecipient, BillSplitError> {
        if let Some(user_id) = user_id {
            if let Some(saved) = self.storage.get_recipient(user_id).await? {
                return PaymentRecipient::mobile(&saved.phone, &saved.name);
            }
        }
        self.settings
            .default_recipient
            .clone()
            .ok_or_else(|| BillSplitError::RecipientNotFound(user_id.unwrap_or("default").to_string()))
    }

    pub async fn save_pairing(
        &self,
        chat_id: &str,
        person_key: &str,
        external_user_id: &str,
    ) -> Result<Pairing, BillSplitError> {
        self.validate_string_input("chat_id", chat_id, 100)?;
        self.validate_string_input("person_key", person_key, 100)?;
        self.validate_string_input("external_user_id", external_user_id, 100)?;

        let pairing = Pairing {
            chat_id: chat_id.to_string(),
            person_key: person_key.to_string(),
            external_user_id: external_user_id.to_string(),
            updated_at: Utc::now(),
        };
        self.storage.save_pairing(pairing.clone()).await?;
        self.log_and_audit(
            PAIRING_SAVED,
            json!({ "chat_id": chat_id, "person_key": person_key }),
            Some(external_user_id),
        )
        .await?;
        Ok(pairing)
    }

    pub async fn get_pairings(&self, chat_id: &str) -> Result<Vec<Pairing>, BillSplitError> {
        self.storage.get_pairings(chat_id).await
    }

    pub async fn get_app_logs(&self) -> Result<Vec<AppLog>, BillSplitError> {
        self.logging.get_logs().await
    }
}
