use axum::{Json, http::StatusCode, response::IntoResponse};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

use crate::core::errors::BillSplitError;
use crate::core::models::{Bill, PaymentRecipient, SplitResult};
use crate::core::services::PaymentRequest;

// Request structs for JSON payloads
#[derive(Deserialize, ToSchema)]
pub struct SharerRequest {
    pub participant: String,
    /// Relative weight on the item, 1 when omitted
    #[schema(value_type = Option<String>, example = "0.5")]
    pub weight: Option<Decimal>,
}

#[derive(Deserialize, ToSchema)]
pub struct SplitRequest {
    pub bill: Bill,
    /// Sharers per item, keyed by 0-based item index
    pub assignment: HashMap<usize, Vec<SharerRequest>>,
    pub requested_by: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct EvenSplitRequest {
    pub bill: Bill,
    pub participants: Vec<String>,
    pub requested_by: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct ParseBillRequest {
    /// Raw text returned by the vision model
    pub text: String,
    pub requested_by: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct PayNowRequest {
    /// Explicit recipient; otherwise the saved recipient of `user_id` or the configured default
    pub recipient: Option<PaymentRecipient>,
    pub user_id: Option<String>,
    #[schema(value_type = String, example = "12.50")]
    pub amount: Decimal,
    pub reference: Option<String>,
    /// Only SGD is accepted
    pub currency: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct VerifyPayloadRequest {
    pub payload: String,
}

#[derive(Deserialize, ToSchema)]
pub struct PaymentRequestsRequest {
    pub bill: Bill,
    pub assignment: HashMap<usize, Vec<SharerRequest>>,
    pub recipient: Option<PaymentRecipient>,
    /// Saved recipient to pay back when `recipient` is omitted
    pub payer_user_id: Option<String>,
    /// Participant who paid and owes nothing back
    pub payer: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct PaymentRequestsResponse {
    pub split: SplitResult,
    pub requests: Vec<PaymentRequest>,
}

#[derive(Deserialize, ToSchema)]
pub struct SaveRecipientRequest {
    pub phone: String,
    pub name: String,
}

#[derive(Deserialize, ToSchema)]
pub struct SavePairingRequest {
    pub person_key: String,
    pub external_user_id: String,
}

// Error response struct
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

// Newtype wrapper for BillSplitError to implement IntoResponse
pub struct ApiError(pub BillSplitError);

impl From<BillSplitError> for ApiError {
    fn from(err: BillSplitError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            BillSplitError::InvalidAssignment(_)
            | BillSplitError::InvalidRecipient(_)
            | BillSplitError::InvalidAmount(_)
            | BillSplitError::UnsupportedCurrency(_)
            | BillSplitError::InvalidInput(..) => StatusCode::BAD_REQUEST,
            BillSplitError::RecipientNotFound(_) => StatusCode::NOT_FOUND,
            BillSplitError::InconsistentBill { .. } | BillSplitError::UpstreamParseError(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            BillSplitError::StorageError(_) | BillSplitError::LoggingError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let error_message = match self.0 {
            BillSplitError::InvalidInput(field, detail) => {
                format!("Invalid input for {}: {}", field, detail.description)
            }
            BillSplitError::StorageError(msg) => {
                tracing::error!("Storage error: {}", msg);
                "Storage error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(ErrorResponse { error: error_message })).into_response()
    }
}
