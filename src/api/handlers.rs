use crate::{
    api::models::*,
    core::{
        errors::BillSplitError,
        models::{AppLog, Assignment, Bill, ItemShare, Pairing, SavedRecipient, SplitResult},
        paynow::{Currency, DecodedPayload},
        services::{PaymentRequest, SplitService},
    },
    infrastructure::{logging::in_memory::InMemoryLogging, storage::Storage},
};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

/// The service as the HTTP layer holds it; the storage backend is picked at startup.
pub type AppService = SplitService<InMemoryLogging, Arc<dyn Storage>>;

// Define API routes
pub fn api_routes(service: Arc<AppService>) -> Router {
    Router::new()
        .route("/splits", post(split_bill))
        .route("/splits/even", post(split_even))
        .route("/bills/parse", post(parse_bill))
        .route("/paynow", post(create_payload))
        .route("/paynow/verify", post(verify_payload))
        .route("/payment-requests", post(create_payment_requests))
        .route(
            "/recipients/{user_id}",
            get(get_recipient).put(save_recipient).delete(delete_recipient),
        )
        .route("/chats/{chat_id}/pairings", get(get_pairings).put(save_pairing))
        .route("/logs", get(get_app_logs))
        .with_state(service)
}

fn to_assignment(items: HashMap<usize, Vec<SharerRequest>>) -> Assignment {
    let mut assignment = Assignment::new();
    for (index, sharers) in items {
        for sharer in sharers {
            let weight = sharer.weight.unwrap_or(Decimal::ONE);
            assignment.add_share(index, ItemShare::weighted(sharer.participant, weight));
        }
    }
    assignment
}

#[utoipa::path(
    post,
    path = "/api/splits",
    request_body = SplitRequest,
    responses(
        (status = 200, description = "Per-participant amounts", body = SplitResult),
        (status = 400, description = "Invalid assignment", body = ErrorResponse),
        (status = 422, description = "Bill totals do not reconcile", body = ErrorResponse)
    )
)]
async fn split_bill(
    State(service): State<Arc<AppService>>,
    Json(req): Json<SplitRequest>,
) -> Result<Json<SplitResult>, ApiError> {
    let assignment = to_assignment(req.assignment);
    let split = service
        .split_bill(&req.bill, &assignment, req.requested_by.as_deref())
        .await?;
    Ok(Json(split))
}

#[utoipa::path(
    post,
    path = "/api/splits/even",
    request_body = EvenSplitRequest,
    responses(
        (status = 200, description = "Per-participant amounts", body = SplitResult),
        (status = 400, description = "No participants", body = ErrorResponse),
        (status = 422, description = "Bill totals do not reconcile", body = ErrorResponse)
    )
)]
async fn split_even(
    State(service): State<Arc<AppService>>,
    Json(req): Json<EvenSplitRequest>,
) -> Result<Json<SplitResult>, ApiError> {
    let split = service
        .split_even(&req.bill, &req.participants, req.requested_by.as_deref())
        .await?;
    Ok(Json(split))
}

#[utoipa::path(
    post,
    path = "/api/bills/parse",
    request_body = ParseBillRequest,
    responses(
        (status = 200, description = "Parsed bill", body = Bill),
        (status = 422, description = "Response could not be mapped to a bill", body = ErrorResponse)
    )
)]
async fn parse_bill(
    State(service): State<Arc<AppService>>,
    Json(req): Json<ParseBillRequest>,
) -> Result<Json<Bill>, ApiError> {
    let bill = service.parse_bill(&req.text, req.requested_by.as_deref()).await?;
    Ok(Json(bill))
}

#[utoipa::path(
    post,
    path = "/api/paynow",
    request_body = PayNowRequest,
    responses(
        (status = 200, description = "Encoded PayNow payload", body = PaymentRequest),
        (status = 400, description = "Invalid recipient, amount or currency", body = ErrorResponse),
        (status = 404, description = "No recipient to pay", body = ErrorResponse)
    )
)]
async fn create_payload(
    State(service): State<Arc<AppService>>,
    Json(req): Json<PayNowRequest>,
) -> Result<Json<PaymentRequest>, ApiError> {
    if let Some(currency) = &req.currency {
        currency.parse::<Currency>()?;
    }
    let recipient = match req.recipient {
        Some(recipient) => recipient,
        None => service.recipient_for(req.user_id.as_deref()).await?,
    };
    let request = service
        .payment_request(&recipient, req.amount, req.reference, req.user_id.as_deref())
        .await?;
    Ok(Json(request))
}

#[utoipa::path(
    post,
    path = "/api/paynow/verify",
    request_body = VerifyPayloadRequest,
    responses(
        (status = 200, description = "Decoded payload", body = DecodedPayload),
        (status = 400, description = "Malformed payload or checksum mismatch", body = ErrorResponse)
    )
)]
async fn verify_payload(
    State(service): State<Arc<AppService>>,
    Json(req): Json<VerifyPayloadRequest>,
) -> Result<Json<DecodedPayload>, ApiError> {
    Ok(Json(service.verify_payload(&req.payload)?))
}

#[utoipa::path(
    post,
    path = "/api/payment-requests",
    request_body = PaymentRequestsRequest,
    responses(
        (status = 200, description = "Split with one payment request per participant", body = PaymentRequestsResponse),
        (status = 400, description = "Invalid assignment or recipient", body = ErrorResponse),
        (status = 404, description = "No recipient to pay", body = ErrorResponse),
        (status = 422, description = "Bill totals do not reconcile", body = ErrorResponse)
    )
)]
async fn create_payment_requests(
    State(service): State<Arc<AppService>>,
    Json(req): Json<PaymentRequestsRequest>,
) -> Result<Json<PaymentRequestsResponse>, ApiError> {
    let recipient = match req.recipient {
        Some(recipient) => recipient,
        None => service.recipient_for(req.payer_user_id.as_deref()).await?,
    };
    let assignment = to_assignment(req.assignment);
    let split = service
        .split_bill(&req.bill, &assignment, req.payer_user_id.as_deref())
        .await?;
    let requests = service
        .payment_requests(
            &req.bill,
            &split,
            &recipient,
            req.payer.as_deref(),
            req.payer_user_id.as_deref(),
        )
        .await?;
    Ok(Json(PaymentRequestsResponse { split, requests }))
}

#[utoipa::path(
    get,
    path = "/api/recipients/{user_id}",
    params(("user_id" = String, Path, description = "External user id")),
    responses(
        (status = 200, description = "Saved recipient", body = SavedRecipient),
        (status = 404, description = "Nothing saved for this user", body = ErrorResponse)
    )
)]
async fn get_recipient(
    State(service): State<Arc<AppService>>,
    Path(user_id): Path<String>,
) -> Result<Json<SavedRecipient>, ApiError> {
    let recipient = service
        .get_recipient(&user_id)
        .await?
        .ok_or(BillSplitError::RecipientNotFound(user_id))?;
    Ok(Json(recipient))
}

#[utoipa::path(
    put,
    path = "/api/recipients/{user_id}",
    params(("user_id" = String, Path, description = "External user id")),
    request_body = SaveRecipientRequest,
    responses(
        (status = 200, description = "Recipient saved", body = SavedRecipient),
        (status = 400, description = "Invalid phone or name", body = ErrorResponse)
    )
)]
async fn save_recipient(
    State(service): State<Arc<AppService>>,
    Path(user_id): Path<String>,
    Json(req): Json<SaveRecipientRequest>,
) -> Result<Json<SavedRecipient>, ApiError> {
    let saved = service.save_recipient(&user_id, &req.phone, &req.name).await?;
    Ok(Json(saved))
}

#[utoipa::path(
    delete,
    path = "/api/recipients/{user_id}",
    params(("user_id" = String, Path, description = "External user id")),
    responses(
        (status = 204, description = "Recipient deleted"),
        (status = 404, description = "Nothing saved for this user", body = ErrorResponse)
    )
)]
async fn delete_recipient(
    State(service): State<Arc<AppService>>,
    Path(user_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    service.delete_recipient(&user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/chats/{chat_id}/pairings",
    params(("chat_id" = String, Path, description = "Chat the pairings belong to")),
    responses(
        (status = 200, description = "Pairings of the chat", body = [Pairing])
    )
)]
async fn get_pairings(
    State(service): State<Arc<AppService>>,
    Path(chat_id): Path<String>,
) -> Result<Json<Vec<Pairing>>, ApiError> {
    Ok(Json(service.get_pairings(&chat_id).await?))
}

#[utoipa::path(
    put,
    path = "/api/chats/{chat_id}/pairings",
    params(("chat_id" = String, Path, description = "Chat the pairing belongs to")),
    request_body = SavePairingRequest,
    responses(
        (status = 200, description = "Pairing saved", body = Pairing),
        (status = 400, description = "Bad request", body = ErrorResponse)
    )
)]
async fn save_pairing(
    State(service): State<Arc<AppService>>,
    Path(chat_id): Path<String>,
    Json(req): Json<SavePairingRequest>,
) -> Result<Json<Pairing>, ApiError> {
    let pairing = service
        .save_pairing(&chat_id, &req.person_key, &req.external_user_id)
        .await?;
    Ok(Json(pairing))
}

#[utoipa::path(
    get,
    path = "/api/logs",
    responses(
        (status = 200, description = "Recorded actions", body = [AppLog])
    )
)]
async fn get_app_logs(State(service): State<Arc<AppService>>) -> Result<Json<Vec<AppLog>>, ApiError> {
    Ok(Json(service.get_app_logs().await?))
}
