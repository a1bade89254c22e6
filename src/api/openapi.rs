use utoipa::OpenApi;

use crate::{
    api::models::{
        ErrorResponse, EvenSplitRequest, ParseBillRequest, PayNowRequest, PaymentRequestsRequest,
        PaymentRequestsResponse, SavePairingRequest, SaveRecipientRequest, SharerRequest, SplitRequest,
        VerifyPayloadRequest,
    },
    core::{
        models::{
            AppLog, Bill, BillItem, ItemAllocation, Pairing, ParticipantShare, PaymentRecipient, ProxyType,
            SavedRecipient, SplitResult,
        },
        paynow::{DecodedPayload, TlvField},
        services::PaymentRequest,
    },
};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::handlers::split_bill,
        super::handlers::split_even,
        super::handlers::parse_bill,
        super::handlers::create_payload,
        super::handlers::verify_payload,
        super::handlers::create_payment_requests,
        super::handlers::get_recipient,
        super::handlers::save_recipient,
        super::handlers::delete_recipient,
        super::handlers::get_pairings,
        super::handlers::save_pairing,
        super::handlers::get_app_logs
    ),
    components(schemas(
        SharerRequest,
        SplitRequest,
        EvenSplitRequest,
        ParseBillRequest,
        PayNowRequest,
        VerifyPayloadRequest,
        PaymentRequestsRequest,
        PaymentRequestsResponse,
        SaveRecipientRequest,
        SavePairingRequest,
        ErrorResponse,
        Bill,
        BillItem,
        SplitResult,
        ParticipantShare,
        ItemAllocation,
        PaymentRecipient,
        ProxyType,
        PaymentRequest,
        DecodedPayload,
        TlvField,
        SavedRecipient,
        Pairing,
        AppLog
    )),
    info(
        title = "Bill Split API",
        description = "Splits itemised restaurant bills and encodes PayNow payment requests",
        version = "0.1.0"
    )
)]
pub struct ApiDoc;
