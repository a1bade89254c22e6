mod paynow_tests;
mod service_tests;

use crate::core::models::PaymentRecipient;
use crate::core::services::{ServiceSettings, SplitService};
use crate::infrastructure::logging::in_memory::InMemoryLogging;
use crate::infrastructure::storage::in_memory::InMemoryStorage;

pub fn create_test_service() -> SplitService<InMemoryLogging, InMemoryStorage> {
    create_test_service_with(ServiceSettings::default())
}

pub fn create_test_service_with(settings: ServiceSettings) -> SplitService<InMemoryLogging, InMemoryStorage> {
    let storage = InMemoryStorage::new();
    let logging = InMemoryLogging::new();
    SplitService::new(storage, logging, settings)
}

pub fn alex() -> PaymentRecipient {
    PaymentRecipient::mobile("+6591234567", "Alex Tan").unwrap()
}
