pub mod api;
pub mod config;
pub mod constants;
pub mod core;
pub mod infrastructure;

pub use crate::core::errors::BillSplitError;
pub use crate::core::models::{Assignment, Bill, BillItem, PaymentRecipient, SplitResult};
pub use crate::core::paynow::{Currency, encode_payment};
pub use crate::core::services::SplitService;
pub use crate::core::split::compute_shares;

#[cfg(test)]
mod tests;
