pub mod assignment;
pub mod audit;
pub mod bill;
pub mod person;
pub mod recipient;
pub mod records;
pub mod share;

pub use assignment::{Assignment, ItemShare};
pub use audit::AppLog;
pub use bill::{Bill, BillItem, round_cents};
pub use person::{DetectedPerson, PersonMatches};
pub use recipient::{PaymentRecipient, ProxyType};
pub use records::{Pairing, SavedRecipient};
pub use share::{ItemAllocation, ParticipantShare, SplitResult};
