pub mod delivery;
pub mod ledger;
pub mod notify;
pub mod submissions;
pub mod traits;

// Re-exports for convenience.
pub use delivery::RestDeliveryClient;
pub use ledger::DispatchLedger;
pub use notify::RestNotifyClient;
pub use submissions::JsonlSubmissionLog;
pub use traits::{
    DeliveryRequest, DocumentDelivery, Notifier, NotifyRequest, SubmissionLog, SubmissionRecord,
};
