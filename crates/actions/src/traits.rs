//! Interfaces to the side-effect dispatch collaborators.
//!
//! Each trait covers one external concern; implementations may talk to a
//! real service or be test doubles. All methods return the shared
//! `docent_domain::error::Result` and a short human-readable receipt on
//! success.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use docent_domain::error::Result;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Document delivery
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// POST /api/deliveries — request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryRequest {
    pub document_id: String,
    /// Delivery target; an opaque handle the delivery service resolves
    /// (session inbox, registered address).
    pub recipient: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[async_trait]
pub trait DocumentDelivery: Send + Sync {
    /// Deliver a document; returns a receipt string on success.
    async fn deliver(&self, req: DeliveryRequest) -> Result<String>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Operator notification
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// POST /api/notify — request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyRequest {
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Notify the operator; returns a receipt string on success.
    async fn notify(&self, req: NotifyRequest) -> Result<String>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Anonymized submission log
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One anonymized submission. Carries no submitter identity, no session
/// correlation, and no free text — only the shape of what arrived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub category: String,
    pub content_chars: usize,
    pub received_at: DateTime<Utc>,
}

impl SubmissionRecord {
    pub fn new(category: impl Into<String>, content_chars: usize) -> Self {
        Self {
            category: category.into(),
            content_chars,
            received_at: Utc::now(),
        }
    }
}

#[async_trait]
pub trait SubmissionLog: Send + Sync {
    /// Append one record; returns a receipt string on success.
    async fn append(&self, record: SubmissionRecord) -> Result<String>;
}
