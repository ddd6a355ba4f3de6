//! Action executor.
//!
//! Dispatches each gated action through the matching backend adapter
//! and records the outcome. Actions execute independently (one failure
//! never blocks a sibling and never touches the generated answer), each
//! dispatch is bounded by a timeout, and replays of the same dispatch
//! identity are suppressed via the ledger.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::future::join_all;

use docent_domain::config::ActionsConfig;
use docent_domain::error::{Error, Result};
use docent_domain::state::{ActionDescriptor, ActionKind, ActionOutcome, ExecutedAction};
use docent_domain::trace::TraceEvent;

use docent_actions::ledger::{dispatch_key, DispatchLedger};
use docent_actions::traits::{
    DeliveryRequest, DocumentDelivery, Notifier, NotifyRequest, SubmissionLog, SubmissionRecord,
};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Executor
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Holds the optional backend adapters. An unconfigured backend turns
/// the matching action into a "service unavailable" failure outcome
/// rather than a crash.
pub struct Executor {
    delivery: Option<Arc<dyn DocumentDelivery>>,
    notifier: Option<Arc<dyn Notifier>>,
    submissions: Option<Arc<dyn SubmissionLog>>,
    ledger: DispatchLedger,
    timeout: Duration,
    document_id: String,
}

impl Executor {
    pub fn new(
        cfg: &ActionsConfig,
        delivery: Option<Arc<dyn DocumentDelivery>>,
        notifier: Option<Arc<dyn Notifier>>,
        submissions: Option<Arc<dyn SubmissionLog>>,
    ) -> Self {
        let document_id = cfg
            .delivery
            .as_ref()
            .map(|d| d.document_id.clone())
            .unwrap_or_else(|| "profile-dossier".into());

        Self {
            delivery,
            notifier,
            submissions,
            ledger: DispatchLedger::new(),
            timeout: Duration::from_millis(cfg.dispatch_timeout_ms),
            document_id,
        }
    }

    /// Execute a gated plan. Dispatches run concurrently; results come
    /// back in plan order. Never fails the turn.
    pub async fn execute(
        &self,
        session_id: &str,
        turn_id: &str,
        actions: &[ActionDescriptor],
    ) -> Vec<ExecutedAction> {
        let futures: Vec<_> = actions
            .iter()
            .map(|d| self.execute_one(session_id, turn_id, d))
            .collect();
        join_all(futures).await
    }

    async fn execute_one(
        &self,
        session_id: &str,
        turn_id: &str,
        descriptor: &ActionDescriptor,
    ) -> ExecutedAction {
        // Reserve the dispatch identity before any external call; the
        // reservation also covers calls that later error.
        let key = dispatch_key(
            session_id,
            turn_id,
            descriptor.kind.as_str(),
            &descriptor.params,
        );
        if !self.ledger.reserve(&key) {
            TraceEvent::DispatchSuppressed {
                kind: descriptor.kind.as_str().to_owned(),
            }
            .emit();
            return ExecutedAction {
                descriptor: descriptor.clone(),
                outcome: ActionOutcome::Success,
                detail: "duplicate dispatch suppressed".into(),
            };
        }

        let start = Instant::now();
        let result = match tokio::time::timeout(self.timeout, self.dispatch(descriptor)).await {
            Ok(r) => r,
            Err(_) => Err(Error::Timeout(format!(
                "{} exceeded {}ms",
                descriptor.kind.as_str(),
                self.timeout.as_millis()
            ))),
        };

        let (outcome, detail) = match result {
            Ok(receipt) => (ActionOutcome::Success, receipt),
            Err(e) => (ActionOutcome::Failure, e.to_string()),
        };

        TraceEvent::ActionDispatched {
            kind: descriptor.kind.as_str().to_owned(),
            outcome: outcome.as_str().to_owned(),
            duration_ms: start.elapsed().as_millis() as u64,
        }
        .emit();

        ExecutedAction {
            descriptor: descriptor.clone(),
            outcome,
            detail,
        }
    }

    async fn dispatch(&self, descriptor: &ActionDescriptor) -> Result<String> {
        match descriptor.kind {
            ActionKind::SendDocument => match &self.delivery {
                Some(client) => {
                    let recipient = descriptor
                        .params
                        .get("recipient")
                        .and_then(|v| v.as_str())
                        .unwrap_or("session")
                        .to_owned();
                    client
                        .deliver(DeliveryRequest {
                            document_id: self.document_id.clone(),
                            recipient,
                            note: None,
                        })
                        .await
                }
                None => Err(unavailable("delivery")),
            },
            ActionKind::FlagContact => match &self.notifier {
                Some(client) => {
                    let body = descriptor
                        .params
                        .get("note")
                        .and_then(|v| v.as_str())
                        .unwrap_or_default()
                        .to_owned();
                    client
                        .notify(NotifyRequest {
                            subject: "contact request".into(),
                            body,
                        })
                        .await
                }
                None => Err(unavailable("notify")),
            },
            ActionKind::LogSubmission => match &self.submissions {
                Some(log) => {
                    let category = descriptor
                        .params
                        .get("category")
                        .and_then(|v| v.as_str())
                        .unwrap_or("other")
                        .to_owned();
                    let content_chars = descriptor
                        .params
                        .get("content_chars")
                        .and_then(|v| v.as_u64())
                        .unwrap_or(0) as usize;
                    log.append(SubmissionRecord::new(category, content_chars)).await
                }
                None => Err(unavailable("submissions")),
            },
        }
    }
}

fn unavailable(name: &str) -> Error {
    Error::Backend {
        name: name.into(),
        message: "service unavailable: backend not configured".into(),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
