//! Declarative action planner.
//!
//! Inspects the query, role, generated answer, and classification
//! signals and emits zero or more action descriptors — never side
//! effects. Descriptors come out in priority order (privacy/compliance
//! before convenience) so the policy gate and executor can judge each
//! one independently.

use docent_domain::role::Role;
use docent_domain::state::{ActionDescriptor, ActionKind, Classification};

use crate::classify::{contact_requested, document_requested, tokenize};

/// Plan the side-effect candidates for one turn.
pub fn plan(
    query: &str,
    role: Role,
    answer: &str,
    classification: &Classification,
) -> Vec<ActionDescriptor> {
    let tokens = tokenize(query);
    let mut actions = Vec::new();

    // Privacy/compliance first: the anonymous persona's turn is itself a
    // submission. Parameters are anonymized already at planning time;
    // the gate strips anything else defensively.
    if role == Role::Anonymous && !tokens.is_empty() {
        actions.push(ActionDescriptor {
            kind: ActionKind::LogSubmission,
            params: serde_json::json!({
                "category": classification.intent.as_str(),
                "content_chars": query.chars().count(),
            }),
            reason: "anonymous submission persona".into(),
        });
    }

    if contact_requested(&tokens) {
        actions.push(ActionDescriptor {
            kind: ActionKind::FlagContact,
            params: serde_json::json!({
                "note": query,
                "role": role.as_str(),
            }),
            reason: "contact request phrasing".into(),
        });
    }

    // Offer the dossier when the visitor asked for it, or when the
    // generated answer itself points at it.
    let answer_tokens = tokenize(answer);
    if document_requested(&tokens) || document_requested(&answer_tokens) {
        actions.push(ActionDescriptor {
            kind: ActionKind::SendDocument,
            params: serde_json::json!({
                "document": "dossier",
                "recipient": "session",
            }),
            reason: "document request phrasing".into(),
        });
    }

    actions
}
