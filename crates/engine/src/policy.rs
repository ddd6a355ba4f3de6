//! Role policy gate.
//!
//! The single decision table over {role × action-kind}, plus the
//! response-facet queries the generator consults. This is the only
//! place action eligibility is finally decided: the planner stays
//! I/O-free and policy-ignorant, the executor only ever sees actions
//! that passed this gate.

use docent_domain::role::Role;
use docent_domain::state::{ActionDescriptor, ActionKind};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Decision table
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
    AllowWithRedaction,
}

/// The full {role × kind} table. Total match: adding a role or a kind
/// forces every cell to be decided here.
pub fn decide(role: Role, kind: ActionKind) -> Decision {
    use ActionKind::*;
    use Decision::*;

    match (role, kind) {
        // The anonymous persona may only leave an anonymized submission;
        // identity and free text are stripped before execution.
        (Role::Anonymous, LogSubmission) => AllowWithRedaction,
        (Role::Anonymous, SendDocument) => Deny,
        (Role::Anonymous, FlagContact) => Deny,

        // The submission log exists for the anonymous flow alone.
        (_, LogSubmission) => Deny,

        // Dossier delivery is for identified, engaged personas.
        (Role::Visitor, SendDocument) => Deny,
        (Role::Recruiter, SendDocument) => Allow,
        (Role::Partner, SendDocument) => Allow,
        (Role::Engineer, SendDocument) => Allow,

        // Any identified persona may ask to be contacted.
        (_, FlagContact) => Allow,
    }
}

/// Apply the table to one descriptor. `None` means denied.
pub fn apply(role: Role, descriptor: ActionDescriptor) -> Option<ActionDescriptor> {
    match decide(role, descriptor.kind) {
        Decision::Allow => Some(descriptor),
        Decision::Deny => None,
        Decision::AllowWithRedaction => Some(redact_descriptor(descriptor)),
    }
}

/// Gate a full plan, preserving order. Denied actions are dropped
/// silently; a policy denial is not an error.
pub fn gate(role: Role, plan: Vec<ActionDescriptor>) -> Vec<ActionDescriptor> {
    plan.into_iter()
        .filter_map(|d| apply(role, d))
        .collect()
}

/// Strip descriptor parameters down to the anonymized allowlist.
fn redact_descriptor(mut descriptor: ActionDescriptor) -> ActionDescriptor {
    const KEEP: &[&str] = &["category", "content_chars"];

    let mut kept = serde_json::Map::new();
    if let Some(obj) = descriptor.params.as_object() {
        for key in KEEP {
            if let Some(v) = obj.get(*key) {
                kept.insert((*key).to_owned(), v.clone());
            }
        }
    }
    kept.insert("redacted".into(), serde_json::Value::Bool(true));
    descriptor.params = serde_json::Value::Object(kept);
    descriptor
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Response facets
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Verbatim code excerpts in answers.
pub fn code_permitted(role: Role) -> bool {
    matches!(role, Role::Engineer)
}

/// Full raw tabular data in answers (others get summary form).
pub fn raw_data_permitted(role: Role) -> bool {
    matches!(role, Role::Engineer)
}

/// Whether the knowledge base may be searched for this persona. Denied
/// for the anonymous persona: its turns must leave no retrieval trail.
pub fn retrieval_permitted(role: Role) -> bool {
    role != Role::Anonymous
}

/// Whether turn summaries may carry the query excerpt and the session
/// correlation id.
pub fn telemetry_identity_permitted(role: Role) -> bool {
    role != Role::Anonymous
}

/// Whether the exchange may be kept in the session history buffer. An
/// anonymous submission must not resurface in later prompts, even if
/// the same session switches to another persona.
pub fn history_retained(role: Role) -> bool {
    role != Role::Anonymous
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(kind: ActionKind, params: serde_json::Value) -> ActionDescriptor {
        ActionDescriptor {
            kind,
            params,
            reason: "test".into(),
        }
    }

    #[test]
    fn anonymous_gets_only_redacted_submission() {
        let plan = vec![
            descriptor(
                ActionKind::LogSubmission,
                serde_json::json!({
                    "category": "feedback",
                    "content_chars": 64,
                    "text": "my secret message",
                    "submitter": "jane@example.com",
                }),
            ),
            descriptor(ActionKind::FlagContact, serde_json::json!({ "note": "call me" })),
            descriptor(ActionKind::SendDocument, serde_json::json!({})),
        ];

        let gated = gate(Role::Anonymous, plan);
        assert_eq!(gated.len(), 1);
        assert_eq!(gated[0].kind, ActionKind::LogSubmission);

        let params = gated[0].params.as_object().unwrap();
        assert_eq!(params.get("category").unwrap(), "feedback");
        assert_eq!(params.get("content_chars").unwrap(), 64);
        assert_eq!(params.get("redacted").unwrap(), true);
        assert!(!params.contains_key("text"));
        assert!(!params.contains_key("submitter"));
    }

    #[test]
    fn visitor_cannot_receive_dossier_but_can_flag_contact() {
        assert_eq!(decide(Role::Visitor, ActionKind::SendDocument), Decision::Deny);
        assert_eq!(decide(Role::Visitor, ActionKind::FlagContact), Decision::Allow);
    }

    #[test]
    fn identified_roles_can_receive_dossier() {
        for role in [Role::Recruiter, Role::Partner, Role::Engineer] {
            assert_eq!(decide(role, ActionKind::SendDocument), Decision::Allow, "{role}");
        }
    }

    #[test]
    fn submission_log_is_anonymous_only() {
        for role in [Role::Visitor, Role::Recruiter, Role::Partner, Role::Engineer] {
            assert_eq!(decide(role, ActionKind::LogSubmission), Decision::Deny, "{role}");
        }
    }

    #[test]
    fn gate_preserves_plan_order() {
        let plan = vec![
            descriptor(ActionKind::FlagContact, serde_json::json!({})),
            descriptor(ActionKind::SendDocument, serde_json::json!({})),
        ];
        let gated = gate(Role::Recruiter, plan);
        assert_eq!(gated.len(), 2);
        assert_eq!(gated[0].kind, ActionKind::FlagContact);
        assert_eq!(gated[1].kind, ActionKind::SendDocument);
    }

    #[test]
    fn facets_restrict_non_technical_roles() {
        assert!(code_permitted(Role::Engineer));
        assert!(raw_data_permitted(Role::Engineer));
        for role in [Role::Visitor, Role::Recruiter, Role::Partner, Role::Anonymous] {
            assert!(!code_permitted(role), "{role}");
            assert!(!raw_data_permitted(role), "{role}");
        }
    }

    #[test]
    fn anonymous_is_cut_off_from_retrieval_and_telemetry_identity() {
        assert!(!retrieval_permitted(Role::Anonymous));
        assert!(!telemetry_identity_permitted(Role::Anonymous));
        assert!(!history_retained(Role::Anonymous));
        assert!(retrieval_permitted(Role::Visitor));
        assert!(telemetry_identity_permitted(Role::Engineer));
        assert!(history_retained(Role::Recruiter));
    }
}
