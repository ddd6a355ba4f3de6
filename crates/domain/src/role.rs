//! The persona set.
//!
//! A role is selected once per session (it may change between turns) and
//! governs tone, permitted depth, and action eligibility downstream. The
//! set is closed: policy decisions are a total table over these variants,
//! never string comparisons scattered through the pipeline.

use serde::{Deserialize, Serialize};

/// Visitor-facing persona for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Casual browser. Conversational tone, summaries over detail.
    #[default]
    Visitor,
    /// Hiring-side persona. Plain-language answers, dossier delivery allowed.
    Recruiter,
    /// Business/collaboration persona. Contact flow allowed.
    Partner,
    /// Technical persona. Code excerpts and raw tabular data permitted.
    #[serde(alias = "technical")]
    Engineer,
    /// Privacy-sensitive anonymous-submission persona. Message content and
    /// submitter identity never reach logs or analytics.
    #[serde(alias = "anon")]
    Anonymous,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Visitor => "visitor",
            Role::Recruiter => "recruiter",
            Role::Partner => "partner",
            Role::Engineer => "engineer",
            Role::Anonymous => "anonymous",
        }
    }

    /// Parse a role name; unknown or empty input falls back to `Visitor`.
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            s if s.eq_ignore_ascii_case("recruiter") => Role::Recruiter,
            s if s.eq_ignore_ascii_case("partner") => Role::Partner,
            s if s.eq_ignore_ascii_case("engineer") || s.eq_ignore_ascii_case("technical") => {
                Role::Engineer
            }
            s if s.eq_ignore_ascii_case("anonymous") || s.eq_ignore_ascii_case("anon") => {
                Role::Anonymous
            }
            _ => Role::Visitor,
        }
    }

    pub fn all() -> [Role; 5] {
        [
            Role::Visitor,
            Role::Recruiter,
            Role::Partner,
            Role::Engineer,
            Role::Anonymous,
        ]
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Role::parse("Recruiter"), Role::Recruiter);
        assert_eq!(Role::parse("ENGINEER"), Role::Engineer);
    }

    #[test]
    fn technical_is_an_alias_for_engineer() {
        assert_eq!(Role::parse("technical"), Role::Engineer);
        let r: Role = serde_json::from_str("\"technical\"").unwrap();
        assert_eq!(r, Role::Engineer);
    }

    #[test]
    fn unknown_falls_back_to_visitor() {
        assert_eq!(Role::parse("wizard"), Role::Visitor);
        assert_eq!(Role::parse(""), Role::Visitor);
    }
}
