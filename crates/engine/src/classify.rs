//! Keyword-vocabulary query classifier.
//!
//! Deterministic, no I/O, no external calls. Queries are tokenized into
//! lowercase words and matched against a fixed, versioned vocabulary at
//! word-boundary granularity: a keyword fragment embedded inside an
//! unrelated word never matches. Ties between matched categories resolve
//! by a fixed priority (action > data > code > informational > other).

use docent_domain::role::Role;
use docent_domain::state::{Classification, HistoryEntry, Intent};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Vocabulary
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Bump when any table below changes; recorded in every classification
/// and turn summary so analytics can segment by vocabulary.
pub const VOCABULARY_VERSION: u32 = 3;

const ACTION_KEYWORDS: &[&str] = &[
    "contact", "hire", "hiring", "resume", "cv", "dossier", "connect",
];
const ACTION_PHRASES: &[&str] = &[
    "reach out",
    "get in touch",
    "send me",
    "call me",
    "email me",
    "leave a message",
];

const DATA_KEYWORDS: &[&str] = &[
    "data", "stats", "statistics", "metrics", "numbers", "figures", "breakdown", "table",
];

const CODE_KEYWORDS: &[&str] = &[
    "code", "snippet", "implementation", "source", "repository", "repo", "function",
];

const INFO_KEYWORDS: &[&str] = &[
    "who", "what", "when", "where", "why", "how", "tell", "describe", "about",
    "experience", "skills", "skill", "background", "education", "projects", "project",
];

const LONG_FORM_KEYWORDS: &[&str] = &[
    "explain", "elaborate", "detail", "details", "thorough", "walkthrough", "overview",
];
const LONG_FORM_PHRASES: &[&str] = &["in depth", "step by step", "deep dive"];

/// Queries longer than this many words warrant a longer answer even
/// without an explicit long-form keyword.
const LONG_QUERY_WORDS: usize = 24;

/// A very short query with prior history is treated as a follow-up
/// rather than noise.
const FOLLOW_UP_MAX_WORDS: usize = 6;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Word-boundary matching
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Split a query into lowercase alphanumeric word tokens.
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn contains_word(tokens: &[String], word: &str) -> bool {
    tokens.iter().any(|t| t == word)
}

/// Match a multi-word phrase as a contiguous token subsequence.
fn contains_phrase(tokens: &[String], phrase: &str) -> bool {
    let needle = tokenize(phrase);
    if needle.is_empty() || needle.len() > tokens.len() {
        return false;
    }
    tokens.windows(needle.len()).any(|w| w == needle.as_slice())
}

pub(crate) fn matches_any(tokens: &[String], keywords: &[&str], phrases: &[&str]) -> bool {
    keywords.iter().any(|k| contains_word(tokens, k))
        || phrases.iter().any(|p| contains_phrase(tokens, p))
}

/// Whether the query phrasing asks to be contacted. Shared with the
/// action planner so classification and planning agree on vocabulary.
pub(crate) fn contact_requested(tokens: &[String]) -> bool {
    matches_any(
        tokens,
        &["contact", "connect"],
        &["reach out", "get in touch", "call me", "email me", "leave a message"],
    )
}

/// Whether the query phrasing asks for the dossier document.
pub(crate) fn document_requested(tokens: &[String]) -> bool {
    matches_any(tokens, &["resume", "cv", "dossier"], &["send me"])
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// classify
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Classify one query into the fixed signal set.
///
/// Pure function of its inputs: repeated calls with the same
/// (query, role, history) always return the same signals.
pub fn classify(query: &str, role: Role, history: &[HistoryEntry]) -> Classification {
    let tokens = tokenize(query);

    let action = matches_any(&tokens, ACTION_KEYWORDS, ACTION_PHRASES);
    let data = matches_any(&tokens, DATA_KEYWORDS, &[]);
    let code = matches_any(&tokens, CODE_KEYWORDS, &[]);
    let info = matches_any(&tokens, INFO_KEYWORDS, &[]);

    // Fixed priority: action > data > code > informational > other.
    let intent = if action {
        Intent::ActionRequest
    } else if data {
        Intent::DataRequest
    } else if code {
        Intent::CodeRequest
    } else if info {
        Intent::Informational
    } else if !history.is_empty() && tokens.len() <= FOLLOW_UP_MAX_WORDS && !tokens.is_empty() {
        // Short unmatched query mid-conversation: a follow-up.
        Intent::Informational
    } else {
        Intent::Other
    };

    // Anonymous submissions never warrant a teaching-style answer; the
    // persona's turns acknowledge rather than explain.
    let needs_longer_response = role != Role::Anonymous
        && (matches_any(&tokens, LONG_FORM_KEYWORDS, LONG_FORM_PHRASES)
            || tokens.len() > LONG_QUERY_WORDS);

    Classification {
        intent,
        needs_longer_response,
        code_display_requested: code,
        data_display_requested: data,
        vocabulary_version: VOCABULARY_VERSION,
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
