//! PII redaction for free text headed to the analytics store.
//!
//! Pattern-matched masking: emails, phone numbers, and long digit runs
//! are replaced with placeholder tokens before any free text is
//! recorded. Redaction here is the last line; the anonymous persona's
//! text never reaches this module at all.

use std::sync::LazyLock;

use regex::Regex;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").unwrap());

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\+?\d{1,3}[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}").unwrap()
});

/// Runs of 6+ digits (account numbers, ids) not already caught above.
static DIGIT_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{6,}").unwrap());

/// Mask PII patterns in free text.
pub fn redact_text(text: &str) -> String {
    let masked = EMAIL_RE.replace_all(text, "<EMAIL>");
    let masked = PHONE_RE.replace_all(&masked, "<PHONE>");
    let masked = DIGIT_RUN_RE.replace_all(&masked, "<NUMBER>");
    masked.into_owned()
}

/// Redact, then bound to `max_chars` at a char boundary.
pub fn redacted_excerpt(text: &str, max_chars: usize) -> String {
    let masked = redact_text(text);
    if masked.chars().count() <= max_chars {
        return masked;
    }
    masked.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_emails() {
        let out = redact_text("write to jane.doe+tag@example.co.uk please");
        assert_eq!(out, "write to <EMAIL> please");
    }

    #[test]
    fn masks_phone_numbers() {
        let out = redact_text("call 555-123-4567 today");
        assert!(out.contains("<PHONE>"), "{out}");
        assert!(!out.contains("4567"));

        let out = redact_text("call +1 (555) 123 4567");
        assert!(out.contains("<PHONE>"), "{out}");
    }

    #[test]
    fn masks_long_digit_runs() {
        let out = redact_text("id 123456789012");
        assert!(!out.contains("123456789012"));
        assert!(out.contains("<NUMBER>") || out.contains("<PHONE>"));
    }

    #[test]
    fn leaves_plain_text_alone() {
        let text = "tell me about the 3 biggest projects";
        assert_eq!(redact_text(text), text);
    }

    #[test]
    fn excerpt_is_bounded() {
        let long = "a".repeat(500);
        assert_eq!(redacted_excerpt(&long, 160).chars().count(), 160);
    }
}
