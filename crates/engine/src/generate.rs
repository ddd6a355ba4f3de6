//! Grounded answer generation.
//!
//! Builds a role-conditioned prompt over the retrieved context and the
//! bounded history, calls the generation provider under a timeout, and
//! enforces the response-facet policy on the way out. Two hard rules:
//! with empty context the answer discloses the lack of grounded
//! information (no provider call, no fabricated detail), and a provider
//! failure yields a fixed degradation message, never an error.

use std::sync::Arc;
use std::time::{Duration, Instant};

use docent_domain::config::{ConversationConfig, LlmConfig};
use docent_domain::role::Role;
use docent_domain::state::{Chunk, Classification, HistoryEntry, Speaker};
use docent_domain::trace::TraceEvent;
use docent_providers::{ChatMessage, ChatRequest, LlmProvider};

use crate::policy;

/// Fixed degradation message when the provider errors or times out.
pub const FALLBACK_ANSWER: &str =
    "I hit a snag putting an answer together just now. Please ask again in a moment.";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Generator
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct Generator {
    provider: Arc<dyn LlmProvider>,
    timeout: Duration,
    temperature: f32,
    max_tokens: u32,
    max_tokens_long: u32,
    max_code_block_chars: usize,
}

impl Generator {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        llm: &LlmConfig,
        conversation: &ConversationConfig,
    ) -> Self {
        Self {
            provider,
            timeout: Duration::from_millis(llm.timeout_ms),
            temperature: llm.temperature,
            max_tokens: llm.max_tokens,
            max_tokens_long: llm.max_tokens_long,
            max_code_block_chars: conversation.max_code_block_chars,
        }
    }

    /// Produce the user-facing answer for one turn. Infallible: every
    /// failure path degrades to a coherent message.
    pub async fn generate(
        &self,
        query: &str,
        role: Role,
        context: &[Chunk],
        history: &[HistoryEntry],
        classification: &Classification,
    ) -> String {
        // The anonymous persona's turn is a submission, not a question;
        // acknowledge without consulting the profile or the provider.
        if role == Role::Anonymous {
            return anonymous_acknowledgement().to_owned();
        }

        if context.is_empty() {
            return no_grounding_answer(role);
        }

        let max_tokens = if classification.needs_longer_response {
            self.max_tokens_long
        } else {
            self.max_tokens
        };

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(system_prompt(
            role,
            classification,
            self.max_code_block_chars,
        )));
        for entry in history {
            messages.push(match entry.speaker {
                Speaker::User => ChatMessage::user(&entry.text),
                Speaker::Assistant => ChatMessage::assistant(&entry.text),
            });
        }
        messages.push(ChatMessage::user(format!(
            "Profile excerpts:\n{}\nQuestion: {query}",
            context_block(context)
        )));

        let req = ChatRequest {
            messages,
            temperature: Some(self.temperature),
            max_tokens: Some(max_tokens),
            model: None,
        };

        let start = Instant::now();
        let answer = match tokio::time::timeout(self.timeout, self.provider.chat(req)).await {
            Ok(Ok(resp)) => {
                TraceEvent::LlmRequest {
                    model: resp.model.clone(),
                    duration_ms: start.elapsed().as_millis() as u64,
                    fallback: false,
                }
                .emit();
                resp.content
            }
            Ok(Err(e)) => {
                TraceEvent::LlmRequest {
                    model: String::new(),
                    duration_ms: start.elapsed().as_millis() as u64,
                    fallback: true,
                }
                .emit();
                tracing::warn!(error = %e, "generation failed, using fallback answer");
                return FALLBACK_ANSWER.to_owned();
            }
            Err(_) => {
                TraceEvent::LlmRequest {
                    model: String::new(),
                    duration_ms: start.elapsed().as_millis() as u64,
                    fallback: true,
                }
                .emit();
                tracing::warn!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    "generation timed out, using fallback answer"
                );
                return FALLBACK_ANSWER.to_owned();
            }
        };

        enforce_code_bounds(
            &answer,
            policy::code_permitted(role),
            self.max_code_block_chars,
        )
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Prompt assembly
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn system_prompt(role: Role, classification: &Classification, code_cap: usize) -> String {
    let mut prompt = String::from(
        "You are Docent, the concierge for one professional profile. \
         Answer only from the provided profile excerpts. When the excerpts \
         do not cover something, say so plainly instead of guessing.\n",
    );

    prompt.push_str(match role {
        Role::Visitor => "Keep a friendly, conversational tone and prefer short summaries.\n",
        Role::Recruiter => {
            "Use plain language for a hiring audience; highlight outcomes over internals.\n"
        }
        Role::Partner => "Use a collegial business tone; focus on collaboration fit.\n",
        Role::Engineer => "Use a precise technical tone; concrete specifics are welcome.\n",
        // Unreachable through the pipeline (handled before prompting),
        // but the prompt stays safe if called directly.
        Role::Anonymous => "Acknowledge briefly; do not discuss the profile.\n",
    });

    if classification.code_display_requested {
        if policy::code_permitted(role) {
            prompt.push_str(&format!(
                "Verbatim code from the excerpts is allowed; keep any single \
                 code block under {code_cap} characters.\n"
            ));
        } else {
            prompt.push_str(
                "Do not include verbatim code; describe implementations in prose.\n",
            );
        }
    }

    if classification.data_display_requested {
        if policy::raw_data_permitted(role) {
            prompt.push_str("Present figures as a compact table.\n");
        } else {
            prompt.push_str(
                "Summarize figures in a sentence or two; no raw tables or logs.\n",
            );
        }
    }

    if classification.needs_longer_response {
        prompt.push_str("Structure the answer as a few short titled sections.\n");
    } else {
        prompt.push_str("Keep the answer to one short paragraph.\n");
    }

    prompt
}

fn context_block(context: &[Chunk]) -> String {
    let mut block = String::new();
    for chunk in context {
        block.push_str(&format!(
            "[{} / {}] {}\n",
            chunk.source_id, chunk.section, chunk.text
        ));
    }
    block
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Degradation messages
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn anonymous_acknowledgement() -> &'static str {
    "Thank you — your note has been received. Nothing you write here is \
     tied to your identity."
}

/// Deterministic disclosure used whenever no grounded context exists.
fn no_grounding_answer(role: Role) -> String {
    let base = "I don't have profile information that covers that, so I'd \
                rather not guess.";
    let hint = match role {
        Role::Engineer => " Try asking about documented projects, code, or tooling.",
        _ => " Try asking about documented skills, projects, or experience.",
    };
    format!("{base}{hint}")
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Output bounds
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Enforce the code facet on the final text: strip fenced blocks when
/// the role may not see code, truncate oversized blocks otherwise.
fn enforce_code_bounds(answer: &str, permitted: bool, cap: usize) -> String {
    if !answer.contains("```") {
        return answer.to_owned();
    }

    let mut out = String::new();
    for (i, segment) in answer.split("```").enumerate() {
        let is_code = i % 2 == 1;
        if !is_code {
            out.push_str(segment);
        } else if !permitted {
            out.push_str("[code omitted for this audience]");
        } else if segment.len() > cap {
            let end = floor_char_boundary(segment, cap);
            out.push_str("```");
            out.push_str(&segment[..end]);
            out.push_str("\n[truncated]\n```");
        } else {
            out.push_str("```");
            out.push_str(segment);
            out.push_str("```");
        }
    }
    out
}

/// Largest index `<= idx` that is a valid char boundary of `s`.
fn floor_char_boundary(s: &str, mut idx: usize) -> usize {
    if idx >= s.len() {
        return s.len();
    }
    while !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
