//! Pipeline orchestrator.
//!
//! Sequences the stages deterministically: Classify → Retrieve →
//! Generate → Plan → Gate → Execute → Record. No stage is skipped;
//! stages with nothing to do still run and produce an empty result.
//! Only input validation short-circuits; every other failure kind is
//! absorbed by its stage's degradation policy. The terminal state is
//! reached even when intermediate stages degrade, and an internal fault
//! maps to a user-safe fallback rather than a raw error.

use std::sync::Arc;
use std::time::Instant;

use docent_domain::config::Config;
use docent_domain::error::{Error, Result};
use docent_domain::state::{ConversationState, TurnRequest, TurnResponse};
use docent_domain::trace::TraceEvent;
use docent_retrieval::Retriever;

use crate::classify::classify;
use crate::execute::Executor;
use crate::generate::Generator;
use crate::history::SessionStore;
use crate::plan::plan;
use crate::policy;
use crate::telemetry::Telemetry;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Direct user-facing messages
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub const EMPTY_QUERY_ANSWER: &str =
    "I didn't catch a question there — type something and I'll do my best.";

pub const OVERSIZED_QUERY_ANSWER: &str =
    "That message is longer than I can take in one go. Could you shorten it?";

pub const INTERNAL_FAULT_ANSWER: &str =
    "Something went wrong on my side while handling that. Please try again.";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Pipeline
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct Pipeline {
    config: Arc<Config>,
    retriever: Retriever,
    generator: Generator,
    executor: Executor,
    telemetry: Telemetry,
    sessions: SessionStore,
}

impl Pipeline {
    pub fn new(
        config: Arc<Config>,
        retriever: Retriever,
        generator: Generator,
        executor: Executor,
        telemetry: Telemetry,
    ) -> Self {
        let sessions = SessionStore::new(config.conversation.max_history_turns);
        Self {
            config,
            retriever,
            generator,
            executor,
            telemetry,
            sessions,
        }
    }

    /// Run one turn. Always returns a well-formed response.
    pub async fn run_turn(&self, req: TurnRequest) -> TurnResponse {
        let started = Instant::now();

        let (session_id, is_new) = self.sessions.resolve(req.session_id.as_deref());
        if is_new {
            if let Some(history) = req.history.clone() {
                self.sessions.seed_if_absent(&session_id, history);
            }
        }

        // Input validation is the only short-circuit: it bypasses
        // classification, retrieval, generation, and actions entirely.
        if req.query.trim().is_empty() {
            TraceEvent::TurnRejected {
                reason: "empty query".into(),
            }
            .emit();
            return direct_response(session_id, EMPTY_QUERY_ANSWER);
        }
        if req.query.chars().count() > self.config.conversation.max_query_chars {
            TraceEvent::TurnRejected {
                reason: "oversized query".into(),
            }
            .emit();
            return direct_response(session_id, OVERSIZED_QUERY_ANSWER);
        }

        match self.run_stages(&req, session_id.clone(), started).await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::error!(error = %e, session_id = %session_id, "pipeline fault");
                direct_response(session_id, INTERNAL_FAULT_ANSWER)
            }
        }
    }

    async fn run_stages(
        &self,
        req: &TurnRequest,
        session_id: String,
        started: Instant,
    ) -> Result<TurnResponse> {
        let history = self.sessions.snapshot(&session_id);
        let mut state = ConversationState::new(&req.query, req.role, session_id, history);

        // ── Classify ─────────────────────────────────────────────────
        state.classification = Some(classify(&state.query, state.role, &state.history));

        // ── Retrieve ─────────────────────────────────────────────────
        // The privacy-sensitive persona never touches the knowledge
        // base; its stage result is the empty context.
        state.context = if policy::retrieval_permitted(state.role) {
            self.retriever.retrieve(&state.query).await
        } else {
            Vec::new()
        };

        // ── Generate ─────────────────────────────────────────────────
        let classification = state
            .classification
            .ok_or_else(|| Error::Internal("classification absent before generation".into()))?;
        let answer = self
            .generator
            .generate(
                &state.query,
                state.role,
                &state.context,
                &state.history,
                &classification,
            )
            .await;
        state.answer = Some(answer.clone());

        // ── Plan ─────────────────────────────────────────────────────
        let proposed = plan(&state.query, state.role, &answer, &classification);

        // ── Gate ─────────────────────────────────────────────────────
        state.planned_actions = policy::gate(state.role, proposed);

        // ── Execute ──────────────────────────────────────────────────
        state.executed_actions = self
            .executor
            .execute(
                &state.session_id,
                &state.turn_id.to_string(),
                &state.planned_actions,
            )
            .await;

        // ── Record ───────────────────────────────────────────────────
        let latency_ms = started.elapsed().as_millis() as u64;
        self.telemetry.record(&state, latency_ms).await;

        // History is updated only at turn completion, and never for the
        // anonymous persona.
        if policy::history_retained(state.role) {
            self.sessions
                .append_exchange(&state.session_id, &state.query, &answer);
        }

        TraceEvent::TurnCompleted {
            session_id: state.session_id.clone(),
            turn_id: state.turn_id.to_string(),
            role: state.role.as_str().to_owned(),
            latency_ms,
            context_chunks: state.context.len(),
            actions_executed: state.executed_actions.len(),
        }
        .emit();

        Ok(TurnResponse {
            answer,
            session_id: state.session_id,
            sources: state.context.iter().map(Into::into).collect(),
            actions: state.executed_actions.iter().map(Into::into).collect(),
        })
    }
}

fn direct_response(session_id: String, answer: &str) -> TurnResponse {
    TurnResponse {
        answer: answer.to_owned(),
        session_id,
        sources: Vec::new(),
        actions: Vec::new(),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use docent_actions::traits::{SubmissionLog, SubmissionRecord};
    use docent_domain::config::RetrievalConfig;
    use docent_domain::role::Role;
    use docent_domain::state::ActionKind;
    use docent_providers::{ChatRequest, ChatResponse, LlmProvider};
    use docent_retrieval::types::{SearchHitDto, SearchRequest, SearchResponse};
    use docent_retrieval::SearchBackend;

    use crate::telemetry::{AnalyticsSink, TurnSummary};

    // ── Test doubles ─────────────────────────────────────────────────

    struct FixedSearch {
        hits: Vec<SearchHitDto>,
        calls: AtomicUsize,
    }

    impl FixedSearch {
        fn with_skills() -> Self {
            Self {
                hits: vec![SearchHitDto {
                    source_id: Some("profile".into()),
                    section: Some("skills".into()),
                    content: "Skilled in X and Y".into(),
                    similarity: Some(0.82),
                }],
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SearchBackend for FixedSearch {
        async fn search(&self, _req: SearchRequest) -> docent_domain::error::Result<SearchResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(SearchResponse {
                results: self.hits.clone(),
            })
        }
    }

    struct SlowSearch;

    #[async_trait]
    impl SearchBackend for SlowSearch {
        async fn search(&self, _req: SearchRequest) -> docent_domain::error::Result<SearchResponse> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(SearchResponse { results: vec![] })
        }
    }

    struct EchoProvider;

    #[async_trait]
    impl LlmProvider for EchoProvider {
        async fn chat(&self, req: ChatRequest) -> docent_domain::error::Result<ChatResponse> {
            // Answer from whatever excerpts the prompt carried.
            let user = req.messages.last().map(|m| m.content.clone()).unwrap_or_default();
            let grounded = user
                .lines()
                .filter(|l| l.starts_with('['))
                .collect::<Vec<_>>()
                .join(" ");
            Ok(ChatResponse {
                content: format!("Based on the profile: {grounded}"),
                model: "echo".into(),
                finish_reason: Some("stop".into()),
            })
        }
        fn provider_id(&self) -> &str {
            "echo"
        }
    }

    #[derive(Default)]
    struct CapturingSink {
        summaries: Mutex<Vec<TurnSummary>>,
    }

    #[async_trait]
    impl AnalyticsSink for CapturingSink {
        async fn record(&self, summary: &TurnSummary) -> docent_domain::error::Result<()> {
            self.summaries.lock().push(summary.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct CapturingSubmissions {
        records: Mutex<Vec<SubmissionRecord>>,
    }

    #[async_trait]
    impl SubmissionLog for CapturingSubmissions {
        async fn append(&self, record: SubmissionRecord) -> docent_domain::error::Result<String> {
            self.records.lock().push(record);
            Ok("submission logged".into())
        }
    }

    // ── Assembly helper ──────────────────────────────────────────────

    struct Fixture {
        pipeline: Pipeline,
        sink: Arc<CapturingSink>,
        submissions: Arc<CapturingSubmissions>,
        search_calls: Option<Arc<FixedSearch>>,
    }

    fn fixture(backend: Arc<dyn SearchBackend>, retrieval: RetrievalConfig) -> Fixture {
        let config = Arc::new(Config {
            retrieval,
            ..Config::default()
        });

        let sink = Arc::new(CapturingSink::default());
        let submissions = Arc::new(CapturingSubmissions::default());

        let retriever = Retriever::new(backend, &config.retrieval);
        let generator = Generator::new(
            Arc::new(EchoProvider),
            &config.llm,
            &config.conversation,
        );
        let executor = Executor::new(
            &config.actions,
            None,
            None,
            Some(submissions.clone() as Arc<dyn SubmissionLog>),
        );
        let telemetry = Telemetry::new(Some(sink.clone() as Arc<dyn AnalyticsSink>));

        Fixture {
            pipeline: Pipeline::new(config, retriever, generator, executor, telemetry),
            sink,
            submissions,
            search_calls: None,
        }
    }

    fn skills_fixture() -> Fixture {
        let backend = Arc::new(FixedSearch::with_skills());
        let mut f = fixture(backend.clone(), RetrievalConfig::default());
        f.search_calls = Some(backend);
        f
    }

    fn turn(query: &str, role: Role, session_id: Option<&str>) -> TurnRequest {
        TurnRequest {
            query: query.into(),
            role,
            session_id: session_id.map(str::to_owned),
            history: None,
        }
    }

    // ── Tests ────────────────────────────────────────────────────────

    #[tokio::test]
    async fn grounded_answer_mentions_retrieved_skills() {
        let f = skills_fixture();
        let resp = f
            .pipeline
            .run_turn(turn("What are your skills?", Role::Engineer, None))
            .await;

        assert!(resp.answer.contains("X and Y"), "{}", resp.answer);
        assert_eq!(resp.sources.len(), 1);
        assert!((resp.sources[0].similarity - 0.82).abs() < 1e-6);
        assert!(resp.actions.is_empty());
        assert!(!resp.session_id.is_empty());
    }

    #[tokio::test]
    async fn retrieval_timeout_yields_no_grounding_answer_within_budget() {
        let retrieval = RetrievalConfig {
            timeout_ms: 50,
            ..RetrievalConfig::default()
        };
        let f = fixture(Arc::new(SlowSearch), retrieval);

        let start = Instant::now();
        let resp = f
            .pipeline
            .run_turn(turn("What are your skills?", Role::Visitor, None))
            .await;

        assert!(resp.sources.is_empty());
        assert!(resp.answer.contains("don't have profile information"));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn empty_query_short_circuits_before_every_stage() {
        let f = skills_fixture();
        let resp = f.pipeline.run_turn(turn("   ", Role::Visitor, None)).await;

        assert_eq!(resp.answer, EMPTY_QUERY_ANSWER);
        assert!(resp.sources.is_empty());
        assert!(resp.actions.is_empty());
        // Neither retrieval nor telemetry ran.
        assert_eq!(f.search_calls.unwrap().calls.load(Ordering::SeqCst), 0);
        assert!(f.sink.summaries.lock().is_empty());
    }

    #[tokio::test]
    async fn oversized_query_short_circuits() {
        let f = skills_fixture();
        let long = "w ".repeat(2_000);
        let resp = f.pipeline.run_turn(turn(&long, Role::Visitor, None)).await;
        assert_eq!(resp.answer, OVERSIZED_QUERY_ANSWER);
    }

    #[tokio::test]
    async fn anonymous_turn_leaves_no_trail() {
        let backend = Arc::new(FixedSearch::with_skills());
        let f = {
            let mut f = fixture(backend.clone(), RetrievalConfig::default());
            f.search_calls = Some(backend);
            f
        };

        let resp = f
            .pipeline
            .run_turn(turn(
                "I would like to share something in confidence",
                Role::Anonymous,
                Some("anon-session"),
            ))
            .await;

        // Acknowledged, no sources, exactly one redacted submission.
        assert!(resp.answer.contains("received"));
        assert!(resp.sources.is_empty());
        assert_eq!(resp.actions.len(), 1);
        assert_eq!(resp.actions[0].kind, ActionKind::LogSubmission);

        // The knowledge base was never searched.
        assert_eq!(f.search_calls.unwrap().calls.load(Ordering::SeqCst), 0);

        // The logged record carries no text and no identity.
        let records = f.submissions.records.lock();
        assert_eq!(records.len(), 1);
        let as_json = serde_json::to_string(&records[0]).unwrap();
        assert!(!as_json.contains("confidence"));
        assert!(!as_json.contains("anon-session"));

        // Telemetry dropped both the excerpt and the correlation id.
        let summaries = f.sink.summaries.lock();
        assert_eq!(summaries.len(), 1);
        assert!(summaries[0].session.is_none());
        assert!(summaries[0].query_excerpt.is_none());

        // The submission never entered the history buffer either.
        assert!(f.pipeline.sessions.is_empty("anon-session"));
    }

    #[tokio::test]
    async fn telemetry_records_signals_and_similarities() {
        let f = skills_fixture();
        f.pipeline
            .run_turn(turn("What are your skills?", Role::Recruiter, None))
            .await;

        let summaries = f.sink.summaries.lock();
        assert_eq!(summaries.len(), 1);
        let s = &summaries[0];
        assert_eq!(s.role, "recruiter");
        assert_eq!(s.intent, "informational");
        assert_eq!(s.similarity_scores.len(), 1);
        assert!(s.query_excerpt.is_some());
    }

    #[tokio::test]
    async fn history_is_bounded_across_many_turns() {
        let f = skills_fixture();
        let mut session_id = None;

        for i in 0..10 {
            let resp = f
                .pipeline
                .run_turn(turn(
                    &format!("What about project {i}?"),
                    Role::Visitor,
                    session_id.as_deref(),
                ))
                .await;
            session_id = Some(resp.session_id);
        }

        let sid = session_id.unwrap();
        // Default bound: 4 exchanges = 8 entries.
        assert_eq!(f.pipeline.sessions.len(&sid), 8);
        let snapshot = f.pipeline.sessions.snapshot(&sid);
        assert_eq!(snapshot[0].text, "What about project 6?");
    }

    #[tokio::test]
    async fn session_id_is_stable_once_minted() {
        let f = skills_fixture();
        let first = f
            .pipeline
            .run_turn(turn("hello there, what is this?", Role::Visitor, None))
            .await;
        let second = f
            .pipeline
            .run_turn(turn(
                "tell me more",
                Role::Visitor,
                Some(&first.session_id),
            ))
            .await;
        assert_eq!(first.session_id, second.session_id);
    }

    #[tokio::test]
    async fn recruiter_contact_request_without_notifier_fails_gracefully() {
        let f = skills_fixture();
        let resp = f
            .pipeline
            .run_turn(turn(
                "Please get in touch about a role",
                Role::Recruiter,
                None,
            ))
            .await;

        // The action surfaced as a failure outcome; the answer stands.
        assert_eq!(resp.actions.len(), 1);
        assert_eq!(resp.actions[0].kind, ActionKind::FlagContact);
        assert!(resp.actions[0].detail.contains("service unavailable"));
        assert!(!resp.answer.is_empty());
    }
}
