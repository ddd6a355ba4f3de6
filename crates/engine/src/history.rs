//! Per-session history store.
//!
//! The only state that persists and mutates across turns. Owned
//! exclusively by the orchestrator: stages receive an immutable snapshot
//! at turn start and the completed exchange is appended only at turn
//! end. Buffers are FIFO-bounded; oldest entries evict first.

use std::collections::{HashMap, VecDeque};

use parking_lot::RwLock;

use docent_domain::state::HistoryEntry;
use docent_domain::trace::TraceEvent;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// SessionStore
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct SessionStore {
    sessions: RwLock<HashMap<String, VecDeque<HistoryEntry>>>,
    /// Entry bound: two entries (user + assistant) per kept exchange.
    max_entries: usize,
}

impl SessionStore {
    pub fn new(max_history_turns: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_entries: max_history_turns * 2,
        }
    }

    /// Resolve the session id, minting a fresh one when absent.
    /// Returns `(session_id, is_new)`.
    pub fn resolve(&self, requested: Option<&str>) -> (String, bool) {
        match requested {
            Some(id) if !id.trim().is_empty() => {
                let is_new = !self.sessions.read().contains_key(id);
                TraceEvent::SessionResolved {
                    session_id: id.to_owned(),
                    is_new,
                }
                .emit();
                (id.to_owned(), is_new)
            }
            _ => {
                let id = uuid::Uuid::new_v4().to_string();
                TraceEvent::SessionResolved {
                    session_id: id.clone(),
                    is_new: true,
                }
                .emit();
                (id, true)
            }
        }
    }

    /// Seed a session the store has not seen (stateless callers handing
    /// back their history). A known session keeps its server-side
    /// buffer; the seed is ignored.
    pub fn seed_if_absent(&self, session_id: &str, entries: Vec<HistoryEntry>) {
        let mut sessions = self.sessions.write();
        if sessions.contains_key(session_id) {
            return;
        }
        let mut buffer: VecDeque<HistoryEntry> = entries.into();
        while buffer.len() > self.max_entries {
            buffer.pop_front();
        }
        sessions.insert(session_id.to_owned(), buffer);
    }

    /// Immutable snapshot of a session's history, oldest first.
    pub fn snapshot(&self, session_id: &str) -> Vec<HistoryEntry> {
        self.sessions
            .read()
            .get(session_id)
            .map(|buf| buf.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Append one completed exchange, evicting oldest entries beyond
    /// the bound. Called exactly once per turn, at completion.
    pub fn append_exchange(&self, session_id: &str, query: &str, answer: &str) {
        let mut sessions = self.sessions.write();
        let buffer = sessions.entry(session_id.to_owned()).or_default();
        buffer.push_back(HistoryEntry::user(query));
        buffer.push_back(HistoryEntry::assistant(answer));
        while buffer.len() > self.max_entries {
            buffer.pop_front();
        }
    }

    /// Current entry count for a session (for tests and monitoring).
    pub fn len(&self, session_id: &str) -> usize {
        self.sessions
            .read()
            .get(session_id)
            .map(VecDeque::len)
            .unwrap_or(0)
    }

    pub fn is_empty(&self, session_id: &str) -> bool {
        self.len(session_id) == 0
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use docent_domain::state::Speaker;

    #[test]
    fn bound_holds_after_many_turns() {
        let store = SessionStore::new(4);
        for i in 0..50 {
            store.append_exchange("s", &format!("q{i}"), &format!("a{i}"));
            assert!(store.len("s") <= 8, "bound exceeded at turn {i}");
        }
        assert_eq!(store.len("s"), 8);
    }

    #[test]
    fn eviction_is_strictly_fifo() {
        let store = SessionStore::new(2);
        for i in 0..5 {
            store.append_exchange("s", &format!("q{i}"), &format!("a{i}"));
        }

        let snapshot = store.snapshot("s");
        assert_eq!(snapshot.len(), 4);
        // The two oldest exchanges (q0..q2) are gone; q3 leads.
        assert_eq!(snapshot[0].text, "q3");
        assert_eq!(snapshot[0].speaker, Speaker::User);
        assert_eq!(snapshot[3].text, "a4");
        assert_eq!(snapshot[3].speaker, Speaker::Assistant);
    }

    #[test]
    fn resolve_mints_when_absent_and_reuses_when_given() {
        let store = SessionStore::new(4);
        let (id, is_new) = store.resolve(None);
        assert!(is_new);
        assert!(!id.is_empty());

        store.append_exchange(&id, "q", "a");
        let (again, is_new) = store.resolve(Some(&id));
        assert_eq!(again, id);
        assert!(!is_new);
    }

    #[test]
    fn seed_is_ignored_for_known_sessions() {
        let store = SessionStore::new(4);
        store.append_exchange("s", "real q", "real a");
        store.seed_if_absent("s", vec![HistoryEntry::user("stale")]);

        let snapshot = store.snapshot("s");
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].text, "real q");
    }

    #[test]
    fn seed_respects_the_bound() {
        let store = SessionStore::new(1);
        store.seed_if_absent(
            "s",
            vec![
                HistoryEntry::user("old"),
                HistoryEntry::assistant("old a"),
                HistoryEntry::user("new"),
                HistoryEntry::assistant("new a"),
            ],
        );
        let snapshot = store.snapshot("s");
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].text, "new");
    }

    #[test]
    fn sessions_are_isolated() {
        let store = SessionStore::new(4);
        store.append_exchange("a", "qa", "aa");
        store.append_exchange("b", "qb", "ab");
        assert_eq!(store.snapshot("a")[0].text, "qa");
        assert_eq!(store.snapshot("b")[0].text, "qb");
    }
}
