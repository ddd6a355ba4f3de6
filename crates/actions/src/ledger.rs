//! In-process dispatch ledger for action idempotency.
//!
//! Every action dispatch is keyed by its session, turn, kind, and
//! canonical parameters. The key is reserved *before* the external call;
//! a replay of the same key is suppressed without a second externally
//! visible effect. Reservation survives a failed call on purpose: an
//! errored call may still have produced the effect.

use std::collections::HashSet;

use parking_lot::RwLock;
use sha2::{Digest, Sha256};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Dispatch key
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Build the idempotency key for one dispatch.
///
/// `params` must be the exact descriptor parameters; serde_json's
/// `to_string` is stable for a given `Value` (map order is preserved),
/// which is sufficient because descriptors are built by one planner.
pub fn dispatch_key(
    session_id: &str,
    turn_id: &str,
    kind: &str,
    params: &serde_json::Value,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(session_id.as_bytes());
    hasher.update(b"\x1f");
    hasher.update(turn_id.as_bytes());
    hasher.update(b"\x1f");
    hasher.update(kind.as_bytes());
    hasher.update(b"\x1f");
    hasher.update(params.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Ledger
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Set of dispatch keys already reserved in this process.
#[derive(Default)]
pub struct DispatchLedger {
    seen: RwLock<HashSet<String>>,
}

impl DispatchLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a key. Returns `true` when the key was free (the caller
    /// may dispatch) and `false` when it was already reserved (the
    /// caller must suppress the dispatch).
    pub fn reserve(&self, key: &str) -> bool {
        self.seen.write().insert(key.to_owned())
    }

    /// Number of reserved keys (for monitoring).
    pub fn len(&self) -> usize {
        self.seen.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.read().is_empty()
    }
}
