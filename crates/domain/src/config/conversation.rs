use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Conversation limits
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationConfig {
    /// Exchanges kept per session. The buffer holds at most
    /// `2 * max_history_turns` (speaker, text) entries; oldest evict first.
    #[serde(default = "d_max_history_turns")]
    pub max_history_turns: usize,
    /// Queries longer than this are rejected before classification.
    #[serde(default = "d_max_query_chars")]
    pub max_query_chars: usize,
    /// Upper bound on verbatim code echoed into an answer.
    #[serde(default = "d_max_code_block_chars")]
    pub max_code_block_chars: usize,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            max_history_turns: d_max_history_turns(),
            max_query_chars: d_max_query_chars(),
            max_code_block_chars: d_max_code_block_chars(),
        }
    }
}

fn d_max_history_turns() -> usize {
    4
}

fn d_max_query_chars() -> usize {
    2_000
}

fn d_max_code_block_chars() -> usize {
    1_600
}
