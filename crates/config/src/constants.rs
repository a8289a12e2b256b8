//! Centralized constants for the triage engine
//!
//! Single source of truth for endpoints, model names, timeouts and the
//! dialogue thresholds. Settings defaults read from here.

/// Remote generation endpoints and models
pub mod endpoints {
    /// Groq OpenAI-compatible base URL
    pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

    /// Default Groq chat model
    pub const GROQ_DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

    /// Minimax base URL
    pub const MINIMAX_BASE_URL: &str = "https://api.minimax.chat/v1";

    /// Minimax chat completion path (relative to the base URL)
    pub const MINIMAX_CHAT_PATH: &str = "text/chatcompletion_v2";

    /// Default Minimax chat model
    pub const MINIMAX_DEFAULT_MODEL: &str = "MiniMax-Text-01";

    /// Environment variable holding the Groq key
    pub const GROQ_API_KEY_ENV: &str = "GROQ_API_KEY";

    /// Environment variable holding the Minimax key
    pub const MINIMAX_API_KEY_ENV: &str = "MINIMAX_API_KEY";
}

/// Per-call timeouts (milliseconds)
pub mod timeouts {
    /// Next-turn generation
    pub const CONVERSATION_MS: u64 = 20_000;

    /// Live fact extraction
    pub const EXTRACTION_MS: u64 = 10_000;

    /// Single-shot remote classification
    pub const CLASSIFICATION_MS: u64 = 15_000;

    /// Upper bound accepted by validation
    pub const MAX_MS: u64 = 60_000;
}

/// Generation parameters
pub mod generation {
    pub const CONVERSATION_TEMPERATURE: f32 = 0.6;
    pub const GROQ_CONVERSATION_MAX_TOKENS: usize = 500;
    pub const MINIMAX_CONVERSATION_MAX_TOKENS: usize = 400;

    pub const EXTRACTION_TEMPERATURE: f32 = 0.1;
    pub const EXTRACTION_MAX_TOKENS: usize = 300;

    pub const CLASSIFICATION_TEMPERATURE: f32 = 0.2;
    pub const CLASSIFICATION_MAX_TOKENS: usize = 800;
}

/// Local dialogue policy thresholds
///
/// Chosen empirically; kept configurable through `DialogueConfig`.
pub mod dialogue {
    /// Turn count after which essentials alone allow completion
    pub const MIN_TURNS_FOR_COMPLETION: usize = 5;

    /// Non-essential topics that, with essentials, allow early completion
    pub const MIN_EXTRA_TOPICS: usize = 2;

    /// Hard ceiling: completion is forced at this turn
    pub const MAX_TURNS: usize = 8;
}

/// Live extraction
pub mod extraction {
    /// Transcript lines sent to the remote extractor
    pub const WINDOW_LINES: usize = 12;
}

/// Session registry
pub mod registry {
    pub const MAX_SESSIONS: usize = 1000;

    /// Sessions idle longer than this are dropped
    pub const IDLE_TIMEOUT_SECS: u64 = 1800;

    pub const CLEANUP_INTERVAL_SECS: u64 = 60;
}
