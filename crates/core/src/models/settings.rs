use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// User-configurable refresh settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Trailing window of daily closes to fetch per refresh (sparkline width).
    pub lookback_days: u32,

    /// How long one fetch result stays fresh before the next refresh hits the
    /// provider again.
    pub cache_ttl_minutes: i64,

    /// Optional API tokens for providers that accept them.
    /// Keys: provider name (e.g., "brapi"). Values: the token string.
    pub api_keys: HashMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            lookback_days: 7,
            cache_ttl_minutes: 10,
            api_keys: HashMap::new(),
        }
    }
}
