//! Runtime configuration for indexing operations

use std::env;

/// Environment variable read by [`IndexingConfig::from_env`]
pub const SYNC_ENV_VAR: &str = "SUBTENSOR_SYNC";

/// Settings shared by the indexing operations
///
/// Read-only once constructed; operations take it by value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct IndexingConfig {
    /// Synchronize the device right after each scatter kernel launch
    ///
    /// Launch and execution failures then surface from the operation that
    /// caused them instead of a later synchronization point.
    pub sync_after_launch: bool,
}

impl IndexingConfig {
    /// Default configuration (asynchronous launches)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set [`Self::sync_after_launch`]
    pub fn with_sync_after_launch(mut self, sync: bool) -> Self {
        self.sync_after_launch = sync;
        self
    }

    /// Configuration from the process environment
    ///
    /// `SUBTENSOR_SYNC` set to `1`, `true`, `yes` or `on` (any case) enables
    /// synchronous launches. Anything else, or no variable, leaves them off.
    pub fn from_env() -> Self {
        let sync = env::var(SYNC_ENV_VAR)
            .map(|v| parse_flag(&v))
            .unwrap_or(false);
        Self::new().with_sync_after_launch(sync)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_async() {
        assert!(!IndexingConfig::default().sync_after_launch);
        assert!(IndexingConfig::new().with_sync_after_launch(true).sync_after_launch);
    }

    #[test]
    fn test_config_is_hashable() {
        use std::collections::HashSet;
        let set: HashSet<IndexingConfig> = [
            IndexingConfig::new(),
            IndexingConfig::default(),
            IndexingConfig::new().with_sync_after_launch(true),
        ]
        .into_iter()
        .collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_parse_flag() {
        for v in ["1", "true", "TRUE", " yes ", "On"] {
            assert!(parse_flag(v), "{v}");
        }
        for v in ["", "0", "false", "off", "sync"] {
            assert!(!parse_flag(v), "{v}");
        }
    }
}
