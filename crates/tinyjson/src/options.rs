//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Nesting limit used when none is configured.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Which occurrence wins when an object repeats a key bound to a field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateKeyPolicy {
    /// Later occurrences are parsed for syntax and otherwise ignored.
    #[default]
    FirstWins,
    /// Every occurrence is bound; the last one stays.
    LastWins,
}

/// Options for a [`TinyJson`](crate::TinyJson) engine.
///
/// Missing fields take their defaults when deserialized, so a partial
/// configuration document is enough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Maximum nesting of containers and optionals, for encode and decode.
    pub max_depth: usize,
    pub duplicate_keys: DuplicateKeyPolicy,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            duplicate_keys: DuplicateKeyPolicy::default(),
        }
    }
}

impl Options {
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn duplicate_keys(mut self, policy: DuplicateKeyPolicy) -> Self {
        self.duplicate_keys = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_fills_defaults() {
        let options: Options = serde_json::from_str(r#"{"duplicate_keys":"last_wins"}"#).unwrap();
        assert_eq!(options.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(options.duplicate_keys, DuplicateKeyPolicy::LastWins);
    }

    #[test]
    fn builder_setters() {
        let options = Options::default().max_depth(4);
        assert_eq!(options.max_depth, 4);
        assert_eq!(options.duplicate_keys, DuplicateKeyPolicy::FirstWins);
    }
}
