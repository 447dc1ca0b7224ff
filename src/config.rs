/// Tunables for keyword learning and undo
use serde::{Deserialize, Serialize};

/// Category every unclassified link falls back to. Never learned.
pub const OTHER: &str = "Other";

/// Built-in categories. Only reassignments to one of these feed the learner.
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "News",
    "Shopping",
    "Social",
    "Video",
    "Work",
    "Reference",
    OTHER,
];

pub fn is_default_category(name: &str) -> bool {
    DEFAULT_CATEGORIES.contains(&name)
}

/// Settings persisted under the `settings` key. Missing fields take defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Shortest token the extractor keeps
    pub min_keyword_len: usize,
    /// Most keywords a single correction may write
    pub max_keywords: usize,
    /// Site names shorter than this carry no signal
    pub min_hostname_len: usize,
    /// How long a deleted link stays recoverable, in milliseconds
    pub undo_window_ms: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            min_keyword_len: 4,
            max_keywords: 5,
            min_hostname_len: 3,
            undo_window_ms: 8000.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_other_is_a_default() {
        assert!(is_default_category(OTHER));
        assert!(is_default_category("Shopping"));
        assert!(!is_default_category("Hobbies"));
    }

    #[test]
    fn test_partial_settings_fill_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"maxKeywords": 8}"#).unwrap();

        assert_eq!(settings.max_keywords, 8);
        assert_eq!(settings.min_keyword_len, 4);
        assert_eq!(settings.undo_window_ms, 8000.0);
    }
}
