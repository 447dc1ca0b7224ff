/// Best-guess category for a new link from the learned keyword map
use serde::Serialize;

use crate::config::OTHER;
use crate::error::Result;
use crate::link_data::KeywordMap;
use crate::storage::{KEYWORD_TO_CATEGORY, KeyValueStore, load};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Categorization {
    pub category: String,
    pub matched: bool,
}

impl Categorization {
    pub fn other() -> Self {
        Categorization {
            category: OTHER.to_string(),
            matched: false,
        }
    }
}

/// Match against an already loaded map
///
/// The first keyword (in map order) that occurs anywhere in the lowercased
/// "title url" string wins. This is a substring test, so short keywords can
/// hit inside longer unrelated words.
pub fn categorize_with(map: &KeywordMap, title: &str, url: &str) -> Categorization {
    let haystack = format!("{} {}", title, url).to_lowercase();

    match map.first_match(&haystack) {
        Some(category) => Categorization {
            category: category.to_string(),
            matched: true,
        },
        None => Categorization::other(),
    }
}

pub fn categorize<S>(store: &S, title: &str, url: &str) -> Result<Categorization>
where
    S: KeyValueStore + ?Sized,
{
    let map: KeywordMap = load(store, KEYWORD_TO_CATEGORY)?.unwrap_or_default();
    Ok(categorize_with(&map, title, url))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, save};

    fn store_with(entries: &[(&str, &str)]) -> MemoryStore {
        let mut map = KeywordMap::new();
        for (keyword, category) in entries {
            map.insert(keyword.to_string(), category.to_string());
        }
        let mut store = MemoryStore::new();
        save(&mut store, KEYWORD_TO_CATEGORY, &map).unwrap();
        store
    }

    #[test]
    fn test_categorize_empty_map_is_other() {
        let store = MemoryStore::new();

        for (title, url) in [
            ("Big Deals", "https://megastore.com/x"),
            ("", ""),
            ("Anything", "not a url"),
        ] {
            assert_eq!(categorize(&store, title, url).unwrap(), Categorization::other());
        }
    }

    #[test]
    fn test_categorize_matches_url() {
        let store = store_with(&[("megastore", "Store")]);

        let result = categorize(&store, "Big Deals", "https://megastore.com/x").unwrap();

        assert_eq!(
            result,
            Categorization {
                category: "Store".to_string(),
                matched: true,
            }
        );
    }

    #[test]
    fn test_categorize_matches_title_case_insensitive() {
        let store = store_with(&[("sourdough", "Food")]);

        let result = categorize(&store, "My SOURDOUGH Starter", "https://blog.example").unwrap();
        assert_eq!(result.category, "Food");
        assert!(result.matched);
    }

    #[test]
    fn test_categorize_substring_imprecision() {
        let store = store_with(&[("java", "Work")]);

        // "javascript" contains "java"
        let result = categorize(&store, "JavaScript Tricks", "https://example.com").unwrap();
        assert_eq!(result.category, "Work");
    }

    #[test]
    fn test_categorize_no_match() {
        let store = store_with(&[("megastore", "Store")]);

        let result = categorize(&store, "Rust Book", "https://doc.rust-lang.org").unwrap();
        assert_eq!(result, Categorization::other());
    }

    #[test]
    fn test_categorize_stable_across_calls() {
        let store = store_with(&[("rust", "Work"), ("book", "Reference"), ("lang", "News")]);

        let first = categorize(&store, "Rust Book", "https://doc.rust-lang.org").unwrap();
        for _ in 0..5 {
            assert_eq!(
                categorize(&store, "Rust Book", "https://doc.rust-lang.org").unwrap(),
                first
            );
        }
        assert!(first.matched);
    }

    #[test]
    fn test_categorize_imported_mixed_case_keyword() {
        let store = store_with(&[("GitHub", "Work")]);

        let result = categorize(&store, "GitHub repo", "https://github.com/x").unwrap();

        assert_eq!(result.category, "Work");
        assert!(result.matched);
    }
}
