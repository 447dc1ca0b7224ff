/// Data structures for Link Sorter
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_CATEGORIES, OTHER, is_default_category};

/// A saved link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRecord {
    pub url: String,
    pub title: String,
    pub category: String,
    /// Category assigned when the link was first saved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_category: Option<String>,
    #[serde(default)]
    pub visited: bool,
}

impl LinkRecord {
    pub fn new(url: String, title: String, category: String) -> LinkRecord {
        LinkRecord {
            url,
            title,
            original_category: Some(category.clone()),
            category,
            visited: false,
        }
    }

    /// Category to fall back on when the current one goes away
    pub fn original_or_other(&self) -> &str {
        self.original_category.as_deref().unwrap_or(OTHER)
    }
}

/// Learned keyword → category associations
///
/// Keys iterate in lexicographic order, so the first match for a given
/// input is stable as long as the map is not written to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeywordMap(BTreeMap<String, String>);

impl KeywordMap {
    pub fn new() -> Self {
        KeywordMap(BTreeMap::new())
    }

    /// Last write wins
    pub fn insert(&mut self, keyword: String, category: String) {
        self.0.insert(keyword, category);
    }

    pub fn remove(&mut self, keyword: &str) -> bool {
        self.0.remove(keyword).is_some()
    }

    pub fn get(&self, keyword: &str) -> Option<&str> {
        self.0.get(keyword).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Category of the first keyword found as a substring of `haystack`
    ///
    /// Keywords compare lowercased; `haystack` is expected to be lowercase already.
    pub fn first_match(&self, haystack: &str) -> Option<&str> {
        self.iter()
            .find(|(keyword, _)| haystack.contains(&keyword.to_lowercase()))
            .map(|(_, category)| category)
    }
}

/// Built-in categories plus the ones the user added, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategorySet {
    user: Vec<String>,
}

impl CategorySet {
    pub fn new() -> Self {
        CategorySet { user: Vec::new() }
    }

    pub fn from_user(user: Vec<String>) -> Self {
        let mut set = CategorySet::new();
        for name in user {
            set.add_user(&name);
        }
        set
    }

    pub fn user(&self) -> &[String] {
        &self.user
    }

    /// Defaults first, then user categories
    pub fn all(&self) -> Vec<String> {
        DEFAULT_CATEGORIES
            .iter()
            .map(|c| c.to_string())
            .chain(self.user.iter().cloned())
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        is_default_category(name) || self.user.iter().any(|c| c == name)
    }

    /// Returns false for blank names, defaults, and names already present
    pub fn add_user(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.contains(name) {
            return false;
        }
        self.user.push(name.to_string());
        true
    }

    pub fn remove_user(&mut self, name: &str) -> bool {
        let name = name.trim();
        let original_len = self.user.len();
        self.user.retain(|c| c != name);
        self.user.len() < original_len
    }
}
