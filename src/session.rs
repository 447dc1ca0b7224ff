/// Session: the in-memory state of one popup, backed by a key-value store
///
/// Every mutation updates memory first and then writes through to the
/// store. Store failures are logged and otherwise ignored, so the session
/// keeps working on its in-memory state until the next reload.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::categorizer::{Categorization, categorize};
use crate::collection::{AddOutcome, LinkCollection, UndoSlot};
use crate::config::{OTHER, Settings, is_default_category};
use crate::error::Result;
use crate::learner::learn;
use crate::link_data::{CategorySet, KeywordMap, LinkRecord};
use crate::storage::{
    ExportOptions, KEYWORD_TO_CATEGORY, KeyValueStore, SETTINGS, USER_CATEGORIES, VISITED_URLS,
    export_document, import_document, load, save,
};

pub struct Session<S: KeyValueStore> {
    store: S,
    settings: Settings,
    links: LinkCollection,
    categories: CategorySet,
}

impl<S: KeyValueStore> Session<S> {
    pub fn load(store: S) -> Self {
        let mut session = Session {
            store,
            settings: Settings::default(),
            links: LinkCollection::new(),
            categories: CategorySet::new(),
        };
        session.reload();
        session
    }

    /// Re-read everything from the store, e.g. after an import. Drops any pending undo.
    pub fn reload(&mut self) {
        self.settings = load_or_default(&self.store, SETTINGS);
        self.links = LinkCollection::from_records(load_records(&self.store));
        self.categories = CategorySet::from_user(load_or_default(&self.store, USER_CATEGORIES));
    }

    pub fn links(&self) -> &LinkCollection {
        &self.links
    }

    pub fn categories(&self) -> &CategorySet {
        &self.categories
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn categorize(&self, title: &str, url: &str) -> Categorization {
        categorize(&self.store, title, url).unwrap_or_else(|e| {
            log::warn!("Categorize failed, using {}: {}", OTHER, e);
            Categorization::other()
        })
    }

    /// Save a link, auto-categorized from learned keywords
    pub fn add_or_touch(&mut self, title: &str, url: &str) -> AddOutcome {
        let outcome = {
            let Session { store, links, .. } = self;
            links.add_or_touch(title, url, || match categorize(&*store, title, url) {
                Ok(result) => result.category,
                Err(e) => {
                    log::warn!("Categorize failed, using {}: {}", OTHER, e);
                    OTHER.to_string()
                }
            })
        };

        if outcome == AddOutcome::Added {
            self.persist_links();
        }
        outcome
    }

    /// Save a link as "Other" without consulting the keyword map (context-menu capture)
    pub fn save_unclassified(&mut self, title: &str, url: &str) -> AddOutcome {
        let outcome = self.links.add_or_touch(title, url, || OTHER.to_string());
        if outcome == AddOutcome::Added {
            self.persist_links();
        }
        outcome
    }

    /// Delete a link; it stays recoverable for `undo_window_ms` after `now`
    pub fn remove(&mut self, url: &str, now: f64) -> bool {
        let expires_at = now + self.settings.undo_window_ms;
        let removed = self.links.remove(url, expires_at);
        if removed {
            self.persist_links();
        }
        removed
    }

    pub fn undo(&mut self, now: f64) -> bool {
        let restored = self.links.undo(now).is_some();
        if restored {
            self.persist_links();
        }
        restored
    }

    pub fn pending_undo(&self, now: f64) -> Option<&UndoSlot> {
        self.links.pending_undo(now)
    }

    pub fn expire_undo(&mut self, now: f64) -> bool {
        self.links.expire_undo(now)
    }

    /// Move a link to `category`. Moves into a built-in category also teach the learner.
    pub fn reassign_category(&mut self, url: &str, category: &str) -> bool {
        let Some(record) = self.links.reassign_category(url, category).cloned() else {
            return false;
        };
        log::info!("{} -> {}", url, category);
        self.persist_links();

        if is_default_category(category) {
            if let Err(e) = learn(&mut self.store, &self.settings, &record, category) {
                log::warn!("Failed to save learned keywords: {}", e);
            }
        }
        true
    }

    pub fn mark_visited(&mut self, url: &str) -> bool {
        let marked = self.links.mark_visited(url);
        if marked {
            self.persist_links();
        }
        marked
    }

    pub fn add_user_category(&mut self, name: &str) -> bool {
        let added = self.categories.add_user(name);
        if added {
            self.persist_categories();
        }
        added
    }

    /// Remove a user category; its links return to their original category
    pub fn delete_user_category(&mut self, name: &str) -> usize {
        let name = name.trim();
        if !self.categories.remove_user(name) {
            return 0;
        }

        let moved = self.links.reset_category(name);
        log::info!("Deleted category {}, {} links reset", name, moved);

        self.persist_categories();
        if moved > 0 {
            self.persist_links();
        }
        moved
    }

    pub fn keywords(&self) -> KeywordMap {
        load_or_default(&self.store, KEYWORD_TO_CATEGORY)
    }

    pub fn forget_keyword(&mut self, keyword: &str) -> bool {
        let mut map = self.keywords();
        if !map.remove(keyword) {
            return false;
        }
        if let Err(e) = save(&mut self.store, KEYWORD_TO_CATEGORY, &map) {
            log::warn!("Failed to save keywords: {}", e);
        }
        true
    }

    /// Overwrite stored state from an exported document, then reload
    pub fn import(&mut self, json: &str) -> Result<Vec<String>> {
        let written = import_document(&mut self.store, json)?;
        self.reload();
        Ok(written)
    }

    pub fn export(&self, options: ExportOptions) -> Result<String> {
        export_document(&self.store, options)
    }

    fn persist_links(&mut self) {
        persist(&mut self.store, VISITED_URLS, self.links.links());
    }

    fn persist_categories(&mut self) {
        persist(&mut self.store, USER_CATEGORIES, self.categories.user());
    }
}

fn persist<S, T>(store: &mut S, key: &str, value: &T)
where
    S: KeyValueStore + ?Sized,
    T: Serialize + ?Sized,
{
    if let Err(e) = save(store, key, value) {
        log::warn!("Failed to save {}: {}", key, e);
    }
}

/// Saved links, skipping entries that no longer parse instead of dropping the whole list
fn load_records<S>(store: &S) -> Vec<LinkRecord>
where
    S: KeyValueStore + ?Sized,
{
    let entries: Vec<Value> = load_or_default(store, VISITED_URLS);

    entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value(entry) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("Skipping unreadable link #{} in {}: {}", index, VISITED_URLS, e);
                None
            }
        })
        .collect()
}

fn load_or_default<S, T>(store: &S, key: &str) -> T
where
    S: KeyValueStore + ?Sized,
    T: DeserializeOwned + Default,
{
    match load(store, key) {
        Ok(value) => value.unwrap_or_default(),
        Err(e) => {
            log::warn!("Failed to load {}, starting empty: {}", key, e);
            T::default()
        }
    }
}
