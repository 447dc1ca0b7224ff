/// Ordered link collection with single-step undo

use std::collections::HashSet;

use crate::link_data::LinkRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// Inserted at the front; worth highlighting
    Added,
    /// URL was already saved, nothing changed
    AlreadyPresent,
}

/// The most recently deleted link and where it was
#[derive(Debug, Clone, PartialEq)]
pub struct UndoSlot {
    pub record: LinkRecord,
    pub index: usize,
    /// Millisecond timestamp after which the deletion is permanent
    pub expires_at: f64,
}

impl UndoSlot {
    pub fn is_expired(&self, now: f64) -> bool {
        now >= self.expires_at
    }
}

/// Links newest first, unique by URL
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkCollection {
    links: Vec<LinkRecord>,
    undo: Option<UndoSlot>,
}

impl LinkCollection {
    pub fn new() -> Self {
        LinkCollection {
            links: Vec::new(),
            undo: None,
        }
    }

    /// Build from persisted records, keeping the first occurrence of each URL
    pub fn from_records(records: Vec<LinkRecord>) -> Self {
        let mut seen_urls = HashSet::new();
        let original_len = records.len();

        let links: Vec<LinkRecord> = records
            .into_iter()
            .filter(|record| seen_urls.insert(record.url.clone()))
            .collect();

        if links.len() < original_len {
            log::warn!("Dropped {} duplicate links", original_len - links.len());
        }

        LinkCollection { links, undo: None }
    }

    pub fn links(&self) -> &[LinkRecord] {
        &self.links
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn get(&self, url: &str) -> Option<&LinkRecord> {
        self.links.iter().find(|l| l.url == url)
    }

    fn position(&self, url: &str) -> Option<usize> {
        self.links.iter().position(|l| l.url == url)
    }

    /// Insert a new link at the front, categorized by `classify`
    ///
    /// `classify` only runs for unknown URLs. A known URL keeps its
    /// current category, even if classification would now differ.
    pub fn add_or_touch<F>(&mut self, title: &str, url: &str, classify: F) -> AddOutcome
    where
        F: FnOnce() -> String,
    {
        if self.get(url).is_some() {
            return AddOutcome::AlreadyPresent;
        }

        let record = LinkRecord::new(url.to_string(), title.to_string(), classify());
        self.links.insert(0, record);
        AddOutcome::Added
    }

    /// Delete a link, making it the only recoverable deletion until `expires_at`
    pub fn remove(&mut self, url: &str, expires_at: f64) -> bool {
        let Some(index) = self.position(url) else {
            return false;
        };

        let record = self.links.remove(index);
        self.undo = Some(UndoSlot {
            record,
            index,
            expires_at,
        });
        true
    }

    /// Put the last deleted link back where it was
    ///
    /// No-op once the slot has expired. If the URL was saved again in the
    /// meantime the slot is dropped rather than creating a duplicate.
    pub fn undo(&mut self, now: f64) -> Option<&LinkRecord> {
        let slot = self.undo.take()?;

        if slot.is_expired(now) {
            return None;
        }

        if self.get(&slot.record.url).is_some() {
            log::debug!("{} was saved again, dropping undo", slot.record.url);
            return None;
        }

        let index = slot.index.min(self.links.len());
        self.links.insert(index, slot.record);
        self.links.get(index)
    }

    /// The live undo slot, if any
    pub fn pending_undo(&self, now: f64) -> Option<&UndoSlot> {
        self.undo.as_ref().filter(|slot| !slot.is_expired(now))
    }

    /// Clear the slot if its window has passed. Returns true when it was cleared.
    pub fn expire_undo(&mut self, now: f64) -> bool {
        if self.undo.as_ref().is_some_and(|slot| slot.is_expired(now)) {
            self.undo = None;
            return true;
        }
        false
    }

    pub fn reassign_category(&mut self, url: &str, category: &str) -> Option<&LinkRecord> {
        let record = self.links.iter_mut().find(|l| l.url == url)?;
        record.category = category.to_string();
        Some(&*record)
    }

    pub fn mark_visited(&mut self, url: &str) -> bool {
        self.links
            .iter_mut()
            .find(|l| l.url == url)
            .map(|record| {
                record.visited = true;
            })
            .is_some()
    }

    /// Send every link in `category` back to its original category. Returns how many moved.
    pub fn reset_category(&mut self, category: &str) -> usize {
        let mut moved = 0;
        for record in self.links.iter_mut().filter(|l| l.category == category) {
            record.category = record.original_or_other().to_string();
            moved += 1;
        }
        moved
    }
}
