use std::collections::HashMap;

use crate::record::{Record, RecordId};

/// Population of a single tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagEntry {
    pub count: usize,
    pub ids: Vec<RecordId>,
}

/// How [`TagIndex::listing`] orders its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TagOrder {
    /// Most used first, ties broken by name.
    #[default]
    Count,
    /// Case-insensitive alphabetical.
    Name,
}

/// Inverted index from tag to the records carrying it.
///
/// `count == ids.len()` holds for every entry as long as callers pair every
/// [`update_with_entry`](Self::update_with_entry) with a later
/// [`remove_entry`](Self::remove_entry) of the same snapshot. A tag whose
/// last record is removed disappears from the index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagIndex {
    tags: HashMap<String, TagEntry>,
}

impl TagIndex {
    /// Register every tag of `record`.
    pub fn update_with_entry(&mut self, record: &Record) {
        for tag in &record.tags {
            let entry = self.tags.entry(tag.clone()).or_default();
            entry.count += 1;
            entry.ids.push(record.id.clone());
        }
    }

    /// Unregister every tag of `record`. Unknown tags and ids are ignored.
    pub fn remove_entry(&mut self, record: &Record) {
        for tag in &record.tags {
            let Some(entry) = self.tags.get_mut(tag) else {
                continue;
            };
            if let Some(pos) = entry.ids.iter().position(|id| *id == record.id)
            {
                entry.ids.remove(pos);
                entry.count = entry.count.saturating_sub(1);
            }
            if entry.count == 0 && entry.ids.is_empty() {
                self.tags.remove(tag);
            }
        }
    }

    pub fn get(&self, tag: &str) -> Option<&TagEntry> {
        self.tags.get(tag)
    }

    pub fn count(&self, tag: &str) -> usize {
        self.tags.get(tag).map_or(0, |e| e.count)
    }

    pub fn ids(&self, tag: &str) -> &[RecordId] {
        self.tags.get(tag).map_or(&[], |e| e.ids.as_slice())
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Tag names sorted case-insensitively, for completion.
    pub fn sorted_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> =
            self.tags.keys().map(String::as_str).collect();
        keys.sort_by_cached_key(|k| (k.to_lowercase(), k.to_string()));
        keys
    }

    /// `(tag, count)` pairs whose name contains `filter` (case-insensitive),
    /// in the requested order.
    pub fn listing(
        &self,
        filter: &str,
        order: TagOrder,
    ) -> Vec<(&str, usize)> {
        let needle = filter.trim().to_lowercase();
        let mut rows: Vec<(&str, usize)> = self
            .tags
            .iter()
            .filter(|(tag, _)| {
                needle.is_empty() || tag.to_lowercase().contains(&needle)
            })
            .map(|(tag, e)| (tag.as_str(), e.count))
            .collect();

        rows.sort_by_cached_key(|(tag, _)| {
            (tag.to_lowercase(), tag.to_string())
        });
        if order == TagOrder::Count {
            rows.sort_by(|a, b| b.1.cmp(&a.1));
        }
        rows
    }
}
