use std::{
    collections::{BTreeSet, HashMap},
    path::Path,
};

use crate::{
    error::{Error, Result},
    record::{Record, RecordId},
    tag_index::TagIndex,
};

/// The ordered record store with its id→index lookup.
///
/// Record order is data order: index 0 is the most recently added entry.
/// `collections` holds the user's collection names in display order; a
/// record's membership position is the index of its collection there.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<Record>,
    index: HashMap<RecordId, usize>,
    collections: Vec<String>,
}

impl Catalog {
    /// Build a catalog, rejecting records without an id and duplicate ids.
    pub fn new(records: Vec<Record>) -> Result<Self> {
        let mut catalog = Self {
            records,
            ..Self::default()
        };
        catalog.rebuild_index()?;
        Ok(catalog)
    }

    /// Load records from `catalog` (a JSON array) and collection names from
    /// `collections`. Missing files are treated as empty.
    pub fn load(catalog: &Path, collections: &Path) -> Result<Self> {
        let records: Vec<Record> = read_json_or_default(catalog)?;
        let names = match read_json_or_default(collections)? {
            serde_json::Value::Null => Vec::new(),
            value => collection_names(value)?,
        };
        tracing::debug!(
            records = records.len(),
            collections = names.len(),
            "loaded catalog"
        );
        Ok(Self::new(records)?.with_collections(names))
    }

    pub fn with_collections(mut self, collections: Vec<String>) -> Self {
        self.collections = collections;
        self
    }

    fn rebuild_index(&mut self) -> Result<()> {
        let mut index = HashMap::with_capacity(self.records.len());
        for (idx, record) in self.records.iter().enumerate() {
            if record.id.is_empty() {
                return Err(Error::InvalidCatalog(format!(
                    "entry without id at position {idx}: {:?}",
                    record.display_title()
                )));
            }
            if index.insert(record.id.clone(), idx).is_some() {
                return Err(Error::InvalidCatalog(format!(
                    "duplicate entry id {} ({:?})",
                    record.id,
                    record.display_title()
                )));
            }
        }
        self.index = index;
        Ok(())
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn collections(&self) -> &[String] {
        &self.collections
    }

    /// Position of a collection in the user's ordering.
    pub fn collection_position(&self, name: &str) -> Option<usize> {
        self.collections.iter().position(|c| c == name)
    }

    /// Data-order position of a record.
    pub fn position(&self, id: &RecordId) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn get(&self, id: &RecordId) -> Option<&Record> {
        self.position(id).map(|idx| &self.records[idx])
    }

    /// Put new records in front of the existing ones (newest first) and
    /// register their tags.
    ///
    /// Nothing is changed if any new record has a missing or clashing id.
    pub fn prepend(
        &mut self,
        new_records: Vec<Record>,
        tags: &mut TagIndex,
    ) -> Result<Vec<RecordId>> {
        let ids: Vec<RecordId> =
            new_records.iter().map(|r| r.id.clone()).collect();

        let mut records = new_records;
        records.extend(self.records.iter().cloned());
        let mut candidate = Self {
            records,
            index: HashMap::new(),
            collections: self.collections.clone(),
        };
        candidate.rebuild_index()?;

        for record in &candidate.records[..ids.len()] {
            tags.update_with_entry(record);
        }
        *self = candidate;
        tracing::debug!(added = ids.len(), total = self.len(), "prepended");
        Ok(ids)
    }

    /// Apply an edit to one record, keeping the tag index consistent.
    ///
    /// The id is immutable; an edit that changes it is reverted.
    pub fn edit<F>(
        &mut self,
        id: &RecordId,
        tags: &mut TagIndex,
        edit: F,
    ) -> Result<()>
    where
        F: FnOnce(&mut Record),
    {
        let idx = self.position(id).ok_or_else(|| Error::NotFound {
            kind: "record",
            name: id.to_string(),
        })?;

        let record = &mut self.records[idx];
        tags.remove_entry(record);
        edit(record);
        if record.id != *id {
            tracing::warn!(
                %id,
                attempted = %record.id,
                "record id is immutable"
            );
            record.id = id.clone();
        }
        tags.update_with_entry(record);
        Ok(())
    }

    /// Records listed as similar to `id`; dangling references are skipped.
    pub fn similar_to(&self, id: &RecordId) -> Vec<&Record> {
        let Some(record) = self.get(id) else {
            return Vec::new();
        };
        record
            .similar
            .iter()
            .filter_map(|other| {
                let found = self.get(other);
                if found.is_none() {
                    tracing::debug!(
                        %id,
                        missing = %other,
                        "dangling similar id"
                    );
                }
                found
            })
            .collect()
    }

    /// Every credited artist, sorted and deduplicated.
    pub fn artists(&self) -> Vec<&str> {
        self.records
            .iter()
            .flat_map(|r| r.artist.iter().map(String::as_str))
            .filter(|a| !a.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Build a tag index covering every record.
    pub fn tag_index(&self) -> TagIndex {
        let mut tags = TagIndex::default();
        for record in &self.records {
            tags.update_with_entry(record);
        }
        tags
    }
}

fn read_json_or_default<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned + Default,
{
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(serde_json::from_str(&text)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "file missing, using empty");
            Ok(T::default())
        }
        Err(e) => Err(e.into()),
    }
}

/// Collection names in display order: either a list of names or the keys
/// of an object mapping names to their contents.
fn collection_names(value: serde_json::Value) -> Result<Vec<String>> {
    match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                serde_json::Value::String(name) => Ok(name),
                other => Err(Error::InvalidCatalog(format!(
                    "collection name must be a string, got {other}"
                ))),
            })
            .collect(),
        serde_json::Value::Object(map) => {
            Ok(map.into_iter().map(|(name, _)| name).collect())
        }
        other => Err(Error::InvalidCatalog(format!(
            "collections must be a list or an object, got {other}"
        ))),
    }
}
