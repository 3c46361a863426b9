use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    fields::StorageKey,
    value::{FieldRef, FieldValue},
};

/// Marker some sources put into the language list of translated works.
const TRANSLATED_MARKER: &str = "translated";

/// The stable identifier of a catalog record.
#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// One catalog entry.
///
/// Every field is optional in the source data; missing fields deserialize
/// to their documented defaults and explicit `null`s are treated the same
/// way. Keys outside the known set are kept in `extra` so that queries can
/// still reach them by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Record {
    pub id: RecordId,
    pub title: Option<String>,
    pub title_short: Option<String>,
    pub title_alt: Option<String>,
    pub description: Option<String>,
    #[serde(alias = "tag", deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub artist: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub group: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub language: Vec<String>,
    pub pages: Option<i64>,
    #[serde(deserialize_with = "null_as_default")]
    pub parody: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub character: Vec<String>,
    #[serde(alias = "upload_date")]
    pub upload: Option<String>,
    pub score: Option<f64>,
    pub collection: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub similar: Vec<RecordId>,
    #[serde(deserialize_with = "null_as_default")]
    pub removed: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub opens: u64,
    pub last_opened: Option<String>,
    pub last_edited: Option<String>,
    pub thumbnail_url: Option<String>,
    pub open_url: Option<String>,
    pub filesystem_location: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn text(value: &Option<String>) -> Option<FieldRef<'_>> {
    value.as_deref().map(FieldRef::Text)
}

impl Record {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: RecordId::new(id),
            ..Self::default()
        }
    }

    /// A borrowed view of the value stored under `key`, or `None` if the
    /// record does not carry it.
    ///
    /// Lists always count as carried. The `removed` flag and the open
    /// counter only count once they differ from their defaults, so that an
    /// unqualified search for `false` or `0` does not hit every record.
    pub fn field(&self, key: &StorageKey) -> Option<FieldRef<'_>> {
        match key {
            StorageKey::Id => Some(FieldRef::Text(self.id.as_str())),
            StorageKey::Title => text(&self.title),
            StorageKey::TitleShort => text(&self.title_short),
            StorageKey::TitleAlt => text(&self.title_alt),
            StorageKey::Description => text(&self.description),
            StorageKey::Tags => Some(FieldRef::Texts(&self.tags)),
            StorageKey::Artist => Some(FieldRef::Texts(&self.artist)),
            StorageKey::Group => Some(FieldRef::Texts(&self.group)),
            StorageKey::Language => Some(FieldRef::Texts(&self.language)),
            StorageKey::Pages => self.pages.map(FieldRef::Integer),
            StorageKey::Parody => Some(FieldRef::Texts(&self.parody)),
            StorageKey::Character => Some(FieldRef::Texts(&self.character)),
            StorageKey::Upload => text(&self.upload),
            StorageKey::Score => self.score.map(FieldRef::Float),
            StorageKey::Collection => text(&self.collection),
            StorageKey::Similar => Some(FieldRef::Ids(&self.similar)),
            StorageKey::Removed => self.removed.then_some(FieldRef::Bool(true)),
            // Counts past i64::MAX have no faithful integer form.
            StorageKey::Opens => i64::try_from(self.opens)
                .ok()
                .filter(|n| *n > 0)
                .map(FieldRef::Integer),
            StorageKey::LastOpened => text(&self.last_opened),
            StorageKey::LastEdited => text(&self.last_edited),
            StorageKey::ThumbnailUrl => text(&self.thumbnail_url),
            StorageKey::OpenUrl => text(&self.open_url),
            StorageKey::FilesystemLocation => text(&self.filesystem_location),
            StorageKey::Other(name) => self.extra.get(name).map(FieldRef::Json),
        }
    }

    /// Like [`field`](Self::field), falling back to the key's default.
    pub fn field_or_default(&self, key: &StorageKey) -> FieldRef<'_> {
        self.field(key).unwrap_or_else(|| key.kind().default_ref())
    }

    /// Every value the record carries, known keys first, then extra keys.
    pub fn present_fields(&self) -> impl Iterator<Item = FieldRef<'_>> {
        StorageKey::known_keys()
            .iter()
            .filter_map(|key| self.field(key))
            .chain(self.extra.values().map(FieldRef::Json))
    }

    /// Owned copy of the value stored under `key`.
    pub fn get(&self, key: &StorageKey) -> Option<FieldValue> {
        self.field(key).map(FieldRef::to_value)
    }

    /// The value under `key`, falling back to the key's documented default.
    pub fn value(&self, key: &StorageKey) -> FieldValue {
        self.field_or_default(key).to_value()
    }

    /// The title shown in lists: short title, else alternative title, else
    /// the full title.
    pub fn display_title(&self) -> &str {
        [&self.title_short, &self.title_alt, &self.title]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|t| !t.is_empty())
            .unwrap_or("")
    }

    /// The first credited artist, falling back to the first group.
    pub fn primary_credit(&self) -> &str {
        self.artist
            .iter()
            .chain(self.group.iter())
            .map(String::as_str)
            .find(|name| !name.is_empty())
            .unwrap_or("")
    }

    /// Languages without the translation marker.
    pub fn languages(&self) -> Vec<&str> {
        self.language
            .iter()
            .map(String::as_str)
            .filter(|lang| *lang != TRANSLATED_MARKER)
            .collect()
    }

    pub fn is_translated(&self) -> bool {
        self.language.iter().any(|lang| lang == TRANSLATED_MARKER)
    }
}
