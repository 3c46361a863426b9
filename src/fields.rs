//! Field resolution: logical field names and aliases to storage keys.
//!
//! Every storage key a record can carry is listed in [`StorageKey::ALL`]
//! together with its implicit [`ValueKind`]. Query terms name *logical*
//! fields, which either hit the alias table, name a storage key directly, or
//! fall through as a literal key looked up in the record's extra fields.

use crate::value::{FieldValue, ValueKind};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Id,
    Title,
    TitleShort,
    TitleAlt,
    Description,
    Tags,
    Artist,
    Group,
    Language,
    Pages,
    Parody,
    Character,
    Upload,
    Score,
    Collection,
    Similar,
    Removed,
    Opens,
    LastOpened,
    LastEdited,
    ThumbnailUrl,
    OpenUrl,
    FilesystemLocation,
    /// A key outside the known table, looked up literally.
    Other(String),
}

/// Logical names that expand to one or more storage keys.
const ALIASES: &[(&str, &[StorageKey])] = &[
    ("author", &[StorageKey::Artist, StorageKey::Group]),
    ("artists", &[StorageKey::Artist]),
    (
        "title",
        &[StorageKey::Title, StorageKey::TitleShort, StorageKey::TitleAlt],
    ),
    (
        "name",
        &[StorageKey::Title, StorageKey::TitleShort, StorageKey::TitleAlt],
    ),
    ("tag", &[StorageKey::Tags]),
    ("rating", &[StorageKey::Score]),
    ("stars", &[StorageKey::Score]),
    ("lang", &[StorageKey::Language]),
    ("date", &[StorageKey::Upload]),
    ("uploaded", &[StorageKey::Upload]),
    ("upload_date", &[StorageKey::Upload]),
    ("characters", &[StorageKey::Character]),
    ("chars", &[StorageKey::Character]),
    ("series", &[StorageKey::Parody]),
    ("desc", &[StorageKey::Description]),
    ("url", &[StorageKey::OpenUrl]),
    ("location", &[StorageKey::FilesystemLocation]),
    ("path", &[StorageKey::FilesystemLocation]),
];

impl StorageKey {
    /// Every known storage key, in the order unqualified terms visit them.
    pub const ALL: [StorageKey; 23] = [
        StorageKey::Id,
        StorageKey::Title,
        StorageKey::TitleShort,
        StorageKey::TitleAlt,
        StorageKey::Description,
        StorageKey::Tags,
        StorageKey::Artist,
        StorageKey::Group,
        StorageKey::Language,
        StorageKey::Pages,
        StorageKey::Parody,
        StorageKey::Character,
        StorageKey::Upload,
        StorageKey::Score,
        StorageKey::Collection,
        StorageKey::Similar,
        StorageKey::Removed,
        StorageKey::Opens,
        StorageKey::LastOpened,
        StorageKey::LastEdited,
        StorageKey::ThumbnailUrl,
        StorageKey::OpenUrl,
        StorageKey::FilesystemLocation,
    ];

    /// [`ALL`](Self::ALL) as a slice with a `'static` lifetime.
    pub fn known_keys() -> &'static [StorageKey] {
        static KEYS: [StorageKey; 23] = StorageKey::ALL;
        &KEYS
    }

    pub fn name(&self) -> &str {
        match self {
            StorageKey::Other(name) => name,
            known => known.static_name(),
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            StorageKey::Id
            | StorageKey::Title
            | StorageKey::Description
            | StorageKey::Other(_) => ValueKind::Text,
            StorageKey::TitleShort
            | StorageKey::TitleAlt
            | StorageKey::Upload
            | StorageKey::Collection
            | StorageKey::LastOpened
            | StorageKey::LastEdited
            | StorageKey::ThumbnailUrl
            | StorageKey::OpenUrl
            | StorageKey::FilesystemLocation => ValueKind::OptionalText,
            StorageKey::Tags
            | StorageKey::Artist
            | StorageKey::Group
            | StorageKey::Language
            | StorageKey::Parody
            | StorageKey::Character
            | StorageKey::Similar => ValueKind::List,
            StorageKey::Pages | StorageKey::Score | StorageKey::Opens => {
                ValueKind::Number
            }
            StorageKey::Removed => ValueKind::Bool,
        }
    }

    /// The documented default for a record that does not carry this key.
    pub fn default_value(&self) -> FieldValue {
        self.kind().default_value()
    }

    /// Look up a known storage key by its exact (case-insensitive) name.
    pub fn known(name: &str) -> Option<StorageKey> {
        StorageKey::ALL
            .iter()
            .find(|key| key.name().eq_ignore_ascii_case(name))
            .cloned()
    }

    fn static_name(&self) -> &'static str {
        match self {
            StorageKey::Other(_) => "other",
            StorageKey::Id => "id",
            StorageKey::Title => "title",
            StorageKey::TitleShort => "title_short",
            StorageKey::TitleAlt => "title_alt",
            StorageKey::Description => "description",
            StorageKey::Tags => "tags",
            StorageKey::Artist => "artist",
            StorageKey::Group => "group",
            StorageKey::Language => "language",
            StorageKey::Pages => "pages",
            StorageKey::Parody => "parody",
            StorageKey::Character => "character",
            StorageKey::Upload => "upload",
            StorageKey::Score => "score",
            StorageKey::Collection => "collection",
            StorageKey::Similar => "similar",
            StorageKey::Removed => "removed",
            StorageKey::Opens => "opens",
            StorageKey::LastOpened => "last_opened",
            StorageKey::LastEdited => "last_edited",
            StorageKey::ThumbnailUrl => "thumbnail_url",
            StorageKey::OpenUrl => "open_url",
            StorageKey::FilesystemLocation => "filesystem_location",
        }
    }
}

/// Resolve a logical field name to the storage keys it covers.
///
/// Aliases win over storage key names; anything else is passed through as a
/// single literal key.
pub fn resolve(logical: &str) -> Vec<StorageKey> {
    let trimmed = logical.trim();
    let lowered = trimmed.to_lowercase();

    if let Some((_, keys)) =
        ALIASES.iter().find(|(alias, _)| *alias == lowered.as_str())
    {
        return keys.to_vec();
    }

    match StorageKey::known(&lowered) {
        Some(key) => vec![key],
        None => vec![StorageKey::Other(trimmed.to_string())],
    }
}

/// All logical names a user can type before `:`, sorted case-insensitively.
pub fn logical_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = ALIASES
        .iter()
        .map(|(alias, _)| *alias)
        .chain(StorageKey::ALL.iter().map(StorageKey::static_name))
        .collect();
    names.sort_by_key(|name| name.to_lowercase());
    names.dedup();
    names
}
