use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default cap on rendered search results.
pub const DEFAULT_THRESHOLD: usize = 100;
/// Default quiet period before a search runs, in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 150;

/// User preferences that shape every search.
///
/// Stored as `settings.json` in the data directory. Every field is optional
/// in the file; missing ones take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Maximum number of rendered results; 0 means unlimited.
    pub threshold: usize,
    /// Include entries flagged as removed.
    pub show_removed: bool,
    /// Restrict results to one collection.
    pub collection: Option<String>,
    /// Name of the active comparator.
    pub sort: String,
    /// Flip the comparator's default direction.
    pub reverse: bool,
    /// Count every occurrence of a term instead of one per field.
    pub count_multiple_matches: bool,
    pub debounce_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            show_removed: false,
            collection: None,
            sort: "data".to_string(),
            reverse: false,
            count_multiple_matches: true,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

impl Settings {
    /// Read settings from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no settings file");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&text).map_err(|e| {
            Error::Config(format!("{}: {e}", path.display()))
        })
    }

    /// `None` when the threshold is unlimited.
    pub fn limit(&self) -> Option<usize> {
        (self.threshold > 0).then_some(self.threshold)
    }
}
