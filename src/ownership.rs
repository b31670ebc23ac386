//! Ownership map: which source created which destination path.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Owner reported for destination paths this run did not create.
pub const UNKNOWN_OWNER: &str = "<unknown package>";

/// Records the label of the first source that created each destination path.
///
/// Entries are only ever added, never replaced or removed. The map lives for
/// a single merge run and is used solely to attribute conflicts.
#[derive(Debug, Clone, Default)]
pub struct OwnershipMap {
    owners: HashMap<PathBuf, String>,
}

impl OwnershipMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `label` as the creator of `path`.
    ///
    /// The first recorded owner wins; returns `false` if `path` already had
    /// one.
    pub fn record(&mut self, path: &Path, label: &str) -> bool {
        if self.owners.contains_key(path) {
            return false;
        }
        self.owners.insert(path.to_path_buf(), label.to_owned());
        true
    }

    /// Label that created `path`, or [`UNKNOWN_OWNER`].
    pub fn owner_of(&self, path: &Path) -> &str {
        self.owners.get(path).map_or(UNKNOWN_OWNER, String::as_str)
    }

    /// Number of recorded paths.
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    /// Whether nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}
