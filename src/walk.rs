//! Lazy pre-order traversal of a source tree.
//!
//! [`SourceWalk`] yields the source root first, then every path below it,
//! parents before children. Symlinks are never followed. Entries within a
//! directory are visited in file-name order so a merge log is reproducible
//! across runs.

use std::fs::Metadata;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// What a visited source path turned out to be.
#[derive(Debug)]
pub(crate) enum EntryKind {
    /// A directory
    Directory,
    /// A regular file, with the metadata read during classification
    File(Metadata),
    /// A symlink, device, socket, fifo, ...
    Other,
    /// The path vanished or could not be read
    Missing,
}

/// A visited source path.
#[derive(Debug)]
pub(crate) struct SourceEntry {
    /// Full source path
    pub path: PathBuf,
    /// Path relative to the source root (empty for the root itself)
    pub relative: PathBuf,
    pub kind: EntryKind,
}

/// Depth-first, pre-order iterator over a source tree.
pub(crate) struct SourceWalk {
    root: PathBuf,
    inner: walkdir::IntoIter,
}

impl SourceWalk {
    pub(crate) fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            inner: WalkDir::new(root)
                .follow_links(false)
                .sort_by_file_name()
                .into_iter(),
        }
    }

    fn relative(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }
}

impl Iterator for SourceWalk {
    type Item = SourceEntry;

    fn next(&mut self) -> Option<SourceEntry> {
        let entry = match self.inner.next()? {
            Ok(entry) => entry,
            Err(err) => {
                // Unreadable directories and a missing root both end up here.
                let path = err
                    .path()
                    .map_or_else(|| self.root.clone(), Path::to_path_buf);
                return Some(SourceEntry {
                    relative: self.relative(&path),
                    path,
                    kind: EntryKind::Missing,
                });
            }
        };

        // lstat again rather than trusting the dirent type: the entry may
        // have disappeared since its parent was read.
        let kind = match entry.metadata() {
            Ok(meta) if meta.is_dir() => EntryKind::Directory,
            Ok(meta) if meta.is_file() => EntryKind::File(meta),
            Ok(_) => EntryKind::Other,
            Err(_) => EntryKind::Missing,
        };

        Some(SourceEntry {
            relative: self.relative(entry.path()),
            path: entry.into_path(),
            kind,
        })
    }
}
