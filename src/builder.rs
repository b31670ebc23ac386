//! Builder API for merge runs.
//!
//! The builder pattern provides a fluent interface for describing the
//! mounts and options of a merge. This is often more convenient than
//! assembling a `Vec<Mount>` and [`MergeOptions`] by hand.
//!
//! # Examples
//!
//! ## Basic Usage
//!
//! ```no_run
//! use drvmerge::MergeBuilder;
//!
//! let stats = MergeBuilder::new("out")
//!     .mount("bash", "/store/bash", "usr")
//!     .mount("coreutils", "/store/coreutils", "usr")
//!     .run()?;
//! println!("Merged {} files", stats.files_copied);
//! # Ok::<(), drvmerge::Error>(())
//! ```
//!
//! ## With Options
//!
//! ```no_run
//! use drvmerge::MergeBuilder;
//!
//! let stats = MergeBuilder::new("out")
//!     .mount("docs", "/store/docs", "share/doc")
//!     .preserve_timestamps()
//!     .fsync()
//!     .run()?;
//! # Ok::<(), drvmerge::Error>(())
//! ```

use crate::error::Result;
use crate::merge::{MergeStats, merge};
use crate::mount::Mount;
use crate::options::{EventHandler, MergeOptions};
use std::path::{Path, PathBuf};

/// A builder for configuring and executing merge runs.
///
/// # Example
///
/// ```no_run
/// use drvmerge::{MergeBuilder, MergeEvent};
///
/// fn print_event(event: &MergeEvent<'_>) {
///     println!("{event}");
/// }
///
/// let stats = MergeBuilder::new("/tmp/out")
///     .mount("bash", "/store/bash", "/")
///     .on_event(print_event)
///     .run()?;
/// # Ok::<(), drvmerge::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct MergeBuilder {
    destination: PathBuf,
    mounts: Vec<Mount>,
    options: MergeOptions,
}

impl MergeBuilder {
    /// Create a new `MergeBuilder` merging into `destination`.
    ///
    /// Starts with no mounts and default options (permissions preserved,
    /// timestamps not, no fsync).
    pub fn new<P: AsRef<Path>>(destination: P) -> Self {
        Self {
            destination: destination.as_ref().to_path_buf(),
            mounts: Vec::new(),
            options: MergeOptions::default(),
        }
    }

    /// Add a source tree, mounted at `subpath` under the destination.
    ///
    /// Mounts are merged in the order they are added.
    #[must_use]
    pub fn mount(
        mut self,
        label: impl Into<String>,
        source: impl Into<PathBuf>,
        subpath: impl Into<PathBuf>,
    ) -> Self {
        self.mounts.push(Mount::new(label, source, subpath));
        self
    }

    /// Add several mounts at once, keeping their order.
    #[must_use]
    pub fn mounts<I: IntoIterator<Item = Mount>>(mut self, mounts: I) -> Self {
        self.mounts.extend(mounts);
        self
    }

    /// Copy file timestamps (mtime/atime) along with contents.
    #[must_use]
    pub fn preserve_timestamps(mut self) -> Self {
        self.options = self.options.with_preserve_timestamps();
        self
    }

    /// Don't copy permission bits; new files get default permissions.
    #[must_use]
    pub fn no_permissions(mut self) -> Self {
        self.options = self.options.without_permissions();
        self
    }

    /// Sync each copied file to disk before it becomes visible.
    #[must_use]
    pub fn fsync(mut self) -> Self {
        self.options = self.options.with_fsync();
        self
    }

    /// Receive every progress and diagnostic event.
    #[must_use]
    pub fn on_event(mut self, handler: EventHandler) -> Self {
        self.options = self.options.with_event_handler(handler);
        self
    }

    /// Get the configured options.
    pub fn options(&self) -> &MergeOptions {
        &self.options
    }

    /// Get the configured mounts, in merge order.
    pub fn mount_list(&self) -> &[Mount] {
        &self.mounts
    }

    /// Execute the merge.
    ///
    /// # Errors
    ///
    /// See [`merge`](crate::merge()).
    pub fn run(self) -> Result<MergeStats> {
        merge(&self.destination, &self.mounts, &self.options)
    }
}
