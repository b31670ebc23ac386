//! The merge run.
//!
//! Mounts are processed strictly in order. For each one the source tree is
//! walked in pre-order and every entry is replicated under the mount point:
//!
//! 1. Directories are created, or accepted if a directory is already there
//! 2. Regular files are copied, unless anything at all is already there
//! 3. Symlinks and special files are reported and skipped
//! 4. Entries that vanished or cannot be read are reported and skipped
//!
//! The first conflict ends the run. Everything merged before it stays on
//! disk.

use crate::error::{Error, Result};
use crate::event::MergeEvent;
use crate::mount::Mount;
use crate::options::MergeOptions;
use crate::ownership::OwnershipMap;
use crate::utils::path::relative_display;
use crate::walk::{EntryKind, SourceEntry, SourceWalk};
use std::fs::{self, Metadata};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use super::file::{CopyOutcome, copy_new_file};

/// Statistics from a merge run.
///
/// Returned by [`merge`] and [`MergeContext::finish`].
///
/// # Example
///
/// ```no_run
/// use drvmerge::{Mount, MergeOptions, merge};
/// use std::path::Path;
///
/// let mounts = [Mount::new("bash", "/store/bash", "usr")];
/// let stats = merge(Path::new("out"), &mounts, &MergeOptions::default())?;
/// println!("Copied {} files ({} bytes)", stats.files_copied, stats.bytes_copied);
/// # Ok::<(), drvmerge::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MergeStats {
    /// Number of mounts processed
    pub mounts: u64,
    /// Number of regular files copied
    pub files_copied: u64,
    /// Total bytes copied
    pub bytes_copied: u64,
    /// Number of directories created
    pub dirs_created: u64,
    /// Number of directories that already existed and were shared
    pub dirs_merged: u64,
    /// Number of source entries that vanished or could not be read
    pub entries_missing: u64,
    /// Number of symlinks and special files skipped
    pub entries_illegal: u64,
    /// Duration of the merge
    pub duration: Duration,
}

/// State of one merge run.
///
/// Holds the ownership map, so that every mount merged through the same
/// context is checked against the paths created by the earlier ones.
/// Separate contexts never see each other's ownership.
///
/// # Example
///
/// ```no_run
/// use drvmerge::{MergeContext, MergeOptions, Mount};
/// use std::path::Path;
///
/// let options = MergeOptions::default();
/// let mut ctx = MergeContext::new(Path::new("out"), &options);
/// ctx.merge_mount(&Mount::new("bash", "/store/bash", "usr"))?;
/// ctx.merge_mount(&Mount::new("coreutils", "/store/coreutils", "usr"))?;
/// let stats = ctx.finish();
/// # Ok::<(), drvmerge::Error>(())
/// ```
#[derive(Debug)]
pub struct MergeContext<'a> {
    destination: PathBuf,
    options: &'a MergeOptions,
    ownership: OwnershipMap,
    stats: MergeStats,
    started: Instant,
}

impl<'a> MergeContext<'a> {
    /// Start a merge run into `destination`.
    pub fn new(destination: &Path, options: &'a MergeOptions) -> Self {
        Self {
            destination: destination.to_path_buf(),
            options,
            ownership: OwnershipMap::new(),
            stats: MergeStats::default(),
            started: Instant::now(),
        }
    }

    /// Paths created so far and who created them.
    pub fn ownership(&self) -> &OwnershipMap {
        &self.ownership
    }

    /// Statistics so far.
    pub fn stats(&self) -> &MergeStats {
        &self.stats
    }

    /// End the run and return its statistics.
    pub fn finish(mut self) -> MergeStats {
        self.stats.duration = self.started.elapsed();
        self.stats
    }

    /// Merge one source tree into the destination.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The mount subpath contains `..` ([`Error::InvalidSubpath`])
    /// - A directory maps onto an existing non-directory ([`Error::DirectoryFileConflict`])
    /// - A file maps onto an existing directory ([`Error::FileDirectoryConflict`])
    /// - A file maps onto any other existing entry ([`Error::FileConflict`])
    /// - IO operations fail ([`Error::Io`], [`Error::TempFile`], [`Error::Persist`])
    pub fn merge_mount(&mut self, mount: &Mount) -> Result<()> {
        let mount_point = mount.mount_point(&self.destination)?;

        self.options.emit(&MergeEvent::Mounting {
            label: &mount.label,
            subpath: &mount.subpath,
        });
        self.stats.mounts += 1;

        for entry in SourceWalk::new(&mount.source) {
            let target = if entry.relative.as_os_str().is_empty() {
                mount_point.clone()
            } else {
                mount_point.join(&entry.relative)
            };

            match &entry.kind {
                EntryKind::Directory => self.merge_directory(mount, &entry, &target)?,
                EntryKind::File(meta) => self.merge_file(mount, &entry, meta, &target)?,
                EntryKind::Other => {
                    self.stats.entries_illegal += 1;
                    self.options
                        .emit(&MergeEvent::IllegalFileType { path: &entry.path });
                }
                EntryKind::Missing => {
                    self.stats.entries_missing += 1;
                    self.options.emit(&MergeEvent::Missing { path: &entry.path });
                }
            }
        }

        Ok(())
    }

    fn merge_directory(&mut self, mount: &Mount, entry: &SourceEntry, target: &Path) -> Result<()> {
        match fs::symlink_metadata(target) {
            Ok(existing) if existing.is_dir() => {
                self.stats.dirs_merged += 1;
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    "{} already exists, shared with {}",
                    target.display(),
                    mount.label
                );
                Ok(())
            }
            Ok(_) => Err(Error::DirectoryFileConflict {
                relative: relative_display(&entry.relative).to_path_buf(),
                label: mount.label.clone(),
                owner: self.ownership.owner_of(target).to_owned(),
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                fs::create_dir_all(target)?;
                self.ownership.record(target, &mount.label);
                self.stats.dirs_created += 1;
                #[cfg(feature = "tracing")]
                tracing::debug!("created {} for {}", target.display(), mount.label);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn merge_file(
        &mut self,
        mount: &Mount,
        entry: &SourceEntry,
        meta: &Metadata,
        target: &Path,
    ) -> Result<()> {
        match fs::symlink_metadata(target) {
            Ok(existing) => {
                return Err(self.file_conflict(mount, entry, target, existing.is_dir()));
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        // A source root that is a single file has no parent directory entry
        // of its own to create the mount point's ancestors.
        if entry.relative.as_os_str().is_empty() {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
        }

        match copy_new_file(&entry.path, meta, target, self.options)? {
            CopyOutcome::Copied(bytes) => {
                self.options.emit(&MergeEvent::Copied {
                    label: &mount.label,
                    relative: &entry.relative,
                    destination: &self.destination,
                    subpath: &mount.subpath,
                    bytes,
                });
                self.ownership.record(target, &mount.label);
                self.stats.files_copied += 1;
                self.stats.bytes_copied += bytes;
                Ok(())
            }
            CopyOutcome::DestinationExists => {
                Err(self.file_conflict(mount, entry, target, target.is_dir()))
            }
        }
    }

    fn file_conflict(
        &self,
        mount: &Mount,
        entry: &SourceEntry,
        target: &Path,
        existing_is_dir: bool,
    ) -> Error {
        let relative = relative_display(&entry.relative).to_path_buf();
        let label = mount.label.clone();
        let owner = self.ownership.owner_of(target).to_owned();
        if existing_is_dir {
            Error::FileDirectoryConflict {
                relative,
                label,
                owner,
            }
        } else {
            Error::FileConflict {
                relative,
                label,
                owner,
            }
        }
    }
}

/// Merge source trees into `destination`, in order.
///
/// Every mount subpath is validated before anything is written. Mounts are
/// then merged one after another through a single [`MergeContext`], so a
/// conflict is attributed to whichever earlier mount created the path.
///
/// # Arguments
///
/// * `destination` - Root of the merged tree
/// * `mounts` - Sources to merge, in priority order
/// * `options` - Merge options
///
/// # Errors
///
/// Returns the first error of any mount; see [`MergeContext::merge_mount`].
/// Work done before the error is left in place.
pub fn merge(destination: &Path, mounts: &[Mount], options: &MergeOptions) -> Result<MergeStats> {
    for mount in mounts {
        mount.mount_point(destination)?;
    }

    let mut ctx = MergeContext::new(destination, options);
    for mount in mounts {
        ctx.merge_mount(mount)?;
    }
    Ok(ctx.finish())
}
