//! # drvmerge
//!
//! Conflict-aware merging of independent directory trees into one output
//! tree.
//!
//! Package builds often produce several independent outputs ("derivations")
//! that have to be composed into a single prefix such as `/usr`. drvmerge
//! walks each source tree in turn and replicates it under a mount point in
//! the destination, refusing to let two sources claim the same file.
//!
//! ## Core Features
//!
//! - **Ordered mounts**: sources are merged strictly in the order given
//! - **Shared directories**: directories present in several sources merge silently
//! - **Conflict attribution**: a clash names the source that got there first
//! - **Fail fast**: the first conflict stops the run, with no rollback
//! - **Atomic copies**: files appear via temp file + no-clobber rename
//! - **Symlink aware**: symlinks and special files are reported and skipped, never followed
//!
//! ## Quick Start with Builder API
//!
//! ```no_run
//! use drvmerge::MergeBuilder;
//!
//! let stats = MergeBuilder::new("out")
//!     .mount("bash", "/store/bash", "usr")
//!     .mount("coreutils", "/store/coreutils", "usr")
//!     .run()?;
//! println!("Copied {} files ({} bytes)", stats.files_copied, stats.bytes_copied);
//! # Ok::<(), drvmerge::Error>(())
//! ```
//!
//! ## Function API
//!
//! Command-line style arguments can be turned into mounts with
//! [`parse_mounts`] and merged with [`merge()`]:
//!
//! ```no_run
//! use drvmerge::{MergeOptions, merge, parse_mounts};
//! use std::path::Path;
//!
//! let mounts = parse_mounts(["bash", "/store/bash", "usr", "man", "/store/man", "usr/share"])?;
//! let options = MergeOptions::default().with_preserve_timestamps();
//! let stats = merge(Path::new("out"), &mounts, &options)?;
//! # Ok::<(), drvmerge::Error>(())
//! ```
//!
//! ## Conflict Rules
//!
//! | Source entry | Destination has | Result |
//! |--------------|-----------------|--------|
//! | directory | nothing | created, owned by this source |
//! | directory | directory | shared, nothing to do |
//! | directory | anything else | [`Error::DirectoryFileConflict`] |
//! | file | nothing | copied, owned by this source |
//! | file | directory | [`Error::FileDirectoryConflict`] |
//! | file | anything else | [`Error::FileConflict`] |
//! | symlink, device, fifo, socket | - | [`MergeEvent::IllegalFileType`], skipped |
//! | vanished / unreadable | - | [`MergeEvent::Missing`], skipped |
//!
//! ## Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `tracing` | Structured logging with tracing crate |
//! | `serde` | Serialize/Deserialize for [`MergeOptions`], [`Mount`], [`MergeStats`] |
//! | `full` | Enable all optional features |

#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
mod error;
mod event;
mod merge;
mod mount;
mod options;
mod ownership;
mod utils;
mod walk;

pub use builder::MergeBuilder;
pub use error::{Error, ErrorCode, Result, is_no_space_error};
pub use event::MergeEvent;
pub use merge::{MergeContext, MergeStats, merge};
pub use mount::{Mount, parse_mounts};
pub use options::{EventHandler, MergeOptions};
pub use ownership::{OwnershipMap, UNKNOWN_OWNER};
