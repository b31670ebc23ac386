//! Configuration options for merge runs.
//!
//! This module provides [`MergeOptions`] for configuring how files are
//! copied into the destination and where progress events go.
//!
//! # Example
//!
//! ```
//! use drvmerge::MergeOptions;
//!
//! let options = MergeOptions::default()
//!     .with_preserve_timestamps()
//!     .with_fsync();
//! assert!(options.preserve_permissions);
//! ```

use crate::event::MergeEvent;

/// Callback receiving each [`MergeEvent`] in processing order.
pub type EventHandler = fn(&MergeEvent<'_>);

/// Options for merge runs.
///
/// Conflicts are always fatal; the options only control the copy itself
/// and event delivery.
///
/// # Default Values
///
/// | Field | Default | Description |
/// |-------|---------|-------------|
/// | `preserve_permissions` | `true` | Copy file permission bits |
/// | `preserve_timestamps` | `false` | Copy mtime/atime |
/// | `fsync` | `false` | Sync each file to disk before rename |
/// | `event_handler` | `None` | Events go to `tracing` (if enabled) |
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MergeOptions {
    /// Whether to copy file permission bits (default: true)
    pub preserve_permissions: bool,

    /// Whether to copy file timestamps (default: false)
    ///
    /// Merged outputs are usually normalized afterwards, so by default
    /// copied files get the current time.
    pub preserve_timestamps: bool,

    /// Whether to sync files to disk before the final rename (default: false)
    pub fsync: bool,

    /// Callback for progress and diagnostic events (optional)
    ///
    /// If not set and the `tracing` feature is enabled, events are logged
    /// via tracing. Otherwise they are dropped.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub event_handler: Option<EventHandler>,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            preserve_permissions: true,
            preserve_timestamps: false,
            fsync: false,
            event_handler: None,
        }
    }
}

impl MergeOptions {
    /// Create options with an event handler
    #[must_use]
    pub fn with_event_handler(mut self, handler: EventHandler) -> Self {
        self.event_handler = Some(handler);
        self
    }

    /// Copy file timestamps (mtime/atime) along with contents
    #[must_use]
    pub fn with_preserve_timestamps(mut self) -> Self {
        self.preserve_timestamps = true;
        self
    }

    /// Sync each copied file to disk before it becomes visible
    #[must_use]
    pub fn with_fsync(mut self) -> Self {
        self.fsync = true;
        self
    }

    /// Disable permission preservation
    ///
    /// Copied files then get the default permissions for new files
    /// (subject to the umask).
    #[must_use]
    pub fn without_permissions(mut self) -> Self {
        self.preserve_permissions = false;
        self
    }

    pub(crate) fn emit(&self, event: &MergeEvent<'_>) {
        if let Some(handler) = self.event_handler {
            handler(event);
        } else {
            #[cfg(feature = "tracing")]
            log_event(event);
        }
    }
}

#[cfg(feature = "tracing")]
fn log_event(event: &MergeEvent<'_>) {
    if event.is_diagnostic() {
        tracing::warn!("{}", event);
    } else {
        tracing::info!("{}", event);
    }
}
