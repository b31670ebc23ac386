//! Copying a single regular file into the destination tree.
//!
//! The copy is written to a temporary file next to its final location and
//! then renamed into place with `persist_noclobber`, so a destination path
//! never holds a partial file and an entry that appears concurrently is
//! never overwritten.

use crate::error::{Error, Result};
use crate::options::MergeOptions;
use filetime::{FileTime, set_file_times};
use std::fs::{self, File, Metadata};
use std::io;
use std::path::Path;

/// Result of copying one file (internal use)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CopyOutcome {
    /// File was copied; number of bytes written
    Copied(u64),
    /// Something appeared at the destination before the rename
    DestinationExists,
}

/// Copy `src` to the not-yet-existing path `dst`.
///
/// `src_meta` is the metadata read when the source was classified; its
/// permission bits and timestamps are applied according to `options`.
pub(crate) fn copy_new_file(
    src: &Path,
    src_meta: &Metadata,
    dst: &Path,
    options: &MergeOptions,
) -> Result<CopyOutcome> {
    let mut src_file = File::open(src)?;

    let dst_parent = dst.parent().unwrap_or(Path::new("."));
    let temp_file = create_temp_file(dst_parent, options)?;

    let bytes = io::copy(&mut src_file, &mut temp_file.as_file())?;

    if options.fsync {
        temp_file.as_file().sync_all()?;
    }

    if options.preserve_permissions {
        fs::set_permissions(temp_file.path(), src_meta.permissions())?;
    }

    if let Err(e) = temp_file.persist_noclobber(dst) {
        if e.error.kind() == io::ErrorKind::AlreadyExists {
            return Ok(CopyOutcome::DestinationExists);
        }
        return Err(Error::Persist {
            path: dst.to_path_buf(),
            source: e.error,
        });
    }

    if options.preserve_timestamps {
        // Not critical: the content is already in place.
        if let Err(_e) = preserve_timestamps(src_meta, dst) {
            #[cfg(feature = "tracing")]
            tracing::warn!("Failed to set timestamps on {}: {}", dst.display(), _e);
        }
    }

    Ok(CopyOutcome::Copied(bytes))
}

fn create_temp_file(dir: &Path, options: &MergeOptions) -> Result<tempfile::NamedTempFile> {
    let to_error = |source: io::Error| Error::TempFile {
        path: dir.to_path_buf(),
        source,
    };

    if options.preserve_permissions {
        // Created 0o600; source permissions are applied before the rename.
        return tempfile::NamedTempFile::new_in(dir).map_err(to_error);
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tempfile::Builder::new()
            .permissions(fs::Permissions::from_mode(0o666))
            .tempfile_in(dir)
            .map_err(to_error)
    }
    #[cfg(not(unix))]
    {
        tempfile::NamedTempFile::new_in(dir).map_err(to_error)
    }
}

/// Copy mtime and atime from the source metadata
fn preserve_timestamps(src_meta: &Metadata, dst: &Path) -> io::Result<()> {
    let mtime = FileTime::from_last_modification_time(src_meta);
    let atime = FileTime::from_last_access_time(src_meta);
    set_file_times(dst, atime, mtime)
}
