//! Path utilities for mount points and relative paths.
//!
//! Mount subpaths come straight from the command line, so they are
//! normalized before being joined onto the destination: a subpath is always
//! interpreted relative to the destination root, even when written as an
//! absolute path such as `/usr`.

use std::path::{Component, Path, PathBuf};

/// Normalize a mount subpath so it can be joined onto a destination root.
///
/// - Root and prefix components are dropped (`/usr` becomes `usr`)
/// - `.` components are dropped (`./lib/.` becomes `lib`)
/// - `..` components are rejected, returning `None`
///
/// An empty result means "mount at the destination root".
pub(crate) fn normalize_subpath(subpath: &Path) -> Option<PathBuf> {
    let mut normalized = PathBuf::new();
    for component in subpath.components() {
        match component {
            Component::Normal(part) => normalized.push(part),
            Component::RootDir | Component::Prefix(_) | Component::CurDir => {}
            Component::ParentDir => return None,
        }
    }
    Some(normalized)
}

/// Display form of a path relative to a source root.
///
/// The source root itself has an empty relative path, shown as `.`.
#[inline]
pub(crate) fn relative_display(relative: &Path) -> &Path {
    if relative.as_os_str().is_empty() {
        Path::new(".")
    } else {
        relative
    }
}
