//! Core merge operations.
//!
//! This module provides the merge run itself and the atomic single-file
//! copy it uses for every regular file.

mod file;
mod tree;

// Re-export public API
pub use tree::{MergeContext, MergeStats, merge};
