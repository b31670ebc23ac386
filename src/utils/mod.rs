//! Internal helpers shared by the merge modules.

pub(crate) mod path;
