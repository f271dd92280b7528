//! Content loaders for reading creature data from files.
//!
//! Tuning comes from TOML, the creature catalog and levels from RON.

pub mod catalog;
pub mod map;
pub mod tuning;

pub use catalog::CreatureCatalogLoader;
pub use map::MapLoader;
pub use tuning::TuningLoader;

use std::path::Path;

use anyhow::Context;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read file {}", path.display()))
}
