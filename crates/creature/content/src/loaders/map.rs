//! Level loader.
//!
//! A level file is RON holding the ASCII rows and the spawn table:
//!
//! ```text
//! (
//!     rows: [
//!         "#########",
//!         "#@..W.gc#",
//!         "#########",
//!     ],
//!     spawns: [
//!         (glyph: 'c', creature: "goblin conjurer"),
//!         (glyph: 'g', creature: "goblin", follows: Some('c')),
//!     ],
//! )
//! ```

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::layout::Layout;
use crate::level::{Level, SpawnSpec};
use crate::loaders::{LoadResult, read_file};

/// Level data structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LevelRon {
    rows: Vec<String>,
    #[serde(default)]
    spawns: Vec<SpawnSpec>,
}

/// Loader for levels from RON files.
pub struct MapLoader;

impl MapLoader {
    /// Load a level from a RON file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the RON file containing rows and spawns
    ///
    /// # Returns
    ///
    /// Returns a Level whose markers all have spawn entries.
    pub fn load(path: &Path) -> LoadResult<Level> {
        let content = read_file(path)?;
        Self::parse(&content).with_context(|| format!("in {}", path.display()))
    }

    pub fn parse(content: &str) -> LoadResult<Level> {
        let data: LevelRon = ron::from_str(content).context("Failed to parse level RON")?;
        let layout = Layout::parse(&data.rows)?;
        let level = Level::new(layout, data.spawns)?;
        tracing::debug!(
            width = level.layout.dimensions().width,
            height = level.layout.dimensions().height,
            markers = level.layout.markers.len(),
            "loaded level"
        );
        Ok(level)
    }
}
