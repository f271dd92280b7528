//! Creature catalog loader.

use std::path::Path;

use anyhow::Context;

use crate::catalog::{CreatureCatalog, CreatureTemplate};
use crate::loaders::{LoadResult, read_file};

/// Loader for the creature catalog from RON files.
///
/// The file holds a list of [`CreatureTemplate`]s:
///
/// ```text
/// [
///     (name: "jackal", max_health: 8, damage: (min: 2, max: 4), movement_speed: 50),
///     (name: "goblin conjurer", max_health: 10, minions: ["spectral blade"],
///      abilities: (summons: true)),
/// ]
/// ```
pub struct CreatureCatalogLoader;

impl CreatureCatalogLoader {
    /// Load the catalog from a RON file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the RON file containing the template list
    ///
    /// # Returns
    ///
    /// Returns a validated CreatureCatalog.
    pub fn load(path: &Path) -> LoadResult<CreatureCatalog> {
        let content = read_file(path)?;
        Self::parse(&content).with_context(|| format!("in {}", path.display()))
    }

    pub fn parse(content: &str) -> LoadResult<CreatureCatalog> {
        let templates: Vec<CreatureTemplate> =
            ron::from_str(content).context("Failed to parse creature catalog RON")?;
        let catalog = CreatureCatalog::new(templates)?;
        tracing::debug!(templates = catalog.len(), "loaded creature catalog");
        Ok(catalog)
    }
}
