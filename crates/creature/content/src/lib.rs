//! Data-driven content and reference collaborators for the creature AI.
//!
//! This crate houses everything the AI core deliberately leaves outside:
//! - Creature templates and the catalog that instantiates them
//! - ASCII level layouts with spawn markers and waypoints
//! - Terrain, line-of-sight, scent and combat oracles
//! - Loaders for TOML tuning and RON catalogs and levels
//!
//! [`Scenario`] ties them together into a seeded [`Session`].

pub mod catalog;
pub mod error;
pub mod layout;
pub mod level;
pub mod oracle;
pub mod scenario;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use catalog::{CreatureCatalog, CreatureTemplate, DamageRange};
pub use error::ContentError;
pub use layout::Layout;
pub use level::{Level, SpawnSpec};
pub use oracle::{AsciiTerrain, CatalogCombat, RayVisibility, ScentField, Stage, TerrainTile};
pub use scenario::{Scenario, Session};

#[cfg(feature = "loaders")]
pub use loaders::{CreatureCatalogLoader, MapLoader, TuningLoader};
