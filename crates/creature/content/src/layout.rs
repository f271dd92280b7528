//! ASCII level layouts.
//!
//! Rows of text describe the terrain together with where things start:
//! `@` is the player, `W` a waypoint, and any other letter a spawn marker
//! resolved against the level's spawn table. Markers stand on plain floor.
//! Terrain glyphs are listed on [`TerrainTile::from_glyph`].

use creature_core::{AiTuning, Dimensions, Position, TerrainOracle};

use crate::error::ContentError;
use crate::oracle::{AsciiTerrain, TerrainTile};

/// A parsed layout: the terrain plus the markers drawn on it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    pub terrain: AsciiTerrain,
    pub player: Position,
    /// Waypoints in reading order.
    pub waypoints: Vec<Position>,
    /// Spawn markers in reading order.
    pub markers: Vec<(char, Position)>,
}

impl Layout {
    pub const PLAYER: char = '@';
    pub const WAYPOINT: char = 'W';
    /// Spacing of the lattice used when a layout marks no waypoints.
    pub const AUTO_WAYPOINT_SPACING: i32 = 8;

    pub fn parse<S: AsRef<str>>(rows: &[S]) -> Result<Self, ContentError> {
        let width = rows.first().ok_or(ContentError::EmptyLevel)?.as_ref().chars().count();
        if width == 0 {
            return Err(ContentError::EmptyLevel);
        }
        let dimensions = Dimensions::new(width as u32, rows.len() as u32);

        let mut tiles = Vec::with_capacity(dimensions.cell_count());
        let mut player = None;
        let mut waypoints = Vec::new();
        let mut markers = Vec::new();
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let found = row.chars().count();
            if found != width {
                return Err(ContentError::RaggedRow {
                    row: y,
                    expected: width,
                    found,
                });
            }
            for (x, glyph) in row.chars().enumerate() {
                let position = Position::new(x as i32, y as i32);
                let tile = match glyph {
                    Self::PLAYER => {
                        if player.replace(position).is_some() {
                            return Err(ContentError::DuplicatePlayer(position));
                        }
                        TerrainTile::FLOOR
                    }
                    Self::WAYPOINT => {
                        waypoints.push(position);
                        TerrainTile::FLOOR
                    }
                    marker if marker.is_ascii_alphabetic() => {
                        markers.push((marker, position));
                        TerrainTile::FLOOR
                    }
                    other => TerrainTile::from_glyph(other).ok_or(ContentError::UnknownGlyph {
                        glyph: other,
                        position,
                    })?,
                };
                tiles.push(tile);
            }
        }

        let terrain = AsciiTerrain::new(dimensions, tiles);
        if waypoints.is_empty() {
            waypoints = lattice_waypoints(&terrain);
        }
        waypoints.truncate(AiTuning::MAX_WAYPOINTS);
        Ok(Self {
            terrain,
            player: player.ok_or(ContentError::MissingPlayer)?,
            waypoints,
            markers,
        })
    }

    pub fn dimensions(&self) -> Dimensions {
        self.terrain.dimensions()
    }
}

/// Open cells on a regular lattice, used as waypoints for layouts that mark none.
fn lattice_waypoints(terrain: &AsciiTerrain) -> Vec<Position> {
    let spacing = Layout::AUTO_WAYPOINT_SPACING;
    let half = spacing / 2;
    terrain
        .open_cells()
        .filter(|cell| cell.x % spacing == half && cell.y % spacing == half)
        .take(AiTuning::MAX_WAYPOINTS)
        .collect()
}
