//! Static level terrain served through [`creature_core::TerrainOracle`].
use creature_core::{Dimensions, Direction, Position, TerrainFlags, TerrainOracle};

const WALL: TerrainFlags = TerrainFlags::OBSTRUCTS_PASSABILITY
    .union(TerrainFlags::OBSTRUCTS_VISION)
    .union(TerrainFlags::OBSTRUCTS_DIAGONAL_MOVEMENT);

/// One cell of the legend: what the glyph is now, what it becomes once its
/// secret is found, and what is left after it burns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TerrainTile {
    pub flags: TerrainFlags,
    pub discovered: TerrainFlags,
    pub burned: TerrainFlags,
    pub stairs: bool,
}

impl TerrainTile {
    pub const FLOOR: Self = Self::plain(TerrainFlags::empty());

    const fn plain(flags: TerrainFlags) -> Self {
        Self {
            flags,
            discovered: TerrainFlags::empty(),
            burned: TerrainFlags::empty(),
            stairs: false,
        }
    }

    /// Terrain drawn by a glyph, or `None` for glyphs that are not terrain.
    ///
    /// ```text
    /// .  floor            #  wall            +  door
    /// %  secret door      ~  deep water      =  lava
    /// ^  fire             *  brimstone       "  grass
    /// :  spider web       &  trap            !  caustic vent
    /// _  altar            0  hole            >  stairs
    /// ```
    pub const fn from_glyph(glyph: char) -> Option<Self> {
        let tile = match glyph {
            '.' => Self::FLOOR,
            '#' => Self::plain(WALL),
            '+' => Self::plain(
                TerrainFlags::IS_DOOR
                    .union(TerrainFlags::OBSTRUCTS_VISION)
                    .union(TerrainFlags::IS_FLAMMABLE),
            ),
            '%' => Self {
                discovered: TerrainFlags::IS_DOOR.union(TerrainFlags::OBSTRUCTS_VISION),
                ..Self::plain(WALL.union(TerrainFlags::IS_SECRET))
            },
            '~' => Self::plain(TerrainFlags::IS_DEEP_WATER.union(TerrainFlags::ALLOWS_SUBMERGING)),
            '=' => Self::plain(TerrainFlags::LAVA_INSTA_DEATH),
            '^' => Self::plain(TerrainFlags::IS_FIRE),
            '*' => Self::plain(TerrainFlags::SPONTANEOUSLY_IGNITES),
            '"' => Self::plain(TerrainFlags::IS_FLAMMABLE),
            ':' => Self::plain(TerrainFlags::ENTANGLES.union(TerrainFlags::IS_FLAMMABLE)),
            '&' => Self::plain(TerrainFlags::IS_DF_TRAP),
            '!' => Self::plain(TerrainFlags::CAUSES_POISON),
            '_' => Self::plain(TerrainFlags::SACRED),
            '0' => Self::plain(TerrainFlags::AUTO_DESCENT),
            '>' => Self {
                stairs: true,
                ..Self::FLOOR
            },
            _ => return None,
        };
        Some(tile)
    }
}

/// Immutable terrain of one level, stored row-major.
///
/// Loop membership is computed once when the terrain is built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AsciiTerrain {
    dimensions: Dimensions,
    tiles: Vec<TerrainTile>,
    in_loop: Vec<bool>,
}

impl AsciiTerrain {
    /// Builds terrain from row-major tiles. `tiles.len()` must equal the cell count.
    pub fn new(dimensions: Dimensions, tiles: Vec<TerrainTile>) -> Self {
        debug_assert_eq!(tiles.len(), dimensions.cell_count());
        let in_loop = loop_cells(dimensions, &tiles);
        Self {
            dimensions,
            tiles,
            in_loop,
        }
    }

    /// An open room ringed by walls.
    pub fn room(width: u32, height: u32) -> Self {
        let dimensions = Dimensions::new(width, height);
        let tiles = (0..dimensions.cell_count())
            .map(|index| {
                let at = Position::new((index % width as usize) as i32, (index / width as usize) as i32);
                if dimensions.is_border(at) {
                    TerrainTile::plain(WALL)
                } else {
                    TerrainTile::FLOOR
                }
            })
            .collect();
        Self::new(dimensions, tiles)
    }

    pub fn tile(&self, position: Position) -> Option<TerrainTile> {
        self.index(position).map(|index| self.tiles[index])
    }

    /// Cells that are open ground an ordinary creature may stand on.
    pub fn open_cells(&self) -> impl Iterator<Item = Position> + '_ {
        self.dimensions
            .positions()
            .filter(|&cell| !self.has_flag(cell, TerrainFlags::PATHING_BLOCKER | TerrainFlags::HARMFUL_TERRAIN))
    }

    fn index(&self, position: Position) -> Option<usize> {
        self.dimensions
            .contains(position)
            .then(|| position.y as usize * self.dimensions.width as usize + position.x as usize)
    }
}

impl TerrainOracle for AsciiTerrain {
    fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    fn flags_at(&self, position: Position) -> TerrainFlags {
        self.tile(position).map_or(TerrainFlags::empty(), |tile| tile.flags)
    }

    fn discovered_flags_at(&self, position: Position) -> TerrainFlags {
        self.tile(position).map_or(TerrainFlags::empty(), |tile| tile.discovered)
    }

    fn burned_flags_at(&self, position: Position) -> TerrainFlags {
        self.tile(position).map_or(TerrainFlags::empty(), |tile| tile.burned)
    }

    fn is_stairs(&self, position: Position) -> bool {
        self.tile(position).is_some_and(|tile| tile.stairs)
    }

    fn is_in_loop(&self, position: Position) -> bool {
        self.index(position).is_some_and(|index| self.in_loop[index])
    }
}

/// Marks walkable cells that keep two or more ways out once dead ends are
/// peeled away, leaving only the cycles of the cardinal walking graph and the
/// corridors joining them.
fn loop_cells(dimensions: Dimensions, tiles: &[TerrainTile]) -> Vec<bool> {
    let width = dimensions.width as usize;
    let index = |at: Position| at.y as usize * width + at.x as usize;
    let mut alive: Vec<bool> = tiles
        .iter()
        .map(|tile| !tile.flags.contains(TerrainFlags::OBSTRUCTS_PASSABILITY))
        .collect();

    let exits = |alive: &[bool], at: Position| {
        Direction::CARDINAL
            .iter()
            .map(|&dir| at.step(dir))
            .filter(|&next| dimensions.contains(next) && alive[index(next)])
            .count()
    };

    let mut pending: Vec<Position> = dimensions
        .positions()
        .filter(|&at| alive[index(at)] && exits(&alive, at) < 2)
        .collect();
    while let Some(at) = pending.pop() {
        if !alive[index(at)] {
            continue;
        }
        alive[index(at)] = false;
        for dir in Direction::CARDINAL {
            let next = at.step(dir);
            if dimensions.contains(next) && alive[index(next)] && exits(&alive, next) < 2 {
                pending.push(next);
            }
        }
    }
    alive
}
