use bitflags::bitflags;

use crate::geometry::{Dimensions, Position};

bitflags! {
    /// Properties of the terrain stack at one cell.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct TerrainFlags: u32 {
        const OBSTRUCTS_PASSABILITY       = 1 << 0;
        const OBSTRUCTS_VISION            = 1 << 1;
        const OBSTRUCTS_DIAGONAL_MOVEMENT = 1 << 2;
        const IS_FIRE                     = 1 << 3;
        const SPONTANEOUSLY_IGNITES       = 1 << 4;
        const LAVA_INSTA_DEATH            = 1 << 5;
        const IS_DEEP_WATER               = 1 << 6;
        const AUTO_DESCENT                = 1 << 7;
        const IS_DF_TRAP                  = 1 << 8;
        const CAUSES_DAMAGE               = 1 << 9;
        const CAUSES_POISON               = 1 << 10;
        const CAUSES_PARALYSIS            = 1 << 11;
        const CAUSES_CONFUSION            = 1 << 12;
        const CAUSES_NAUSEA               = 1 << 13;
        const CAUSES_EXPLOSIVE_DAMAGE     = 1 << 14;
        const ENTANGLES                   = 1 << 15;
        const IS_FLAMMABLE                = 1 << 16;
        const SACRED                      = 1 << 17;
        const ALLOWS_SUBMERGING           = 1 << 18;
        /// Hidden feature that reveals itself as whatever
        /// [`TerrainOracle::discovered_flags_at`] reports.
        const IS_SECRET                   = 1 << 19;
        const IS_DOOR                     = 1 << 20;

        /// Terrain that hurts or disables whoever stands in it.
        const HARMFUL_TERRAIN = Self::CAUSES_POISON.bits()
            | Self::IS_FIRE.bits()
            | Self::CAUSES_DAMAGE.bits()
            | Self::CAUSES_PARALYSIS.bits()
            | Self::CAUSES_CONFUSION.bits()
            | Self::CAUSES_EXPLOSIVE_DAMAGE.bits();

        /// Terrain ordinary travellers never path through.
        const PATHING_BLOCKER = Self::OBSTRUCTS_PASSABILITY.bits()
            | Self::AUTO_DESCENT.bits()
            | Self::IS_DF_TRAP.bits()
            | Self::LAVA_INSTA_DEATH.bits()
            | Self::IS_DEEP_WATER.bits()
            | Self::SPONTANEOUSLY_IGNITES.bits();
    }
}

/// Read-only terrain of the current level.
///
/// Cells outside [`TerrainOracle::dimensions`] are never queried through
/// `flags_at`; the helpers below treat them as carrying no flags.
pub trait TerrainOracle {
    fn dimensions(&self) -> Dimensions;

    fn flags_at(&self, position: Position) -> TerrainFlags;

    /// Flags the cell would have once its secret is discovered.
    fn discovered_flags_at(&self, _position: Position) -> TerrainFlags {
        TerrainFlags::empty()
    }

    /// Flags the cell would have after its flammable layers burn.
    fn burned_flags_at(&self, _position: Position) -> TerrainFlags {
        TerrainFlags::empty()
    }

    fn is_stairs(&self, _position: Position) -> bool {
        false
    }

    /// True when the cell lies on a loop of the level graph (has two ways out).
    fn is_in_loop(&self, _position: Position) -> bool {
        false
    }

    fn contains(&self, position: Position) -> bool {
        self.dimensions().contains(position)
    }

    /// True when the cell is in bounds and carries any flag of `mask`.
    fn has_flag(&self, position: Position, mask: TerrainFlags) -> bool {
        self.contains(position) && self.flags_at(position).intersects(mask)
    }

    /// Open ground, or a secret door that creatures may walk through.
    fn is_passable_or_secret_door(&self, position: Position) -> bool {
        if !self.contains(position) {
            return false;
        }
        let flags = self.flags_at(position);
        !flags.contains(TerrainFlags::OBSTRUCTS_PASSABILITY) || self.is_usable_secret(position)
    }

    /// A secret that obstructs now but opens up once discovered.
    fn is_usable_secret(&self, position: Position) -> bool {
        let flags = self.flags_at(position);
        flags.contains(TerrainFlags::IS_SECRET | TerrainFlags::OBSTRUCTS_PASSABILITY)
            && !self
                .discovered_flags_at(position)
                .contains(TerrainFlags::OBSTRUCTS_PASSABILITY)
    }

    /// Whether a diagonal step between two cells is cut by a wall corner.
    fn diagonal_blocked(&self, from: Position, to: Position) -> bool {
        if from.x == to.x || from.y == to.y {
            return false;
        }
        self.has_flag(
            Position::new(from.x, to.y),
            TerrainFlags::OBSTRUCTS_DIAGONAL_MOVEMENT,
        ) || self.has_flag(
            Position::new(to.x, from.y),
            TerrainFlags::OBSTRUCTS_DIAGONAL_MOVEMENT,
        )
    }

    /// Number of separate passable arcs around a cell. Two or more means the
    /// cell connects distinct regions, as in a corridor.
    fn passable_arc_count(&self, position: Position) -> i32 {
        const RING: [(i32, i32); 8] = [
            (0, 1),
            (1, 1),
            (1, 0),
            (1, -1),
            (0, -1),
            (-1, -1),
            (-1, 0),
            (-1, 1),
        ];
        let passable = |(dx, dy): (i32, i32)| {
            let cell = position.offset(dx, dy);
            self.contains(cell)
                && (!self.has_flag(cell, TerrainFlags::PATHING_BLOCKER)
                    || self.has_flag(cell, TerrainFlags::IS_DOOR)
                    || self.is_usable_secret(cell))
        };
        let transitions = (0..RING.len())
            .filter(|&i| passable(RING[(i + 7) % 8]) != passable(RING[i]))
            .count() as i32;
        transitions / 2
    }
}
