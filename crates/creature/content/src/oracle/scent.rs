//! The player's scent trail.
use creature_core::geometry::scent_distance;
use creature_core::{
    Dimensions, Position, ScentOracle, TerrainFlags, TerrainOracle, VisibilityOracle,
};

/// Scent laid by the player over every cell it can see.
///
/// Each call to [`ScentField::lay`] advances the epoch by three and stamps
/// `epoch - scent_distance` into visible cells, keeping whichever reading is
/// fresher. Older trails are never erased; they simply fall behind.
#[derive(Clone, Debug)]
pub struct ScentField {
    dimensions: Dimensions,
    values: Vec<i32>,
    epoch: i32,
}

impl ScentField {
    /// Epoch advance per turn.
    pub const TURN_STEP: i32 = 3;
    /// Starting epoch, high enough that `epoch - scent_distance` stays
    /// positive across any level.
    pub const INITIAL_EPOCH: i32 = 1_000;

    pub fn new(dimensions: Dimensions) -> Self {
        Self {
            dimensions,
            values: vec![0; dimensions.cell_count()],
            epoch: Self::INITIAL_EPOCH,
        }
    }

    /// Refreshes the trail around the player for a new turn.
    pub fn lay(
        &mut self,
        terrain: &dyn TerrainOracle,
        visibility: &dyn VisibilityOracle,
        player: Position,
    ) {
        self.epoch += Self::TURN_STEP;
        let mut stamped = 0usize;
        for cell in self.dimensions.positions() {
            if !visibility.in_field_of_view(cell)
                || terrain.flags_at(cell).contains(TerrainFlags::OBSTRUCTS_PASSABILITY)
            {
                continue;
            }
            let value = self.epoch - scent_distance(cell, player);
            let slot = &mut self.values[cell.y as usize * self.dimensions.width as usize + cell.x as usize];
            if value > *slot {
                *slot = value;
                stamped += 1;
            }
        }
        tracing::trace!(epoch = self.epoch, %player, stamped, "laid scent");
    }
}

impl ScentOracle for ScentField {
    fn scent_at(&self, cell: Position) -> i32 {
        if !self.dimensions.contains(cell) {
            return 0;
        }
        self.values[cell.y as usize * self.dimensions.width as usize + cell.x as usize]
    }

    fn scent_turn(&self) -> i32 {
        self.epoch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::{AsciiTerrain, RayVisibility};

    #[test]
    fn fresher_trail_wins_and_walls_stay_scentless() {
        let terrain = AsciiTerrain::room(10, 5);
        let mut sight = RayVisibility::new(&terrain);
        let mut scent = ScentField::new(terrain.dimensions());

        sight.refresh(Position::new(2, 2));
        scent.lay(&terrain, &sight, Position::new(2, 2));
        assert_eq!(scent.scent_at(Position::new(2, 2)), 1_003);
        assert_eq!(scent.scent_at(Position::new(0, 0)), 0);

        sight.refresh(Position::new(7, 2));
        scent.lay(&terrain, &sight, Position::new(7, 2));
        assert_eq!(scent.scent_turn(), 1_006);
        assert_eq!(scent.scent_at(Position::new(7, 2)), 1_006);
        // Old spot is now five cells away: 1006 - 10 < 1003, so the older reading stays.
        assert_eq!(scent.scent_at(Position::new(2, 2)), 1_003);
        assert!(scent.scent_at(Position::new(6, 2)) > scent.scent_at(Position::new(5, 2)));
    }
}
