use crate::geometry::Position;

/// The player's scent trail.
///
/// Each turn the player refreshes the field with a rising epoch minus the
/// scent distance to every visible cell, so larger values are fresher and
/// `epoch - value` approximates twice the distance to the player.
pub trait ScentOracle {
    fn scent_at(&self, cell: Position) -> i32;

    /// Epoch of the most recent refresh.
    fn scent_turn(&self) -> i32;
}
