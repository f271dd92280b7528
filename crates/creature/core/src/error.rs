//! Common error infrastructure for creature-core.
//!
//! Pathfinding failures are not errors: "no improving step" and "no path" are
//! ordinary outcomes expressed with `Option`. Errors are reserved for misuse of
//! the creature arena (bad placement, stale handles) and for broken internal
//! invariants that a debug build would already have asserted on.

use crate::creature::CreatureId;
use crate::geometry::Position;

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the caller may retry with another cell or creature
/// - **Validation**: invalid input that should be rejected without retry
/// - **Internal**: bookkeeping inconsistency that indicates a bug
/// - **Fatal**: the simulation cannot take another turn
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    Recoverable,
    Validation,
    Internal,
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all creature-core errors.
///
/// Error enums derive `thiserror::Error` for Display and implement this trait
/// so harnesses can log and classify failures uniformly.
pub trait CoreError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Errors raised by the creature arena and occupancy grid.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    #[error("position {0} is outside the dungeon bounds")]
    OutOfBounds(Position),

    #[error("cell {position} is already occupied by {occupant}")]
    CellOccupied {
        position: Position,
        occupant: CreatureId,
    },

    #[error("creature {0} does not exist")]
    UnknownCreature(CreatureId),

    #[error("a player creature is already registered as {0}")]
    DuplicatePlayer(CreatureId),

    #[error("no player creature is registered")]
    NoPlayer,

    /// The occupancy grid disagrees with a creature's recorded position.
    #[error("occupancy grid desync: {creature} recorded at {position}")]
    OccupancyDesync {
        creature: CreatureId,
        position: Position,
    },
}

impl CoreError for WorldError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::CellOccupied { .. } => ErrorSeverity::Recoverable,
            Self::OutOfBounds(_) | Self::UnknownCreature(_) | Self::DuplicatePlayer(_) => {
                ErrorSeverity::Validation
            }
            Self::OccupancyDesync { .. } => ErrorSeverity::Internal,
            Self::NoPlayer => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::OutOfBounds(_) => "WORLD_OUT_OF_BOUNDS",
            Self::CellOccupied { .. } => "WORLD_CELL_OCCUPIED",
            Self::UnknownCreature(_) => "WORLD_UNKNOWN_CREATURE",
            Self::DuplicatePlayer(_) => "WORLD_DUPLICATE_PLAYER",
            Self::OccupancyDesync { .. } => "WORLD_OCCUPANCY_DESYNC",
            Self::NoPlayer => "WORLD_NO_PLAYER",
        }
    }
}
