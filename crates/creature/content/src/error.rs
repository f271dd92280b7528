//! Errors raised while turning content data into a playable level.

use creature_core::{CoreError, ErrorSeverity, Position, WorldError};

/// Problems with a level layout or the creatures it places.
///
/// File and parse failures are reported by the loaders through `anyhow`;
/// these variants describe data that parsed but does not make sense.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ContentError {
    #[error("level has no rows")]
    EmptyLevel,

    #[error("row {row} is {found} cells wide, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unknown glyph {glyph:?} at {position}")]
    UnknownGlyph { glyph: char, position: Position },

    #[error("level places no player")]
    MissingPlayer,

    #[error("second player at {0}")]
    DuplicatePlayer(Position),

    #[error("spawn glyph {0:?} is declared twice")]
    DuplicateSpawnGlyph(char),

    #[error("spawn glyph {glyph:?} follows {leader:?}, which places no creature")]
    UnknownLeader { glyph: char, leader: char },

    #[error("no creature named {0:?} in the catalog")]
    UnknownCreature(String),

    #[error("catalog entry {name:?} is invalid: {reason}")]
    InvalidTemplate { name: String, reason: &'static str },

    #[error("spawn glyph {0:?} is drawn on the level but has no spawn entry")]
    UnassignedMarker(char),

    #[error("could not place a creature: {0}")]
    Placement(#[from] WorldError),
}

impl CoreError for ContentError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Placement(inner) => inner.severity(),
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyLevel => "CONTENT_EMPTY_LEVEL",
            Self::RaggedRow { .. } => "CONTENT_RAGGED_ROW",
            Self::UnknownGlyph { .. } => "CONTENT_UNKNOWN_GLYPH",
            Self::MissingPlayer => "CONTENT_MISSING_PLAYER",
            Self::DuplicatePlayer(_) => "CONTENT_DUPLICATE_PLAYER",
            Self::DuplicateSpawnGlyph(_) => "CONTENT_DUPLICATE_SPAWN_GLYPH",
            Self::UnknownLeader { .. } => "CONTENT_UNKNOWN_LEADER",
            Self::UnknownCreature(_) => "CONTENT_UNKNOWN_CREATURE",
            Self::InvalidTemplate { .. } => "CONTENT_INVALID_TEMPLATE",
            Self::UnassignedMarker(_) => "CONTENT_UNASSIGNED_MARKER",
            Self::Placement(inner) => inner.error_code(),
        }
    }
}
