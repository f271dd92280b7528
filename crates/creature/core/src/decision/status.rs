//! Outcome of a behaviour and the selector that chains them.

use crate::creature::CreatureId;
use crate::decision::Turn;

/// The result of trying one behaviour.
///
/// Every behaviour completes within the turn it is tried:
/// - `Success` means the creature acted and its turn is over
/// - `Failure` means nothing applied and the next behaviour gets a chance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Status {
    Success,
    Failure,
}

impl Status {
    #[inline]
    pub fn is_success(self) -> bool {
        matches!(self, Status::Success)
    }
}

impl From<bool> for Status {
    fn from(acted: bool) -> Self {
        if acted { Status::Success } else { Status::Failure }
    }
}

/// One link of a behaviour chain.
pub(crate) type Step = fn(&mut Turn<'_, '_>, CreatureId) -> Status;

/// Tries each step in order until one succeeds (short-circuit OR).
pub(crate) fn select(turn: &mut Turn<'_, '_>, id: CreatureId, steps: &[Step]) -> Status {
    for step in steps {
        if step(turn, id).is_success() {
            return Status::Success;
        }
    }
    Status::Failure
}
