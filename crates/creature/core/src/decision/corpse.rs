use tracing::{debug, trace};

use crate::creature::{CorpseGift, Creature, CreatureId, StatusKind};
use crate::decision::{Status, Turn, TurnAction};

/// Status duration that never runs out.
pub(crate) const PERMANENT: i32 = 1000;

/// Ticks spent on each absorbing turn.
const ABSORB_TICKS: i32 = 100;

/// Advances an ally's corpse claim. Returns `Success` while the ally is busy
/// absorbing, which uses up the whole turn.
pub(crate) fn update_absorption(turn: &mut Turn<'_, '_>, id: CreatureId) -> Status {
    let abandon_threshold = turn.ctx.tuning.corpse_abandon_threshold;
    let Some(monst) = turn.world.get_mut(id) else {
        return Status::Failure;
    };
    let Some(mut claim) = monst.corpse else {
        return Status::Failure;
    };

    if monst.position == claim.position && monst.bookkeeping.absorbing {
        claim.counter -= 1;
        if claim.counter <= 0 {
            monst.corpse = None;
            monst.bookkeeping.absorbing = false;
            grant(monst, claim.gift);
            debug!(creature = %id, gift = ?claim.gift, "finished absorbing");
        } else {
            monst.corpse = Some(claim);
        }
        monst.ticks_until_turn = ABSORB_TICKS;
        turn.record(TurnAction::Absorbing);
        return Status::Success;
    }

    claim.counter -= 1;
    if claim.counter <= 0 {
        monst.corpse = None;
        monst.bookkeeping.absorbing = false;
        trace!(creature = %id, "corpse claim expired");
    } else {
        monst.corpse = Some(claim);
        if monst.bookkeeping.absorbing {
            monst.bookkeeping.absorbing = false;
            if claim.counter <= abandon_threshold {
                monst.corpse = None;
                trace!(creature = %id, "abandoned interrupted absorption");
            }
        }
    }
    Status::Failure
}

/// Applies what a finished corpse teaches.
pub(crate) fn grant(monst: &mut Creature, gift: CorpseGift) {
    match gift {
        CorpseGift::Bolt(bolt) => {
            monst.abilities.learn(bolt);
        }
        CorpseGift::Flight => {
            monst.movement.flies = true;
            monst.movement.restricted_to_liquid = false;
            monst.movement.submerges = false;
            monst.bookkeeping.submerged = false;
            monst.status.set(StatusKind::Levitating, PERMANENT);
        }
        CorpseGift::FireImmunity => monst.status.set(StatusKind::ImmuneToFire, PERMANENT),
        CorpseGift::Invisibility => monst.status.set(StatusKind::Invisible, PERMANENT),
        CorpseGift::Fiery => {
            monst.movement.fiery = true;
            monst.status.set(StatusKind::Burning, PERMANENT);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creature::{AbilityId, Bolt, BoltEffect};
    use crate::geometry::Position;

    #[test]
    fn flight_frees_swimmers_from_water() {
        let mut eel = Creature::new("eel", Position::new(3, 3));
        eel.movement.restricted_to_liquid = true;
        eel.movement.submerges = true;
        eel.bookkeeping.submerged = true;
        grant(&mut eel, CorpseGift::Flight);
        assert!(eel.movement.flies);
        assert!(!eel.movement.restricted_to_liquid);
        assert!(!eel.bookkeeping.submerged);
    }

    #[test]
    fn learned_bolt_is_not_duplicated() {
        let bolt = Bolt {
            id: AbilityId(4),
            effect: BoltEffect::Fire,
        };
        let mut monst = Creature::new("ogre", Position::new(1, 1));
        grant(&mut monst, CorpseGift::Bolt(bolt));
        grant(&mut monst, CorpseGift::Bolt(bolt));
        assert_eq!(monst.abilities.bolts.len(), 1);
    }
}
