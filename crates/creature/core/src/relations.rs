//! Derived relations between creatures.
//!
//! Nothing here is stored: team membership, hostility and willingness to
//! fight are recomputed from the two creatures' states, leader links and
//! statuses on every query.

use crate::creature::{Creature, CreatureState, Relationship, StatusKind};
use crate::env::TerrainFlags;
use crate::geometry::distance_between;
use crate::view::WorldView;

pub fn are_teammates(a: &Creature, b: &Creature) -> bool {
    (a.bookkeeping.follower && a.leader == Some(b.id))
        || (b.bookkeeping.follower && b.leader == Some(a.id))
        || (a.is_ally() && b.is_player)
        || (a.is_player && b.is_ally())
        || (a.is_ally() && b.is_ally())
        || (a.bookkeeping.follower && b.bookkeeping.follower && a.leader == b.leader)
}

/// Creatures that may be moved aside: a follower makes way for its leader,
/// a weaker teammate for a stronger one.
pub fn swappable(mover: &Creature, blocker: &Creature) -> bool {
    if blocker.is_player {
        return false;
    }
    if [
        StatusKind::Confused,
        StatusKind::Stuck,
        StatusKind::Paralyzed,
        StatusKind::Entranced,
    ]
    .into_iter()
    .any(|kind| blocker.has_status(kind))
        || mover.has_status(StatusKind::Entranced)
    {
        return false;
    }
    if blocker.bookkeeping.captive || blocker.bookkeeping.absorbing || blocker.movement.immobile {
        return false;
    }
    if blocker.leader == Some(mover.id) {
        return true;
    }
    if mover.leader == Some(blocker.id) {
        return false;
    }
    are_teammates(mover, blocker) && blocker.health.current < mover.health.current
}

/// Whether the creature can take part in swarming at all.
pub fn eligible_for_swarming(monst: &Creature) -> bool {
    if monst.movement.immobile
        || monst.movement.gets_turn_on_activation
        || monst.behavior.maintains_distance
        || [
            StatusKind::Entranced,
            StatusKind::Confused,
            StatusKind::Stuck,
            StatusKind::Paralyzed,
            StatusKind::MagicalFear,
        ]
        .into_iter()
        .any(|kind| monst.has_status(kind))
        || monst.status.get(StatusKind::LifespanRemaining) == 1
        || monst.bookkeeping.seized
        || monst.bookkeeping.seizing
    {
        return false;
    }
    monst.is_player
        || matches!(monst.state, CreatureState::Ally | CreatureState::TrackingScent)
}

impl WorldView<'_> {
    pub fn are_teammates(&self, a: &Creature, b: &Creature) -> bool {
        are_teammates(a, b)
    }

    pub fn are_enemies(&self, a: &Creature, b: &Creature) -> bool {
        if a.bookkeeping.captive || b.bookkeeping.captive || a.id == b.id {
            return false;
        }
        if a.has_status(StatusKind::Discordant) || b.has_status(StatusKind::Discordant) {
            return true;
        }
        if self.hunts_in_water(a, b) || self.hunts_in_water(b, a) {
            return true;
        }
        a.sides_with_player() != b.sides_with_player()
    }

    /// Liquid-bound hunters go after anything vulnerable in their water.
    fn hunts_in_water(&self, hunter: &Creature, prey: &Creature) -> bool {
        hunter.movement.restricted_to_liquid
            && !prey.movement.immune_to_water
            && !prey.is_levitating()
            && self
                .terrain()
                .has_flag(prey.position, TerrainFlags::IS_DEEP_WATER)
    }

    pub fn will_attack(&self, attacker: &Creature, defender: &Creature) -> bool {
        if attacker.id == defender.id || defender.is_dying() {
            return false;
        }
        if attacker.is_player && defender.is_ally() {
            return defender.has_status(StatusKind::Discordant);
        }
        if attacker.has_status(StatusKind::Entranced) && !defender.is_ally() {
            return true;
        }
        if attacker.is_ally() && !attacker.is_player && defender.has_status(StatusKind::Entranced) {
            return false;
        }
        if defender.bookkeeping.captive {
            return false;
        }
        if attacker.has_status(StatusKind::Discordant)
            || defender.has_status(StatusKind::Discordant)
            || attacker.has_status(StatusKind::Confused)
        {
            return true;
        }
        self.are_enemies(attacker, defender) && !are_teammates(attacker, defender)
    }

    pub fn attack_would_be_futile(&self, attacker: &Creature, defender: &Creature) -> bool {
        if self
            .terrain()
            .has_flag(defender.position, TerrainFlags::OBSTRUCTS_PASSABILITY)
            && !defender.combat.attackable_thru_walls
        {
            return true;
        }
        if attacker.is_player {
            return false;
        }
        if attacker.movement.restricted_to_liquid
            && !attacker.is_levitating()
            && defender.is_levitating()
        {
            return true;
        }
        defender.combat.invulnerable
            || (defender.combat.immune_to_weapons && !attacker.combat.poisons)
    }

    pub fn can_pass(&self, mover: &Creature, blocker: &Creature) -> bool {
        !self.are_enemies(mover, blocker) && swappable(mover, blocker)
    }

    /// Whether `monst` keeps its distance from `defender` rather than charging.
    pub fn flees_from(&self, monst: &Creature, defender: &Creature) -> bool {
        if !self.will_attack(defender, monst) {
            return false;
        }
        if distance_between(monst.position, defender.position) >= self.tuning().fear_check_distance {
            return false;
        }
        if (defender.combat.immune_to_weapons || defender.combat.invulnerable)
            && !defender.movement.immobile
        {
            return true;
        }
        if monst.is_ally()
            && !monst.has_status(StatusKind::Discordant)
            && defender.bookkeeping.marked_for_sacrifice
        {
            return true;
        }
        if monst.behavior.maintains_distance || defender.combat.kamikaze {
            return true;
        }
        monst.combat.poisons
            && defender.status.get(StatusKind::Poisoned) * defender.poison_amount
                > defender.health.current
    }

    /// Coarse relation for UI and combat collaborators.
    pub fn relationship_of(&self, a: &Creature, b: &Creature) -> Relationship {
        if a.id == b.id {
            Relationship::Ally
        } else if self.will_attack(a, b) || self.are_enemies(a, b) {
            Relationship::Enemy
        } else if are_teammates(a, b) {
            Relationship::Ally
        } else {
            Relationship::Neutral
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creature::CreatureId;
    use crate::geometry::Position;

    fn creature(id: u32, x: i32) -> Creature {
        let mut c = Creature::new("goblin", Position::new(x, 1));
        c.id = CreatureId(id);
        c
    }

    #[test]
    fn followers_of_one_leader_are_teammates() {
        let leader = creature(0, 1);
        let a = creature(1, 2).with_leader(leader.id);
        let b = creature(2, 3).with_leader(leader.id);
        assert!(are_teammates(&a, &b));
        assert!(are_teammates(&a, &leader));
        assert!(!are_teammates(&a, &creature(3, 4)));
    }

    #[test]
    fn player_and_allies_share_a_team() {
        let mut player = Creature::player(Position::new(1, 1));
        player.id = CreatureId(0);
        let ally = creature(1, 2).with_state(CreatureState::Ally);
        assert!(are_teammates(&player, &ally));
        assert!(are_teammates(&ally, &player));
    }

    #[test]
    fn leader_can_push_through_its_follower() {
        let mut leader = creature(0, 1);
        leader.bookkeeping.leader = true;
        let follower = creature(1, 2).with_leader(leader.id);
        assert!(swappable(&leader, &follower));
        assert!(!swappable(&follower, &leader));
    }

    #[test]
    fn paralysed_creatures_cannot_be_swapped() {
        let leader = creature(0, 1);
        let mut follower = creature(1, 2).with_leader(leader.id);
        follower.status.set(StatusKind::Paralyzed, 3);
        assert!(!swappable(&leader, &follower));
    }

    #[test]
    fn fear_blocks_swarming() {
        let mut hunter = creature(0, 1).with_state(CreatureState::TrackingScent);
        assert!(eligible_for_swarming(&hunter));
        hunter.status.set(StatusKind::MagicalFear, 2);
        assert!(!eligible_for_swarming(&hunter));
        let wanderer = creature(1, 1);
        assert!(!eligible_for_swarming(&wanderer));
    }
}
