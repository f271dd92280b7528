use crate::creature::{AbilityId, Creature, StatusKind};

/// Numbers produced by a melee exchange. The core applies them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AttackReport {
    pub hit: bool,
    pub damage: i32,
    /// Damage bounced back onto the attacker.
    pub reflected: i32,
}

/// Numbers produced by a bolt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BoltReport {
    pub damage: i32,
    pub healing: i32,
    /// Status the bolt inflicts on its target, with a duration in turns.
    pub status: Option<(StatusKind, i32)>,
}

/// Resolves the outcomes the decision engine merely chooses.
///
/// Damage formulas, bolt effects and minion generation all live behind this
/// seam. Implementations must be deterministic for a fixed input sequence.
pub trait CombatResolver {
    fn perform_attack(&mut self, attacker: &Creature, defender: &Creature) -> AttackReport;

    fn cast_bolt(&mut self, caster: &Creature, target: &Creature, ability: AbilityId) -> BoltReport;

    /// Fresh minions for a summoner. The core places them and binds them to
    /// the summoner; positions and ids on the returned values are ignored.
    fn summon_minions(&mut self, summoner: &Creature) -> Vec<Creature>;
}
