use arrayvec::ArrayVec;

use crate::config::AiTuning;

/// Opaque handle the combat resolver uses to identify a bolt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityId(pub u16);

/// What a bolt does, as far as target selection is concerned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BoltEffect {
    Damage,
    Fire,
    Slow,
    Negation,
    Spiderweb,
    Haste,
    Protection,
    Heal,
    Blinking,
}

impl BoltEffect {
    /// Bolts only ever aimed at enemies.
    pub const fn targets_enemies(self) -> bool {
        matches!(
            self,
            BoltEffect::Damage | BoltEffect::Fire | BoltEffect::Slow | BoltEffect::Spiderweb
        )
    }

    /// Bolts only ever aimed at teammates. Negation goes either way.
    pub const fn targets_allies(self) -> bool {
        matches!(
            self,
            BoltEffect::Haste | BoltEffect::Protection | BoltEffect::Heal
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bolt {
    pub id: AbilityId,
    pub effect: BoltEffect,
}

/// Abilities a creature may use on its turn.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Abilities {
    pub bolts: ArrayVec<Bolt, { AiTuning::MAX_BOLTS }>,
    pub summons: bool,
    /// Summons once on arrival rather than on a budget.
    pub summons_on_entry: bool,
}

impl Abilities {
    pub fn bolt_with(&self, effect: BoltEffect) -> Option<Bolt> {
        self.bolts.iter().copied().find(|bolt| bolt.effect == effect)
    }

    pub fn can_blink(&self) -> bool {
        self.bolt_with(BoltEffect::Blinking).is_some()
    }

    pub fn can_shoot_webs(&self) -> bool {
        self.bolt_with(BoltEffect::Spiderweb).is_some()
    }

    /// Bolts eligible for ordinary casting; blinking is handled by movement.
    pub fn castable_bolts(&self) -> impl Iterator<Item = Bolt> + '_ {
        self.bolts
            .iter()
            .copied()
            .filter(|bolt| bolt.effect != BoltEffect::Blinking)
    }

    /// Adds a bolt unless the list is full or already has it.
    pub fn learn(&mut self, bolt: Bolt) -> bool {
        if self.bolts.contains(&bolt) || self.bolts.is_full() {
            return false;
        }
        self.bolts.push(bolt);
        true
    }
}
