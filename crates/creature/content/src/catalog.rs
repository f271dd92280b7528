//! Creature templates and the catalog that instantiates them.
use creature_core::{
    Abilities, BehaviorTraits, CombatTraits, Creature, CreatureMode, CreatureState, Health,
    MovementTraits, Position, StatusKind,
};

use crate::error::ContentError;

/// Inclusive damage bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageRange {
    pub min: i32,
    pub max: i32,
}

impl DamageRange {
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }
}

/// Static description of one kind of creature.
///
/// Every field except `name` and `max_health` has a sensible default, so data
/// files only spell out what makes a creature different.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CreatureTemplate {
    pub name: String,
    pub max_health: i32,
    /// Percent chance to hit an undefended target.
    pub accuracy: i32,
    /// Subtracted from an attacker's accuracy.
    pub defense: i32,
    pub damage: DamageRange,
    /// Damage of this creature's offensive bolts.
    pub bolt_damage: DamageRange,
    /// Share of melee damage bounced back onto whoever hits this creature.
    pub reflect_percent: i32,
    pub turns_between_regen: i32,
    /// Turns before the creature expires on its own. Zero lives forever.
    pub lifespan: i32,
    pub movement_speed: i32,
    pub attack_speed: i32,
    pub mode: CreatureMode,
    /// State on arrival when the level does not say otherwise.
    pub state: CreatureState,
    pub carries_item: bool,
    pub movement: MovementTraits,
    pub combat: CombatTraits,
    pub behavior: BehaviorTraits,
    pub abilities: Abilities,
    /// Catalog names of the minions a summon produces.
    pub minions: Vec<String>,
}

impl Default for CreatureTemplate {
    fn default() -> Self {
        Self {
            name: String::new(),
            max_health: 0,
            accuracy: 100,
            defense: 0,
            damage: DamageRange::new(1, 3),
            bolt_damage: DamageRange::new(2, 6),
            reflect_percent: 0,
            turns_between_regen: 20,
            lifespan: 0,
            movement_speed: Creature::DEFAULT_SPEED,
            attack_speed: Creature::DEFAULT_SPEED,
            mode: CreatureMode::Normal,
            state: CreatureState::Wandering,
            carries_item: false,
            movement: MovementTraits::default(),
            combat: CombatTraits::default(),
            behavior: BehaviorTraits::default(),
            abilities: Abilities::default(),
            minions: Vec::new(),
        }
    }
}

impl CreatureTemplate {
    fn validate(&self) -> Result<(), ContentError> {
        let reason = if self.name.trim().is_empty() {
            Some("name is empty")
        } else if self.max_health <= 0 {
            Some("max_health must be positive")
        } else if self.damage.min > self.damage.max || self.bolt_damage.min > self.bolt_damage.max {
            Some("damage range is inverted")
        } else if self.lifespan < 0 {
            Some("lifespan must not be negative")
        } else if self.movement_speed <= 0 || self.attack_speed <= 0 {
            Some("speeds must be positive")
        } else if self.state == CreatureState::Ally {
            Some("templates cannot start as allies")
        } else {
            None
        };
        match reason {
            Some(reason) => Err(ContentError::InvalidTemplate {
                name: self.name.clone(),
                reason,
            }),
            None => Ok(()),
        }
    }

    /// A fresh creature of this kind standing at `position`.
    pub fn instantiate(&self, position: Position) -> Creature {
        let mut creature = Creature::new(self.name.clone(), position).with_state(self.state);
        creature.health = Health::full(self.max_health);
        creature.turns_between_regen = self.turns_between_regen;
        creature.max_damage = self.damage.max;
        creature.movement_speed = self.movement_speed;
        creature.attack_speed = self.attack_speed;
        creature.mode = self.mode;
        creature.carries_item = self.carries_item;
        creature.movement = self.movement;
        creature.combat = self.combat;
        creature.behavior = self.behavior;
        creature.abilities = self.abilities.clone();
        if self.lifespan > 0 {
            creature.status.set(StatusKind::LifespanRemaining, self.lifespan);
        }
        creature
    }
}

/// Validated set of templates, looked up by name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CreatureCatalog {
    templates: Vec<CreatureTemplate>,
}

impl CreatureCatalog {
    /// Checks every template and rejects duplicate names and minions that
    /// name no template.
    pub fn new(templates: Vec<CreatureTemplate>) -> Result<Self, ContentError> {
        for (index, template) in templates.iter().enumerate() {
            template.validate()?;
            if templates[..index].iter().any(|earlier| earlier.name == template.name) {
                return Err(ContentError::InvalidTemplate {
                    name: template.name.clone(),
                    reason: "name is declared twice",
                });
            }
        }
        let catalog = Self { templates };
        for template in &catalog.templates {
            if let Some(missing) = template.minions.iter().find(|minion| catalog.get(minion).is_none()) {
                return Err(ContentError::UnknownCreature(missing.clone()));
            }
        }
        Ok(catalog)
    }

    pub fn get(&self, name: &str) -> Option<&CreatureTemplate> {
        self.templates.iter().find(|template| template.name == name)
    }

    pub fn instantiate(&self, name: &str, position: Position) -> Result<Creature, ContentError> {
        self.get(name)
            .map(|template| template.instantiate(position))
            .ok_or_else(|| ContentError::UnknownCreature(name.to_owned()))
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CreatureTemplate> {
        self.templates.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(name: &str) -> CreatureTemplate {
        CreatureTemplate {
            name: name.into(),
            max_health: 15,
            ..CreatureTemplate::default()
        }
    }

    #[test]
    fn instantiated_creatures_carry_their_template() {
        let mut jackal = template("jackal");
        jackal.movement_speed = 50;
        jackal.damage = DamageRange::new(2, 4);
        let catalog = CreatureCatalog::new(vec![jackal]).unwrap();

        let creature = catalog.instantiate("jackal", Position::new(3, 4)).unwrap();
        assert_eq!(creature.health, Health::full(15));
        assert_eq!(creature.movement_speed, 50);
        assert_eq!(creature.max_damage, 4);
        assert_eq!(creature.position, Position::new(3, 4));
        assert!(!creature.is_player);
    }

    #[test]
    fn unknown_minions_are_rejected() {
        let mut conjurer = template("goblin conjurer");
        conjurer.minions = vec!["spectral blade".into()];
        assert_eq!(
            CreatureCatalog::new(vec![conjurer]),
            Err(ContentError::UnknownCreature("spectral blade".into()))
        );
    }

    #[test]
    fn duplicate_and_empty_entries_are_rejected() {
        assert!(CreatureCatalog::new(vec![template("rat"), template("rat")]).is_err());
        assert!(CreatureCatalog::new(vec![CreatureTemplate::default()]).is_err());
    }
}
