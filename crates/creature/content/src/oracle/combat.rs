//! Combat outcomes rolled from catalog stats.
use std::sync::Arc;

use creature_core::rng::derive_stream_seed;
use creature_core::{
    AbilityId, AttackReport, BoltEffect, BoltReport, CombatResolver, Creature, RngStream,
    StatusKind,
};

use crate::catalog::{CreatureCatalog, CreatureTemplate, DamageRange};

/// Resolves attacks, bolts and summons using the stats in a [`CreatureCatalog`].
///
/// Rolls come from a private stream so combat never shifts the AI's own
/// random sequence. Creatures missing from the catalog (the player, usually)
/// fight with their `max_damage` and no defense.
#[derive(Clone, Debug)]
pub struct CatalogCombat {
    catalog: Arc<CreatureCatalog>,
    rng: RngStream,
}

impl CatalogCombat {
    /// Stream index of the combat rolls, alongside the simulation's own two.
    pub const STREAM: u32 = 2;

    /// Turns of burning, slowing, webbing and buffs applied by bolts.
    const BURN_TURNS: i32 = 4;
    const SLOW_TURNS: i32 = 10;
    const WEB_TURNS: i32 = 5;
    const BUFF_TURNS: i32 = 10;
    /// Lowest hit chance, however well defended the target is.
    const MIN_HIT_PERCENT: i32 = 5;

    pub fn new(catalog: Arc<CreatureCatalog>, seed: u64) -> Self {
        Self {
            catalog,
            rng: RngStream::seeded(derive_stream_seed(seed, Self::STREAM)),
        }
    }

    fn template(&self, creature: &Creature) -> Option<&CreatureTemplate> {
        if creature.is_player {
            return None;
        }
        self.catalog.get(&creature.name)
    }

    fn roll(&mut self, range: DamageRange) -> i32 {
        self.rng.range(range.min, range.max)
    }
}

impl CombatResolver for CatalogCombat {
    fn perform_attack(&mut self, attacker: &Creature, defender: &Creature) -> AttackReport {
        let (accuracy, damage) = match self.template(attacker) {
            Some(template) => (template.accuracy, template.damage),
            None => (100, DamageRange::new(1, attacker.max_damage.max(1))),
        };
        let (defense, reflect_percent) = self
            .template(defender)
            .map_or((0, 0), |template| (template.defense, template.reflect_percent));

        let hit_percent = (accuracy - defense).clamp(Self::MIN_HIT_PERCENT, 100);
        if !self.rng.percent(hit_percent) {
            return AttackReport::default();
        }
        let dealt = self.roll(damage);
        AttackReport {
            hit: true,
            damage: dealt,
            reflected: dealt * reflect_percent / 100,
        }
    }

    fn cast_bolt(&mut self, caster: &Creature, target: &Creature, ability: AbilityId) -> BoltReport {
        let Some(bolt) = caster.abilities.bolts.iter().find(|bolt| bolt.id == ability) else {
            tracing::warn!(caster = %caster.id, ?ability, "bolt not known to caster");
            return BoltReport::default();
        };
        let bolt_damage = self
            .template(caster)
            .map_or(DamageRange::new(1, caster.max_damage.max(1)), |template| template.bolt_damage);

        match bolt.effect {
            BoltEffect::Damage => BoltReport {
                damage: self.roll(bolt_damage),
                ..BoltReport::default()
            },
            BoltEffect::Fire if target.has_status(StatusKind::ImmuneToFire) => BoltReport::default(),
            BoltEffect::Fire => BoltReport {
                damage: self.roll(bolt_damage),
                status: Some((StatusKind::Burning, Self::BURN_TURNS)),
                ..BoltReport::default()
            },
            BoltEffect::Slow => BoltReport {
                status: Some((StatusKind::Slowed, Self::SLOW_TURNS)),
                ..BoltReport::default()
            },
            BoltEffect::Spiderweb => BoltReport {
                status: Some((StatusKind::Stuck, Self::WEB_TURNS)),
                ..BoltReport::default()
            },
            BoltEffect::Haste => BoltReport {
                status: Some((StatusKind::Hasted, Self::BUFF_TURNS)),
                ..BoltReport::default()
            },
            BoltEffect::Protection => BoltReport {
                status: Some((StatusKind::Shielded, Self::BUFF_TURNS)),
                ..BoltReport::default()
            },
            BoltEffect::Heal => BoltReport {
                healing: (target.health.max / 2).max(1),
                ..BoltReport::default()
            },
            BoltEffect::Negation | BoltEffect::Blinking => BoltReport::default(),
        }
    }

    fn summon_minions(&mut self, summoner: &Creature) -> Vec<Creature> {
        let Some(template) = self.template(summoner) else {
            return Vec::new();
        };
        template
            .minions
            .iter()
            .filter_map(|name| self.catalog.instantiate(name, summoner.position).ok())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use creature_core::{Bolt, Position};

    use super::*;

    fn catalog() -> Arc<CreatureCatalog> {
        let mut conjurer = CreatureTemplate {
            name: "goblin conjurer".into(),
            max_health: 10,
            bolt_damage: DamageRange::new(3, 3),
            minions: vec!["spectral blade".into(), "spectral blade".into()],
            ..CreatureTemplate::default()
        };
        conjurer.abilities.bolts.push(Bolt {
            id: AbilityId(1),
            effect: BoltEffect::Fire,
        });
        let blade = CreatureTemplate {
            name: "spectral blade".into(),
            max_health: 1,
            ..CreatureTemplate::default()
        };
        let turtle = CreatureTemplate {
            name: "turtle".into(),
            max_health: 30,
            defense: 500,
            reflect_percent: 50,
            ..CreatureTemplate::default()
        };
        Arc::new(CreatureCatalog::new(vec![conjurer, blade, turtle]).unwrap())
    }

    #[test]
    fn summons_come_from_the_template() {
        let catalog = catalog();
        let mut combat = CatalogCombat::new(catalog.clone(), 1);
        let conjurer = catalog.instantiate("goblin conjurer", Position::new(4, 4)).unwrap();
        let minions = combat.summon_minions(&conjurer);
        assert_eq!(minions.len(), 2);
        assert!(minions.iter().all(|minion| minion.name == "spectral blade"));
    }

    #[test]
    fn fire_bolts_burn_unless_immune() {
        let catalog = catalog();
        let mut combat = CatalogCombat::new(catalog.clone(), 1);
        let conjurer = catalog.instantiate("goblin conjurer", Position::new(4, 4)).unwrap();
        let mut player = Creature::player(Position::new(6, 4));

        let report = combat.cast_bolt(&conjurer, &player, AbilityId(1));
        assert_eq!(report.damage, 3);
        assert_eq!(report.status, Some((StatusKind::Burning, 4)));

        player.status.set(StatusKind::ImmuneToFire, 10);
        assert_eq!(combat.cast_bolt(&conjurer, &player, AbilityId(1)), BoltReport::default());
        assert_eq!(combat.cast_bolt(&conjurer, &player, AbilityId(9)), BoltReport::default());
    }

    #[test]
    fn armoured_targets_are_rarely_hit_and_bounce_damage_back() {
        let catalog = catalog();
        let mut combat = CatalogCombat::new(catalog.clone(), 7);
        let turtle = catalog.instantiate("turtle", Position::new(2, 2)).unwrap();
        let player = Creature::player(Position::new(3, 2));

        let reports: Vec<_> = (0..400).map(|_| combat.perform_attack(&player, &turtle)).collect();
        let hits: Vec<_> = reports.iter().filter(|report| report.hit).collect();
        assert!(hits.len() < 60, "{} hits", hits.len());
        assert!(hits.iter().all(|report| report.reflected == report.damage * 50 / 100));
        assert!(reports.iter().filter(|report| !report.hit).all(|report| report.damage == 0));
    }

    #[test]
    fn combat_rolls_replay_per_seed() {
        let catalog = catalog();
        let attacker = Creature::player(Position::new(3, 2));
        let defender = catalog.instantiate("spectral blade", Position::new(4, 2)).unwrap();
        let run = |seed| {
            let mut combat = CatalogCombat::new(catalog.clone(), seed);
            (0..20)
                .map(|_| combat.perform_attack(&attacker, &defender))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(11), run(11));
    }
}
