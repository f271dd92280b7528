//! Spells: blinking, summoning and bolts.

use tracing::{debug, trace, warn};

use crate::avoidance::avoided_flags;
use crate::config::AiTuning;
use crate::creature::{Bolt, BoltEffect, Creature, CreatureId, CreatureState, StatusKind};
use crate::decision::{Turn, TurnAction};
use crate::env::TerrainFlags;
use crate::geometry::{Direction, Position, distance_between};
use crate::grid::{DistanceGrid, GridKind};
use crate::state_machine::wake_up;
use crate::view::WorldView;

/// Perimeter point `n` of the square of radius [`AiTuning::BLINK_AIM_RADIUS`]
/// around the caster: top row, bottom row, then the two sides.
fn blink_aim_offset(n: i32) -> (i32, i32) {
    let r = AiTuning::BLINK_AIM_RADIUS;
    match n {
        0..=10 => (n - r, -r),
        11..=21 => (n - 16, r),
        22..=30 => (-r, n - 26),
        _ => (r, n - 35),
    }
}

/// Where a blink should land to do better on `preference` than walking would.
///
/// The blink has to beat the best cardinal neighbour, and it has to actually
/// jump: a landing one step away with open corners is left to walking.
fn plan_blink(
    view: &WorldView<'_>,
    monst: &Creature,
    preference: impl Fn(Position) -> i32,
    uphill: bool,
) -> Option<Position> {
    if !monst.abilities.can_blink() {
        return None;
    }
    let terrain = view.terrain();
    let origin = monst.position;
    let improves = |now: i32, best: i32| if uphill { now > best } else { now < best };

    let mut best = preference(origin);
    for dir in Direction::CARDINAL {
        let cell = origin.step(dir);
        if !terrain.contains(cell) {
            continue;
        }
        let value = preference(cell);
        if improves(value, best) && !view.avoids(monst, cell) {
            best = value;
        }
    }

    let mut chosen = None;
    for n in 0..AiTuning::BLINK_SAMPLES {
        let (dx, dy) = blink_aim_offset(n);
        let impact = view.blink_landing(origin, origin.offset(dx, dy), view.tuning().blink_distance);
        if impact == origin {
            continue;
        }
        let value = preference(impact);
        if improves(value, best) && !view.avoids(monst, impact) {
            best = value;
            let leaps = (impact.x - origin.x).abs() > 1
                || (impact.y - origin.y).abs() > 1
                || terrain.has_flag(Position::new(impact.x, origin.y), TerrainFlags::OBSTRUCTS_PASSABILITY)
                || terrain.has_flag(Position::new(origin.x, impact.y), TerrainFlags::OBSTRUCTS_PASSABILITY);
            chosen = leaps.then_some(impact);
        }
    }
    chosen
}

/// Blinks to the best reachable cell on a preference map. Returns whether the
/// creature blinked.
pub(crate) fn blink_to_preference(
    turn: &mut Turn<'_, '_>,
    id: CreatureId,
    preference: impl Fn(Position) -> i32,
    uphill: bool,
) -> bool {
    let landing = {
        let view = turn.view();
        let Some(monst) = view.creature(id) else {
            return false;
        };
        plan_blink(&view, monst, preference, uphill)
    };
    landing.is_some_and(|to| blink_to(turn, id, to))
}

/// Blinks up the player's scent trail.
pub(crate) fn blink_up_scent(turn: &mut Turn<'_, '_>, id: CreatureId) -> bool {
    let scent = turn.ctx.scent;
    blink_to_preference(turn, id, |cell| scent.scent_at(cell), true)
}

/// Which safety grid a fugitive consults.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SafetySource {
    Shared(GridKind),
    /// The creature's own snapshot, taken when it lost sight of the player.
    Private,
}

/// Picks the fugitive's safety grid. A fugitive that can tell where the
/// player is uses the live grid; one that cannot keeps fleeing along the
/// snapshot it took when it lost track.
pub(crate) fn safety_source(turn: &mut Turn<'_, '_>, id: CreatureId) -> SafetySource {
    let aware = {
        let view = turn.view();
        let (Some(monst), Some(player)) = (view.creature(id), view.player()) else {
            return SafetySource::Shared(GridKind::Safety);
        };
        if player.has_status(StatusKind::Invisible) {
            distance_between(monst.position, player.position) <= 1
        } else {
            view.in_view(monst.position)
        }
    };
    if aware {
        if let Some(monst) = turn.world.get_mut(id) {
            monst.safety_map = None;
        }
        return SafetySource::Shared(GridKind::Safety);
    }

    let has_snapshot = turn
        .world
        .get(id)
        .is_some_and(|monst| monst.safety_map.is_some());
    if !has_snapshot {
        let snapshot = {
            let view = WorldView::new(turn.ctx, turn.world);
            turn.grids.get(&view, GridKind::Safety).clone()
        };
        if let Some(monst) = turn.world.get_mut(id) {
            trace!(creature = %id, "took private safety snapshot");
            monst.safety_map = Some(Box::new(snapshot));
        }
    }
    SafetySource::Private
}

/// Runs `f` against the chosen safety grid.
pub(crate) fn with_safety_grid<R>(
    turn: &mut Turn<'_, '_>,
    id: CreatureId,
    source: SafetySource,
    f: impl FnOnce(&WorldView<'_>, &DistanceGrid) -> R,
) -> Option<R> {
    let view = WorldView::new(turn.ctx, turn.world);
    match source {
        SafetySource::Shared(kind) => {
            let grid = turn.grids.get(&view, kind);
            Some(f(&view, grid))
        }
        SafetySource::Private => {
            let grid = view.creature(id)?.safety_map.as_deref()?;
            Some(f(&view, grid))
        }
    }
}

/// Blinks down the appropriate safety grid.
pub(crate) fn blink_to_safety(turn: &mut Turn<'_, '_>, id: CreatureId) -> bool {
    let ally = turn.world.get(id).is_some_and(Creature::is_ally);
    let source = if ally {
        SafetySource::Shared(GridKind::AllySafety)
    } else {
        safety_source(turn, id)
    };
    let landing = with_safety_grid(turn, id, source, |view, grid| {
        let monst = view.creature(id)?;
        plan_blink(view, monst, |cell| grid.distance_at(cell), false)
    })
    .flatten();
    landing.is_some_and(|to| blink_to(turn, id, to))
}

fn blink_to(turn: &mut Turn<'_, '_>, id: CreatureId, to: Position) -> bool {
    let Some(from) = turn.world.get(id).map(|monst| monst.position) else {
        return false;
    };
    if let Err(err) = turn.world.relocate(id, to) {
        warn!(creature = %id, %err, "blink rejected");
        return false;
    }
    debug!(creature = %id, %from, %to, "blinked");
    turn.charge_casting(id);
    turn.record(TurnAction::Blinked { from, to });
    true
}

/// Whether an ability roll succeeds for this creature.
pub(crate) fn wants_to_use_ability(turn: &mut Turn<'_, '_>, id: CreatureId) -> bool {
    let always = turn
        .world
        .get(id)
        .is_some_and(|monst| monst.behavior.always_use_ability);
    always || turn.rng.percent(turn.ctx.tuning.ability_use_percent)
}

/// Summons minions when the budget allows.
///
/// Allied summoners count every ally; others count their own followers. The
/// fewer minions exist, the likelier another summon.
pub(crate) fn summons(turn: &mut Turn<'_, '_>, id: CreatureId, always_use: bool) -> bool {
    let Some(monst) = turn.world.get(id) else {
        return false;
    };
    if !monst.abilities.summons {
        return false;
    }
    let ally = monst.is_ally();
    let on_entry = monst.abilities.summons_on_entry;
    let minions = turn
        .world
        .monsters()
        .filter(|other| {
            if ally {
                other.is_ally()
            } else {
                other.follows(id)
            }
        })
        .count() as i32;
    let odds = summon_odds(turn.ctx.tuning, minions, ally, on_entry, always_use);
    let summon = match odds {
        SummonOdds::Certain => true,
        SummonOdds::Never => false,
        SummonOdds::OneIn(upper) => turn.rng.one_in(upper),
    };
    summon && summon_minions(turn, id)
}

/// Chance that a summoner calls for help this turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SummonOdds {
    Certain,
    Never,
    /// Rolled with [`RngStream::one_in`](crate::rng::RngStream::one_in): `1 / (upper + 1)`.
    OneIn(i32),
}

fn summon_odds(tuning: &AiTuning, minions: i32, ally: bool, on_entry: bool, always_use: bool) -> SummonOdds {
    if always_use && minions < tuning.forced_summon_cap {
        SummonOdds::Certain
    } else if on_entry {
        SummonOdds::OneIn(tuning.entry_summon_one_in)
    } else if ally && minions >= tuning.ally_summon_cap {
        SummonOdds::Never
    } else {
        SummonOdds::OneIn(minions * minions * 3 + 1)
    }
}

/// Asks the combat resolver for minions and binds them to the summoner.
fn summon_minions(turn: &mut Turn<'_, '_>, id: CreatureId) -> bool {
    let Some(summoner) = turn.world.get(id) else {
        return false;
    };
    let origin = summoner.position;
    let state = summoner.state;
    let minions = turn.combat.summon_minions(summoner);

    let mut count = 0;
    for mut minion in minions {
        let cell = {
            let view = turn.view();
            view.qualifying_cell_near(&minion, origin)
        };
        let Some(cell) = cell else {
            warn!(summoner = %id, minion = %minion.name, "no room for minion");
            continue;
        };
        minion.position = cell;
        minion.leader = Some(id);
        minion.bookkeeping.follower = true;
        minion.bookkeeping.just_summoned = true;
        minion.state = state;
        minion.last_seen_player_at = cell;
        match turn.world.spawn(minion) {
            Ok(_) => count += 1,
            Err(err) => warn!(summoner = %id, %err, "minion spawn failed"),
        }
    }
    if count == 0 {
        return false;
    }
    if let Some(summoner) = turn.world.get_mut(id) {
        summoner.bookkeeping.leader = true;
    }
    debug!(creature = %id, count, "summoned");
    turn.charge_casting(id);
    turn.record(TurnAction::Summoned { count });
    true
}

/// Summoning first, then bolts.
pub(crate) fn use_magic(turn: &mut Turn<'_, '_>, id: CreatureId) -> bool {
    let always = turn
        .world
        .get(id)
        .is_some_and(|monst| monst.behavior.always_use_ability);
    summons(turn, id, always) || use_bolt(turn, id)
}

/// Fires the first bolt that suits the first suitable target, player first.
fn use_bolt(turn: &mut Turn<'_, '_>, id: CreatureId) -> bool {
    let Some(caster) = turn.world.get(id) else {
        return false;
    };
    if caster.abilities.castable_bolts().next().is_none() {
        return false;
    }
    let targets: Vec<CreatureId> = turn.world.player_then_others().map(|c| c.id).collect();
    for target_id in targets {
        let bolts: Vec<Bolt> = {
            let view = turn.view();
            let (Some(caster), Some(target)) = (view.creature(id), view.creature(target_id)) else {
                continue;
            };
            if !generally_valid_target(&view, caster, target) {
                continue;
            }
            caster
                .abilities
                .castable_bolts()
                .filter(|bolt| specifically_valid_target(&view, caster, target, bolt.effect))
                .collect()
        };
        for bolt in bolts {
            if wants_to_use_ability(turn, id) {
                cast(turn, id, target_id, bolt);
                return true;
            }
        }
    }
    false
}

fn generally_valid_target(view: &WorldView<'_>, caster: &Creature, target: &Creature) -> bool {
    if caster.id == target.id {
        return false;
    }
    if caster.has_status(StatusKind::Discordant)
        && caster.state == CreatureState::Wandering
        && target.is_player
    {
        return false;
    }
    if caster.is_ally()
        && !caster.has_status(StatusKind::Discordant)
        && target.bookkeeping.marked_for_sacrifice
    {
        return false;
    }
    if target.has_status(StatusKind::Invisible) || target.bookkeeping.submerged {
        return false;
    }
    view.open_path_between(caster.position, target.position)
}

/// Haste and protection are wasted on a target that is not in a fight.
fn eligible_for_combat_buff(view: &WorldView<'_>, caster: &Creature, target: &Creature) -> bool {
    if !caster.is_ally() {
        return target.state == CreatureState::TrackingScent;
    }
    let Some(player) = view.player() else {
        return false;
    };
    view.player_can_see(caster)
        && view.world.player_then_others().any(|enemy| {
            view.are_enemies(player, enemy) && view.player_can_see(enemy) && view.in_view(enemy.position)
        })
}

fn specifically_valid_target(
    view: &WorldView<'_>,
    caster: &Creature,
    target: &Creature,
    effect: BoltEffect,
) -> bool {
    let terrain = view.terrain();
    let enemies = view.are_enemies(caster, target);
    let teammates = view.are_teammates(caster, target);
    if effect.targets_allies() && (!teammates || enemies) {
        return false;
    }
    if effect.targets_enemies() && (!enemies || target.combat.invulnerable) {
        return false;
    }

    match effect {
        BoltEffect::Fire => {
            !target.has_status(StatusKind::ImmuneToFire)
                && !terrain
                    .burned_flags_at(caster.position)
                    .intersects(avoided_flags(caster))
                && !(target.has_status(StatusKind::Entranced) && enemies)
        }
        BoltEffect::Damage => {
            !(terrain.has_flag(target.position, TerrainFlags::OBSTRUCTS_PASSABILITY)
                && !target.combat.attackable_thru_walls)
                && !(target.has_status(StatusKind::Entranced) && enemies)
        }
        BoltEffect::Slow => !target.has_status(StatusKind::Slowed),
        BoltEffect::Haste => {
            !target.has_status(StatusKind::Hasted) && eligible_for_combat_buff(view, caster, target)
        }
        BoltEffect::Protection => {
            !target.has_status(StatusKind::Shielded) && eligible_for_combat_buff(view, caster, target)
        }
        BoltEffect::Heal => target.health.current < target.health.max,
        BoltEffect::Spiderweb => {
            !target.has_status(StatusKind::Stuck) && !target.movement.immune_to_webs
        }
        BoltEffect::Negation => {
            if enemies {
                target.has_status(StatusKind::Hasted)
                    || target.has_status(StatusKind::Shielded)
                    || target.combat.immune_to_weapons
                    || ((target.has_status(StatusKind::ImmuneToFire) || target.is_levitating())
                        && terrain.has_flag(
                            target.position,
                            TerrainFlags::LAVA_INSTA_DEATH
                                | TerrainFlags::IS_DEEP_WATER
                                | TerrainFlags::AUTO_DESCENT,
                        ))
                    || (teammates
                        && target.has_status(StatusKind::Discordant)
                        && !caster.has_status(StatusKind::Discordant))
            } else if teammates {
                (target.has_status(StatusKind::Entranced) && !caster.is_ally())
                    || target.has_status(StatusKind::MagicalFear)
            } else {
                false
            }
        }
        BoltEffect::Blinking => false,
    }
}

fn cast(turn: &mut Turn<'_, '_>, id: CreatureId, target_id: CreatureId, bolt: Bolt) {
    let (Some(caster), Some(target)) = (turn.world.get(id), turn.world.get(target_id)) else {
        return;
    };
    let report = turn.combat.cast_bolt(caster, target, bolt.id);
    let woke = !target.is_player && target.state == CreatureState::Sleeping && report.damage > 0;
    if let Some(target) = turn.world.get_mut(target_id) {
        target.take_damage(report.damage);
        target.heal(report.healing);
        if let Some((kind, turns)) = report.status {
            target.status.extend(kind, turns);
        }
    }
    debug!(caster = %id, target = %target_id, effect = %bolt.effect, "cast bolt");
    if woke {
        wake_up(turn, target_id);
    }
    turn.charge_casting(id);
    turn.record(TurnAction::Cast {
        target: target_id,
        ability: bolt.id,
    });
}
