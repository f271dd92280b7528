//! Behavioural state transitions, evaluated once per creature per turn.
//!
//! [`select_rule`] is a pure function of [`TransitionInputs`] so the rule
//! table can be checked exhaustively; [`update_state`] gathers the inputs
//! from the world and applies the chosen rule with its side effects.

use tracing::{debug, trace};

use crate::config::AiTuning;
use crate::creature::{CreatureId, CreatureMode, CreatureState, Health, StatusKind};
use crate::decision::Turn;
use crate::geometry::{Position, distance_between};
use crate::grid::{WaypointSet, next_step};
use crate::relations::are_teammates;
use crate::view::WorldView;

/// Which transition rule fired for a creature this turn. Exactly one fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
pub enum TransitionRule {
    /// Always-hunting creatures track without checking anything else.
    AlwaysHunting,
    /// Immobile creatures track while aware and sleep otherwise.
    Immobile,
    /// A wanderer notices the player and starts hunting.
    Alert,
    /// A sleeper notices the player and rouses its team.
    WakeUp,
    /// A hunter loses the player and wanders toward the last sighting.
    LoseTrack,
    /// A hunter with a feared enemy close by turns to flee.
    Frightened,
    /// A badly hurt creature that flees near death runs.
    NearDeath,
    /// Hurt but not yet desperate; the current state holds.
    Wounded,
    /// A fugitive with no feared enemy nearby resumes the hunt.
    RegainCourage,
    /// A thief that lost its loot stops running for good.
    ThiefReformed,
    /// A fugitive that healed rejoins its side.
    Recovered,
    Unchanged,
}

/// The facts the transition rules read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransitionInputs {
    pub state: CreatureState,
    pub mode: CreatureMode,
    pub always_hunting: bool,
    pub immobile: bool,
    pub aware: bool,
    /// The player's cell is inside the player's field of view.
    pub player_in_view: bool,
    /// Distance to the closest feared enemy; large when there is none.
    pub feared_distance: i32,
    pub flees_near_death: bool,
    pub health: Health,
    pub magically_afraid: bool,
    /// Discord changes who counts as an enemy, not which rule fires.
    pub discordant: bool,
    pub hit_steal_flee: bool,
    pub carries_item: bool,
}

impl TransitionInputs {
    /// Permanently fleeing creatures never wander or hunt.
    pub fn effective_state(&self) -> CreatureState {
        if self.mode == CreatureMode::PermanentlyFleeing
            && matches!(
                self.state,
                CreatureState::Wandering | CreatureState::TrackingScent
            )
        {
            CreatureState::Fleeing
        } else {
            self.state
        }
    }
}

/// Picks the single rule that applies, in precedence order.
pub fn select_rule(inputs: &TransitionInputs, tuning: &AiTuning) -> TransitionRule {
    use CreatureState::*;
    use TransitionRule::*;

    let ally = inputs.state == Ally;
    if inputs.always_hunting && !ally {
        return AlwaysHunting;
    }
    if inputs.immobile && !ally {
        return Immobile;
    }

    let state = inputs.effective_state();
    let hp = inputs.health;
    let radius = tuning.feared_enemy_radius;
    let calm = !inputs.magically_afraid;
    let normal = inputs.mode == CreatureMode::Normal;

    if state == Wandering && inputs.aware && inputs.player_in_view {
        Alert
    } else if state == Sleeping {
        if inputs.aware { WakeUp } else { Unchanged }
    } else if state == TrackingScent && !inputs.aware {
        LoseTrack
    } else if state == TrackingScent && inputs.feared_distance < radius {
        Frightened
    } else if !ally
        && inputs.flees_near_death
        && hp.current <= hp.max * tuning.recover_courage_percent / 100
    {
        if state == Fleeing || hp.current <= hp.max * tuning.flee_near_death_percent / 100 {
            NearDeath
        } else {
            Wounded
        }
    } else if normal && state == Fleeing && calm && inputs.feared_distance >= radius {
        RegainCourage
    } else if !normal
        && state == Fleeing
        && inputs.hit_steal_flee
        && calm
        && !inputs.carries_item
    {
        ThiefReformed
    } else if normal
        && state == Fleeing
        && inputs.flees_near_death
        && calm
        && hp.current >= hp.max * tuning.recover_courage_percent / 100
    {
        Recovered
    } else {
        Unchanged
    }
}

/// Re-evaluates a creature's state and applies the resulting transition.
pub(crate) fn update_state(turn: &mut Turn<'_, '_>, id: CreatureId) -> Option<TransitionRule> {
    let view = WorldView::new(turn.ctx, turn.world);
    let monst = view.creature(id)?;
    let player = view.player();
    let ally = monst.is_ally();

    let aware = if monst.behavior.always_hunting && !ally {
        true
    } else {
        player.is_some_and(|player| {
            view.aware_of_target(turn.rng, turn.start.stealth_range, monst, player)
        })
    };

    let feared_distance = view
        .world
        .player_then_others()
        .filter(|other| {
            view.flees_from(monst, other)
                && view.traversible_path_between(other, monst.position)
                && view.open_path_between(monst.position, other.position)
        })
        .map(|other| distance_between(monst.position, other.position))
        .min()
        .unwrap_or_else(|| view.terrain().dimensions().span());

    let inputs = TransitionInputs {
        state: monst.state,
        mode: monst.mode,
        always_hunting: monst.behavior.always_hunting,
        immobile: monst.movement.immobile,
        aware,
        player_in_view: player.is_some_and(|player| view.in_view(player.position)),
        feared_distance,
        flees_near_death: monst.behavior.flees_near_death,
        health: monst.health,
        magically_afraid: monst.has_status(StatusKind::MagicalFear),
        discordant: monst.has_status(StatusKind::Discordant),
        hit_steal_flee: monst.combat.hit_steal_flee,
        carries_item: monst.carries_item,
    };
    let leader_is_player = monst.leader.is_some() && monst.leader == view.world.player_id();
    let follows_player = monst.bookkeeping.follower && leader_is_player;
    let rule = select_rule(&inputs, view.tuning());
    trace!(creature = %id, %rule, aware, feared_distance, "transition rule");

    let effective = inputs.effective_state();
    if let Some(monst) = turn.world.get_mut(id) {
        monst.state = effective;
    }

    match rule {
        TransitionRule::AlwaysHunting => set_state(turn, id, CreatureState::TrackingScent),
        TransitionRule::Immobile => {
            let state = if aware {
                CreatureState::TrackingScent
            } else {
                CreatureState::Sleeping
            };
            set_state(turn, id, state);
        }
        TransitionRule::Alert => alert(turn, id),
        TransitionRule::WakeUp => wake_up(turn, id),
        TransitionRule::LoseTrack => {
            set_state(turn, id, CreatureState::Wandering);
            let last_seen = turn.world.get(id).map(|monst| monst.last_seen_player_at);
            if let Some(last_seen) = last_seen {
                wander_toward(turn, id, last_seen);
            }
        }
        TransitionRule::Frightened | TransitionRule::NearDeath => {
            set_state(turn, id, CreatureState::Fleeing)
        }
        TransitionRule::RegainCourage => set_state(turn, id, CreatureState::TrackingScent),
        TransitionRule::ThiefReformed => {
            if let Some(monst) = turn.world.get_mut(id) {
                monst.mode = CreatureMode::Normal;
            }
            if leader_is_player {
                set_state(turn, id, CreatureState::Ally);
            } else {
                alert(turn, id);
            }
        }
        TransitionRule::Recovered => {
            if follows_player {
                set_state(turn, id, CreatureState::Ally);
            } else {
                alert(turn, id);
            }
        }
        TransitionRule::Wounded | TransitionRule::Unchanged => {}
    }

    if aware && let Some(position) = turn.player_position() {
        if let Some(monst) = turn.world.get_mut(id)
            && matches!(
                monst.state,
                CreatureState::Fleeing | CreatureState::TrackingScent
            )
        {
            monst.last_seen_player_at = position;
        }
    }
    Some(rule)
}

fn set_state(turn: &mut Turn<'_, '_>, id: CreatureId, state: CreatureState) {
    if let Some(monst) = turn.world.get_mut(id) {
        monst.state = state;
    }
}

/// Starts hunting the player, or running from it when permanently afraid.
pub(crate) fn alert(turn: &mut Turn<'_, '_>, id: CreatureId) {
    let player_at = turn.player_position();
    if let Some(monst) = turn.world.get_mut(id) {
        monst.state = if monst.mode == CreatureMode::PermanentlyFleeing {
            CreatureState::Fleeing
        } else {
            CreatureState::TrackingScent
        };
        if let Some(position) = player_at {
            monst.last_seen_player_at = position;
        }
    }
}

/// Wakes a creature and every teammate in normal mode.
///
/// Sleeping or wandering teammates lose at least a full turn getting up. A
/// hostile waker also sets its teammates hunting and re-evaluates them.
pub(crate) fn wake_up(turn: &mut Turn<'_, '_>, id: CreatureId) {
    let Some(monst) = turn.world.get(id) else {
        return;
    };
    let waker_is_ally = monst.is_ally();
    if !waker_is_ally {
        alert(turn, id);
    }
    if let Some(monst) = turn.world.get_mut(id) {
        monst.ticks_until_turn = 100;
    }

    for teammate in turn.world.ids() {
        let (Some(monst), Some(other)) = (turn.world.get(id), turn.world.get(teammate)) else {
            continue;
        };
        if teammate == id
            || other.is_player
            || other.mode != CreatureMode::Normal
            || !are_teammates(monst, other)
        {
            continue;
        }
        if let Some(other) = turn.world.get_mut(teammate) {
            if matches!(
                other.state,
                CreatureState::Sleeping | CreatureState::Wandering
            ) {
                other.ticks_until_turn = other.ticks_until_turn.max(100);
            }
            if !waker_is_ally {
                other.state = CreatureState::TrackingScent;
            }
        }
        if !waker_is_ally {
            update_state(turn, teammate);
        }
    }
    debug!(creature = %id, "woke up");
}

/// Heads for the waypoint nearest `destination` and forgets having visited it.
pub(crate) fn wander_toward(turn: &mut Turn<'_, '_>, id: CreatureId, destination: Position) {
    let Some(index) = turn.waypoints.closest_to(destination) else {
        return;
    };
    if let Some(monst) = turn.world.get_mut(id) {
        monst.visited_waypoints.clear(index);
        monst.target_waypoint = Some(index);
    }
}

/// Whether a waypoint is worth walking to from where the creature stands.
pub(crate) fn is_valid_wander_destination(
    view: &WorldView<'_>,
    waypoints: &WaypointSet,
    id: CreatureId,
    index: usize,
) -> bool {
    let (Some(monst), Some(grid)) = (view.creature(id), waypoints.grid(index)) else {
        return false;
    };
    !monst.visited_waypoints.is_visited(index)
        && grid.distance_at(monst.position) >= 0
        && next_step(view, grid, monst.position, Some(monst), false).is_some()
}

/// Marks the current waypoint done and targets the nearest valid unvisited one.
///
/// Two random visit marks are cleared first so that, over time, about half of
/// the waypoints are available. When none is valid, every mark is cleared
/// and the search runs again.
pub(crate) fn choose_new_wander_destination(turn: &mut Turn<'_, '_>, id: CreatureId) {
    let count = turn.waypoints.len() as i32;
    if count == 0 {
        return;
    }
    let first = turn.rng.range(0, count - 1) as usize;
    let second = turn.rng.range(0, count - 1) as usize;
    if let Some(monst) = turn.world.get_mut(id) {
        monst.visited_waypoints.clear(first);
        monst.visited_waypoints.clear(second);
        if let Some(current) = monst.target_waypoint {
            monst.visited_waypoints.mark(current);
        }
    }

    let mut choice = closest_valid_waypoint(turn, id);
    if choice.is_none() {
        if let Some(monst) = turn.world.get_mut(id) {
            monst.visited_waypoints.clear_all();
        }
        choice = closest_valid_waypoint(turn, id);
    }
    if let Some(monst) = turn.world.get_mut(id) {
        monst.target_waypoint = choice;
    }
    trace!(creature = %id, waypoint = ?choice, "new wander destination");
}

fn closest_valid_waypoint(turn: &Turn<'_, '_>, id: CreatureId) -> Option<usize> {
    let view = turn.view();
    let monst = view.creature(id)?;
    let mut shortest = view.terrain().dimensions().width as i32 / 2;
    let mut best = None;
    for index in 0..turn.waypoints.len() {
        let distance = turn.waypoints.distance(index, monst.position);
        if distance < shortest && is_valid_wander_destination(&view, turn.waypoints, id, index) {
            shortest = distance;
            best = Some(index);
        }
    }
    best
}
