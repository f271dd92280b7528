//! Turn decision engine: what a creature does with its turn.
//!
//! Each creature runs a priority chain of behaviours. A behaviour that acts
//! returns [`Status::Success`] and ends the turn; one that finds nothing to
//! do returns [`Status::Failure`] and the chain falls through to the next.
//! Pathing failures are never errors, they are simply failures here.
mod ally;
mod corpse;
mod fleeing;
mod hunting;
mod magic;
mod movement;
mod scent;
mod status;
mod wandering;

pub(crate) use corpse::PERMANENT;
pub(crate) use movement::random_valid_direction;
pub(crate) use status::{Status, Step, select};

use tracing::debug;

use crate::creature::{AbilityId, CreatureId, CreatureState, StatusKind};
use crate::env::{CombatResolver, WorldContext};
use crate::geometry::Position;
use crate::grid::{SharedGrids, WaypointSet};
use crate::rng::RngStream;
use crate::state_machine::{self, TransitionRule};
use crate::view::WorldView;
use crate::world::World;

/// Facts about the player's last turn that shape how creatures react.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnStart {
    /// Radius within which the player is noticeable; doubled for awareness.
    pub stealth_range: i32,
    /// The player rested or searched, so allies roam on a longer leash.
    pub player_rested: bool,
}

impl TurnStart {
    pub const DEFAULT_STEALTH_RANGE: i32 = 14;
}

impl Default for TurnStart {
    fn default() -> Self {
        Self {
            stealth_range: Self::DEFAULT_STEALTH_RANGE,
            player_rested: false,
        }
    }
}

/// The last thing a creature did on its turn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display)]
pub enum TurnAction {
    /// Spent the turn without acting.
    #[default]
    Idle,
    /// Could not act at all: paralysed, entranced, captive, dying or the player.
    Skipped,
    Moved { from: Position, to: Position },
    Swapped { with: CreatureId },
    /// Sidestepped to make room for a teammate.
    Swarmed { from: Position, to: Position },
    Attacked { target: CreatureId, hit: bool },
    Blinked { from: Position, to: Position },
    Cast { target: CreatureId, ability: AbilityId },
    Summoned { count: usize },
    Absorbing,
}

/// What happened during one creature's turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TurnReport {
    pub creature: CreatureId,
    pub state_before: CreatureState,
    pub state_after: CreatureState,
    /// Which transition rule fired, if the state machine ran.
    pub transition: Option<TransitionRule>,
    pub action: TurnAction,
    pub ticks_until_turn: i32,
}

/// Mutable access to everything one creature's turn may touch.
pub(crate) struct Turn<'t, 'c> {
    pub ctx: WorldContext<'c>,
    pub world: &'t mut World,
    pub grids: &'t mut SharedGrids,
    pub waypoints: &'t WaypointSet,
    pub rng: &'t mut RngStream,
    pub combat: &'t mut (dyn CombatResolver + 'c),
    pub start: TurnStart,
    pub action: TurnAction,
}

impl Turn<'_, '_> {
    pub fn view(&self) -> WorldView<'_> {
        WorldView::new(self.ctx, self.world)
    }

    pub fn record(&mut self, action: TurnAction) {
        self.action = action;
    }

    pub fn set_ticks(&mut self, id: CreatureId, ticks: i32) {
        if let Some(monst) = self.world.get_mut(id) {
            monst.ticks_until_turn = ticks;
        }
    }

    /// Charges the creature for a spell or a blink.
    pub fn charge_casting(&mut self, id: CreatureId) {
        if let Some(monst) = self.world.get_mut(id) {
            monst.ticks_until_turn = monst.casting_ticks();
        }
    }

    pub fn player_position(&self) -> Option<Position> {
        self.world.player().map(|player| player.position)
    }
}

/// Runs one creature's turn: state update, then the behaviour for its state.
pub(crate) fn take_turn(turn: &mut Turn<'_, '_>, id: CreatureId) -> Option<TurnReport> {
    let monst = turn.world.get(id)?;
    let state_before = monst.state;
    let mut report = TurnReport {
        creature: id,
        state_before,
        state_after: state_before,
        transition: None,
        action: TurnAction::Skipped,
        ticks_until_turn: monst.ticks_until_turn,
    };
    if monst.is_player {
        return Some(report);
    }

    if let Some(monst) = turn.world.get_mut(id) {
        monst.turns_spent_stationary += 1;
    }

    if corpse::update_absorption(turn, id).is_success() {
        return Some(finish(turn, report));
    }

    let monst = turn.world.get(id)?;
    if monst.has_status(StatusKind::Paralyzed)
        || monst.has_status(StatusKind::Entranced)
        || monst.bookkeeping.captive
    {
        let ticks = monst.movement_speed;
        let captive = monst.bookkeeping.captive;
        if let Some(monst) = turn.world.get_mut(id) {
            monst.ticks_until_turn = ticks;
            if captive {
                monst.carries_item = false;
            }
        }
        turn.record(TurnAction::Skipped);
        return Some(finish(turn, report));
    }
    if monst.is_dying() {
        turn.record(TurnAction::Skipped);
        return Some(finish(turn, report));
    }

    let speed = monst.movement_speed;
    let was_asleep = monst.state == CreatureState::Sleeping;
    turn.set_ticks(id, speed / 3);

    // Waking takes the whole turn. Set before the update so a wake-up delay wins.
    if was_asleep {
        turn.set_ticks(id, speed);
        report.transition = state_machine::update_state(turn, id);
        return Some(finish(turn, report));
    }

    report.transition = state_machine::update_state(turn, id);
    let asleep = turn
        .world
        .get(id)
        .is_none_or(|monst| monst.state == CreatureState::Sleeping);
    if asleep {
        turn.set_ticks(id, speed);
        return Some(finish(turn, report));
    }

    behave(turn, id);
    Some(finish(turn, report))
}

fn finish(turn: &Turn<'_, '_>, mut report: TurnReport) -> TurnReport {
    report.action = turn.action;
    if let Some(monst) = turn.world.get(report.creature) {
        report.state_after = monst.state;
        report.ticks_until_turn = monst.ticks_until_turn;
    }
    if report.state_before != report.state_after {
        debug!(
            creature = %report.creature,
            from = %report.state_before,
            to = %report.state_after,
            rule = ?report.transition,
            "state changed"
        );
    }
    report
}

/// The behaviour chain for a creature that is awake and free to act.
fn behave(turn: &mut Turn<'_, '_>, id: CreatureId) {
    const CHAIN: &[Step] = &[
        hunting::immobile_turn,
        hunting::discordant_turn,
        hunting::hunt,
        fleeing::flee,
        wandering::wander,
        ally::ally_turn,
    ];
    let status = select(turn, id, CHAIN);
    debug!(creature = %id, ?status, action = %turn.action, "turn decided");
}
