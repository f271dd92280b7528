//! The simulation facade: owns the arena, shared grids, waypoints and random
//! streams, and drives creature turns in a stable order.

use core::fmt;

use tracing::{debug, info, trace};

use crate::config::AiTuning;
use crate::creature::{CorpseClaim, CorpseGift, Creature, CreatureId, CreatureState, Relationship, StatusKind};
use crate::decision::{self, Turn, TurnAction, TurnReport, TurnStart};
use crate::env::{CombatResolver, TerrainFlags, WorldContext};
use crate::error::WorldError;
use crate::geometry::{Dimensions, Position};
use crate::grid::{DistanceGrid, GridKind, SharedGrids, WaypointSet};
use crate::rng::Rngs;
use crate::view::WorldView;
use crate::world::World;

/// Order-stable fingerprint of the simulation, compared across replays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StateDigest {
    pub hash: u64,
    /// Substantive draws consumed so far.
    pub draws: u64,
}

impl fmt::Display for StateDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}/{}", self.hash, self.draws)
    }
}

/// One creature AI simulation for a single level.
#[derive(Clone, Debug)]
pub struct Simulation {
    world: World,
    grids: SharedGrids,
    waypoints: WaypointSet,
    rngs: Rngs,
    start: TurnStart,
    turn: u64,
}

impl Simulation {
    /// Ticks of game time covered by one round.
    pub const ROUND_TICKS: i32 = 100;
    /// Upper bound on actions one creature may take within a round.
    pub const MAX_ACTIONS_PER_ROUND: usize = 4;

    pub fn new(dims: Dimensions, seed: u64) -> Self {
        Self {
            world: World::new(dims),
            grids: SharedGrids::new(),
            waypoints: WaypointSet::default(),
            rngs: Rngs::from_seed(seed),
            start: TurnStart::default(),
            turn: 0,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn creature(&self, id: CreatureId) -> Option<&Creature> {
        self.world.get(id)
    }

    pub fn creature_mut(&mut self, id: CreatureId) -> Option<&mut Creature> {
        self.world.get_mut(id)
    }

    pub fn rngs(&self) -> &Rngs {
        &self.rngs
    }

    pub fn rngs_mut(&mut self) -> &mut Rngs {
        &mut self.rngs
    }

    pub fn turn_number(&self) -> u64 {
        self.turn
    }

    pub fn waypoints(&self) -> &WaypointSet {
        &self.waypoints
    }

    pub fn spawn(&mut self, creature: Creature) -> Result<CreatureId, WorldError> {
        self.world.spawn(creature)
    }

    /// Replaces the waypoint network. Creatures forget their old targets.
    pub fn set_waypoints(&mut self, waypoints: WaypointSet) {
        for id in self.world.ids() {
            if let Some(monst) = self.world.get_mut(id) {
                monst.target_waypoint = None;
                monst.visited_waypoints.clear_all();
            }
        }
        debug!(count = waypoints.len(), "waypoints installed");
        self.waypoints = waypoints;
    }

    /// Marks every shared grid stale and records how the player spent the turn.
    pub fn begin_turn(&mut self, start: TurnStart) {
        self.grids.invalidate();
        self.start = start;
        self.turn += 1;
        trace!(turn = self.turn, ?start, "turn begins");
    }

    /// Rebuilds the player-path, safety and ally-safety grids.
    pub fn recompute_shared_navigation_grids(&mut self, ctx: WorldContext<'_>) {
        let view = WorldView::new(ctx, &self.world);
        self.grids.refresh(&view);
    }

    /// A shared grid as last built, if it is current for this turn.
    pub fn shared_grid(&self, kind: GridKind) -> Option<&DistanceGrid> {
        self.grids.peek(kind)
    }

    pub fn relationship_of(
        &self,
        ctx: WorldContext<'_>,
        a: CreatureId,
        b: CreatureId,
    ) -> Result<Relationship, WorldError> {
        let view = WorldView::new(ctx, &self.world);
        let a = self.world.try_get(a)?;
        let b = self.world.try_get(b)?;
        Ok(view.relationship_of(a, b))
    }

    /// Offers an ally a corpse to absorb. The claim lapses if the ally has
    /// not finished with it in `corpse_absorption_turns` turns.
    pub fn offer_corpse(
        &mut self,
        tuning: &AiTuning,
        id: CreatureId,
        position: Position,
        gift: CorpseGift,
    ) -> Result<(), WorldError> {
        let counter = tuning.corpse_absorption_turns;
        let monst = self
            .world
            .get_mut(id)
            .ok_or(WorldError::UnknownCreature(id))?;
        monst.corpse = Some(CorpseClaim {
            position,
            counter,
            gift,
        });
        monst.bookkeeping.absorbing = false;
        debug!(creature = %id, at = %position, ?gift, "corpse offered");
        Ok(())
    }

    /// Runs one creature's turn.
    pub fn advance_creature_turn(
        &mut self,
        ctx: WorldContext<'_>,
        combat: &mut dyn CombatResolver,
        id: CreatureId,
    ) -> Result<TurnReport, WorldError> {
        let mut turn = Turn {
            ctx,
            world: &mut self.world,
            grids: &mut self.grids,
            waypoints: &self.waypoints,
            rng: &mut self.rngs.substantive,
            combat,
            start: self.start,
            action: TurnAction::Idle,
        };
        decision::take_turn(&mut turn, id).ok_or(WorldError::UnknownCreature(id))
    }

    /// Begins a turn, lets every ready creature act in arena order, then
    /// closes the turn. A creature acts while it owes no time, so fast
    /// creatures may act more than once.
    pub fn run_round(
        &mut self,
        ctx: WorldContext<'_>,
        combat: &mut dyn CombatResolver,
        start: TurnStart,
    ) -> Vec<TurnReport> {
        self.begin_turn(start);
        // Time passes for everyone before anyone acts, so a delay imposed
        // mid-round (a teammate's wake-up) is still owed afterwards.
        for id in self.world.ids() {
            if let Some(monst) = self.world.get_mut(id)
                && !monst.is_player
            {
                monst.ticks_until_turn -= Self::ROUND_TICKS;
            }
        }
        let mut reports = Vec::new();
        for id in self.world.ids() {
            if self.world.get(id).is_none_or(|monst| monst.is_player) {
                continue;
            }
            for _ in 0..Self::MAX_ACTIONS_PER_ROUND {
                let Some(monst) = self.world.get(id) else {
                    break;
                };
                if monst.ticks_until_turn > 0 || monst.is_dying() {
                    break;
                }
                let debt = monst.ticks_until_turn;
                match self.advance_creature_turn(ctx, combat, id) {
                    Ok(report) => reports.push(report),
                    Err(_) => break,
                }
                if let Some(monst) = self.world.get_mut(id) {
                    monst.ticks_until_turn += debt;
                }
            }
        }
        self.end_turn(ctx);
        reports
    }

    /// Ticks status effects and removes the dead.
    pub fn end_turn(&mut self, ctx: WorldContext<'_>) {
        for id in self.world.ids() {
            self.update_statuses(ctx, id);
        }
        self.remove_dying();
        debug_assert!(self.world.audit_occupancy().is_ok());
    }

    fn update_statuses(&mut self, ctx: WorldContext<'_>, id: CreatureId) {
        let player_id = self.world.player_id();
        let Some(monst) = self.world.get_mut(id) else {
            return;
        };
        if monst.is_player {
            return;
        }
        monst.bookkeeping.just_summoned = false;
        let leader_is_player = monst.leader.is_some() && monst.leader == player_id;
        let on_web = ctx.terrain.has_flag(monst.position, TerrainFlags::ENTANGLES);
        let before = monst.status;

        for kind in [
            StatusKind::Discordant,
            StatusKind::Entranced,
            StatusKind::Confused,
            StatusKind::Levitating,
            StatusKind::ImmuneToFire,
            StatusKind::Burning,
            StatusKind::MagicalFear,
            StatusKind::Invisible,
            StatusKind::Paralyzed,
            StatusKind::Poisoned,
            StatusKind::LifespanRemaining,
            StatusKind::Enraged,
            StatusKind::Nauseous,
            StatusKind::Hasted,
            StatusKind::Slowed,
            StatusKind::Shielded,
        ] {
            let turns = monst.status.get(kind);
            if turns <= 0 || turns >= decision::PERMANENT {
                continue;
            }
            if kind == StatusKind::Levitating && monst.movement.flies {
                continue;
            }
            monst.status.set(kind, turns - 1);
        }
        if monst.has_status(StatusKind::Stuck) && !on_web {
            monst.status.set(StatusKind::Stuck, 0);
        }

        if before.has(StatusKind::Poisoned) {
            let amount = monst.poison_amount.max(1);
            monst.take_damage(amount);
            if !monst.has_status(StatusKind::Poisoned) {
                monst.poison_amount = 0;
            }
        }

        let expired = |kind: StatusKind| before.has(kind) && !monst.status.has(kind);
        let discord_ended = expired(StatusKind::Discordant);
        let fear_ended = expired(StatusKind::MagicalFear);
        let lifespan_ended = expired(StatusKind::LifespanRemaining);

        if discord_ended
            && monst.state == CreatureState::Fleeing
            && !monst.has_status(StatusKind::MagicalFear)
            && leader_is_player
        {
            monst.state = CreatureState::Ally;
        }
        if fear_ended {
            monst.state = if leader_is_player {
                CreatureState::Ally
            } else {
                CreatureState::TrackingScent
            };
        }
        if lifespan_ended {
            monst.bookkeeping.dying = true;
            debug!(creature = %id, "lifespan ran out");
        }
    }

    /// Deferred removal: leadership passes on, links are cleared, owned grids
    /// drop with the creature. Removing a leader can doom bound followers, so
    /// this repeats until nobody is left dying.
    fn remove_dying(&mut self) {
        loop {
            let dying: Vec<CreatureId> = self
                .world
                .iter()
                .filter(|monst| monst.is_dying() && !monst.is_player)
                .map(|monst| monst.id)
                .collect();
            if dying.is_empty() {
                break;
            }
            for id in dying {
                let leader = self.world.get(id).and_then(|monst| monst.leader);
                self.world.demote_from_leadership(id);
                self.world.forget_leader(id);
                if let Some(mut gone) = self.world.remove(id) {
                    gone.release_grids();
                    info!(creature = %id, name = %gone.name, "creature removed");
                }
                if let Some(leader) = leader {
                    self.world.check_continued_leadership(leader);
                }
            }
        }
    }

    /// Fingerprint of every creature's position, state and health plus the
    /// substantive draw count.
    pub fn state_digest(&self) -> StateDigest {
        const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
        const PRIME: u64 = 0x0000_0100_0000_01b3;
        let mut hash = OFFSET;
        let mut feed = |value: i64| {
            for byte in value.to_le_bytes() {
                hash ^= byte as u64;
                hash = hash.wrapping_mul(PRIME);
            }
        };
        for monst in self.world.iter() {
            feed(monst.id.0 as i64);
            feed(monst.position.x as i64);
            feed(monst.position.y as i64);
            feed(monst.state as i64);
            feed(monst.health.current as i64);
            feed(monst.ticks_until_turn as i64);
        }
        StateDigest {
            hash,
            draws: self.rngs.substantive.draws(),
        }
    }
}
