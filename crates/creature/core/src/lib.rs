//! Creature intelligence for a turn-based dungeon: navigation grids,
//! perception, per-creature state machines, turn decisions and team relations.
//!
//! `creature-core` is pure and deterministic. Terrain, field of view, the scent
//! trail and combat resolution are supplied by the caller through the traits in
//! [`env`], and every random decision draws from an explicit [`RngStream`] so a
//! seed reproduces a run exactly. [`Simulation`] is the entry point: it owns
//! the creature arena and the shared grids and advances creatures one turn at
//! a time.
pub mod avoidance;
pub mod config;
pub mod creature;
pub mod env;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod perception;
pub mod relations;
pub mod rng;
pub mod state_machine;
pub mod view;
pub mod world;

mod decision;
mod leadership;
mod sim;
mod swarm;

pub use config::AiTuning;
pub use creature::{
    Abilities, AbilityId, BehaviorTraits, Bolt, BoltEffect, Bookkeeping, CombatTraits, CorpseClaim,
    CorpseGift, Creature, CreatureId, CreatureMode, CreatureState, Health, MovementTraits,
    Relationship, StatusEffects, StatusKind,
};
pub use decision::{TurnAction, TurnReport, TurnStart};
pub use env::{
    AttackReport, BoltReport, CombatResolver, ScentOracle, TerrainFlags, TerrainOracle,
    VisibilityOracle, WorldContext,
};
pub use error::{CoreError, ErrorSeverity, WorldError};
pub use geometry::{Dimensions, Direction, Position, distance_between};
pub use grid::{
    CostGrid, DistanceGrid, Grid, GridKind, SharedGrids, StepCost, WaypointSet, WaypointVisits,
    calculate_distances, next_step, propagate, rescan, terrain_costs,
};
pub use rng::{RngStream, Rngs};
pub use sim::{Simulation, StateDigest};
pub use state_machine::{TransitionInputs, TransitionRule, select_rule};
pub use view::WorldView;
pub use world::World;
