//! Creature records and the vocabulary of AI states.
mod abilities;
mod status;
mod traits;

pub use abilities::{Abilities, AbilityId, Bolt, BoltEffect};
pub use status::{StatusEffects, StatusKind};
pub use traits::{BehaviorTraits, Bookkeeping, CombatTraits, MovementTraits};

use core::fmt;

use crate::geometry::Position;
use crate::grid::{DistanceGrid, WaypointVisits};

/// Stable arena handle. Ids are never reused within a simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CreatureId(pub u32);

impl fmt::Display for CreatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CreatureState {
    Sleeping,
    Wandering,
    TrackingScent,
    Fleeing,
    Ally,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CreatureMode {
    #[default]
    Normal,
    PermanentlyFleeing,
}

/// How one creature regards another.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
pub enum Relationship {
    Ally,
    Enemy,
    Neutral,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Health {
    pub current: i32,
    pub max: i32,
}

impl Health {
    pub const fn full(max: i32) -> Self {
        Self { current: max, max }
    }

    /// Current health as a whole percentage of the maximum.
    pub fn percent(&self) -> i32 {
        if self.max <= 0 {
            return 0;
        }
        100 * self.current / self.max
    }
}

/// Capability gained by finishing a corpse.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CorpseGift {
    Bolt(Bolt),
    Flight,
    FireImmunity,
    Invisibility,
    Fiery,
}

/// A corpse an ally has been offered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CorpseClaim {
    pub position: Position,
    /// Turns left; counts down every turn, absorbing or not.
    pub counter: i32,
    pub gift: CorpseGift,
}

/// A creature on the current level, including the player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Creature {
    /// Assigned by the arena on spawn.
    pub id: CreatureId,
    pub name: String,
    pub is_player: bool,
    pub position: Position,
    pub state: CreatureState,
    pub mode: CreatureMode,
    pub health: Health,
    /// Zero means the creature never regenerates.
    pub turns_between_regen: i32,
    /// Upper bound of one melee hit.
    pub max_damage: i32,
    pub movement_speed: i32,
    pub attack_speed: i32,
    pub ticks_until_turn: i32,
    pub movement: MovementTraits,
    pub combat: CombatTraits,
    pub behavior: BehaviorTraits,
    pub abilities: Abilities,
    pub status: StatusEffects,
    /// Damage per turn while poisoned.
    pub poison_amount: i32,
    pub bookkeeping: Bookkeeping,
    pub leader: Option<CreatureId>,
    pub carries_item: bool,
    /// Distance map toward this creature, built on demand by pursuers.
    pub map_to_me: Option<Box<DistanceGrid>>,
    /// Private snapshot of the safety grid taken while fleeing out of sight.
    pub safety_map: Option<Box<DistanceGrid>>,
    pub target_waypoint: Option<usize>,
    pub visited_waypoints: WaypointVisits,
    pub last_seen_player_at: Position,
    pub turns_spent_stationary: i32,
    pub corpse: Option<CorpseClaim>,
}

impl Creature {
    pub const DEFAULT_SPEED: i32 = 100;

    pub fn new(name: impl Into<String>, position: Position) -> Self {
        Self {
            id: CreatureId(u32::MAX),
            name: name.into(),
            is_player: false,
            position,
            state: CreatureState::Wandering,
            mode: CreatureMode::Normal,
            health: Health::full(10),
            turns_between_regen: 20,
            max_damage: 3,
            movement_speed: Self::DEFAULT_SPEED,
            attack_speed: Self::DEFAULT_SPEED,
            ticks_until_turn: 0,
            movement: MovementTraits::default(),
            combat: CombatTraits::default(),
            behavior: BehaviorTraits::default(),
            abilities: Abilities::default(),
            status: StatusEffects::default(),
            poison_amount: 0,
            bookkeeping: Bookkeeping::default(),
            leader: None,
            carries_item: false,
            map_to_me: None,
            safety_map: None,
            target_waypoint: None,
            visited_waypoints: WaypointVisits::default(),
            last_seen_player_at: position,
            turns_spent_stationary: 0,
            corpse: None,
        }
    }

    pub fn player(position: Position) -> Self {
        let mut player = Self::new("player", position);
        player.is_player = true;
        player.health = Health::full(40);
        player
    }

    pub fn with_state(mut self, state: CreatureState) -> Self {
        self.state = state;
        self
    }

    pub fn with_health(mut self, current: i32, max: i32) -> Self {
        self.health = Health { current, max };
        self
    }

    pub fn with_leader(mut self, leader: CreatureId) -> Self {
        self.leader = Some(leader);
        self.bookkeeping.follower = true;
        self
    }

    pub fn is_dying(&self) -> bool {
        self.bookkeeping.dying
    }

    pub fn is_ally(&self) -> bool {
        self.state == CreatureState::Ally
    }

    /// On the player's side: the player or one of its allies.
    pub fn sides_with_player(&self) -> bool {
        self.is_player || self.is_ally()
    }

    pub fn follows(&self, leader: CreatureId) -> bool {
        self.bookkeeping.follower && self.leader == Some(leader)
    }

    pub fn has_status(&self, kind: StatusKind) -> bool {
        self.status.has(kind)
    }

    /// Flying creatures levitate permanently.
    pub fn is_levitating(&self) -> bool {
        self.movement.flies || self.has_status(StatusKind::Levitating)
    }

    /// Ticks consumed by casting a spell or blinking.
    pub fn casting_ticks(&self) -> i32 {
        if self.behavior.cast_spells_slowly {
            self.attack_speed * 2
        } else {
            self.attack_speed
        }
    }

    /// Immune to damage and unable to move out of the way.
    pub fn is_immovable_obstacle(&self) -> bool {
        (self.combat.immune_to_weapons || self.combat.invulnerable)
            && (self.movement.immobile || self.movement.gets_turn_on_activation)
    }

    /// Applies damage and marks the creature dying at zero health.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        if amount <= 0 || self.combat.invulnerable {
            return false;
        }
        self.health.current -= amount;
        if self.health.current <= 0 && !self.is_player {
            self.bookkeeping.dying = true;
        }
        self.bookkeeping.dying
    }

    pub fn heal(&mut self, amount: i32) {
        self.health.current = (self.health.current + amount.max(0)).min(self.health.max);
    }

    /// Drops both owned navigation grids.
    pub fn release_grids(&mut self) {
        self.map_to_me = None;
        self.safety_map = None;
    }
}
