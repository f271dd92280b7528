//! Capability sets. Plain boolean fields keep templates readable in data files.

/// How a creature moves and what terrain it tolerates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MovementTraits {
    pub flies: bool,
    pub flits: bool,
    pub immobile: bool,
    pub restricted_to_liquid: bool,
    pub submerges: bool,
    /// Stationary until something triggers it; acts like a trap.
    pub gets_turn_on_activation: bool,
    pub immune_to_webs: bool,
    pub immune_to_water: bool,
    pub fiery: bool,
    pub inanimate: bool,
}

/// How a creature fights and how it can be hurt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CombatTraits {
    pub invulnerable: bool,
    pub immune_to_weapons: bool,
    pub attackable_thru_walls: bool,
    pub poisons: bool,
    pub kamikaze: bool,
    /// Steals an item on hit, then runs for good.
    pub hit_steal_flee: bool,
    pub seizes: bool,
}

/// Standing behavioural tendencies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BehaviorTraits {
    pub always_hunting: bool,
    pub flees_near_death: bool,
    pub maintains_distance: bool,
    /// Pack hunters that refuse to follow into corridors.
    pub avoid_corridors: bool,
    pub always_use_ability: bool,
    pub cast_spells_slowly: bool,
}

/// Per-creature state flags maintained by the engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Bookkeeping {
    pub follower: bool,
    pub leader: bool,
    pub captive: bool,
    pub submerged: bool,
    pub dying: bool,
    pub seized: bool,
    pub seizing: bool,
    pub given_up_on_scent: bool,
    pub absorbing: bool,
    pub does_not_track_leader: bool,
    /// Dies together with its leader.
    pub bound_to_leader: bool,
    pub marked_for_sacrifice: bool,
    pub just_summoned: bool,
}
