/// Behaviour tuning for the creature AI.
///
/// Every chance, radius and threshold the decision engine consults lives here
/// so content files can adjust difficulty without touching code. Defaults
/// reproduce the classic behaviour.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AiTuning {
    /// Chance per turn that a hunter beyond stealth range keeps the trail.
    pub retain_awareness_percent: i32,
    /// Chance per turn that an unaware creature within stealth range notices.
    pub notice_percent: i32,
    /// Chance that a caster uses an eligible bolt or blink when not forced to.
    pub ability_use_percent: i32,
    /// Chance to notice an invisible creature when choosing melee targets.
    pub invisible_notice_percent: i32,
    /// Chance that a flitting creature lurches in a random direction.
    pub flit_percent: i32,

    /// Hunters flee near death below this share of max health.
    pub flee_near_death_percent: i32,
    /// Fleeing creatures that flee near death recover at this share of max health.
    pub recover_courage_percent: i32,
    /// A feared enemy closer than this turns a hunter into a fugitive.
    pub feared_enemy_radius: i32,
    /// Creatures only fear enemies strictly closer than this.
    pub fear_check_distance: i32,

    /// Allies consider fleeing at or below this share of max health.
    pub ally_flee_health_percent: i32,
    /// ...and only while an enemy is strictly closer than this.
    pub ally_flee_enemy_distance: i32,
    /// Allies chase enemies only while the player is closer than this.
    pub ally_leash: i32,
    /// Leash used on turns after the player rested or searched.
    pub ally_leash_rested: i32,
    /// Allies idle instead of following once this close to the player in view.
    pub ally_mill_distance: i32,
    /// Allies farther than this from the player try to blink along the scent.
    pub ally_blink_toward_distance: i32,

    /// Followers farther than this from their leader move to catch up.
    pub follower_leash: i32,
    pub mill_percent: i32,
    pub worshiper_mill_percent: i32,
    pub captor_mill_percent: i32,

    /// A target's distance map is rebuilt once its own cell reads above this.
    pub map_recompute_distance: i32,
    /// Beyond this distance a creature pathing to another tries to blink toward it.
    pub blink_toward_distance: i32,
    /// Maximum blink travel in cells.
    pub blink_distance: i32,

    pub corpse_absorption_turns: i32,
    /// An interrupted absorption is abandoned once the counter is at or below this.
    pub corpse_abandon_threshold: i32,

    /// Forced summoners stop summoning once this many minions exist.
    pub forced_summon_cap: i32,
    /// Allied summoners stop summoning once this many allies exist.
    pub ally_summon_cap: i32,
    /// Summon-on-entry creatures summon with probability `1 / (n + 1)`.
    pub entry_summon_one_in: i32,

    /// Turns a creature may stand still before flee maps treat it as a wall.
    pub stationary_obstacle_turns: i32,
    /// Same idea for the safe-terrain map.
    pub stationary_hazard_turns: i32,
}

impl AiTuning {
    // ===== compile-time constants =====
    /// Distance value meaning "no path".
    pub const UNREACHABLE: i32 = 30_000;
    /// Upper bound on perceived distance.
    pub const PERCEPTION_CAP: i32 = 1_000;
    /// Waypoint visit flags are stored as a 64-bit set.
    pub const MAX_WAYPOINTS: usize = 64;
    pub const MAX_BOLTS: usize = 8;
    pub const MAX_SUMMONS: usize = 4;
    /// Number of aim points sampled on the perimeter when choosing a blink.
    pub const BLINK_SAMPLES: i32 = 40;
    /// Radius of the square those aim points sit on.
    pub const BLINK_AIM_RADIUS: i32 = 5;
    /// Safety value given to unreachable cells before the flee transform.
    pub const SAFETY_UNREACHABLE_DISTANCE: i32 = 150;
    /// Safety bonus subtracted for cells that lie on a loop.
    pub const LOOP_SAFETY_BONUS: i32 = 10;
    /// Movement cost of deep water and brimstone in the safety maps.
    pub const HAZARD_STEP_COST: i32 = 5;
    /// Player cost for secret doors the player cannot see.
    pub const HIDDEN_DOOR_PLAYER_COST: i32 = 100;

    pub fn new() -> Self {
        Self {
            retain_awareness_percent: 97,
            notice_percent: 25,
            ability_use_percent: 30,
            invisible_notice_percent: 33,
            flit_percent: 33,
            flee_near_death_percent: 25,
            recover_courage_percent: 75,
            feared_enemy_radius: 3,
            fear_check_distance: 4,
            ally_flee_health_percent: 33,
            ally_flee_enemy_distance: 10,
            ally_leash: 4,
            ally_leash_rested: 10,
            ally_mill_distance: 3,
            ally_blink_toward_distance: 10,
            follower_leash: 2,
            mill_percent: 30,
            worshiper_mill_percent: 100,
            captor_mill_percent: 10,
            map_recompute_distance: 3,
            blink_toward_distance: 10,
            blink_distance: 12,
            corpse_absorption_turns: 20,
            corpse_abandon_threshold: 15,
            forced_summon_cap: 50,
            ally_summon_cap: 5,
            entry_summon_one_in: 7,
            stationary_obstacle_turns: 2,
            stationary_hazard_turns: 1,
        }
    }
}

impl Default for AiTuning {
    fn default() -> Self {
        Self::new()
    }
}
