//! Shared fixtures: an ASCII level, scripted oracles and a recording combat
//! resolver.
#![allow(dead_code)]

use creature_core::{
    AbilityId, AiTuning, AttackReport, BoltReport, CombatResolver, Creature, CreatureId,
    Dimensions, Position, ScentOracle, TerrainFlags, TerrainOracle, VisibilityOracle, WorldContext,
    geometry::scent_distance,
};

/// Terrain parsed from rows of text.
///
/// `#` wall, `.` floor, `~` deep water, `^` fire, `>` stairs. Anything else
/// reads as floor.
pub struct AsciiLevel {
    dims: Dimensions,
    cells: Vec<TerrainFlags>,
    stairs: Vec<Position>,
}

impl AsciiLevel {
    pub fn parse(rows: &[&str]) -> Self {
        let height = rows.len() as u32;
        let width = rows.iter().map(|row| row.len()).max().unwrap_or(0) as u32;
        let dims = Dimensions::new(width, height);
        let mut cells = vec![TerrainFlags::empty(); dims.cell_count()];
        let mut stairs = Vec::new();
        for (y, row) in rows.iter().enumerate() {
            for (x, glyph) in row.chars().enumerate() {
                let flags = match glyph {
                    '#' => {
                        TerrainFlags::OBSTRUCTS_PASSABILITY
                            | TerrainFlags::OBSTRUCTS_VISION
                            | TerrainFlags::OBSTRUCTS_DIAGONAL_MOVEMENT
                    }
                    '~' => TerrainFlags::IS_DEEP_WATER | TerrainFlags::ALLOWS_SUBMERGING,
                    '^' => TerrainFlags::IS_FIRE,
                    '>' => {
                        stairs.push(Position::new(x as i32, y as i32));
                        TerrainFlags::empty()
                    }
                    _ => TerrainFlags::empty(),
                };
                cells[x * height as usize + y] = flags;
            }
        }
        Self {
            dims,
            cells,
            stairs,
        }
    }

    /// An open room of the given size ringed by walls.
    pub fn room(width: u32, height: u32) -> Self {
        let rows: Vec<String> = (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| {
                        if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
                            '#'
                        } else {
                            '.'
                        }
                    })
                    .collect()
            })
            .collect();
        let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
        Self::parse(&rows)
    }
}

impl TerrainOracle for AsciiLevel {
    fn dimensions(&self) -> Dimensions {
        self.dims
    }

    fn flags_at(&self, position: Position) -> TerrainFlags {
        if !self.dims.contains(position) {
            return TerrainFlags::empty();
        }
        self.cells[position.x as usize * self.dims.height as usize + position.y as usize]
    }

    fn is_stairs(&self, position: Position) -> bool {
        self.stairs.contains(&position)
    }
}

/// Sees everything, or nothing.
pub struct Sight {
    pub everything: bool,
}

impl VisibilityOracle for Sight {
    fn in_field_of_view(&self, _cell: Position) -> bool {
        self.everything
    }

    fn can_directly_see(&self, _observer: Position, _target: Position) -> bool {
        self.everything
    }
}

/// A fresh scent trail laid by a player standing at `source`.
pub struct FreshScent {
    pub source: Position,
    pub epoch: i32,
}

impl ScentOracle for FreshScent {
    fn scent_at(&self, cell: Position) -> i32 {
        self.epoch - scent_distance(cell, self.source)
    }

    fn scent_turn(&self) -> i32 {
        self.epoch
    }
}

/// No scent anywhere: every cell reads as ancient.
pub struct NoScent;

impl ScentOracle for NoScent {
    fn scent_at(&self, _cell: Position) -> i32 {
        0
    }

    fn scent_turn(&self) -> i32 {
        AiTuning::PERCEPTION_CAP * 2
    }
}

/// Every blow lands for a fixed amount; every exchange is recorded.
#[derive(Default)]
pub struct RecordingCombat {
    pub damage: i32,
    pub attacks: Vec<(CreatureId, CreatureId)>,
    pub bolts: Vec<(CreatureId, CreatureId, AbilityId)>,
}

impl RecordingCombat {
    pub fn hitting_for(damage: i32) -> Self {
        Self {
            damage,
            ..Self::default()
        }
    }
}

impl CombatResolver for RecordingCombat {
    fn perform_attack(&mut self, attacker: &Creature, defender: &Creature) -> AttackReport {
        self.attacks.push((attacker.id, defender.id));
        AttackReport {
            hit: self.damage > 0,
            damage: self.damage,
            reflected: 0,
        }
    }

    fn cast_bolt(&mut self, caster: &Creature, target: &Creature, ability: AbilityId) -> BoltReport {
        self.bolts.push((caster.id, target.id, ability));
        BoltReport {
            damage: self.damage,
            ..BoltReport::default()
        }
    }

    fn summon_minions(&mut self, summoner: &Creature) -> Vec<Creature> {
        vec![Creature::new(format!("{} spawn", summoner.name), summoner.position)]
    }
}

/// A level with its oracles, ready to hand out contexts.
pub struct Fixture<S: ScentOracle = FreshScent> {
    pub level: AsciiLevel,
    pub sight: Sight,
    pub scent: S,
    pub tuning: AiTuning,
}

impl Fixture<FreshScent> {
    /// Open room, full visibility, scent centred on `player`.
    pub fn open_room(width: u32, height: u32, player: Position) -> Self {
        Self {
            level: AsciiLevel::room(width, height),
            sight: Sight { everything: true },
            scent: FreshScent {
                source: player,
                epoch: 1_000,
            },
            tuning: AiTuning::default(),
        }
    }
}

impl<S: ScentOracle> Fixture<S> {
    pub fn ctx(&self) -> WorldContext<'_> {
        WorldContext::new(&self.level, &self.sight, &self.scent, &self.tuning)
    }

    pub fn dims(&self) -> Dimensions {
        self.level.dimensions()
    }
}
