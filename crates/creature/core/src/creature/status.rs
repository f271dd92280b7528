use strum::{EnumCount, EnumIter};

/// Timed status effects. Each is a remaining-turns counter; zero means inactive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumCount, EnumIter, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatusKind {
    Discordant,
    Entranced,
    Confused,
    Levitating,
    ImmuneToFire,
    Burning,
    MagicalFear,
    Invisible,
    Paralyzed,
    Stuck,
    Poisoned,
    LifespanRemaining,
    Enraged,
    Nauseous,
    Hasted,
    Slowed,
    Shielded,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffects {
    turns: [i32; StatusKind::COUNT],
}

impl StatusEffects {
    pub fn get(&self, kind: StatusKind) -> i32 {
        self.turns[kind as usize]
    }

    pub fn set(&mut self, kind: StatusKind, turns: i32) {
        self.turns[kind as usize] = turns;
    }

    pub fn with(mut self, kind: StatusKind, turns: i32) -> Self {
        self.set(kind, turns);
        self
    }

    pub fn has(&self, kind: StatusKind) -> bool {
        self.get(kind) > 0
    }

    /// Extends an effect without shortening one already running.
    pub fn extend(&mut self, kind: StatusKind, turns: i32) {
        let current = self.get(kind);
        self.set(kind, current.max(turns));
    }

    /// Counts down every active effect by one turn.
    pub fn tick(&mut self) {
        for value in self.turns.iter_mut() {
            if *value > 0 {
                *value -= 1;
            }
        }
    }

    pub fn clear(&mut self) {
        self.turns = [0; StatusKind::COUNT];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_stops_at_zero() {
        let mut status = StatusEffects::default().with(StatusKind::Confused, 1);
        status.tick();
        status.tick();
        assert_eq!(status.get(StatusKind::Confused), 0);
        assert!(!status.has(StatusKind::Confused));
    }

    #[test]
    fn extend_never_shortens() {
        let mut status = StatusEffects::default().with(StatusKind::Burning, 5);
        status.extend(StatusKind::Burning, 3);
        assert_eq!(status.get(StatusKind::Burning), 5);
        status.extend(StatusKind::Burning, 8);
        assert_eq!(status.get(StatusKind::Burning), 8);
    }
}
