//! How far away a target seems to a creature, and whether it notices.

use tracing::trace;

use crate::config::AiTuning;
use crate::creature::{Creature, CreatureState};
use crate::geometry::scent_distance;
use crate::rng::RngStream;
use crate::view::WorldView;

impl WorldView<'_> {
    /// Perceived distance from `observer` to `target`, in half-cells.
    ///
    /// Reads the age of the scent under the observer, or the direct distance
    /// when the two have a clear line, whichever is smaller. Capped at
    /// [`AiTuning::PERCEPTION_CAP`]; a negative scent age also reads as the cap.
    pub fn awareness_distance(&self, observer: &Creature, target: &Creature) -> i32 {
        let scent = self.ctx.scent;
        let mut perceived = scent.scent_turn() - scent.scent_at(observer.position);
        let sees = if target.is_player {
            self.in_view(observer.position)
        } else {
            self.open_path_between(observer.position, target.position)
        };
        if sees {
            perceived = perceived.min(scent_distance(observer.position, target.position));
        }
        perceived = perceived.min(AiTuning::PERCEPTION_CAP);
        if perceived < 0 {
            AiTuning::PERCEPTION_CAP
        } else {
            perceived
        }
    }

    /// Whether `observer` is aware of `target` as of this turn.
    ///
    /// Awareness is sticky: a creature already hunting loses the trail only
    /// occasionally while it stays within three times its awareness radius.
    /// Draws at most one number from `rng`.
    pub fn aware_of_target(
        &self,
        rng: &mut RngStream,
        stealth_range: i32,
        observer: &Creature,
        target: &Creature,
    ) -> bool {
        let tuning = self.tuning();
        let perceived = self.awareness_distance(observer, target);
        let awareness = stealth_range * 2;
        debug_assert!(perceived >= 0 && awareness >= 0);

        let aware = if observer.behavior.always_hunting {
            true
        } else if observer.movement.immobile {
            perceived <= awareness
        } else if perceived > awareness * 3 {
            false
        } else if observer.state == CreatureState::TrackingScent {
            perceived <= awareness || rng.percent(tuning.retain_awareness_percent)
        } else if target.is_player && !self.in_view(observer.position) {
            false
        } else if perceived <= awareness {
            rng.percent(tuning.notice_percent)
        } else {
            false
        };
        trace!(observer = %observer.id, target = %target.id, perceived, awareness, aware, "awareness check");
        aware
    }
}
