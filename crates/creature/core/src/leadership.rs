//! Leader/follower bookkeeping when hordes lose members.

use tracing::debug;

use crate::creature::CreatureId;
use crate::world::World;

impl World {
    /// Strips leadership from `id` and hands its followers to a successor.
    ///
    /// The first follower not bound to the leader takes over; the others
    /// re-attach to it and adopt the old leader's waypoint. Bound followers
    /// are released and marked dying so they leave with their leader.
    pub fn demote_from_leadership(&mut self, id: CreatureId) {
        let waypoint = match self.get_mut(id) {
            Some(leader) => {
                leader.bookkeeping.leader = false;
                leader.map_to_me = None;
                leader.target_waypoint
            }
            None => None,
        };

        let mut successor: Option<CreatureId> = None;
        let mut adopted = 0usize;
        for follower_id in self.ids() {
            let Some(follower) = self.get_mut(follower_id) else {
                continue;
            };
            if follower_id == id || follower.leader != Some(id) {
                continue;
            }
            if follower.bookkeeping.bound_to_leader {
                follower.leader = None;
                follower.bookkeeping.follower = false;
                follower.bookkeeping.dying = true;
            } else if let Some(new_leader) = successor {
                follower.leader = Some(new_leader);
                follower.target_waypoint = waypoint;
                if let Some(index) = waypoint {
                    follower.visited_waypoints.clear(index);
                }
                adopted += 1;
            } else {
                follower.bookkeeping.leader = true;
                follower.bookkeeping.follower = false;
                follower.leader = None;
                successor = Some(follower_id);
            }
        }

        if let Some(new_leader) = successor {
            if adopted == 0
                && let Some(lonely) = self.get_mut(new_leader)
            {
                lonely.bookkeeping.leader = false;
            }
            debug!(old = %id, new = %new_leader, followers = adopted, "leadership passed on");
        }
    }

    /// Clears the leader flag from a creature nobody follows any more.
    pub fn check_continued_leadership(&mut self, id: CreatureId) {
        let still_followed = self
            .iter()
            .any(|other| other.id != id && other.leader == Some(id));
        if let Some(leader) = self.get_mut(id)
            && leader.bookkeeping.leader
            && !still_followed
        {
            leader.bookkeeping.leader = false;
        }
    }

    /// Drops every leader link that points at `id`.
    pub fn forget_leader(&mut self, id: CreatureId) {
        for other in self.ids() {
            if let Some(creature) = self.get_mut(other)
                && creature.leader == Some(id)
            {
                creature.leader = None;
                creature.bookkeeping.follower = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::creature::{Creature, CreatureId};
    use crate::geometry::{Dimensions, Position};
    use crate::world::World;

    fn horde(followers: usize) -> (World, CreatureId, Vec<CreatureId>) {
        let mut world = World::new(Dimensions::new(12, 5));
        let mut chief = Creature::new("ogre shaman", Position::new(1, 1));
        chief.bookkeeping.leader = true;
        chief.target_waypoint = Some(2);
        let chief = world.spawn(chief).unwrap();
        let ids = (0..followers)
            .map(|i| {
                world
                    .spawn(Creature::new("ogre", Position::new(2 + i as i32, 1)).with_leader(chief))
                    .unwrap()
            })
            .collect();
        (world, chief, ids)
    }

    #[test]
    fn first_follower_takes_over() {
        let (mut world, chief, ids) = horde(3);
        world.demote_from_leadership(chief);

        let heir = world.get(ids[0]).unwrap();
        assert!(heir.bookkeeping.leader);
        assert!(!heir.bookkeeping.follower);
        for &id in &ids[1..] {
            let follower = world.get(id).unwrap();
            assert_eq!(follower.leader, Some(ids[0]));
            assert_eq!(follower.target_waypoint, Some(2));
        }
        assert!(!world.get(chief).unwrap().bookkeeping.leader);
    }

    #[test]
    fn a_lone_heir_is_not_a_leader() {
        let (mut world, chief, ids) = horde(1);
        world.demote_from_leadership(chief);
        assert!(!world.get(ids[0]).unwrap().bookkeeping.leader);
    }

    #[test]
    fn bound_followers_die_with_the_leader() {
        let (mut world, chief, ids) = horde(2);
        world.get_mut(ids[0]).unwrap().bookkeeping.bound_to_leader = true;
        world.demote_from_leadership(chief);

        let bound = world.get(ids[0]).unwrap();
        assert!(bound.is_dying());
        assert_eq!(bound.leader, None);
        // the unbound follower inherits, with nobody left to lead
        assert!(!world.get(ids[1]).unwrap().bookkeeping.leader);
    }

    #[test]
    fn leadership_lapses_without_followers() {
        let (mut world, chief, ids) = horde(1);
        world.check_continued_leadership(chief);
        assert!(world.get(chief).unwrap().bookkeeping.leader);
        world.forget_leader(chief);
        assert!(!world.get(ids[0]).unwrap().bookkeeping.follower);
        world.check_continued_leadership(chief);
        assert!(!world.get(chief).unwrap().bookkeeping.leader);
    }
}
