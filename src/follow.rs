use std::collections::{BTreeSet, HashMap, VecDeque};

/// Frames of trail between consecutive followers.
pub const FOLLOW_DELAY: usize = 6;
/// Followers that get their own spot on the trail. Later slots share the tail.
pub const MAX_FOLLOWS: usize = 16;

/// Stable identity of a tracked entity for the lifetime of a level.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct EntityId(pub u32);

/// The leader's most recent distinct pixel positions, oldest first.
#[derive(Clone, Debug)]
pub struct Trail {
    history: VecDeque<(i32, i32)>,
}

impl Trail {
    pub fn new(start: (i32, i32)) -> Self {
        Self {
            history: std::iter::repeat(start)
                .take(FOLLOW_DELAY * MAX_FOLLOWS)
                .collect(),
        }
    }

    /// Appends `pos` unless the leader has not moved.
    pub fn record(&mut self, pos: (i32, i32)) {
        if self.history.back() == Some(&pos) {
            return;
        }
        self.history.pop_front();
        self.history.push_back(pos);
    }

    /// Where the follower holding `slot` should stand.
    pub fn position_for_slot(&self, slot: usize) -> (i32, i32) {
        let back = (FOLLOW_DELAY * (slot + 1)).min(self.history.len());
        self.history[self.history.len() - back]
    }

    pub fn reset(&mut self, pos: (i32, i32)) {
        for p in self.history.iter_mut() {
            *p = pos;
        }
    }
}

/// Follower bookkeeping for one leader.
///
/// Each entity gets a trail slot the first time it follows and keeps that
/// slot for good; slots are never handed to anyone else, even after the
/// entity stops following.
#[derive(Clone, Debug, Default)]
pub struct FollowRegistry {
    slots: HashMap<EntityId, usize>,
    active: BTreeSet<EntityId>,
    next_slot: usize,
}

impl FollowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot for `id`, assigning the next free one on first contact.
    pub fn slot_of(&mut self, id: EntityId) -> usize {
        let next = &mut self.next_slot;
        *self.slots.entry(id).or_insert_with(|| {
            let slot = *next;
            *next += 1;
            slot
        })
    }

    /// Starts following. Returns false if `id` was already following.
    pub fn follow(&mut self, id: EntityId) -> bool {
        self.slot_of(id);
        self.active.insert(id)
    }

    /// Stops following. Returns false if `id` was not following.
    pub fn unfollow(&mut self, id: EntityId) -> bool {
        self.active.remove(&id)
    }

    pub fn is_following(&self, id: EntityId) -> bool {
        self.active.contains(&id)
    }

    /// Active followers in id order.
    pub fn followers(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.active.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

/// A leader's trail together with who is following it.
#[derive(Clone, Debug)]
pub struct FollowChain {
    pub trail: Trail,
    pub registry: FollowRegistry,
}

impl FollowChain {
    pub fn new(start: (i32, i32)) -> Self {
        Self {
            trail: Trail::new(start),
            registry: FollowRegistry::new(),
        }
    }

    pub fn follower_pos(&mut self, id: EntityId) -> (i32, i32) {
        let slot = self.registry.slot_of(id);
        self.trail.position_for_slot(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_are_assigned_once_and_never_reused() {
        let mut reg = FollowRegistry::new();
        assert!(reg.follow(EntityId(7)));
        assert!(reg.follow(EntityId(3)));
        assert!(!reg.follow(EntityId(7)));
        assert_eq!(reg.slot_of(EntityId(7)), 0);
        assert_eq!(reg.slot_of(EntityId(3)), 1);

        assert!(reg.unfollow(EntityId(7)));
        assert!(!reg.is_following(EntityId(7)));
        assert!(reg.follow(EntityId(9)));
        assert_eq!(reg.slot_of(EntityId(9)), 2);

        reg.follow(EntityId(7));
        assert_eq!(reg.slot_of(EntityId(7)), 0);
        assert_eq!(reg.followers().collect::<Vec<_>>(), vec![
            EntityId(3),
            EntityId(7),
            EntityId(9)
        ]);
    }

    #[test]
    fn trail_staggers_followers() {
        let mut trail = Trail::new((0, 0));
        for x in 1..=20 {
            trail.record((x, 0));
        }
        trail.record((20, 0));
        assert_eq!(trail.position_for_slot(0), (15, 0));
        assert_eq!(trail.position_for_slot(1), (9, 0));
        assert_eq!(trail.position_for_slot(2), (3, 0));
        assert_eq!(trail.position_for_slot(3), (0, 0));
        assert_eq!(trail.position_for_slot(500), (0, 0));
    }
}
