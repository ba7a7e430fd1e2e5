//! Hash clone slot pool.
//!
//! Cloning a running hash spans two messages on two connections: the source
//! connection reserves a slot and hands the slot index back to its caller,
//! and the target connection later presents the index to resolve the source
//! and perform the engine-level clone. The pool is the custody mechanism in
//! between: fixed capacity, reference counted, and a slot's source is only
//! ever revealed to the caller that reserved it.

use vaultgate_proto::{CallerId, ChannelId, Status};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slot {
    owner: CallerId,
    source: ChannelId,
    ref_count: u32,
}

/// Fixed-capacity pool of pending hash clone operations.
#[derive(Debug)]
pub struct HashClonePool {
    slots: Vec<Option<Slot>>,
}

impl HashClonePool {
    /// Create a pool with `capacity` slots.
    pub fn new(capacity: usize) -> Self {
        Self { slots: vec![None; capacity] }
    }

    /// Reserve a slot for `(owner, source)`, returning its index.
    ///
    /// Re-entry is idempotent: if the pair already holds a live slot, its
    /// reference count is incremented and the same index returned. A full
    /// pool refuses with [`Status::BadState`].
    pub fn reserve(&mut self, owner: CallerId, source: ChannelId) -> Result<usize, Status> {
        if let Some(index) = self.slots.iter().position(|slot| {
            slot.is_some_and(|slot| slot.owner == owner && slot.source == source)
        }) {
            if let Some(Some(slot)) = self.slots.get_mut(index) {
                slot.ref_count += 1;
            }
            return Ok(index);
        }

        let index = self
            .slots
            .iter()
            .position(Option::is_none)
            .ok_or(Status::BadState)?;
        self.slots[index] = Some(Slot { owner, source, ref_count: 1 });
        Ok(index)
    }

    /// Resolve a slot index to its source connection, consuming one reference.
    ///
    /// A dead slot, an out-of-range index, or a caller other than the one
    /// that reserved the slot refuses with [`Status::BadState`]; the slot is
    /// untouched in that case. The slot is freed when its reference count
    /// reaches zero.
    pub fn resolve(&mut self, index: usize, caller: CallerId) -> Result<ChannelId, Status> {
        let entry = self.slots.get_mut(index).ok_or(Status::BadState)?;
        let slot = entry.as_mut().ok_or(Status::BadState)?;
        if slot.owner != caller {
            return Err(Status::BadState);
        }

        let source = slot.source;
        slot.ref_count -= 1;
        if slot.ref_count == 0 {
            *entry = None;
        }
        Ok(source)
    }

    /// Force-free every slot whose source is `source`.
    ///
    /// Called when the source operation ends (finish, verify, abort, or
    /// disconnect); pending clones of a finalized state must not resolve.
    pub fn release_all_for(&mut self, source: ChannelId) {
        for entry in &mut self.slots {
            if entry.is_some_and(|slot| slot.source == source) {
                *entry = None;
            }
        }
    }

    /// Free every slot (subsystem teardown).
    pub fn clear(&mut self) {
        self.slots.fill(None);
    }

    /// Number of live slots.
    pub fn live(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: CallerId = CallerId(1);
    const BOB: CallerId = CallerId(2);
    const SOURCE_A: ChannelId = ChannelId(10);
    const SOURCE_B: ChannelId = ChannelId(11);

    #[test]
    fn reserve_is_idempotent_per_owner_and_source() {
        let mut pool = HashClonePool::new(2);
        let first = pool.reserve(ALICE, SOURCE_A).unwrap();
        let second = pool.reserve(ALICE, SOURCE_A).unwrap();
        assert_eq!(first, second);
        assert_eq!(pool.live(), 1);

        // Two references now outstanding; both must resolve.
        assert_eq!(pool.resolve(first, ALICE), Ok(SOURCE_A));
        assert_eq!(pool.live(), 1);
        assert_eq!(pool.resolve(first, ALICE), Ok(SOURCE_A));
        assert_eq!(pool.live(), 0);
        assert_eq!(pool.resolve(first, ALICE), Err(Status::BadState));
    }

    #[test]
    fn distinct_sources_take_distinct_slots() {
        let mut pool = HashClonePool::new(2);
        let a = pool.reserve(ALICE, SOURCE_A).unwrap();
        let b = pool.reserve(ALICE, SOURCE_B).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn exhausted_pool_refuses() {
        let mut pool = HashClonePool::new(1);
        pool.reserve(ALICE, SOURCE_A).unwrap();
        assert_eq!(pool.reserve(BOB, SOURCE_B), Err(Status::BadState));
    }

    #[test]
    fn foreign_caller_cannot_resolve() {
        let mut pool = HashClonePool::new(2);
        let index = pool.reserve(ALICE, SOURCE_A).unwrap();
        assert_eq!(pool.resolve(index, BOB), Err(Status::BadState));
        // The refusal leaves the slot intact for the owner.
        assert_eq!(pool.resolve(index, ALICE), Ok(SOURCE_A));
    }

    #[test]
    fn out_of_range_index_refuses() {
        let mut pool = HashClonePool::new(1);
        assert_eq!(pool.resolve(5, ALICE), Err(Status::BadState));
    }

    #[test]
    fn release_all_for_frees_only_matching_sources() {
        let mut pool = HashClonePool::new(3);
        let a = pool.reserve(ALICE, SOURCE_A).unwrap();
        let b = pool.reserve(BOB, SOURCE_B).unwrap();
        pool.reserve(ALICE, SOURCE_A).unwrap();

        pool.release_all_for(SOURCE_A);
        assert_eq!(pool.resolve(a, ALICE), Err(Status::BadState));
        assert_eq!(pool.resolve(b, BOB), Ok(SOURCE_B));
    }

    #[test]
    fn freed_slot_is_reusable() {
        let mut pool = HashClonePool::new(1);
        let index = pool.reserve(ALICE, SOURCE_A).unwrap();
        pool.resolve(index, ALICE).unwrap();
        assert!(pool.reserve(BOB, SOURCE_B).is_ok());
    }
}
