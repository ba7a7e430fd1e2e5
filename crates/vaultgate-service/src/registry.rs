//! Access-control registry for engine key handles.
//!
//! The engine hands out handles with no notion of who asked; the broker is
//! the custodian. Every handle that crosses the boundary to a caller is
//! registered here first, and every handle-taking call checks permission
//! before the engine is invoked.

use std::collections::HashMap;

use vaultgate_engine::KeyHandle;
use vaultgate_proto::CallerId;

/// Maps live key handles to the caller that owns them.
#[derive(Debug, Default)]
pub struct AccessRegistry {
    owners: HashMap<KeyHandle, CallerId>,
}

impl AccessRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `owner` as the sole caller allowed to use `handle`.
    pub fn register(&mut self, handle: KeyHandle, owner: CallerId) {
        self.owners.insert(handle, owner);
    }

    /// Remove a handle after the engine confirmed close or destroy.
    pub fn unregister(&mut self, handle: KeyHandle) {
        self.owners.remove(&handle);
    }

    /// Whether `caller` may use `handle`. Unknown handles are never permitted.
    pub fn is_permitted(&self, handle: KeyHandle, caller: CallerId) -> bool {
        self.owners.get(&handle) == Some(&caller)
    }

    /// Drop all registrations (subsystem teardown).
    pub fn clear(&mut self) {
        self.owners.clear();
    }

    /// Number of live registrations.
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    /// Whether no handles are registered.
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

/// Fold the caller identity into a client-chosen 32-bit key id.
///
/// Two callers naming the same id get distinct engine-namespace ids, so one
/// partition can never open another's persistent keys by guessing ids.
pub fn assemble_key_id(client_key_id: u32, caller: CallerId) -> u64 {
    (u64::from(client_key_id) << 32) | u64::from(caller.0.cast_unsigned())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: CallerId = CallerId(1);
    const BOB: CallerId = CallerId(2);

    #[test]
    fn only_the_registered_owner_is_permitted() {
        let mut registry = AccessRegistry::new();
        let handle = KeyHandle(42);

        assert!(!registry.is_permitted(handle, ALICE));

        registry.register(handle, ALICE);
        assert!(registry.is_permitted(handle, ALICE));
        assert!(!registry.is_permitted(handle, BOB));

        registry.unregister(handle);
        assert!(!registry.is_permitted(handle, ALICE));
    }

    #[test]
    fn clear_drops_everything() {
        let mut registry = AccessRegistry::new();
        registry.register(KeyHandle(1), ALICE);
        registry.register(KeyHandle(2), BOB);
        assert_eq!(registry.len(), 2);

        registry.clear();
        assert!(registry.is_empty());
    }

    #[test]
    fn assembled_id_separates_callers() {
        assert_ne!(assemble_key_id(7, ALICE), assemble_key_id(7, BOB));
        assert_eq!(assemble_key_id(7, ALICE), assemble_key_id(7, ALICE));
    }

    #[test]
    fn assembled_id_keeps_client_id_in_high_bits() {
        let id = assemble_key_id(0xDEAD_BEEF, CallerId(-1));
        assert_eq!(id >> 32, 0xDEAD_BEEF);
        assert_eq!(id & 0xFFFF_FFFF, 0xFFFF_FFFF);
    }
}
