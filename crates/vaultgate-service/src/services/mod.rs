//! Per-kind service state machines.
//!
//! Each module extends [`Dispatcher`](crate::dispatch::Dispatcher) with the
//! call handler for one service kind. Handlers decode the kind's request
//! header from input parameter 0, check access control before any engine
//! call that takes a caller handle, and return a [`CallResult`] the
//! dispatcher turns into the single reply.

mod aead;
mod asymmetric;
mod derivation;
mod entropy;
mod hash;
mod key_mng;
mod lifecycle;
mod mac;
mod rng;
mod symmetric;

use vaultgate_engine::KeyHandle;
use vaultgate_proto::{CallerId, Status};

use crate::error::{CallResult, ServiceError};
use crate::registry::AccessRegistry;

/// Refuse with invalid-handle unless `caller` owns `handle`.
pub(crate) fn check_permitted(
    registry: &AccessRegistry,
    handle: KeyHandle,
    caller: CallerId,
) -> CallResult {
    if registry.is_permitted(handle, caller) {
        Ok(())
    } else {
        Err(ServiceError::refused(Status::InvalidHandle))
    }
}
