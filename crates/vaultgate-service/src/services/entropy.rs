//! Entropy injection service.

use vaultgate_engine::CryptoEngine;
use vaultgate_proto::{Message, Status};

use crate::channel::SecureChannel;
use crate::dispatch::Dispatcher;
use crate::error::{CallResult, ServiceError};
use crate::transfer;

impl<C: SecureChannel, E: CryptoEngine> Dispatcher<C, E> {
    pub(crate) fn call_entropy(&mut self, msg: &Message) -> CallResult {
        let Self { channel, engine, .. } = self;
        // Oversized seeds are refused before any bytes are pulled across.
        if msg.in_sizes[0] > engine.entropy_seed_limit() {
            return Err(ServiceError::refused(Status::InvalidArgument));
        }
        let seed = transfer::read_param(channel, msg, 0)?;
        engine.inject_entropy(&seed)?;
        Ok(())
    }
}
