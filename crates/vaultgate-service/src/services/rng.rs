//! Random generation service.
//!
//! The caller's declared output capacity is the request: the service fills
//! exactly that many bytes.

use vaultgate_engine::CryptoEngine;
use vaultgate_proto::Message;

use crate::channel::SecureChannel;
use crate::dispatch::Dispatcher;
use crate::error::CallResult;
use crate::transfer;

impl<C: SecureChannel, E: CryptoEngine> Dispatcher<C, E> {
    pub(crate) fn call_rng(&mut self, msg: &Message) -> CallResult {
        let Self { channel, engine, .. } = self;
        let mut scratch = transfer::alloc_scratch(msg.out_sizes[0])?;
        engine.generate_random(&mut scratch)?;
        channel.write(msg.channel, 0, &scratch);
        Ok(())
    }
}
